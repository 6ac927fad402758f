use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /                      -> list
/// POST   /                      -> create
/// GET    /stats                 -> stats
/// GET    /{id}                  -> get_by_id
/// PUT    /{id}                  -> update
/// DELETE /{id}                  -> delete
/// PATCH  /{id}/activate         -> activate
/// PATCH  /{id}/deactivate       -> deactivate
/// POST   /{id}/reset-password   -> reset_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(user::list).post(user::create))
        .route("/stats", get(user::stats))
        .route(
            "/{id}",
            get(user::get_by_id).put(user::update).delete(user::delete),
        )
        .route("/{id}/activate", patch(user::activate))
        .route("/{id}/deactivate", patch(user::deactivate))
        .route("/{id}/reset-password", post(user::reset_password))
}
