use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::permission;
use crate::state::AppState;

/// Routes mounted at `/permissions`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> create
/// GET    /resources         -> resources
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// PATCH  /{id}/activate     -> activate
/// PATCH  /{id}/deactivate   -> deactivate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(permission::list).post(permission::create))
        .route("/resources", get(permission::resources))
        .route(
            "/{id}",
            get(permission::get_by_id)
                .put(permission::update)
                .delete(permission::delete),
        )
        .route("/{id}/activate", patch(permission::activate))
        .route("/{id}/deactivate", patch(permission::deactivate))
}
