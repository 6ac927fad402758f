use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::role;
use crate::state::AppState;

/// Routes mounted at `/roles`.
///
/// ```text
/// GET    /                    -> list
/// POST   /                    -> create
/// GET    /stats               -> stats
/// GET    /{id}                -> get_by_id
/// PUT    /{id}                -> update
/// DELETE /{id}                -> delete
/// PATCH  /{id}/activate       -> activate
/// PATCH  /{id}/deactivate     -> deactivate
/// GET    /{id}/permissions    -> list_permissions
/// PUT    /{id}/permissions    -> set_permissions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(role::list).post(role::create))
        .route("/stats", get(role::stats))
        .route(
            "/{id}",
            get(role::get_by_id).put(role::update).delete(role::delete),
        )
        .route("/{id}/activate", patch(role::activate))
        .route("/{id}/deactivate", patch(role::deactivate))
        .route(
            "/{id}/permissions",
            get(role::list_permissions).put(role::set_permissions),
        )
}
