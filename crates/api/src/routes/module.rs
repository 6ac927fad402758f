use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::handlers::module;
use crate::state::AppState;

/// Routes mounted at `/modules`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> create
/// GET    /options           -> options
/// GET    /stats             -> stats
/// PUT    /reorder           -> reorder
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// PATCH  /{id}/activate     -> activate
/// PATCH  /{id}/deactivate   -> deactivate
/// POST   /{id}/clone        -> clone_module
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(module::list).post(module::create))
        .route("/options", get(module::options))
        .route("/stats", get(module::stats))
        .route("/reorder", put(module::reorder))
        .route(
            "/{id}",
            get(module::get_by_id)
                .put(module::update)
                .delete(module::delete),
        )
        .route("/{id}/activate", patch(module::activate))
        .route("/{id}/deactivate", patch(module::deactivate))
        .route("/{id}/clone", post(module::clone_module))
}
