use axum::routing::{get, patch, put};
use axum::Router;

use crate::handlers::org_unit;
use crate::state::AppState;

/// Routes mounted at `/org-units`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> create
/// GET    /tree              -> tree
/// GET    /stats             -> stats
/// PUT    /reorder           -> reorder
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// GET    /{id}/children     -> children
/// PATCH  /{id}/activate     -> activate
/// PATCH  /{id}/deactivate   -> deactivate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(org_unit::list).post(org_unit::create))
        .route("/tree", get(org_unit::tree))
        .route("/stats", get(org_unit::stats))
        .route("/reorder", put(org_unit::reorder))
        .route(
            "/{id}",
            get(org_unit::get_by_id)
                .put(org_unit::update)
                .delete(org_unit::delete),
        )
        .route("/{id}/children", get(org_unit::children))
        .route("/{id}/activate", patch(org_unit::activate))
        .route("/{id}/deactivate", patch(org_unit::deactivate))
}
