use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::handlers::topic;
use crate::state::AppState;

/// Routes mounted at `/topics`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> create
/// GET    /stats             -> stats
/// PUT    /reorder           -> reorder
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// PATCH  /{id}/activate     -> activate
/// PATCH  /{id}/deactivate   -> deactivate
/// POST   /{id}/clone        -> clone_topic
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(topic::list).post(topic::create))
        .route("/stats", get(topic::stats))
        .route("/reorder", put(topic::reorder))
        .route(
            "/{id}",
            get(topic::get_by_id)
                .put(topic::update)
                .delete(topic::delete),
        )
        .route("/{id}/activate", patch(topic::activate))
        .route("/{id}/deactivate", patch(topic::deactivate))
        .route("/{id}/clone", post(topic::clone_topic))
}
