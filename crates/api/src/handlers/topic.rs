//! Handlers for the `/topics` resource.

use axum::extract::{Path, Query, State};
use cadre_core::error::CoreError;
use cadre_core::listing::TOPIC_LISTING;
use cadre_core::types::DbId;
use cadre_db::models::topic::{
    CloneTopic, CreateTopic, ReorderTopics, Topic, TopicStats, UpdateTopic,
};
use cadre_db::repositories::{ModuleRepo, TopicRepo};

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::{RequireAdmin, RequireManager};
use crate::query::ListParams;
use crate::response::ApiResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Topic",
        id,
    })
}

/// GET /api/v1/topics
///
/// Filterable by `moduleId` and `isActive`.
pub async fn list(
    State(state): State<AppState>,
    _caller: RequireManager,
    Query(params): Query<ListParams>,
) -> AppResult<ApiResponse<Vec<Topic>>> {
    let query = params.to_query(&TOPIC_LISTING, |b| {
        Ok(b.eq("module_id", params.module_id()?))
    })?;
    let page = TopicRepo::list(&state.pool, &query).await?;
    Ok(ApiResponse::page("Topics retrieved successfully", page))
}

/// GET /api/v1/topics/stats
pub async fn stats(
    State(state): State<AppState>,
    _caller: RequireManager,
) -> AppResult<ApiResponse<TopicStats>> {
    let stats = TopicRepo::stats(&state.pool).await?;
    Ok(ApiResponse::ok(
        "Topic statistics retrieved successfully",
        stats,
    ))
}

/// GET /api/v1/topics/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _caller: RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Topic>> {
    let topic = TopicRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok("Topic retrieved successfully", topic))
}

/// POST /api/v1/topics
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateTopic>,
) -> AppResult<ApiResponse<Topic>> {
    if ModuleRepo::find_by_id(&state.pool, input.module_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Module",
            id: input.module_id,
        }));
    }
    let topic = TopicRepo::create(&state.pool, &input, admin.user_id).await?;
    Ok(ApiResponse::created("Topic created successfully", topic))
}

/// PUT /api/v1/topics/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateTopic>,
) -> AppResult<ApiResponse<Topic>> {
    let topic = TopicRepo::update(&state.pool, id, &input, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok("Topic updated successfully", topic))
}

/// DELETE /api/v1/topics/{id}
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<()>> {
    if TopicRepo::delete(&state.pool, id).await? {
        Ok(ApiResponse::ok("Topic deleted successfully", ()))
    } else {
        Err(not_found(id))
    }
}

/// PATCH /api/v1/topics/{id}/activate
pub async fn activate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Topic>> {
    let topic = TopicRepo::set_active(&state.pool, id, true, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok("Topic activated successfully", topic))
}

/// PATCH /api/v1/topics/{id}/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Topic>> {
    let topic = TopicRepo::set_active(&state.pool, id, false, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok("Topic deactivated successfully", topic))
}

/// PUT /api/v1/topics/reorder
///
/// Every id in the batch must belong to `moduleId`.
pub async fn reorder(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<ReorderTopics>,
) -> AppResult<ApiResponse<Vec<Topic>>> {
    let topics =
        TopicRepo::reorder(&state.pool, input.module_id, &input.items, admin.user_id).await?;
    Ok(ApiResponse::ok("Topics reordered successfully", topics))
}

/// POST /api/v1/topics/{id}/clone
pub async fn clone_topic(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<CloneTopic>,
) -> AppResult<ApiResponse<Topic>> {
    let topic = TopicRepo::clone_into(
        &state.pool,
        id,
        input.target_module_id,
        input.name.as_deref(),
        admin.user_id,
    )
    .await?
    .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::created("Topic cloned successfully", topic))
}
