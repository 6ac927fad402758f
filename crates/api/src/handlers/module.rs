//! Handlers for the `/modules` resource.

use axum::extract::{Path, Query, State};
use cadre_core::error::CoreError;
use cadre_core::listing::MODULE_LISTING;
use cadre_core::types::DbId;
use cadre_db::models::module::{
    CloneModule, CreateModule, Module, ModuleOption, ModuleStats, ModuleWithCount,
    ModuleWithTopics, UpdateModule,
};
use cadre_db::repositories::ModuleRepo;

use super::ReorderRequest;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::{RequireAdmin, RequireManager};
use crate::query::ListParams;
use crate::response::ApiResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Module",
        id,
    })
}

/// GET /api/v1/modules
pub async fn list(
    State(state): State<AppState>,
    _caller: RequireManager,
    Query(params): Query<ListParams>,
) -> AppResult<ApiResponse<Vec<ModuleWithCount>>> {
    let query = params.to_query(&MODULE_LISTING, Ok)?;
    let page = ModuleRepo::list(&state.pool, &query).await?;
    Ok(ApiResponse::page("Modules retrieved successfully", page))
}

/// GET /api/v1/modules/options
pub async fn options(
    State(state): State<AppState>,
    _caller: RequireManager,
) -> AppResult<ApiResponse<Vec<ModuleOption>>> {
    let options = ModuleRepo::options(&state.pool).await?;
    Ok(ApiResponse::ok(
        "Module options retrieved successfully",
        options,
    ))
}

/// GET /api/v1/modules/stats
pub async fn stats(
    State(state): State<AppState>,
    _caller: RequireManager,
) -> AppResult<ApiResponse<ModuleStats>> {
    let stats = ModuleRepo::stats(&state.pool).await?;
    Ok(ApiResponse::ok(
        "Module statistics retrieved successfully",
        stats,
    ))
}

/// GET /api/v1/modules/{id}
///
/// Returns the module with its topics in display order.
pub async fn get_by_id(
    State(state): State<AppState>,
    _caller: RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<ModuleWithTopics>> {
    let module = ModuleRepo::find_with_topics(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok("Module retrieved successfully", module))
}

/// POST /api/v1/modules
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateModule>,
) -> AppResult<ApiResponse<Module>> {
    let module = ModuleRepo::create(&state.pool, &input, admin.user_id).await?;
    Ok(ApiResponse::created("Module created successfully", module))
}

/// PUT /api/v1/modules/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateModule>,
) -> AppResult<ApiResponse<Module>> {
    let module = ModuleRepo::update(&state.pool, id, &input, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok("Module updated successfully", module))
}

/// DELETE /api/v1/modules/{id}
///
/// Rejected with `DEPENDENCY_EXISTS` while the module still has topics.
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<()>> {
    if ModuleRepo::delete(&state.pool, id).await? {
        Ok(ApiResponse::ok("Module deleted successfully", ()))
    } else {
        Err(not_found(id))
    }
}

/// PATCH /api/v1/modules/{id}/activate
pub async fn activate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Module>> {
    let module = ModuleRepo::set_active(&state.pool, id, true, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok("Module activated successfully", module))
}

/// PATCH /api/v1/modules/{id}/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Module>> {
    let module = ModuleRepo::set_active(&state.pool, id, false, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok("Module deactivated successfully", module))
}

/// PUT /api/v1/modules/reorder
pub async fn reorder(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<ReorderRequest>,
) -> AppResult<ApiResponse<Vec<Module>>> {
    let modules = ModuleRepo::reorder(&state.pool, &input.items, admin.user_id).await?;
    Ok(ApiResponse::ok("Modules reordered successfully", modules))
}

/// POST /api/v1/modules/{id}/clone
///
/// Copies the module and all of its topics under a new name.
pub async fn clone_module(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<CloneModule>,
) -> AppResult<ApiResponse<ModuleWithTopics>> {
    let module = ModuleRepo::clone_with_topics(&state.pool, id, &input.name, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::created("Module cloned successfully", module))
}
