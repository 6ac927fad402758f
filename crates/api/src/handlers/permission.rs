//! Handlers for the `/permissions` resource.

use axum::extract::{Path, Query, State};
use cadre_core::error::CoreError;
use cadre_core::listing::PERMISSION_LISTING;
use cadre_core::types::DbId;
use cadre_db::models::permission::{CreatePermission, Permission, UpdatePermission};
use cadre_db::repositories::PermissionRepo;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::{RequireAdmin, RequireManager};
use crate::query::ListParams;
use crate::response::ApiResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Permission",
        id,
    })
}

/// GET /api/v1/permissions
///
/// Filterable by `resource` and `isActive`.
pub async fn list(
    State(state): State<AppState>,
    _caller: RequireManager,
    Query(params): Query<ListParams>,
) -> AppResult<ApiResponse<Vec<Permission>>> {
    let query = params.to_query(&PERMISSION_LISTING, |b| {
        Ok(b.eq("resource", params.resource()))
    })?;
    let page = PermissionRepo::list(&state.pool, &query).await?;
    Ok(ApiResponse::page(
        "Permissions retrieved successfully",
        page,
    ))
}

/// GET /api/v1/permissions/resources
///
/// Distinct resource names, for grouping permissions in the UI.
pub async fn resources(
    State(state): State<AppState>,
    _caller: RequireManager,
) -> AppResult<ApiResponse<Vec<String>>> {
    let resources = PermissionRepo::resources(&state.pool).await?;
    Ok(ApiResponse::ok(
        "Permission resources retrieved successfully",
        resources,
    ))
}

/// GET /api/v1/permissions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _caller: RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Permission>> {
    let permission = PermissionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok(
        "Permission retrieved successfully",
        permission,
    ))
}

/// POST /api/v1/permissions
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreatePermission>,
) -> AppResult<ApiResponse<Permission>> {
    let permission = PermissionRepo::create(&state.pool, &input, admin.user_id).await?;
    Ok(ApiResponse::created(
        "Permission created successfully",
        permission,
    ))
}

/// PUT /api/v1/permissions/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdatePermission>,
) -> AppResult<ApiResponse<Permission>> {
    let permission = PermissionRepo::update(&state.pool, id, &input, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok(
        "Permission updated successfully",
        permission,
    ))
}

/// DELETE /api/v1/permissions/{id}
///
/// Role grants of the permission are removed with it.
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<()>> {
    if PermissionRepo::delete(&state.pool, id).await? {
        Ok(ApiResponse::ok("Permission deleted successfully", ()))
    } else {
        Err(not_found(id))
    }
}

/// PATCH /api/v1/permissions/{id}/activate
pub async fn activate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Permission>> {
    let permission = PermissionRepo::set_active(&state.pool, id, true, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok(
        "Permission activated successfully",
        permission,
    ))
}

/// PATCH /api/v1/permissions/{id}/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Permission>> {
    let permission = PermissionRepo::set_active(&state.pool, id, false, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok(
        "Permission deactivated successfully",
        permission,
    ))
}
