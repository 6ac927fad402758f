//! Handlers for the `/roles` resource and a role's permission set.

use axum::extract::{Path, Query, State};
use cadre_core::error::CoreError;
use cadre_core::listing::ROLE_LISTING;
use cadre_core::types::DbId;
use cadre_db::models::permission::Permission;
use cadre_db::models::role::{
    CreateRole, Role, RoleStats, RoleWithCounts, RoleWithPermissions, SetRolePermissions,
    UpdateRole,
};
use cadre_db::repositories::RoleRepo;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::{RequireAdmin, RequireManager};
use crate::query::ListParams;
use crate::response::ApiResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Role", id })
}

/// GET /api/v1/roles
pub async fn list(
    State(state): State<AppState>,
    _caller: RequireManager,
    Query(params): Query<ListParams>,
) -> AppResult<ApiResponse<Vec<RoleWithCounts>>> {
    let query = params.to_query(&ROLE_LISTING, Ok)?;
    let page = RoleRepo::list(&state.pool, &query).await?;
    Ok(ApiResponse::page("Roles retrieved successfully", page))
}

/// GET /api/v1/roles/stats
pub async fn stats(
    State(state): State<AppState>,
    _caller: RequireManager,
) -> AppResult<ApiResponse<RoleStats>> {
    let stats = RoleRepo::stats(&state.pool).await?;
    Ok(ApiResponse::ok(
        "Role statistics retrieved successfully",
        stats,
    ))
}

/// GET /api/v1/roles/{id}
///
/// Includes the role's permissions.
pub async fn get_by_id(
    State(state): State<AppState>,
    _caller: RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<RoleWithPermissions>> {
    let role = RoleRepo::find_with_permissions(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok("Role retrieved successfully", role))
}

/// POST /api/v1/roles
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateRole>,
) -> AppResult<ApiResponse<RoleWithPermissions>> {
    let role = RoleRepo::create(&state.pool, &input, admin.user_id).await?;
    let permissions = RoleRepo::permissions(&state.pool, role.id).await?;
    Ok(ApiResponse::created(
        "Role created successfully",
        RoleWithPermissions { role, permissions },
    ))
}

/// PUT /api/v1/roles/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateRole>,
) -> AppResult<ApiResponse<Role>> {
    let role = RoleRepo::update(&state.pool, id, &input, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok("Role updated successfully", role))
}

/// DELETE /api/v1/roles/{id}
///
/// Rejected with `DEPENDENCY_EXISTS` while users still hold the role.
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<()>> {
    if RoleRepo::delete(&state.pool, id).await? {
        Ok(ApiResponse::ok("Role deleted successfully", ()))
    } else {
        Err(not_found(id))
    }
}

/// PATCH /api/v1/roles/{id}/activate
pub async fn activate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Role>> {
    let role = RoleRepo::set_active(&state.pool, id, true, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok("Role activated successfully", role))
}

/// PATCH /api/v1/roles/{id}/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Role>> {
    let role = RoleRepo::set_active(&state.pool, id, false, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok("Role deactivated successfully", role))
}

/// GET /api/v1/roles/{id}/permissions
pub async fn list_permissions(
    State(state): State<AppState>,
    _caller: RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Vec<Permission>>> {
    if RoleRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(not_found(id));
    }
    let permissions = RoleRepo::permissions(&state.pool, id).await?;
    Ok(ApiResponse::ok(
        "Role permissions retrieved successfully",
        permissions,
    ))
}

/// PUT /api/v1/roles/{id}/permissions
///
/// Replaces the whole permission set in one transaction.
pub async fn set_permissions(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SetRolePermissions>,
) -> AppResult<ApiResponse<Vec<Permission>>> {
    let permissions =
        RoleRepo::set_permissions(&state.pool, id, &input.permission_ids, admin.user_id)
            .await?
            .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok(
        "Role permissions updated successfully",
        permissions,
    ))
}
