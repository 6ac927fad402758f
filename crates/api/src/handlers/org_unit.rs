//! Handlers for the `/org-units` resource (organizational hierarchy).

use axum::extract::{Path, Query, State};
use cadre_core::error::CoreError;
use cadre_core::listing::ORG_UNIT_LISTING;
use cadre_core::types::DbId;
use cadre_db::models::org_unit::{
    CreateOrgUnit, OrgUnit, OrgUnitNode, OrgUnitStats, OrgUnitWithCounts, UpdateOrgUnit,
};
use cadre_db::repositories::OrgUnitRepo;

use super::ReorderRequest;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::{RequireAdmin, RequireManager};
use crate::query::ListParams;
use crate::response::ApiResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "OrgUnit",
        id,
    })
}

/// GET /api/v1/org-units
///
/// Filterable by `parentId` and `isActive`.
pub async fn list(
    State(state): State<AppState>,
    _caller: RequireManager,
    Query(params): Query<ListParams>,
) -> AppResult<ApiResponse<Vec<OrgUnitWithCounts>>> {
    let query = params.to_query(&ORG_UNIT_LISTING, |b| {
        Ok(b.eq("parent_id", params.parent_id()?))
    })?;
    let page = OrgUnitRepo::list(&state.pool, &query).await?;
    Ok(ApiResponse::page(
        "Organizational units retrieved successfully",
        page,
    ))
}

/// GET /api/v1/org-units/tree
///
/// `?isActive=true` limits the tree to active units.
pub async fn tree(
    State(state): State<AppState>,
    _caller: RequireManager,
    Query(params): Query<ListParams>,
) -> AppResult<ApiResponse<Vec<OrgUnitNode>>> {
    let active_only = params.is_active()? == Some(true);
    let tree = OrgUnitRepo::tree(&state.pool, active_only).await?;
    Ok(ApiResponse::ok(
        "Organizational hierarchy retrieved successfully",
        tree,
    ))
}

/// GET /api/v1/org-units/stats
pub async fn stats(
    State(state): State<AppState>,
    _caller: RequireManager,
) -> AppResult<ApiResponse<OrgUnitStats>> {
    let stats = OrgUnitRepo::stats(&state.pool).await?;
    Ok(ApiResponse::ok(
        "Organizational unit statistics retrieved successfully",
        stats,
    ))
}

/// GET /api/v1/org-units/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _caller: RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<OrgUnit>> {
    let unit = OrgUnitRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok(
        "Organizational unit retrieved successfully",
        unit,
    ))
}

/// GET /api/v1/org-units/{id}/children
pub async fn children(
    State(state): State<AppState>,
    _caller: RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Vec<OrgUnit>>> {
    if OrgUnitRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(not_found(id));
    }
    let children = OrgUnitRepo::children(&state.pool, id).await?;
    Ok(ApiResponse::ok(
        "Child units retrieved successfully",
        children,
    ))
}

/// POST /api/v1/org-units
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateOrgUnit>,
) -> AppResult<ApiResponse<OrgUnit>> {
    let unit = OrgUnitRepo::create(&state.pool, &input, admin.user_id).await?;
    Ok(ApiResponse::created(
        "Organizational unit created successfully",
        unit,
    ))
}

/// PUT /api/v1/org-units/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateOrgUnit>,
) -> AppResult<ApiResponse<OrgUnit>> {
    let unit = OrgUnitRepo::update(&state.pool, id, &input, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok(
        "Organizational unit updated successfully",
        unit,
    ))
}

/// DELETE /api/v1/org-units/{id}
///
/// Rejected with `DEPENDENCY_EXISTS` while the unit has child units or users.
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<()>> {
    if OrgUnitRepo::delete(&state.pool, id).await? {
        Ok(ApiResponse::ok(
            "Organizational unit deleted successfully",
            (),
        ))
    } else {
        Err(not_found(id))
    }
}

/// PATCH /api/v1/org-units/{id}/activate
pub async fn activate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<OrgUnit>> {
    let unit = OrgUnitRepo::set_active(&state.pool, id, true, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok(
        "Organizational unit activated successfully",
        unit,
    ))
}

/// PATCH /api/v1/org-units/{id}/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<OrgUnit>> {
    let unit = OrgUnitRepo::set_active(&state.pool, id, false, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok(
        "Organizational unit deactivated successfully",
        unit,
    ))
}

/// PUT /api/v1/org-units/reorder
pub async fn reorder(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<ReorderRequest>,
) -> AppResult<ApiResponse<Vec<OrgUnit>>> {
    let units = OrgUnitRepo::reorder(&state.pool, &input.items, admin.user_id).await?;
    Ok(ApiResponse::ok(
        "Organizational units reordered successfully",
        units,
    ))
}
