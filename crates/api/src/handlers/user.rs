//! Handlers for the `/users` resource.
//!
//! Passwords are hashed here before anything reaches storage; responses use
//! [`UserResponse`], which has no hash field.

use axum::extract::{Path, Query, State};
use cadre_core::error::CoreError;
use cadre_core::listing::USER_LISTING;
use cadre_core::types::DbId;
use cadre_core::validation::{MAX_NAME_LEN, MIN_PASSWORD_LENGTH};
use cadre_db::models::user::{CreateUser, UpdateUser, UserResponse, UserStats};
use cadre_db::repositories::UserRepo;
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::{RequireAdmin, RequireManager};
use crate::query::ListParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(
        length(min = 1, max = MAX_NAME_LEN),
        custom(function = "cadre_core::validation::not_blank")
    )]
    pub full_name: String,
    pub password: String,
    pub role_id: DbId,
    pub org_unit_id: Option<DbId>,
}

/// Request body for `POST /users/{id}/reset-password`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

fn hash_checked(password: &str) -> AppResult<String> {
    validate_password_strength(password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

fn reject_self(admin_id: DbId, target_id: DbId, action: &str) -> AppResult<()> {
    if admin_id == target_id {
        return Err(AppError::Core(CoreError::Validation(format!(
            "You cannot {action} your own account"
        ))));
    }
    Ok(())
}

/// GET /api/v1/users
///
/// Filterable by `roleId`, `orgUnitId` and `isActive`.
pub async fn list(
    State(state): State<AppState>,
    _caller: RequireManager,
    Query(params): Query<ListParams>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let query = params.to_query(&USER_LISTING, |b| {
        Ok(b.eq("role_id", params.role_id()?)
            .eq("org_unit_id", params.org_unit_id()?))
    })?;
    let page = UserRepo::list(&state.pool, &query).await?;
    Ok(ApiResponse::page("Users retrieved successfully", page))
}

/// GET /api/v1/users/stats
pub async fn stats(
    State(state): State<AppState>,
    _caller: RequireManager,
) -> AppResult<ApiResponse<UserStats>> {
    let stats = UserRepo::stats(&state.pool).await?;
    Ok(ApiResponse::ok(
        "User statistics retrieved successfully",
        stats,
    ))
}

/// GET /api/v1/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _caller: RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = UserRepo::find_response(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::ok("User retrieved successfully", user))
}

/// POST /api/v1/users
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let password_hash = hash_checked(&input.password)?;
    let create = CreateUser {
        username: input.username,
        email: input.email,
        full_name: input.full_name,
        password_hash,
        role_id: input.role_id,
        org_unit_id: input.org_unit_id,
    };
    let user = UserRepo::create(&state.pool, &create, Some(admin.user_id)).await?;
    let response = UserRepo::to_response(&state.pool, &user).await?;
    Ok(ApiResponse::created("User created successfully", response))
}

/// PUT /api/v1/users/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = UserRepo::update(&state.pool, id, &input, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let response = UserRepo::to_response(&state.pool, &user).await?;
    Ok(ApiResponse::ok("User updated successfully", response))
}

/// DELETE /api/v1/users/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<()>> {
    reject_self(admin.user_id, id, "delete")?;
    if UserRepo::delete(&state.pool, id).await? {
        Ok(ApiResponse::ok("User deleted successfully", ()))
    } else {
        Err(not_found(id))
    }
}

/// PATCH /api/v1/users/{id}/activate
pub async fn activate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = UserRepo::set_active(&state.pool, id, true, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let response = UserRepo::to_response(&state.pool, &user).await?;
    Ok(ApiResponse::ok("User activated successfully", response))
}

/// PATCH /api/v1/users/{id}/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<UserResponse>> {
    reject_self(admin.user_id, id, "deactivate")?;
    let user = UserRepo::set_active(&state.pool, id, false, admin.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let response = UserRepo::to_response(&state.pool, &user).await?;
    Ok(ApiResponse::ok("User deactivated successfully", response))
}

/// POST /api/v1/users/{id}/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    let password_hash = hash_checked(&input.new_password)?;
    if UserRepo::update_password(&state.pool, id, &password_hash, admin.user_id).await? {
        Ok(ApiResponse::ok("Password reset successfully", ()))
    } else {
        Err(not_found(id))
    }
}
