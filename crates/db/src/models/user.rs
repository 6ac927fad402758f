//! User entity model and DTOs.

use cadre_core::types::{DbId, Timestamp};
use cadre_core::validation::MAX_NAME_LEN;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::aggregate::ActiveSplit;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub role_id: DbId,
    pub org_unit_id: Option<DbId>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    /// Resolved role name (e.g. `"admin"`, `"manager"`).
    pub role: String,
    pub role_id: DbId,
    pub org_unit_id: Option<DbId>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserResponse {
    pub fn from_user(user: &User, role: String) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role,
            role_id: user.role_id,
            org_unit_id: user.org_unit_id,
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_by: user.created_by,
            updated_by: user.updated_by,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for inserting a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub role_id: DbId,
    pub org_unit_id: Option<DbId>,
}

/// DTO for updating an existing user. All fields are optional; the password
/// is changed through a dedicated reset.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(length(min = 3, max = 64))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(
        length(min = 1, max = MAX_NAME_LEN),
        custom(function = "cadre_core::validation::not_blank")
    )]
    pub full_name: Option<String>,
    pub role_id: Option<DbId>,
    pub org_unit_id: Option<DbId>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub users: ActiveSplit,
    pub users_without_unit: i64,
    pub users_logged_in: i64,
}
