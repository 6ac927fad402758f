//! Role model and DTOs.

use cadre_core::types::{DbId, Timestamp};
use cadre_core::validation::MAX_DESCRIPTION_LEN;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::permission::Permission;
use crate::aggregate::ActiveSplit;

/// A row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A role list row with derived permission and user counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleWithCounts {
    #[serde(flatten)]
    pub role: Role,
    pub permission_count: i64,
    pub user_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRole {
    #[validate(
        length(min = 1, max = 100),
        custom(function = "cadre_core::validation::not_blank")
    )]
    pub name: String,
    #[validate(length(max = MAX_DESCRIPTION_LEN))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
    /// Permissions granted on creation.
    #[serde(default)]
    pub permission_ids: Vec<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRole {
    #[validate(
        length(min = 1, max = 100),
        custom(function = "cadre_core::validation::not_blank")
    )]
    pub name: Option<String>,
    #[validate(length(max = MAX_DESCRIPTION_LEN))]
    pub description: Option<String>,
}

/// Replace the full permission set of a role.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetRolePermissions {
    pub permission_ids: Vec<DbId>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleStats {
    pub roles: ActiveSplit,
    pub roles_with_permissions: i64,
    pub roles_with_users: i64,
    pub permissions: ActiveSplit,
}
