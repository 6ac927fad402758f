//! Permission model and DTOs. Permissions are grouped by `resource`.

use cadre_core::types::{DbId, Timestamp};
use cadre_core::validation::MAX_DESCRIPTION_LEN;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `permissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub resource: String,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermission {
    #[validate(
        length(min = 1, max = 150),
        custom(function = "cadre_core::validation::not_blank")
    )]
    pub name: String,
    #[validate(length(max = MAX_DESCRIPTION_LEN))]
    pub description: Option<String>,
    #[validate(
        length(min = 1, max = 100),
        custom(function = "cadre_core::validation::not_blank")
    )]
    pub resource: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermission {
    #[validate(
        length(min = 1, max = 150),
        custom(function = "cadre_core::validation::not_blank")
    )]
    pub name: Option<String>,
    #[validate(length(max = MAX_DESCRIPTION_LEN))]
    pub description: Option<String>,
    #[validate(
        length(min = 1, max = 100),
        custom(function = "cadre_core::validation::not_blank")
    )]
    pub resource: Option<String>,
}
