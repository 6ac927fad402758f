//! Training module model and DTOs.
//!
//! A module is a top-level catalog entry that owns an ordered list of topics.

use cadre_core::types::{DbId, Timestamp};
use cadre_core::validation::{MAX_DESCRIPTION_LEN, MAX_NAME_LEN};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::topic::Topic;
use crate::aggregate::ActiveSplit;

/// A row from the `modules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A module list row with its derived topic count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleWithCount {
    #[serde(flatten)]
    pub module: Module,
    pub topic_count: i64,
}

/// A module with its topics eagerly loaded, in display order.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleWithTopics {
    #[serde(flatten)]
    pub module: Module,
    pub topics: Vec<Topic>,
}

/// Minimal projection for dropdowns.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ModuleOption {
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateModule {
    #[validate(
        length(min = 1, max = MAX_NAME_LEN),
        custom(function = "cadre_core::validation::not_blank")
    )]
    pub name: String,
    #[validate(length(max = MAX_DESCRIPTION_LEN))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Partial update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModule {
    #[validate(
        length(min = 1, max = MAX_NAME_LEN),
        custom(function = "cadre_core::validation::not_blank")
    )]
    pub name: Option<String>,
    #[validate(length(max = MAX_DESCRIPTION_LEN))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub display_order: Option<i32>,
}

/// Request to duplicate a module, with all its topics, under a new name.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CloneModule {
    #[validate(
        length(min = 1, max = MAX_NAME_LEN),
        custom(function = "cadre_core::validation::not_blank")
    )]
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStats {
    pub modules: ActiveSplit,
    pub modules_with_topics: i64,
    pub topics: ActiveSplit,
}
