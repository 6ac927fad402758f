//! Topic model and DTOs. Topics belong to exactly one module.

use cadre_core::reorder::ReorderItem;
use cadre_core::types::{DbId, Timestamp};
use cadre_core::validation::{MAX_DESCRIPTION_LEN, MAX_NAME_LEN};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::aggregate::ActiveSplit;

/// A row from the `topics` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: DbId,
    pub module_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopic {
    pub module_id: DbId,
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

/// Partial update. Setting `module_id` moves the topic to another module.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTopic {
    pub module_id: Option<DbId>,
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

/// Request to copy a topic into a module (possibly its own).
///
/// Without `name` the source name is kept, which only succeeds across modules.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CloneTopic {
    pub target_module_id: DbId,
    #[validate(
        length(min = 1, max = MAX_NAME_LEN),
        custom(function = "cadre_core::validation::not_blank")
    )]
    pub name: Option<String>,
}

/// Reorder request for the topics of one module.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTopics {
    pub module_id: DbId,
    pub items: Vec<ReorderItem>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicStats {
    pub topics: ActiveSplit,
    pub modules_with_topics: i64,
}
