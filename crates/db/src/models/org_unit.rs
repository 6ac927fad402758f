//! Organizational unit model and DTOs.
//!
//! Units form a tree through `parent_id`; roots have no parent.

use std::collections::HashMap;

use cadre_core::types::{DbId, Timestamp};
use cadre_core::validation::{MAX_DESCRIPTION_LEN, MAX_NAME_LEN};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::aggregate::ActiveSplit;

/// A row from the `org_units` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnit {
    pub id: DbId,
    pub parent_id: Option<DbId>,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A unit list row with its direct child and member counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnitWithCounts {
    #[serde(flatten)]
    pub unit: OrgUnit,
    pub child_count: i64,
    pub user_count: i64,
}

/// A node of the full hierarchy.
#[derive(Debug, Clone, Serialize)]
pub struct OrgUnitNode {
    #[serde(flatten)]
    pub unit: OrgUnit,
    pub children: Vec<OrgUnitNode>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrgUnit {
    pub parent_id: Option<DbId>,
    #[validate(
        length(min = 1, max = MAX_NAME_LEN),
        custom(function = "cadre_core::validation::not_blank")
    )]
    pub name: String,
    #[validate(
        length(min = 1, max = 32),
        custom(function = "cadre_core::validation::unit_code")
    )]
    pub code: String,
    #[validate(length(max = MAX_DESCRIPTION_LEN))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Partial update. `parent_id` re-parents the unit (never to a descendant).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrgUnit {
    pub parent_id: Option<DbId>,
    #[validate(
        length(min = 1, max = MAX_NAME_LEN),
        custom(function = "cadre_core::validation::not_blank")
    )]
    pub name: Option<String>,
    #[validate(
        length(min = 1, max = 32),
        custom(function = "cadre_core::validation::unit_code")
    )]
    pub code: Option<String>,
    #[validate(length(max = MAX_DESCRIPTION_LEN))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnitStats {
    pub units: ActiveSplit,
    pub root_units: i64,
    pub units_with_children: i64,
    pub units_with_users: i64,
}

/// Assemble a forest from a flat list of units.
///
/// Children keep the relative order of `units`. Only units without a parent
/// become roots; a unit whose parent is missing from the list is dropped along
/// with its whole subtree, so a filtered list never surfaces a nested unit at
/// the top level.
pub fn build_tree(units: Vec<OrgUnit>) -> Vec<OrgUnitNode> {
    let mut children_of: HashMap<Option<DbId>, Vec<OrgUnit>> = HashMap::new();
    for unit in units {
        children_of.entry(unit.parent_id).or_default().push(unit);
    }

    fn attach(
        parent: Option<DbId>,
        children_of: &mut HashMap<Option<DbId>, Vec<OrgUnit>>,
    ) -> Vec<OrgUnitNode> {
        let units = children_of.remove(&parent).unwrap_or_default();
        units
            .into_iter()
            .map(|unit| {
                let children = attach(Some(unit.id), children_of);
                OrgUnitNode { unit, children }
            })
            .collect()
    }

    attach(None, &mut children_of)
}
