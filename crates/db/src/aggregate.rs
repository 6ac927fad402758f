//! Grouped child counts and statistics helpers.
//!
//! [`count_children`] attaches per-parent counts to list rows with a single
//! grouped query instead of one query per row.

use std::collections::HashMap;

use cadre_core::types::DbId;
use sqlx::PgPool;

/// A parent/child relationship expressed as the child table and its FK column.
#[derive(Debug, Clone, Copy)]
pub struct ChildRelation {
    pub child_table: &'static str,
    pub foreign_key: &'static str,
}

pub const TOPICS_BY_MODULE: ChildRelation = ChildRelation {
    child_table: "topics",
    foreign_key: "module_id",
};

pub const PERMISSIONS_BY_ROLE: ChildRelation = ChildRelation {
    child_table: "role_permissions",
    foreign_key: "role_id",
};

pub const USERS_BY_ROLE: ChildRelation = ChildRelation {
    child_table: "users",
    foreign_key: "role_id",
};

pub const UNITS_BY_PARENT: ChildRelation = ChildRelation {
    child_table: "org_units",
    foreign_key: "parent_id",
};

pub const USERS_BY_ORG_UNIT: ChildRelation = ChildRelation {
    child_table: "users",
    foreign_key: "org_unit_id",
};

/// Count children per parent for every id in `parent_ids`.
///
/// Every requested id appears in the result; parents without children map
/// to `0`. An empty id list returns an empty map without touching storage.
pub async fn count_children(
    pool: &PgPool,
    relation: &ChildRelation,
    parent_ids: &[DbId],
) -> Result<HashMap<DbId, i64>, sqlx::Error> {
    if parent_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let query = format!(
        "SELECT p.id, COUNT(c.{fk}) AS child_count \
         FROM UNNEST($1::BIGINT[]) AS p(id) \
         LEFT JOIN {table} c ON c.{fk} = p.id \
         GROUP BY p.id",
        fk = relation.foreign_key,
        table = relation.child_table,
    );
    let rows: Vec<(DbId, i64)> = sqlx::query_as(&query)
        .bind(parent_ids)
        .fetch_all(pool)
        .await?;

    let mut counts: HashMap<DbId, i64> = parent_ids.iter().map(|&id| (id, 0)).collect();
    counts.extend(rows);
    Ok(counts)
}

/// Count the rows of `relation.child_table` whose parent is `parent_id`.
pub async fn count_for_parent(
    pool: &PgPool,
    relation: &ChildRelation,
    parent_id: DbId,
) -> Result<i64, sqlx::Error> {
    let query = format!(
        "SELECT COUNT(*) FROM {} WHERE {} = $1",
        relation.child_table, relation.foreign_key
    );
    sqlx::query_scalar::<_, i64>(&query)
        .bind(parent_id)
        .fetch_one(pool)
        .await
}

/// Number of distinct parents that have at least one child.
pub async fn count_parents_with_children(
    pool: &PgPool,
    relation: &ChildRelation,
) -> Result<i64, sqlx::Error> {
    let query = format!(
        "SELECT COUNT(DISTINCT {fk}) FROM {table} WHERE {fk} IS NOT NULL",
        fk = relation.foreign_key,
        table = relation.child_table,
    );
    sqlx::query_scalar::<_, i64>(&query).fetch_one(pool).await
}

/// Total, active and inactive row counts of a table with an `is_active` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSplit {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
}

/// Compute an [`ActiveSplit`] in one pass using `FILTER` aggregates.
pub async fn active_split(pool: &PgPool, table: &'static str) -> Result<ActiveSplit, sqlx::Error> {
    let query = format!(
        "SELECT COUNT(*), \
                COUNT(*) FILTER (WHERE is_active), \
                COUNT(*) FILTER (WHERE NOT is_active) \
         FROM {table}"
    );
    let (total, active, inactive): (i64, i64, i64) = sqlx::query_as(&query).fetch_one(pool).await?;
    Ok(ActiveSplit {
        total,
        active,
        inactive,
    })
}
