//! Repository for the `org_units` hierarchy.

use cadre_core::error::CoreError;
use cadre_core::listing::ORG_UNIT_LISTING;
use cadre_core::pagination::Page;
use cadre_core::reorder::ReorderItem;
use cadre_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::aggregate::{self, UNITS_BY_PARENT, USERS_BY_ORG_UNIT};
use crate::error::{dependency_on_fk, is_unique_violation, DbError};
use crate::models::org_unit::{
    build_tree, CreateOrgUnit, OrgUnit, OrgUnitNode, OrgUnitStats, OrgUnitWithCounts,
    UpdateOrgUnit,
};
use crate::query::{fetch_page, ListQuery};
use crate::reorder::{apply_reorder, ReorderTarget};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, parent_id, name, code, description, display_order, \
    is_active, created_by, updated_by, created_at, updated_at";

const DUPLICATE_CODE: &str = "An organizational unit with this code already exists";
const DUPLICATE_SIBLING_NAME: &str =
    "An organizational unit with this name already exists under the same parent";

/// Map a unique violation to the message of the constraint that fired.
fn classify_unique(err: sqlx::Error) -> DbError {
    if !is_unique_violation(&err) {
        return DbError::Sqlx(err);
    }
    let constraint = match &err {
        sqlx::Error::Database(db_err) => db_err.constraint().unwrap_or_default().to_string(),
        _ => String::new(),
    };
    let message = if constraint == "uq_org_units_code" {
        DUPLICATE_CODE
    } else {
        DUPLICATE_SIBLING_NAME
    };
    DbError::Core(CoreError::Conflict(message.to_string()))
}

/// Provides CRUD, hierarchy and reorder operations for organizational units.
pub struct OrgUnitRepo;

impl OrgUnitRepo {
    /// Insert a unit. A missing `parent_id` creates a root unit.
    pub async fn create(
        pool: &PgPool,
        input: &CreateOrgUnit,
        actor: DbId,
    ) -> Result<OrgUnit, DbError> {
        if let Some(parent_id) = input.parent_id {
            Self::require_exists(pool, parent_id).await?;
        }

        let query = format!(
            "INSERT INTO org_units \
                (parent_id, name, code, description, display_order, is_active, \
                 created_by, updated_by) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE($6, true), $7, $7) \
             RETURNING {COLUMNS}"
        );
        let unit = sqlx::query_as::<_, OrgUnit>(&query)
            .bind(input.parent_id)
            .bind(input.name.trim())
            .bind(input.code.trim())
            .bind(&input.description)
            .bind(input.display_order)
            .bind(input.is_active)
            .bind(actor)
            .fetch_one(pool)
            .await
            .map_err(classify_unique)?;

        tracing::info!(
            org_unit_id = unit.id,
            parent_id = ?unit.parent_id,
            actor,
            "Org unit created"
        );
        Ok(unit)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<OrgUnit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM org_units WHERE id = $1");
        sqlx::query_as::<_, OrgUnit>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of units with direct child and member counts.
    pub async fn list(
        pool: &PgPool,
        query: &ListQuery,
    ) -> Result<Page<OrgUnitWithCounts>, sqlx::Error> {
        let page = fetch_page::<OrgUnit>(pool, &ORG_UNIT_LISTING, COLUMNS, query).await?;
        let ids: Vec<DbId> = page.items.iter().map(|u| u.id).collect();
        let (child_counts, user_counts) = tokio::try_join!(
            aggregate::count_children(pool, &UNITS_BY_PARENT, &ids),
            aggregate::count_children(pool, &USERS_BY_ORG_UNIT, &ids),
        )?;

        Ok(page.map_items(|unit| OrgUnitWithCounts {
            child_count: child_counts.get(&unit.id).copied().unwrap_or(0),
            user_count: user_counts.get(&unit.id).copied().unwrap_or(0),
            unit,
        }))
    }

    /// Direct children of a unit in display order.
    pub async fn children(pool: &PgPool, parent_id: DbId) -> Result<Vec<OrgUnit>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM org_units WHERE parent_id = $1 \
             ORDER BY display_order, id"
        );
        sqlx::query_as::<_, OrgUnit>(&query)
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }

    /// The full hierarchy, loaded with one query and assembled in memory.
    pub async fn tree(pool: &PgPool, active_only: bool) -> Result<Vec<OrgUnitNode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM org_units \
             WHERE ($1 = false OR is_active) \
             ORDER BY display_order, id"
        );
        let units = sqlx::query_as::<_, OrgUnit>(&query)
            .bind(active_only)
            .fetch_all(pool)
            .await?;
        Ok(build_tree(units))
    }

    /// Update a unit. Only non-`None` fields are applied.
    ///
    /// A new `parent_id` must exist and must not be the unit itself or one of
    /// its descendants. Re-parenting holds a lock on `org_units` from the cycle
    /// check through the write, so two concurrent moves cannot each pass the
    /// check against the other's stale parent and close a cycle.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOrgUnit,
        actor: DbId,
    ) -> Result<Option<OrgUnit>, DbError> {
        let mut tx = pool.begin().await?;

        if let Some(parent_id) = input.parent_id {
            sqlx::query("LOCK TABLE org_units IN SHARE ROW EXCLUSIVE MODE")
                .execute(&mut *tx)
                .await?;
            if !Self::exists(&mut *tx, id).await? {
                return Ok(None);
            }
            Self::require_exists(&mut *tx, parent_id).await?;
            if Self::is_self_or_descendant(&mut *tx, id, parent_id).await? {
                return Err(CoreError::Validation(
                    "An organizational unit cannot be moved under itself or its descendants"
                        .to_string(),
                )
                .into());
            }
        }

        let query = format!(
            "UPDATE org_units SET \
                parent_id = COALESCE($2, parent_id), \
                name = COALESCE($3, name), \
                code = COALESCE($4, code), \
                description = COALESCE($5, description), \
                display_order = COALESCE($6, display_order), \
                updated_by = $7, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let unit = sqlx::query_as::<_, OrgUnit>(&query)
            .bind(id)
            .bind(input.parent_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.code.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.display_order)
            .bind(actor)
            .fetch_optional(&mut *tx)
            .await
            .map_err(classify_unique)?;

        tx.commit().await?;

        if unit.is_some() {
            tracing::info!(org_unit_id = id, actor, "Org unit updated");
        }
        Ok(unit)
    }

    /// Set `is_active`. Idempotent; always refreshes the audit stamp.
    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        active: bool,
        actor: DbId,
    ) -> Result<Option<OrgUnit>, sqlx::Error> {
        let query = format!(
            "UPDATE org_units SET is_active = $2, updated_by = $3, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let unit = sqlx::query_as::<_, OrgUnit>(&query)
            .bind(id)
            .bind(active)
            .bind(actor)
            .fetch_optional(pool)
            .await?;
        if unit.is_some() {
            tracing::info!(org_unit_id = id, active, actor, "Org unit active flag set");
        }
        Ok(unit)
    }

    /// Delete a unit that has neither child units nor members.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, DbError> {
        let (child_count, user_count) = tokio::try_join!(
            aggregate::count_for_parent(pool, &UNITS_BY_PARENT, id),
            aggregate::count_for_parent(pool, &USERS_BY_ORG_UNIT, id),
        )?;
        if child_count > 0 {
            return Err(CoreError::Dependency(format!(
                "Cannot delete organizational unit: it still has {child_count} child unit(s)"
            ))
            .into());
        }
        if user_count > 0 {
            return Err(CoreError::Dependency(format!(
                "Cannot delete organizational unit: it still has {user_count} user(s)"
            ))
            .into());
        }

        let result = sqlx::query("DELETE FROM org_units WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                dependency_on_fk(
                    e,
                    "Cannot delete organizational unit: it is still referenced",
                )
            })?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(org_unit_id = id, "Org unit deleted");
        }
        Ok(deleted)
    }

    /// Apply a reorder batch to units in one transaction.
    pub async fn reorder(
        pool: &PgPool,
        batch: &[ReorderItem],
        actor: DbId,
    ) -> Result<Vec<OrgUnit>, DbError> {
        let target = ReorderTarget {
            entity: "OrgUnit",
            table: "org_units",
            scope: None,
        };
        apply_reorder(pool, &target, COLUMNS, batch, actor).await
    }

    pub async fn stats(pool: &PgPool) -> Result<OrgUnitStats, sqlx::Error> {
        let (units, root_units, units_with_children, units_with_users) = tokio::try_join!(
            aggregate::active_split(pool, "org_units"),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM org_units WHERE parent_id IS NULL")
                .fetch_one(pool),
            aggregate::count_parents_with_children(pool, &UNITS_BY_PARENT),
            aggregate::count_parents_with_children(pool, &USERS_BY_ORG_UNIT),
        )?;
        Ok(OrgUnitStats {
            units,
            root_units,
            units_with_children,
            units_with_users,
        })
    }

    async fn exists<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM org_units WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await
    }

    async fn require_exists<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<(), DbError> {
        if Self::exists(executor, id).await? {
            Ok(())
        } else {
            Err(CoreError::NotFound {
                entity: "OrgUnit",
                id,
            }
            .into())
        }
    }

    /// True if `candidate` is `unit_id` or lies anywhere below it.
    async fn is_self_or_descendant<'e>(
        executor: impl PgExecutor<'e>,
        unit_id: DbId,
        candidate: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "WITH RECURSIVE subtree AS ( \
                 SELECT id FROM org_units WHERE id = $1 \
                 UNION \
                 SELECT o.id FROM org_units o JOIN subtree s ON o.parent_id = s.id \
             ) \
             SELECT EXISTS(SELECT 1 FROM subtree WHERE id = $2)",
        )
        .bind(unit_id)
        .bind(candidate)
        .fetch_one(executor)
        .await
    }
}
