//! Repository for the `permissions` table.

use cadre_core::listing::PERMISSION_LISTING;
use cadre_core::pagination::Page;
use cadre_core::types::DbId;
use sqlx::PgPool;

use crate::error::{conflict_on_unique, DbError};
use crate::models::permission::{CreatePermission, Permission, UpdatePermission};
use crate::query::{fetch_page, ListQuery};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, name, description, resource, is_active, \
    created_by, updated_by, created_at, updated_at";

/// [`COLUMNS`] qualified with the `p` alias, for joins.
pub(crate) const QUALIFIED_COLUMNS: &str = "p.id, p.name, p.description, p.resource, p.is_active, \
    p.created_by, p.updated_by, p.created_at, p.updated_at";

const DUPLICATE_NAME: &str = "A permission with this name already exists";

pub struct PermissionRepo;

impl PermissionRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreatePermission,
        actor: DbId,
    ) -> Result<Permission, DbError> {
        let query = format!(
            "INSERT INTO permissions \
                (name, description, resource, is_active, created_by, updated_by) \
             VALUES ($1, $2, $3, COALESCE($4, true), $5, $5) \
             RETURNING {COLUMNS}"
        );
        let permission = sqlx::query_as::<_, Permission>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.resource.trim())
            .bind(input.is_active)
            .bind(actor)
            .fetch_one(pool)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))?;

        tracing::info!(permission_id = permission.id, actor, "Permission created");
        Ok(permission)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Permission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM permissions WHERE id = $1");
        sqlx::query_as::<_, Permission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, query: &ListQuery) -> Result<Page<Permission>, sqlx::Error> {
        fetch_page::<Permission>(pool, &PERMISSION_LISTING, COLUMNS, query).await
    }

    /// Distinct resource names, for the grouped permission picker.
    pub async fn resources(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT resource FROM permissions ORDER BY resource",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePermission,
        actor: DbId,
    ) -> Result<Option<Permission>, DbError> {
        let query = format!(
            "UPDATE permissions SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                resource = COALESCE($4, resource), \
                updated_by = $5, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let permission = sqlx::query_as::<_, Permission>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.resource.as_deref().map(str::trim))
            .bind(actor)
            .fetch_optional(pool)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))?;

        if permission.is_some() {
            tracing::info!(permission_id = id, actor, "Permission updated");
        }
        Ok(permission)
    }

    /// Set `is_active`. Idempotent; always refreshes the audit stamp.
    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        active: bool,
        actor: DbId,
    ) -> Result<Option<Permission>, sqlx::Error> {
        let query = format!(
            "UPDATE permissions SET is_active = $2, updated_by = $3, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let permission = sqlx::query_as::<_, Permission>(&query)
            .bind(id)
            .bind(active)
            .bind(actor)
            .fetch_optional(pool)
            .await?;
        if permission.is_some() {
            tracing::info!(
                permission_id = id,
                active,
                actor,
                "Permission active flag set"
            );
        }
        Ok(permission)
    }

    /// Delete a permission. Role links are removed by cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(permission_id = id, "Permission deleted");
        }
        Ok(deleted)
    }
}
