//! Repository for `roles` and the `role_permissions` association.

use std::collections::HashMap;

use cadre_core::error::CoreError;
use cadre_core::listing::ROLE_LISTING;
use cadre_core::pagination::Page;
use cadre_core::types::DbId;
use sqlx::PgPool;

use crate::aggregate::{self, PERMISSIONS_BY_ROLE, USERS_BY_ROLE};
use crate::error::{conflict_on_unique, dependency_on_fk, DbError};
use crate::models::permission::Permission;
use crate::models::role::{
    CreateRole, Role, RoleStats, RoleWithCounts, RoleWithPermissions, UpdateRole,
};
use crate::query::{fetch_page, ListQuery};
use crate::repositories::permission_repo::QUALIFIED_COLUMNS as PERMISSION_QUALIFIED_COLUMNS;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, name, description, is_active, \
    created_by, updated_by, created_at, updated_at";

const DUPLICATE_NAME: &str = "A role with this name already exists";

/// Provides CRUD and permission assignment for roles.
pub struct RoleRepo;

impl RoleRepo {
    /// Insert a role together with its initial permission set.
    pub async fn create(pool: &PgPool, input: &CreateRole, actor: DbId) -> Result<Role, DbError> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO roles (name, description, is_active, created_by, updated_by) \
             VALUES ($1, $2, COALESCE($3, true), $4, $4) \
             RETURNING {COLUMNS}"
        );
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.is_active)
            .bind(actor)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))?;

        replace_permissions(&mut tx, role.id, &input.permission_ids).await?;
        tx.commit().await?;

        tracing::info!(
            role_id = role.id,
            permission_count = input.permission_ids.len(),
            actor,
            "Role created"
        );
        Ok(role)
    }

    /// Find a role by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE id = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a role by its unique name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE name = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Find a role with its permissions attached.
    pub async fn find_with_permissions(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RoleWithPermissions>, sqlx::Error> {
        let Some(role) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let permissions = Self::permissions(pool, role.id).await?;
        Ok(Some(RoleWithPermissions { role, permissions }))
    }

    /// Map role ids to role names for the given ids.
    pub async fn names_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<HashMap<DbId, String>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(DbId, String)> =
            sqlx::query_as("SELECT id, name FROM roles WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().collect())
    }

    /// One page of roles with permission and user counts.
    pub async fn list(
        pool: &PgPool,
        query: &ListQuery,
    ) -> Result<Page<RoleWithCounts>, sqlx::Error> {
        let page = fetch_page::<Role>(pool, &ROLE_LISTING, COLUMNS, query).await?;
        let ids: Vec<DbId> = page.items.iter().map(|r| r.id).collect();
        let (permission_counts, user_counts) = tokio::try_join!(
            aggregate::count_children(pool, &PERMISSIONS_BY_ROLE, &ids),
            aggregate::count_children(pool, &USERS_BY_ROLE, &ids),
        )?;

        Ok(page.map_items(|role| RoleWithCounts {
            permission_count: permission_counts.get(&role.id).copied().unwrap_or(0),
            user_count: user_counts.get(&role.id).copied().unwrap_or(0),
            role,
        }))
    }

    /// Permissions granted to a role, ordered by resource then name.
    pub async fn permissions(pool: &PgPool, role_id: DbId) -> Result<Vec<Permission>, sqlx::Error> {
        let query = format!(
            "SELECT {PERMISSION_QUALIFIED_COLUMNS} FROM permissions p \
             JOIN role_permissions rp ON rp.permission_id = p.id \
             WHERE rp.role_id = $1 \
             ORDER BY p.resource, p.name"
        );
        sqlx::query_as::<_, Permission>(&query)
            .bind(role_id)
            .fetch_all(pool)
            .await
    }

    /// Replace the permission set of a role in one transaction.
    ///
    /// Returns `None` if the role does not exist. Unknown permission ids
    /// abort the whole change with a validation error.
    pub async fn set_permissions(
        pool: &PgPool,
        role_id: DbId,
        permission_ids: &[DbId],
        actor: DbId,
    ) -> Result<Option<Vec<Permission>>, DbError> {
        let mut tx = pool.begin().await?;

        let touched = sqlx::query(
            "UPDATE roles SET updated_by = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(role_id)
        .bind(actor)
        .execute(&mut *tx)
        .await?;
        if touched.rows_affected() == 0 {
            return Ok(None);
        }

        replace_permissions(&mut tx, role_id, permission_ids).await?;
        tx.commit().await?;

        tracing::info!(
            role_id,
            permission_count = permission_ids.len(),
            actor,
            "Role permissions replaced"
        );
        Ok(Some(Self::permissions(pool, role_id).await?))
    }

    /// Update a role. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRole,
        actor: DbId,
    ) -> Result<Option<Role>, DbError> {
        let query = format!(
            "UPDATE roles SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                updated_by = $4, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(actor)
            .fetch_optional(pool)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))?;

        if role.is_some() {
            tracing::info!(role_id = id, actor, "Role updated");
        }
        Ok(role)
    }

    /// Set `is_active`. Idempotent; always refreshes the audit stamp.
    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        active: bool,
        actor: DbId,
    ) -> Result<Option<Role>, sqlx::Error> {
        let query = format!(
            "UPDATE roles SET is_active = $2, updated_by = $3, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .bind(active)
            .bind(actor)
            .fetch_optional(pool)
            .await?;
        if role.is_some() {
            tracing::info!(role_id = id, active, actor, "Role active flag set");
        }
        Ok(role)
    }

    /// Delete a role no user holds. Its permission links go with it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, DbError> {
        let user_count = aggregate::count_for_parent(pool, &USERS_BY_ROLE, id).await?;
        if user_count > 0 {
            return Err(CoreError::Dependency(format!(
                "Cannot delete role: it is assigned to {user_count} user(s)"
            ))
            .into());
        }

        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| dependency_on_fk(e, "Cannot delete role: it is assigned to users"))?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(role_id = id, "Role deleted");
        }
        Ok(deleted)
    }

    pub async fn stats(pool: &PgPool) -> Result<RoleStats, sqlx::Error> {
        let (roles, roles_with_permissions, roles_with_users, permissions) = tokio::try_join!(
            aggregate::active_split(pool, "roles"),
            aggregate::count_parents_with_children(pool, &PERMISSIONS_BY_ROLE),
            aggregate::count_parents_with_children(pool, &USERS_BY_ROLE),
            aggregate::active_split(pool, "permissions"),
        )?;
        Ok(RoleStats {
            roles,
            roles_with_permissions,
            roles_with_users,
            permissions,
        })
    }
}

/// Swap the association rows of `role_id` for `permission_ids`.
async fn replace_permissions(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    role_id: DbId,
    permission_ids: &[DbId],
) -> Result<(), DbError> {
    let mut ids = permission_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    if !ids.is_empty() {
        let known = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM permissions WHERE id = ANY($1)",
        )
        .bind(&ids)
        .fetch_one(&mut **tx)
        .await?;
        if known != ids.len() as i64 {
            return Err(CoreError::Validation(
                "One or more permission ids do not exist".to_string(),
            )
            .into());
        }
    }

    sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
        .bind(role_id)
        .execute(&mut **tx)
        .await?;

    if !ids.is_empty() {
        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id) \
             SELECT $1::BIGINT, UNNEST($2::BIGINT[])",
        )
        .bind(role_id)
        .bind(&ids)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
