//! Repository for the `users` table.

use cadre_core::error::CoreError;
use cadre_core::listing::USER_LISTING;
use cadre_core::pagination::Page;
use cadre_core::types::DbId;
use sqlx::PgPool;

use crate::aggregate;
use crate::error::{is_unique_violation, DbError};
use crate::models::user::{CreateUser, UpdateUser, User, UserResponse, UserStats};
use crate::query::{fetch_page, ListQuery};
use crate::repositories::role_repo::RoleRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, full_name, password_hash, role_id, org_unit_id, \
    is_active, last_login_at, created_by, updated_by, created_at, updated_at";

/// Map a unique violation to the message of the constraint that fired.
fn classify_unique(err: sqlx::Error) -> DbError {
    if !is_unique_violation(&err) {
        return DbError::Sqlx(err);
    }
    let message = match &err {
        sqlx::Error::Database(db_err) if db_err.constraint() == Some("uq_users_email") => {
            "A user with this email already exists"
        }
        _ => "A user with this username already exists",
    };
    DbError::Core(CoreError::Conflict(message.to_string()))
}

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// `actor` is `None` for the bootstrap administrator.
    pub async fn create(
        pool: &PgPool,
        input: &CreateUser,
        actor: Option<DbId>,
    ) -> Result<User, DbError> {
        let query = format!(
            "INSERT INTO users \
                (username, email, full_name, password_hash, role_id, org_unit_id, \
                 created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7) \
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(input.username.trim())
            .bind(input.email.trim())
            .bind(input.full_name.trim())
            .bind(&input.password_hash)
            .bind(input.role_id)
            .bind(input.org_unit_id)
            .bind(actor)
            .fetch_one(pool)
            .await
            .map_err(classify_unique)?;

        tracing::info!(user_id = user.id, role_id = user.role_id, actor = ?actor, "User created");
        Ok(user)
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (used for login).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find a user and resolve the role name for the response shape.
    pub async fn find_response(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<UserResponse>, sqlx::Error> {
        let Some(user) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        Ok(Some(Self::to_response(pool, &user).await?))
    }

    /// Build the public representation of `user`.
    pub async fn to_response(pool: &PgPool, user: &User) -> Result<UserResponse, sqlx::Error> {
        let role = RoleRepo::find_by_id(pool, user.role_id)
            .await?
            .map(|r| r.name)
            .unwrap_or_default();
        Ok(UserResponse::from_user(user, role))
    }

    /// One page of users with their role names resolved in a single query.
    pub async fn list(pool: &PgPool, query: &ListQuery) -> Result<Page<UserResponse>, sqlx::Error> {
        let page = fetch_page::<User>(pool, &USER_LISTING, COLUMNS, query).await?;
        let mut role_ids: Vec<DbId> = page.items.iter().map(|u| u.role_id).collect();
        role_ids.sort_unstable();
        role_ids.dedup();
        let names = RoleRepo::names_by_ids(pool, &role_ids).await?;

        Ok(page.map_items(|user| {
            let role = names.get(&user.role_id).cloned().unwrap_or_default();
            UserResponse::from_user(&user, role)
        }))
    }

    /// Update profile fields. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
        actor: DbId,
    ) -> Result<Option<User>, DbError> {
        let query = format!(
            "UPDATE users SET \
                username = COALESCE($2, username), \
                email = COALESCE($3, email), \
                full_name = COALESCE($4, full_name), \
                role_id = COALESCE($5, role_id), \
                org_unit_id = COALESCE($6, org_unit_id), \
                updated_by = $7, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.username.as_deref().map(str::trim))
            .bind(input.email.as_deref().map(str::trim))
            .bind(input.full_name.as_deref().map(str::trim))
            .bind(input.role_id)
            .bind(input.org_unit_id)
            .bind(actor)
            .fetch_optional(pool)
            .await
            .map_err(classify_unique)?;

        if user.is_some() {
            tracing::info!(user_id = id, actor, "User updated");
        }
        Ok(user)
    }

    /// Replace the stored password hash. Returns `false` if the user is missing.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
        actor: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_by = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .bind(actor)
        .execute(pool)
        .await?;
        let updated = result.rows_affected() > 0;
        if updated {
            tracing::info!(user_id = id, actor, "User password reset");
        }
        Ok(updated)
    }

    /// Stamp a successful login.
    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Set `is_active`. Idempotent; always refreshes the audit stamp.
    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        active: bool,
        actor: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET is_active = $2, updated_by = $3, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(active)
            .bind(actor)
            .fetch_optional(pool)
            .await?;
        if user.is_some() {
            tracing::info!(user_id = id, active, actor, "User active flag set");
        }
        Ok(user)
    }

    /// Delete a user. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(user_id = id, "User deleted");
        }
        Ok(deleted)
    }

    /// Count users holding the role named `role_name`.
    pub async fn count_with_role(pool: &PgPool, role_name: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users u JOIN roles r ON r.id = u.role_id WHERE r.name = $1",
        )
        .bind(role_name)
        .fetch_one(pool)
        .await
    }

    pub async fn stats(pool: &PgPool) -> Result<UserStats, sqlx::Error> {
        let (users, users_without_unit, users_logged_in) = tokio::try_join!(
            aggregate::active_split(pool, "users"),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE org_unit_id IS NULL")
                .fetch_one(pool),
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM users WHERE last_login_at IS NOT NULL"
            )
            .fetch_one(pool),
        )?;
        Ok(UserStats {
            users,
            users_without_unit,
            users_logged_in,
        })
    }
}
