//! First-start administrator provisioning.

use cadre_core::error::CoreError;
use cadre_core::roles::ROLE_ADMIN;
use cadre_core::validation::MIN_PASSWORD_LENGTH;
use cadre_db::models::user::CreateUser;
use cadre_db::repositories::{RoleRepo, UserRepo};
use cadre_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

/// Create the configured administrator unless an admin already exists.
///
/// Returns `true` when an account was created.
pub async fn ensure_admin(pool: &DbPool, admin: &BootstrapAdmin) -> AppResult<bool> {
    if UserRepo::count_with_role(pool, ROLE_ADMIN).await? > 0 {
        tracing::debug!("Administrator already present, skipping bootstrap");
        return Ok(false);
    }

    let role = RoleRepo::find_by_name(pool, ROLE_ADMIN)
        .await?
        .ok_or_else(|| AppError::InternalError("Seeded admin role is missing".into()))?;

    validate_password_strength(&admin.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let input = CreateUser {
        username: admin.username.clone(),
        email: admin.email.clone(),
        full_name: "Administrator".to_string(),
        password_hash,
        role_id: role.id,
        org_unit_id: None,
    };
    let user = UserRepo::create(pool, &input, None).await?;
    tracing::info!(user_id = user.id, username = %user.username, "Bootstrap administrator created");
    Ok(true)
}
