//! Storage-level error type and PostgreSQL error classification.

use cadre_core::error::CoreError;

/// PostgreSQL SQLSTATE for unique constraint violations.
pub const PG_UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL SQLSTATE for foreign key violations.
pub const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Error returned by repository methods that can produce domain outcomes
/// (conflict, dependency, validation) in addition to plain database errors.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Return the SQLSTATE code of a database error, if any.
pub fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    sqlstate(err).as_deref() == Some(PG_UNIQUE_VIOLATION)
}

pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    sqlstate(err).as_deref() == Some(PG_FOREIGN_KEY_VIOLATION)
}

/// Translate a unique violation into [`CoreError::Conflict`] with `message`;
/// other errors pass through unchanged.
pub fn conflict_on_unique(err: sqlx::Error, message: impl Into<String>) -> DbError {
    if is_unique_violation(&err) {
        DbError::Core(CoreError::Conflict(message.into()))
    } else {
        DbError::Sqlx(err)
    }
}

/// Translate a foreign key violation raised by a DELETE into
/// [`CoreError::Dependency`]; other errors pass through unchanged.
pub fn dependency_on_fk(err: sqlx::Error, message: impl Into<String>) -> DbError {
    if is_foreign_key_violation(&err) {
        DbError::Core(CoreError::Dependency(message.into()))
    } else {
        DbError::Sqlx(err)
    }
}
