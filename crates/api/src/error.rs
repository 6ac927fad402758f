use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cadre_core::error::CoreError;
use cadre_db::error::{DbError, PG_FOREIGN_KEY_VIOLATION, PG_UNIQUE_VIOLATION};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the `ERROR` envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `cadre_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Core(core) => AppError::Core(core),
            DbError::Sqlx(sqlx) => AppError::Database(sqlx),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::BAD_REQUEST, "CONFLICT", msg.clone()),
                CoreError::Dependency(msg) => {
                    (StatusCode::BAD_REQUEST, "DEPENDENCY_EXISTS", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    opaque_internal()
                }
            },

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                opaque_internal()
            }
        };

        let body = json!({
            "status": "ERROR",
            "message": message,
            "code": code,
            "data": null,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Clients never see internal detail; callers log it before falling back here.
fn opaque_internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Human-readable message for a named unique constraint.
fn conflict_message(constraint: &str) -> String {
    match constraint {
        "uq_modules_name" => "A module with this name already exists".to_string(),
        "uq_topics_module_name" => {
            "A topic with this name already exists in this module".to_string()
        }
        "uq_roles_name" => "A role with this name already exists".to_string(),
        "uq_permissions_name" => "A permission with this name already exists".to_string(),
        "uq_org_units_code" => "An organizational unit with this code already exists".to_string(),
        "uq_org_units_parent_name" => {
            "An organizational unit with this name already exists under the same parent".to_string()
        }
        "uq_users_username" => "A user with this username already exists".to_string(),
        "uq_users_email" => "A user with this email already exists".to_string(),
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations on `uq_*` constraints map to 400 `CONFLICT`.
/// - Foreign key violations map to 400 `INVALID_REFERENCE`.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            let code = db_err.code();
            let constraint = db_err.constraint().unwrap_or("unknown");
            if code.as_deref() == Some(PG_UNIQUE_VIOLATION) && constraint.starts_with("uq_") {
                return (
                    StatusCode::BAD_REQUEST,
                    "CONFLICT",
                    conflict_message(constraint),
                );
            }
            if code.as_deref() == Some(PG_FOREIGN_KEY_VIOLATION) {
                return (
                    StatusCode::BAD_REQUEST,
                    "INVALID_REFERENCE",
                    "A referenced record does not exist".to_string(),
                );
            }
            tracing::error!(error = %db_err, code = ?code, "Database error");
            opaque_internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            opaque_internal()
        }
    }
}
