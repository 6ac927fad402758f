//! Request body extractor that deserializes and validates in one step.

use axum::extract::{FromRequest, Request};
use axum::Json;
use cadre_core::error::CoreError;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// JSON body that has passed its `validator` rules.
///
/// Malformed JSON and rule violations are both rejected as
/// `VALIDATION_ERROR` through [`AppError`], so handlers only ever see
/// well-formed input.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::Core(CoreError::Validation(format!(
                    "Invalid request body: {}",
                    rejection.body_text()
                )))
            })?;

        data.validate().map_err(|errors| {
            AppError::Core(CoreError::Validation(format_validation_errors(&errors)))
        })?;

        Ok(ValidatedJson(data))
    }
}

/// Render field errors as `field: message` pairs, sorted by field name.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut formatted: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", error.code));
                format!("{field}: {message}")
            })
        })
        .collect();
    formatted.sort();
    formatted.join(", ")
}
