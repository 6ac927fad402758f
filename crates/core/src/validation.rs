//! Field validators shared by request DTOs (`#[validate(custom(...))]`).

use validator::ValidationError;

/// Maximum length of a display name (module, topic, role, org unit...).
pub const MAX_NAME_LEN: u64 = 200;

/// Maximum length of a free-text description.
pub const MAX_DESCRIPTION_LEN: u64 = 2000;

/// Minimum password length enforced on user creation and password reset.
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Reject strings that are empty after trimming.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Org unit codes: upper-case letters, digits, `-` and `_`.
pub fn unit_code(value: &str) -> Result<(), ValidationError> {
    let ok = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !ok {
        let mut err = ValidationError::new("unit_code");
        err.message = Some("may only contain A-Z, 0-9, '-' and '_'".into());
        return Err(err);
    }
    Ok(())
}
