use chrono::NaiveDate;

use crate::errors::InternalError;

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_EMAIL_LENGTH: usize = 254;
const MAX_TEXT_LENGTH: usize = 200;

/// Reject blank or overlong free-text values
pub fn validate_required(field: &str, value: &str) -> Result<(), InternalError> {
    if value.trim().is_empty() {
        return Err(InternalError::validation(field, "must not be empty"));
    }
    if value.chars().count() > MAX_TEXT_LENGTH {
        return Err(InternalError::validation(
            field,
            format!("must be at most {} characters", MAX_TEXT_LENGTH),
        ));
    }
    Ok(())
}

/// Minimal structural email check: one `@`, non-empty local part, dotted domain
pub fn validate_email(email: &str) -> Result<(), InternalError> {
    let invalid = || InternalError::validation("email", "must be a valid email address");

    if email.len() > MAX_EMAIL_LENGTH || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), InternalError> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(InternalError::validation(
            "password",
            format!("must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(InternalError::validation(
            "password",
            format!("must be at most {} characters", MAX_PASSWORD_LENGTH),
        ));
    }
    Ok(())
}

/// Purchase dates are calendar dates in `YYYY-MM-DD`
pub fn validate_purchase_date(date: &str) -> Result<(), InternalError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| InternalError::validation("purchase_date", "must be a date in YYYY-MM-DD format"))
}
