//! Request extractors that validate their payload.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use axum_extra::extract::Form;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::mailing::parse_timestamp;
use crate::web::error::{ApiError, ErrorCode};

/// JSON body validated with `validator`.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

/// Form body validated with `validator`.
///
/// Repeated keys (`recipients=1&recipients=2`) decode into a `Vec`. A body
/// that does not decode is reported as a validation failure.
pub struct ValidatedForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::new(ErrorCode::ValidationError, format!("Invalid form: {}", e)))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedForm(value))
    }
}

/// Reject control characters other than newline, carriage return and tab.
pub fn no_control_chars(value: &str) -> Result<(), ValidationError> {
    if value
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\r' && c != '\t')
    {
        return Err(ValidationError::new("no_control_chars")
            .with_message("Must not contain control characters".into()));
    }
    Ok(())
}

/// Reject blank strings.
pub fn not_empty_trimmed(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_empty_trimmed").with_message("Must not be empty".into()));
    }
    Ok(())
}

/// Reject blank strings and control characters.
pub fn required_text(value: &str) -> Result<(), ValidationError> {
    not_empty_trimmed(value)?;
    no_control_chars(value)
}

/// Require a non-blank, parseable date and time.
pub fn required_timestamp(value: &str) -> Result<(), ValidationError> {
    not_empty_trimmed(value)?;
    valid_timestamp(value)
}

/// Require a parseable date and time. Blank values pass; use
/// `not_empty_trimmed` for required fields.
pub fn valid_timestamp(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || parse_timestamp(value).is_some() {
        return Ok(());
    }
    Err(ValidationError::new("valid_timestamp")
        .with_message("Enter a valid date and time (YYYY-MM-DD HH:MM)".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_control_chars() {
        assert!(no_control_chars("Line 1\nLine 2\tend").is_ok());
        assert!(no_control_chars("Hello\x00World").is_err());
        assert!(no_control_chars("Hello\x1bWorld").is_err());
    }

    #[test]
    fn test_not_empty_trimmed() {
        assert!(not_empty_trimmed("  Hi ").is_ok());
        assert!(not_empty_trimmed(" \t\n").is_err());
    }

    #[test]
    fn test_required_text() {
        assert!(required_text("Spring sale").is_ok());
        assert!(required_text("").is_err());
        assert!(required_text("bell\x07").is_err());
    }

    #[test]
    fn test_required_timestamp() {
        assert!(required_timestamp("2024-05-01 09:30:00").is_ok());
        assert!(required_timestamp("  ").is_err());
    }

    #[test]
    fn test_valid_timestamp() {
        assert!(valid_timestamp("2024-05-01T09:30").is_ok());
        assert!(valid_timestamp("").is_ok());
        assert!(valid_timestamp("next tuesday").is_err());
    }
}
