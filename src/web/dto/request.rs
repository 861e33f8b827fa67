//! Request bodies.
//!
//! Auth and admin endpoints take JSON; entity writes take HTML forms.

use serde::Deserialize;
use validator::Validate;

use super::validation::{no_control_chars, required_text, required_timestamp, valid_timestamp};
use crate::mailing::{parse_timestamp, TIMESTAMP_FORMAT};
use crate::web::error::ApiError;

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// User registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 32, message = "Username must be 3-32 characters"),
        custom(function = "no_control_chars")
    )]
    pub username: String,
    pub password: String,
    #[validate(email(message = "Invalid email address"))]
    #[serde(default)]
    pub email: Option<String>,
}

/// Grant or revoke one permission.
#[derive(Debug, Deserialize)]
pub struct PermissionRequest {
    /// Permission codename, e.g. `delete_mailing`.
    pub permission: String,
}

/// Mailing create/update form.
#[derive(Debug, Deserialize, Validate)]
pub struct MailingForm {
    pub message_id: i64,
    #[validate(custom(function = "required_timestamp"))]
    pub start_at: String,
    #[validate(custom(function = "valid_timestamp"))]
    #[serde(default)]
    pub end_at: Option<String>,
    #[validate(length(min = 1, message = "Select at least one recipient"))]
    #[serde(default)]
    pub recipients: Vec<i64>,
}

impl MailingForm {
    /// Start and end normalized to the storage format.
    ///
    /// Fails when the end precedes the start.
    pub fn schedule(&self) -> Result<(String, Option<String>), ApiError> {
        let start = parse_timestamp(&self.start_at)
            .ok_or_else(|| ApiError::field("start_at", "Enter a valid date and time"))?;
        let end = match self.end_at.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(
                parse_timestamp(value)
                    .ok_or_else(|| ApiError::field("end_at", "Enter a valid date and time"))?,
            ),
        };

        if let Some(end) = end {
            if end < start {
                return Err(ApiError::field("end_at", "End must not be before start"));
            }
        }

        Ok((
            start.format(TIMESTAMP_FORMAT).to_string(),
            end.map(|e| e.format(TIMESTAMP_FORMAT).to_string()),
        ))
    }
}

/// Message create/update form.
#[derive(Debug, Deserialize, Validate)]
pub struct MessageForm {
    #[validate(
        custom(function = "required_text"),
        length(max = 255, message = "Subject is too long")
    )]
    pub subject: String,
    #[validate(
        custom(function = "required_text"),
        length(max = 50000, message = "Body is too long")
    )]
    pub body: String,
}

/// Recipient create/update form.
#[derive(Debug, Deserialize, Validate)]
pub struct RecipientForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(
        custom(function = "required_text"),
        length(max = 150, message = "Full name is too long")
    )]
    pub full_name: String,
    #[validate(
        custom(function = "no_control_chars"),
        length(max = 1000, message = "Comment is too long")
    )]
    #[serde(default)]
    pub comment: String,
}

/// Block form. A checkbox: present as `on` when checked, absent otherwise.
#[derive(Debug, Default, Deserialize)]
pub struct BlockForm {
    #[serde(default)]
    pub is_blocked: Option<String>,
}

impl BlockForm {
    /// Whether the checkbox was ticked.
    pub fn checked(&self) -> bool {
        self.is_blocked.as_deref() == Some("on")
    }
}
