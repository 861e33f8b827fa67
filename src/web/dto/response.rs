//! Response DTOs.

use serde::Serialize;

use crate::db::User;
use crate::mailing::{Mailing, MailingAttempt, UserMailingStatistics};
use crate::message::Message;
use crate::recipient::Recipient;

/// Envelope for every successful JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Login and registration response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Access token (JWT).
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    pub user: UserInfo,
}

/// Short user summary.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub role: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role.to_string(),
        }
    }
}

/// Current user with effective permissions.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub role: String,
    /// Effective permission codenames, sorted.
    pub permissions: Vec<String>,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

/// Permissions of a user after a grant or revoke.
#[derive(Debug, Serialize)]
pub struct PermissionsResponse {
    pub user_id: i64,
    /// Explicit grants, sorted.
    pub granted: Vec<String>,
    /// Grants plus role implications, sorted.
    pub effective: Vec<String>,
}

/// Home page counters.
#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub mailings_total: i64,
    pub mailings_started: i64,
    /// Distinct recipient addresses, ignoring case.
    pub unique_recipient_emails: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub subject: String,
    pub body: String,
    pub owner_id: Option<i64>,
    pub created_at: String,
}

impl From<&Message> for MessageResponse {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id,
            subject: m.subject.clone(),
            body: m.body.clone(),
            owner_id: m.owner_id,
            created_at: m.created_at.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipientResponse {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub comment: String,
    pub owner_id: Option<i64>,
    pub created_at: String,
}

impl From<&Recipient> for RecipientResponse {
    fn from(r: &Recipient) -> Self {
        Self {
            id: r.id,
            email: r.email.clone(),
            full_name: r.full_name.clone(),
            comment: r.comment.clone(),
            owner_id: r.owner_id,
            created_at: r.created_at.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MailingResponse {
    pub id: i64,
    pub start_at: String,
    pub end_at: Option<String>,
    pub status: String,
    pub message_id: i64,
    pub owner_id: Option<i64>,
    pub is_blocked: bool,
    pub created_at: String,
}

impl From<&Mailing> for MailingResponse {
    fn from(m: &Mailing) -> Self {
        Self {
            id: m.id,
            start_at: m.start_at.clone(),
            end_at: m.end_at.clone(),
            status: m.status.to_string(),
            message_id: m.message_id,
            owner_id: m.owner_id,
            is_blocked: m.is_blocked,
            created_at: m.created_at.clone(),
        }
    }
}

/// Mailing with its message, recipients and attempts.
#[derive(Debug, Serialize)]
pub struct MailingDetailResponse {
    pub mailing: MailingResponse,
    pub message: Option<MessageResponse>,
    pub recipients: Vec<RecipientResponse>,
    pub attempts: Vec<AttemptResponse>,
}

#[derive(Debug, Serialize)]
pub struct AttemptResponse {
    pub id: i64,
    pub mailing_id: i64,
    pub attempt_at: String,
    pub status: &'static str,
    pub server_response: String,
}

impl From<&MailingAttempt> for AttemptResponse {
    fn from(a: &MailingAttempt) -> Self {
        Self {
            id: a.id,
            mailing_id: a.mailing_id,
            attempt_at: a.attempt_at.clone(),
            status: a.status.as_str(),
            server_response: a.server_response.clone(),
        }
    }
}

/// Attempt log page.
#[derive(Debug, Serialize)]
pub struct AttemptListResponse {
    /// Newest first.
    pub attempts: Vec<AttemptResponse>,
    pub mailings: Vec<MailingResponse>,
}

/// Result of clearing the attempt log.
#[derive(Debug, Serialize)]
pub struct ClearAttemptsResponse {
    pub deleted: u64,
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub user_id: i64,
    pub total_attempts: i64,
    pub successful_attempts: i64,
    pub failed_attempts: i64,
    pub messages_sent: i64,
}

impl From<&UserMailingStatistics> for StatisticsResponse {
    fn from(s: &UserMailingStatistics) -> Self {
        Self {
            user_id: s.user_id,
            total_attempts: s.total_attempts,
            successful_attempts: s.successful_attempts,
            failed_attempts: s.failed_attempts,
            messages_sent: s.messages_sent,
        }
    }
}

/// Convert a slice of domain rows into response DTOs.
pub fn to_responses<'a, T, R>(items: &'a [T]) -> Vec<R>
where
    R: From<&'a T>,
{
    items.iter().map(R::from).collect()
}
