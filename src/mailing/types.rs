//! Mailing, attempt and statistics types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// Storage format for timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a user-supplied timestamp.
///
/// Accepts the storage format, HTML `datetime-local` values (with or without
/// seconds) and RFC 3339 (converted to UTC).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Lifecycle state of a mailing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailingStatus {
    /// Created, never sent.
    #[default]
    Created,
    /// Sent at least once and still running.
    Started,
    /// Past its end time.
    Completed,
}

impl MailingStatus {
    /// Database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MailingStatus::Created => "created",
            MailingStatus::Started => "started",
            MailingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for MailingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MailingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(MailingStatus::Created),
            "started" => Ok(MailingStatus::Started),
            "completed" => Ok(MailingStatus::Completed),
            _ => Err(format!("unknown mailing status: {s}")),
        }
    }
}

/// A mailing campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailing {
    /// Mailing ID.
    pub id: i64,
    /// First send time.
    pub start_at: String,
    /// End of the campaign, if bounded.
    pub end_at: Option<String>,
    /// Lifecycle state.
    pub status: MailingStatus,
    /// Message sent by this mailing.
    pub message_id: i64,
    /// Owning user, null once the owner is deleted.
    pub owner_id: Option<i64>,
    /// Blocked mailings cannot be sent.
    pub is_blocked: bool,
    /// Creation timestamp.
    pub created_at: String,
}

impl Mailing {
    /// Whether the end time has passed at `now`.
    pub fn has_ended(&self, now: NaiveDateTime) -> bool {
        self.end_at
            .as_deref()
            .and_then(parse_timestamp)
            .is_some_and(|end| end <= now)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Mailing {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            start_at: row.try_get("start_at")?,
            end_at: row.try_get("end_at")?,
            status: status.parse().unwrap_or_default(),
            message_id: row.try_get("message_id")?,
            owner_id: row.try_get("owner_id")?,
            is_blocked: row.try_get("is_blocked")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// New mailing for creation.
#[derive(Debug, Clone)]
pub struct NewMailing {
    /// First send time (storage format).
    pub start_at: String,
    /// End time (storage format).
    pub end_at: Option<String>,
    /// Message to send.
    pub message_id: i64,
    /// Recipient IDs.
    pub recipient_ids: Vec<i64>,
    /// Owning user.
    pub owner_id: Option<i64>,
}

/// Partial mailing update.
#[derive(Debug, Clone, Default)]
pub struct MailingUpdate {
    /// New start time.
    pub start_at: Option<String>,
    /// New end time; `Some(None)` clears it.
    pub end_at: Option<Option<String>>,
    /// New message.
    pub message_id: Option<i64>,
    /// Replacement recipient set.
    pub recipient_ids: Option<Vec<i64>>,
}

impl MailingUpdate {
    /// Whether any column of the mailings table changes.
    pub fn has_column_changes(&self) -> bool {
        self.start_at.is_some() || self.end_at.is_some() || self.message_id.is_some()
    }

    /// Check if the update is empty.
    pub fn is_empty(&self) -> bool {
        !self.has_column_changes() && self.recipient_ids.is_none()
    }
}

/// Outcome of one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStatus {
    /// Transport accepted the message.
    Success,
    /// Transport rejected the message.
    Failure,
}

impl AttemptStatus {
    /// Database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::Success => "success",
            AttemptStatus::Failure => "failure",
        }
    }
}

impl FromStr for AttemptStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(AttemptStatus::Success),
            "failure" => Ok(AttemptStatus::Failure),
            _ => Err(format!("unknown attempt status: {s}")),
        }
    }
}

/// A recorded delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailingAttempt {
    /// Attempt ID.
    pub id: i64,
    /// Mailing the attempt belongs to.
    pub mailing_id: i64,
    /// When the attempt happened.
    pub attempt_at: String,
    /// Outcome.
    pub status: AttemptStatus,
    /// Transport response or error text.
    pub server_response: String,
}

impl<'r> FromRow<'r, SqliteRow> for MailingAttempt {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            mailing_id: row.try_get("mailing_id")?,
            attempt_at: row.try_get("attempt_at")?,
            status: status.parse().unwrap_or(AttemptStatus::Failure),
            server_response: row.try_get("server_response")?,
        })
    }
}

/// New attempt for recording.
#[derive(Debug, Clone)]
pub struct NewAttempt {
    /// Mailing the attempt belongs to.
    pub mailing_id: i64,
    /// Outcome.
    pub status: AttemptStatus,
    /// Transport response or error text.
    pub server_response: String,
}

/// Per-user send counters.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserMailingStatistics {
    /// Row ID.
    pub id: i64,
    /// User the counters belong to.
    pub user_id: i64,
    /// All attempts.
    pub total_attempts: i64,
    /// Accepted attempts.
    pub successful_attempts: i64,
    /// Rejected attempts.
    pub failed_attempts: i64,
    /// Messages handed off successfully.
    pub messages_sent: i64,
}
