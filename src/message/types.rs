//! Message types.

/// Maximum length for a message subject.
pub const MAX_SUBJECT_LENGTH: usize = 255;

/// Maximum length for a message body.
pub const MAX_BODY_LENGTH: usize = 50_000;

/// A message that mailings deliver.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Message {
    /// Message ID.
    pub id: i64,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Owning user, null once the owner is deleted.
    pub owner_id: Option<i64>,
    /// Creation timestamp.
    pub created_at: String,
}

/// New message for creation.
#[derive(Debug, Clone)]
pub struct NewMessage {
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Owning user.
    pub owner_id: Option<i64>,
}

impl NewMessage {
    /// Create a new message.
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            owner_id: None,
        }
    }

    /// Set the owner.
    pub fn with_owner(mut self, owner_id: i64) -> Self {
        self.owner_id = Some(owner_id);
        self
    }
}

/// Partial message update.
#[derive(Debug, Clone, Default)]
pub struct MessageUpdate {
    /// New subject.
    pub subject: Option<String>,
    /// New body.
    pub body: Option<String>,
}

impl MessageUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Check if the update is empty.
    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.body.is_none()
    }
}
