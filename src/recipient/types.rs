//! Recipient types.

/// A mailing recipient.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Recipient {
    /// Recipient ID.
    pub id: i64,
    /// Email address.
    pub email: String,
    /// Full name.
    pub full_name: String,
    /// Free-form note.
    pub comment: String,
    /// Owning user, null once the owner is deleted.
    pub owner_id: Option<i64>,
    /// Creation timestamp.
    pub created_at: String,
}

/// New recipient for creation.
#[derive(Debug, Clone)]
pub struct NewRecipient {
    /// Email address.
    pub email: String,
    /// Full name.
    pub full_name: String,
    /// Free-form note.
    pub comment: String,
    /// Owning user.
    pub owner_id: Option<i64>,
}

impl NewRecipient {
    /// Create a new recipient with an empty comment.
    pub fn new(email: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            full_name: full_name.into(),
            comment: String::new(),
            owner_id: None,
        }
    }

    /// Set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Set the owner.
    pub fn with_owner(mut self, owner_id: i64) -> Self {
        self.owner_id = Some(owner_id);
        self
    }
}

/// Partial recipient update.
#[derive(Debug, Clone, Default)]
pub struct RecipientUpdate {
    /// New email.
    pub email: Option<String>,
    /// New full name.
    pub full_name: Option<String>,
    /// New comment.
    pub comment: Option<String>,
}

impl RecipientUpdate {
    /// Check if the update is empty.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.full_name.is_none() && self.comment.is_none()
    }
}
