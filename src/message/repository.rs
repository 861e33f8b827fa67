//! Message repository.

use sqlx::QueryBuilder;

use super::types::{Message, MessageUpdate, NewMessage};
use crate::db::DbPool;
use crate::{MassmailError, Result};

/// Repository for message CRUD operations.
pub struct MessageRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> MessageRepository<'a> {
    /// Create a new MessageRepository.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a message.
    pub async fn create(&self, new_message: &NewMessage) -> Result<Message> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO messages (subject, body, owner_id) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(&new_message.subject)
        .bind(&new_message.body)
        .bind(new_message.owner_id)
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| MassmailError::NotFound("message".to_string()))
    }

    /// Get a message by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Message>> {
        let message = sqlx::query_as::<_, Message>(
            "SELECT id, subject, body, owner_id, created_at FROM messages WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(message)
    }

    /// List all messages ordered by subject.
    pub async fn list(&self) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT id, subject, body, owner_id, created_at FROM messages
             ORDER BY subject, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(messages)
    }

    /// Update a message. Returns None if not found.
    pub async fn update(&self, id: i64, update: &MessageUpdate) -> Result<Option<Message>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE messages SET ");
        let mut separated = query.separated(", ");

        if let Some(ref subject) = update.subject {
            separated.push("subject = ");
            separated.push_bind_unseparated(subject);
        }
        if let Some(ref body) = update.body {
            separated.push("body = ");
            separated.push_bind_unseparated(body);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a message. Mailings using it are deleted with it.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all messages.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
