//! Recipient repository.

use sqlx::QueryBuilder;

use super::types::{NewRecipient, Recipient, RecipientUpdate};
use crate::db::DbPool;
use crate::{MassmailError, Result};

/// Repository for recipient CRUD operations.
pub struct RecipientRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> RecipientRepository<'a> {
    /// Create a new RecipientRepository.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a recipient.
    pub async fn create(&self, new_recipient: &NewRecipient) -> Result<Recipient> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO recipients (email, full_name, comment, owner_id)
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(&new_recipient.email)
        .bind(&new_recipient.full_name)
        .bind(&new_recipient.comment)
        .bind(new_recipient.owner_id)
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| MassmailError::NotFound("recipient".to_string()))
    }

    /// Get a recipient by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Recipient>> {
        let recipient = sqlx::query_as::<_, Recipient>(
            "SELECT id, email, full_name, comment, owner_id, created_at
             FROM recipients WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(recipient)
    }

    /// List all recipients ordered by full name.
    pub async fn list(&self) -> Result<Vec<Recipient>> {
        let recipients = sqlx::query_as::<_, Recipient>(
            "SELECT id, email, full_name, comment, owner_id, created_at
             FROM recipients ORDER BY full_name, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(recipients)
    }

    /// Return which of the given IDs do not exist.
    pub async fn missing_ids(&self, ids: &[i64]) -> Result<Vec<i64>> {
        let mut missing = Vec::new();
        for &id in ids {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM recipients WHERE id = ?)")
                    .bind(id)
                    .fetch_one(self.pool)
                    .await?;
            if !exists {
                missing.push(id);
            }
        }
        Ok(missing)
    }

    /// Update a recipient. Returns None if not found.
    pub async fn update(&self, id: i64, update: &RecipientUpdate) -> Result<Option<Recipient>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE recipients SET ");
        let mut separated = query.separated(", ");

        if let Some(ref email) = update.email {
            separated.push("email = ");
            separated.push_bind_unseparated(email);
        }
        if let Some(ref full_name) = update.full_name {
            separated.push("full_name = ");
            separated.push_bind_unseparated(full_name);
        }
        if let Some(ref comment) = update.comment {
            separated.push("comment = ");
            separated.push_bind_unseparated(comment);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a recipient. It is removed from every mailing.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipients WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count distinct recipient addresses (case-insensitive).
    pub async fn count_unique_emails(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT LOWER(email)) FROM recipients")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
