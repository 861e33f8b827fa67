//! Mailing repository.

use sqlx::QueryBuilder;

use super::types::{Mailing, MailingStatus, MailingUpdate, NewMailing};
use crate::db::DbPool;
use crate::recipient::Recipient;
use crate::{MassmailError, Result};

const MAILING_COLUMNS: &str =
    "id, start_at, end_at, status, message_id, owner_id, is_blocked, created_at";

/// Repository for mailing CRUD operations.
pub struct MailingRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> MailingRepository<'a> {
    /// Create a new MailingRepository.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a mailing together with its recipient set.
    pub async fn create(&self, new_mailing: &NewMailing) -> Result<Mailing> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO mailings (start_at, end_at, message_id, owner_id)
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(&new_mailing.start_at)
        .bind(&new_mailing.end_at)
        .bind(new_mailing.message_id)
        .bind(new_mailing.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        for recipient_id in &new_mailing.recipient_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO mailing_recipients (mailing_id, recipient_id) VALUES (?, ?)",
            )
            .bind(id)
            .bind(recipient_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| MassmailError::NotFound("mailing".to_string()))
    }

    /// Get a mailing by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Mailing>> {
        let query = format!("SELECT {MAILING_COLUMNS} FROM mailings WHERE id = ?");
        let mailing = sqlx::query_as::<_, Mailing>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(mailing)
    }

    /// List all mailings, oldest first.
    pub async fn list(&self) -> Result<Vec<Mailing>> {
        let query = format!("SELECT {MAILING_COLUMNS} FROM mailings ORDER BY id");
        let mailings = sqlx::query_as::<_, Mailing>(&query)
            .fetch_all(self.pool)
            .await?;
        Ok(mailings)
    }

    /// Recipients of a mailing ordered by full name.
    pub async fn recipients(&self, mailing_id: i64) -> Result<Vec<Recipient>> {
        let recipients = sqlx::query_as::<_, Recipient>(
            "SELECT r.id, r.email, r.full_name, r.comment, r.owner_id, r.created_at
             FROM recipients r
             JOIN mailing_recipients mr ON mr.recipient_id = r.id
             WHERE mr.mailing_id = ?
             ORDER BY r.full_name, r.id",
        )
        .bind(mailing_id)
        .fetch_all(self.pool)
        .await?;
        Ok(recipients)
    }

    /// Update a mailing. Returns None if not found.
    ///
    /// A present `recipient_ids` replaces the whole recipient set.
    pub async fn update(&self, id: i64, update: &MailingUpdate) -> Result<Option<Mailing>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM mailings WHERE id = ?)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Ok(None);
        }

        if update.has_column_changes() {
            let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE mailings SET ");
            let mut separated = query.separated(", ");

            if let Some(ref start_at) = update.start_at {
                separated.push("start_at = ");
                separated.push_bind_unseparated(start_at);
            }
            if let Some(ref end_at) = update.end_at {
                separated.push("end_at = ");
                separated.push_bind_unseparated(end_at);
            }
            if let Some(message_id) = update.message_id {
                separated.push("message_id = ");
                separated.push_bind_unseparated(message_id);
            }

            query.push(" WHERE id = ");
            query.push_bind(id);
            query.build().execute(&mut *tx).await?;
        }

        if let Some(ref recipient_ids) = update.recipient_ids {
            sqlx::query("DELETE FROM mailing_recipients WHERE mailing_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for recipient_id in recipient_ids {
                sqlx::query(
                    "INSERT OR IGNORE INTO mailing_recipients (mailing_id, recipient_id)
                     VALUES (?, ?)",
                )
                .bind(id)
                .bind(recipient_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        self.get_by_id(id).await
    }

    /// Set the lifecycle status.
    pub async fn set_status(&self, id: i64, status: MailingStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE mailings SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Block or unblock a mailing.
    pub async fn set_blocked(&self, id: i64, blocked: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE mailings SET is_blocked = ? WHERE id = ?")
            .bind(blocked)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a mailing along with its recipient links and attempts.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM mailings WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all mailings.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mailings")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Count mailings in the given status.
    pub async fn count_by_status(&self, status: MailingStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mailings WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
