//! Delivery attempt log.

use super::types::{MailingAttempt, NewAttempt};
use crate::db::DbPool;
use crate::Result;

/// Repository for mailing attempts.
pub struct AttemptRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> AttemptRepository<'a> {
    /// Create a new AttemptRepository.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Record an attempt.
    pub async fn create(&self, attempt: &NewAttempt) -> Result<MailingAttempt> {
        let created = sqlx::query_as::<_, MailingAttempt>(
            "INSERT INTO mailing_attempts (mailing_id, status, server_response)
             VALUES (?, ?, ?)
             RETURNING id, mailing_id, attempt_at, status, server_response",
        )
        .bind(attempt.mailing_id)
        .bind(attempt.status.as_str())
        .bind(&attempt.server_response)
        .fetch_one(self.pool)
        .await?;
        Ok(created)
    }

    /// All attempts, newest first.
    pub async fn list_all(&self) -> Result<Vec<MailingAttempt>> {
        let attempts = sqlx::query_as::<_, MailingAttempt>(
            "SELECT id, mailing_id, attempt_at, status, server_response
             FROM mailing_attempts ORDER BY attempt_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(attempts)
    }

    /// Attempts of one mailing, newest first.
    pub async fn list_by_mailing(&self, mailing_id: i64) -> Result<Vec<MailingAttempt>> {
        let attempts = sqlx::query_as::<_, MailingAttempt>(
            "SELECT id, mailing_id, attempt_at, status, server_response
             FROM mailing_attempts WHERE mailing_id = ?
             ORDER BY attempt_at DESC, id DESC",
        )
        .bind(mailing_id)
        .fetch_all(self.pool)
        .await?;
        Ok(attempts)
    }

    /// Delete every attempt. Returns the number removed.
    pub async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM mailing_attempts")
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Count all attempts.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mailing_attempts")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
