//! Per-user send statistics.

use super::types::UserMailingStatistics;
use crate::db::DbPool;
use crate::Result;

/// Repository for per-user mailing statistics.
pub struct StatisticsRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> StatisticsRepository<'a> {
    /// Create a new StatisticsRepository.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Fetch the statistics row for a user, creating a zeroed one if absent.
    ///
    /// The flag is true when the row was created by this call.
    pub async fn get_or_create(&self, user_id: i64) -> Result<(UserMailingStatistics, bool)> {
        let inserted = sqlx::query(
            "INSERT INTO user_mailing_statistics (user_id) VALUES (?)
             ON CONFLICT(user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;

        let stats = sqlx::query_as::<_, UserMailingStatistics>(
            "SELECT id, user_id, total_attempts, successful_attempts, failed_attempts, messages_sent
             FROM user_mailing_statistics WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok((stats, inserted.rows_affected() == 1))
    }

    /// Add the outcome of one send run to a user's counters.
    pub async fn record(
        &self,
        user_id: i64,
        successes: i64,
        failures: i64,
    ) -> Result<UserMailingStatistics> {
        self.get_or_create(user_id).await?;

        sqlx::query(
            "UPDATE user_mailing_statistics SET
                 total_attempts = total_attempts + ?,
                 successful_attempts = successful_attempts + ?,
                 failed_attempts = failed_attempts + ?,
                 messages_sent = messages_sent + ?
             WHERE user_id = ?",
        )
        .bind(successes + failures)
        .bind(successes)
        .bind(failures)
        .bind(successes)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        let (stats, _) = self.get_or_create(user_id).await?;
        Ok(stats)
    }
}
