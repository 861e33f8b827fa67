//! Sending a mailing to its recipients.

use chrono::Utc;
use tracing::{info, warn};

use super::attempt::AttemptRepository;
use super::repository::MailingRepository;
use super::statistics::StatisticsRepository;
use super::transport::{MailTransport, OutgoingEmail};
use super::types::{AttemptStatus, MailingStatus, NewAttempt};
use crate::db::DbPool;
use crate::message::MessageRepository;
use crate::{MassmailError, Result};

/// Result of one send run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport {
    pub mailing_id: i64,
    pub succeeded: usize,
    pub failed: usize,
    /// Status after the run.
    pub status: MailingStatus,
}

impl SendReport {
    /// Number of deliveries attempted.
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Delivers mailings through a transport and records the outcome.
pub struct MailingService<'a> {
    pool: &'a DbPool,
    transport: &'a dyn MailTransport,
    from_address: &'a str,
}

impl<'a> MailingService<'a> {
    /// Create a new MailingService.
    pub fn new(pool: &'a DbPool, transport: &'a dyn MailTransport, from_address: &'a str) -> Self {
        Self {
            pool,
            transport,
            from_address,
        }
    }

    /// Send a mailing to every recipient once.
    ///
    /// Each delivery is recorded as an attempt. A failed delivery does not
    /// stop the run. Counters are credited to `acting_user_id` when given.
    pub async fn send_mailing(
        &self,
        mailing_id: i64,
        acting_user_id: Option<i64>,
    ) -> Result<SendReport> {
        let mailings = MailingRepository::new(self.pool);
        let mailing = mailings
            .get_by_id(mailing_id)
            .await?
            .ok_or_else(|| MassmailError::NotFound("mailing".to_string()))?;

        if mailing.is_blocked {
            warn!(mailing_id, "Refusing to send blocked mailing");
            return Err(MassmailError::Permission("mailing is blocked".to_string()));
        }

        let message = MessageRepository::new(self.pool)
            .get_by_id(mailing.message_id)
            .await?
            .ok_or_else(|| MassmailError::NotFound("message".to_string()))?;
        let recipients = mailings.recipients(mailing_id).await?;

        mailings.set_status(mailing_id, MailingStatus::Started).await?;

        let attempts = AttemptRepository::new(self.pool);
        let mut succeeded = 0;
        let mut failed = 0;

        for recipient in &recipients {
            let email = OutgoingEmail {
                from: self.from_address.to_string(),
                to: recipient.email.clone(),
                subject: message.subject.clone(),
                body: message.body.clone(),
            };

            let (status, server_response) = match self.transport.send(&email).await {
                Ok(response) => {
                    succeeded += 1;
                    (AttemptStatus::Success, response)
                }
                Err(e) => {
                    warn!(mailing_id, to = %recipient.email, "Delivery failed: {}", e);
                    failed += 1;
                    (AttemptStatus::Failure, e.to_string())
                }
            };

            attempts
                .create(&NewAttempt {
                    mailing_id,
                    status,
                    server_response,
                })
                .await?;
        }

        let status = if mailing.has_ended(Utc::now().naive_utc()) {
            mailings
                .set_status(mailing_id, MailingStatus::Completed)
                .await?;
            MailingStatus::Completed
        } else {
            MailingStatus::Started
        };

        if let Some(user_id) = acting_user_id {
            StatisticsRepository::new(self.pool)
                .record(user_id, succeeded as i64, failed as i64)
                .await?;
        }

        info!(
            mailing_id,
            succeeded,
            failed,
            status = %status,
            "Mailing sent"
        );

        Ok(SendReport {
            mailing_id,
            succeeded,
            failed,
            status,
        })
    }
}
