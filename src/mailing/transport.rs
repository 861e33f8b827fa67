//! Mail transport interface.
//!
//! Delivery goes through [`MailTransport`] so the backend can be chosen from
//! configuration. [`LogTransport`] only writes to the log; [`MemoryTransport`]
//! keeps an outbox and can be told to reject addresses.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::MailBackend;
use crate::{MassmailError, Result};

/// A single email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers one email and returns the server response text.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send an email. An error means the message was not accepted.
    async fn send(&self, email: &OutgoingEmail) -> Result<String>;
}

/// Transport that logs each message instead of sending it.
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<String> {
        info!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            "Mail delivered to log"
        );
        Ok(format!("250 logged for {}", email.to))
    }
}

/// Messages kept by [`MemoryTransport::new`].
pub const DEFAULT_OUTBOX_LIMIT: usize = 1000;

#[derive(Debug, Default)]
struct Outbox {
    messages: VecDeque<OutgoingEmail>,
    accepted: u64,
}

/// In-memory transport.
///
/// Keeps the most recent accepted messages, up to a fixed limit.
#[derive(Debug)]
pub struct MemoryTransport {
    outbox: Mutex<Outbox>,
    rejected: Mutex<HashSet<String>>,
    limit: usize,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::with_limit(DEFAULT_OUTBOX_LIMIT)
    }
}

impl MemoryTransport {
    /// Create an empty transport keeping up to [`DEFAULT_OUTBOX_LIMIT`] messages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty transport keeping up to `limit` messages.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            outbox: Mutex::new(Outbox::default()),
            rejected: Mutex::new(HashSet::new()),
            limit,
        }
    }

    /// Refuse delivery to this address (case-insensitive).
    pub async fn reject(&self, address: &str) {
        self.rejected.lock().await.insert(address.to_lowercase());
    }

    /// Retained messages, oldest first.
    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.outbox.lock().await.messages.iter().cloned().collect()
    }

    /// Remove and return the retained messages.
    pub async fn drain(&self) -> Vec<OutgoingEmail> {
        self.outbox.lock().await.messages.drain(..).collect()
    }
}

#[async_trait]
impl MailTransport for MemoryTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<String> {
        if self.rejected.lock().await.contains(&email.to.to_lowercase()) {
            return Err(MassmailError::Transport(format!(
                "550 mailbox unavailable: {}",
                email.to
            )));
        }
        let mut outbox = self.outbox.lock().await;
        outbox.accepted += 1;
        if self.limit > 0 {
            if outbox.messages.len() == self.limit {
                outbox.messages.pop_front();
            }
            outbox.messages.push_back(email.clone());
        }
        Ok(format!("250 queued as {}", outbox.accepted))
    }
}

/// Build the transport selected in configuration.
pub fn transport_for(backend: MailBackend) -> Arc<dyn MailTransport> {
    match backend {
        MailBackend::Log => Arc::new(LogTransport),
        MailBackend::Memory => Arc::new(MemoryTransport::new()),
    }
}
