//! Mailings: campaigns that send one message to a set of recipients.
//!
//! Sending records one attempt per recipient and credits the sender's
//! statistics.

mod attempt;
mod repository;
mod service;
mod statistics;
mod transport;
mod types;

pub use attempt::AttemptRepository;
pub use repository::MailingRepository;
pub use service::{MailingService, SendReport};
pub use statistics::StatisticsRepository;
pub use transport::{
    transport_for, LogTransport, MailTransport, MemoryTransport, OutgoingEmail, DEFAULT_OUTBOX_LIMIT,
};
pub use types::{
    parse_timestamp, AttemptStatus, Mailing, MailingAttempt, MailingStatus, MailingUpdate,
    NewAttempt, NewMailing, UserMailingStatistics, TIMESTAMP_FORMAT,
};
