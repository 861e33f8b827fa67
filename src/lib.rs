//! massmail - mailing campaign manager
//!
//! Compose messages, keep a recipient list, schedule mailings that pair the
//! two, send them through a pluggable transport and keep a log of every
//! delivery attempt.

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod mailing;
pub mod message;
pub mod recipient;
pub mod web;

pub use auth::{allowed, hash_password, require, verify_password, PolicyError, Principal};
pub use cache::{ListingCache, ListingKind};
pub use config::Config;
pub use db::{Database, NewUser, Permission, Role, User, UserRepository};
pub use error::{MassmailError, Result};
pub use mailing::{
    LogTransport, MailTransport, Mailing, MailingRepository, MailingService, MailingStatus,
    MemoryTransport, SendReport,
};
pub use message::{Message, MessageRepository, NewMessage};
pub use recipient::{NewRecipient, Recipient, RecipientRepository};
pub use web::WebServer;
