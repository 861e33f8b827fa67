//! HTTP handlers.

pub mod admin;
pub mod attempts;
pub mod auth;
pub mod home;
pub mod mailing;
pub mod message;
pub mod recipient;

pub use admin::*;
pub use attempts::*;
pub use auth::*;
pub use home::*;
pub use mailing::*;
pub use message::*;
pub use recipient::*;
