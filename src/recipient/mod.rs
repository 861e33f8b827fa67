//! Recipients: the addresses mailings are delivered to.

mod repository;
mod types;

pub use repository::RecipientRepository;
pub use types::{NewRecipient, Recipient, RecipientUpdate};
