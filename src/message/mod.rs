//! Messages: the subject and body a mailing sends.

mod repository;
mod types;

pub use repository::MessageRepository;
pub use types::{Message, MessageUpdate, NewMessage, MAX_BODY_LENGTH, MAX_SUBJECT_LENGTH};
