//! Authentication and authorization.
//!
//! Password hashing lives in `password`; the owner-or-permission rules that
//! guard every mutating handler live in `policy`.

mod password;
pub mod policy;

pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use policy::{allowed, require, PolicyError, Principal};
