//! Error types for massmail.

use thiserror::Error;

/// Common error type for massmail.
#[derive(Error, Debug)]
pub enum MassmailError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Mail transport error.
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for MassmailError {
    fn from(e: sqlx::Error) -> Self {
        MassmailError::Database(e.to_string())
    }
}

/// Result type alias for massmail operations.
pub type Result<T> = std::result::Result<T, MassmailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_error_display() {
        let err = MassmailError::Permission("mailing is blocked".to_string());
        assert_eq!(err.to_string(), "permission denied: mailing is blocked");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = MassmailError::NotFound("mailing".to_string());
        assert_eq!(err.to_string(), "mailing not found");
    }

    #[test]
    fn test_transport_error_display() {
        let err = MassmailError::Transport("mailbox unavailable".to_string());
        assert_eq!(err.to_string(), "transport error: mailbox unavailable");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MassmailError = io_err.into();
        assert!(matches!(err, MassmailError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: MassmailError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, MassmailError::Database(_)));
    }
}
