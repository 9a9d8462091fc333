//! Error types for KURCH.

use thiserror::Error;

/// Common error type for KURCH.
#[derive(Error, Debug)]
pub enum KurchError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Stored data could not be decoded.
    #[error("corrupt data: {0}")]
    Corrupt(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for KurchError {
    fn from(e: sqlx::Error) -> Self {
        KurchError::Database(e.to_string())
    }
}

/// Result type alias for KURCH operations.
pub type Result<T> = std::result::Result<T, KurchError>;
