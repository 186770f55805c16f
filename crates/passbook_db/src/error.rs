//! Error types for the storage layer.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for storage operations.
pub type DbResult<T> = Result<T, DbError>;

/// Storage error types.
#[derive(Debug, Error, Diagnostic)]
pub enum DbError {
    /// The database could not be opened at all.
    #[error("Failed to open vault database: {0}")]
    #[diagnostic(help(
        "Check that the vault directory is writable and not held by another process"
    ))]
    Connection(#[source] sqlx::Error),

    /// A single request against an open database failed.
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Caller-supplied data violates the record rules.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// IO error (for filesystem operations if needed)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbError {
    /// Create a not found error.
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }
}
