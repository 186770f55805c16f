//! Error types for the vault façade and remote sync.

use miette::Diagnostic;
use passbook_db::DbError;
use thiserror::Error;

/// Result type alias for façade-level operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Façade and remote-boundary error types.
#[derive(Debug, Error, Diagnostic)]
pub enum CoreError {
    /// Local storage failure; blocking — the operation did not complete.
    #[error("Storage error: {0}")]
    Db(#[from] DbError),

    /// Transport-level failure talking to the sync service.
    #[error("HTTP transport error: {0}")]
    #[diagnostic(
        code(passbook_core::http),
        help("Check network connectivity and the configured base_url")
    )]
    Http(#[from] reqwest::Error),

    /// The sync service answered with a non-success envelope.
    #[error("Remote API error ({status}): {message}")]
    #[diagnostic(
        code(passbook_core::remote_api),
        help("Check that the sync service is reachable and healthy")
    )]
    Api { status: u16, message: String },

    /// Referenced record absent.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A wire row could not be mapped onto the domain model.
    #[error("Invalid remote record field {field}: {message}")]
    Wire {
        field: &'static str,
        message: String,
    },

    /// The remote surface has no endpoint for this operation.
    #[error("{op} is not supported by the remote store")]
    Unsupported { op: &'static str },

    /// Bad or unreadable configuration.
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(passbook_core::config),
        help("Check the config file syntax and paths")
    )]
    Config(String),

    /// Caller asked for something structurally impossible.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl CoreError {
    /// Create a not found error.
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create a wire-mapping error.
    pub fn wire(field: &'static str, message: impl Into<String>) -> Self {
        Self::Wire {
            field,
            message: message.into(),
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// True when the record the operation referenced does not exist, locally
    /// or remotely.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Db(DbError::NotFound { .. })
        )
    }
}
