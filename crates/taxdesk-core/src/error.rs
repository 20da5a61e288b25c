//! Error types for Taxdesk core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages and exit codes.

use thiserror::Error;

/// Result type alias for Taxdesk operations.
pub type Result<T> = std::result::Result<T, TaxdeskError>;

/// Core error type for Taxdesk operations.
#[derive(Debug, Error)]
pub enum TaxdeskError {
    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Record not found in a collection
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input (missing required field, unknown value)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Status change not allowed from the record's current state
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Session state accessed without a logged-in user
    #[error("Not logged in")]
    Unauthenticated,

    /// Generic error (fallback)
    #[error("{0}")]
    Other(String),
}

impl TaxdeskError {
    /// Shorthand for a missing record in a named collection.
    pub fn not_found(what: &str, id: &str) -> Self {
        TaxdeskError::NotFound(format!("{} {}", what, id))
    }

    /// Storage failures may succeed if the same action is tried again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TaxdeskError::Storage(_) | TaxdeskError::Sqlite { .. } | TaxdeskError::Io { .. }
        )
    }
}
