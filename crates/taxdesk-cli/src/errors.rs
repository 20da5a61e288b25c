//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use taxdesk_core::TaxdeskError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, store, record)
    NotFound { message: String, hint: String },

    /// No usable session
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Store failed its integrity check
    IntegrityFailed(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) | CliError::IntegrityFailed(message) => {
                write!(f, "{}", message)
            }
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::IntegrityFailed(_) => exit_codes::INTEGRITY_FAILED,
        }
    }
}

/// Exit code for a core error surfaced through a command.
pub fn core_exit_code(err: &TaxdeskError) -> i32 {
    match err {
        TaxdeskError::NotFound(_) => exit_codes::NOT_FOUND,
        TaxdeskError::InvalidInput(_) | TaxdeskError::InvalidTransition(_) => {
            exit_codes::INVALID_INPUT
        }
        TaxdeskError::Unauthenticated => exit_codes::AUTH_FAILED,
        _ => exit_codes::FAILURE,
    }
}

/// Pick the exit code for any error returned by a command.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(cli) = err.downcast_ref::<CliError>() {
        return cli.exit_code();
    }
    if let Some(core) = err.downcast_ref::<TaxdeskError>() {
        return core_exit_code(core);
    }
    exit_codes::FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_codes() {
        assert_eq!(CliError::not_found("x", "y").exit_code(), 3);
        assert_eq!(CliError::invalid_input("x").exit_code(), 4);
        assert_eq!(CliError::auth_failed_with_hint("x", "y").exit_code(), 5);
        assert_eq!(CliError::IntegrityFailed("x".into()).exit_code(), 6);
    }

    #[test]
    fn test_core_errors_map_through_anyhow() {
        let err = anyhow::Error::new(TaxdeskError::Unauthenticated);
        assert_eq!(exit_code_for(&err), exit_codes::AUTH_FAILED);

        let err = anyhow::Error::new(TaxdeskError::not_found("Invoice", "INV-9"));
        assert_eq!(exit_code_for(&err), exit_codes::NOT_FOUND);

        let err = anyhow::anyhow!("boom");
        assert_eq!(exit_code_for(&err), exit_codes::FAILURE);
    }

    #[test]
    fn test_not_found_display_includes_hint() {
        let err = CliError::not_found("No store found", "Hint: Run `taxdesk init`.");
        assert_eq!(err.to_string(), "No store found\nHint: Run `taxdesk init`.");
    }
}
