//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// General failure.
    pub const FAILURE: i32 = 1;

    /// Resource not found (config, store, return, document, invoice).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input, arguments, or status change.
    pub const INVALID_INPUT: i32 = 4;

    /// No session, or the session could not be started.
    pub const AUTH_FAILED: i32 = 5;

    /// Integrity check failed.
    pub const INTEGRITY_FAILED: i32 = 6;
}

/// Environment variables read by the CLI.
pub mod env_vars {
    /// Config file path override.
    pub const CONFIG: &str = "TAXDESK_CONFIG";
    /// Log filter for stderr diagnostics.
    pub const LOG: &str = "TAXDESK_LOG";
    /// Password used by `login`/`register` when not passed on the command line.
    pub const PASSWORD: &str = "TAXDESK_PASSWORD";
}

/// Log filter used when `TAXDESK_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Rows shown by `activity` unless `--limit` is given.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 50;

/// User agent recorded in activity metadata.
pub const CLIENT_USER_AGENT: &str = concat!("taxdesk-cli/", env!("CARGO_PKG_VERSION"));
