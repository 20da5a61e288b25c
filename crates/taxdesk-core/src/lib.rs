//! # Taxdesk Core
//!
//! Core library for Taxdesk - a local, single-user tax-management workspace.
//!
//! This crate provides the domain logic, storage abstractions, and data models
//! independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **storage**: Key-value store trait and backends (memory, SQLite)
//! - **collections**: Read/seed/write convention for named record collections
//! - **activity**: Append-only activity log
//! - **navigation**: Navigation store, history boundary, links
//! - **routes**: Route table and authentication guard
//! - **auth**: Session state machine
//! - **returns**, **documents**, **payments**, **settings**, **dashboard**: feature pages
//! - **workspace**: Facade tying the store, clock, and session together

pub mod activity;
pub mod auth;
pub mod clock;
pub mod collections;
pub mod dashboard;
pub mod documents;
pub mod error;
pub mod fs;
pub mod navigation;
pub mod payments;
pub mod returns;
pub mod routes;
pub mod seed;
pub mod settings;
pub mod storage;
pub mod workspace;

pub use error::{Result, TaxdeskError};
pub use storage::{KeyValueStore, MemoryStore, Slot, SqliteStore};
pub use workspace::Workspace;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
