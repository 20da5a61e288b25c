//! Local key-value storage.
//!
//! All persistent state lives in named slots of a [`KeyValueStore`], each holding
//! JSON text. Backends:
//!
//! - [`MemoryStore`]: in-process map for tests and throwaway sessions
//! - [`SqliteStore`]: single-file SQLite store used by the CLI

mod memory;
mod slot;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use slot::Slot;
pub use sqlite::SqliteStore;
pub use traits::{verify_slots, KeyValueStore};
