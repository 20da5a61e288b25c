//! SQLite-backed key-value store.
//!
//! One table of slots in a single database file. Every `set_item` is a single
//! upsert statement, so a slot is always either the old value or the new one.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Result, TaxdeskError};
use crate::storage::traits::{verify_slots, KeyValueStore};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS slots (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Storage format version written to `meta` on creation.
pub const FORMAT_VERSION: &str = "1";

/// SQLite key-value store.
pub struct SqliteStore {
    path: Option<PathBuf>,
    conn: Connection,
}

impl SqliteStore {
    /// Create a new store at `path`.
    ///
    /// # Errors
    ///
    /// Returns `TaxdeskError::Storage` if the file already exists.
    pub fn create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Err(TaxdeskError::Storage(format!(
                "Store already exists at {}",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        debug!(path = %path.display(), "created store");
        Ok(Self {
            path: Some(path.to_path_buf()),
            conn,
        })
    }

    /// Open an existing store.
    ///
    /// # Errors
    ///
    /// Returns `TaxdeskError::NotFound` if there is no file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TaxdeskError::NotFound(format!(
                "Store {}",
                path.display()
            )));
        }
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            conn,
        })
    }

    /// Open the store at `path`, creating it if missing.
    pub fn open_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Open a throwaway in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { path: None, conn })
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Storage format version recorded in the file.
    pub fn format_version(&self) -> Result<Option<String>> {
        let version = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'format_version'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(version)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('format_version', ?1)",
            params![FORMAT_VERSION],
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM slots WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO slots (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        debug!(key, bytes = value.len(), "wrote slot");
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM slots WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM slots ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    /// Runs SQLite's own integrity check, then verifies every slot parses.
    fn check_integrity(&self) -> Result<()> {
        let status: String = self
            .conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if status != "ok" {
            return Err(TaxdeskError::Storage(format!(
                "SQLite integrity check failed: {}",
                status
            )));
        }
        verify_slots(self)
    }
}
