//! Key-value store trait definition.
//!
//! `KeyValueStore` is the boundary to local storage. Values are opaque text;
//! the collection layer above it owns serialization.

use crate::error::{Result, TaxdeskError};

/// Local key-value storage interface.
///
/// Implementations must ensure:
/// - `set_item` replaces the whole value for a key; there are no partial writes
/// - `get_item` after a successful `set_item` returns exactly the written text
/// - `remove_item` on a missing key is not an error
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key` and its value.
    fn remove_item(&mut self, key: &str) -> Result<()>;

    /// List all keys, sorted.
    fn keys(&self) -> Result<Vec<String>>;

    /// Check store integrity.
    ///
    /// The default verifies that every slot holds parseable JSON.
    fn check_integrity(&self) -> Result<()> {
        verify_slots(self)
    }
}

/// Verify that every key in the store holds parseable JSON.
pub fn verify_slots<S: KeyValueStore + ?Sized>(store: &S) -> Result<()> {
    for key in store.keys()? {
        let Some(value) = store.get_item(&key)? else {
            continue;
        };
        if serde_json::from_str::<serde_json::Value>(&value).is_err() {
            return Err(TaxdeskError::Storage(format!(
                "Slot \"{}\" holds invalid JSON",
                key
            )));
        }
    }
    Ok(())
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn check_integrity(&self) -> Result<()> {
        (**self).check_integrity()
    }
}
