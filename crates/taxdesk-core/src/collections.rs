//! The persistence convention every feature page follows.
//!
//! A collection is an ordered sequence of records serialized as one JSON array
//! under a [`Slot`]. Pages read the whole collection, mutate it in memory, and
//! write the whole collection back. There is no patching at the storage layer
//! and no merge: the last writer wins.
//!
//! A slot that is missing or unparsable is replaced by the page's seed. A slot
//! the store fails to read is never overwritten: display reads fall back to the
//! seed in memory, and mutations return the retryable storage error.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::Result;
use crate::storage::{KeyValueStore, Slot};

/// Read a collection for display, seeding it on first use.
pub fn get_collection<S, T, F>(store: &mut S, slot: Slot, seed: F) -> Vec<T>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Vec<T>,
{
    match read_slot::<S, Vec<T>>(store, slot) {
        Ok(Some(records)) => records,
        Ok(None) => {
            let records = seed();
            if let Err(err) = set_collection(store, slot, &records) {
                warn!(slot = %slot, error = %err, "failed to persist seed collection");
            }
            records
        }
        Err(err) => {
            warn!(slot = %slot, error = %err, "slot read failed; showing seed without saving");
            seed()
        }
    }
}

/// Read a collection ahead of a write.
///
/// Missing or unparsable slots yield the seed, unsaved. Store errors are
/// returned as-is.
pub fn load_collection<S, T, F>(store: &S, slot: Slot, seed: F) -> Result<Vec<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
    F: FnOnce() -> Vec<T>,
{
    Ok(read_slot(store, slot)?.unwrap_or_else(seed))
}

/// Serialize `records` and overwrite the slot.
///
/// An empty sequence is stored as `[]`, never as an absent slot.
pub fn set_collection<S, T>(store: &mut S, slot: Slot, records: &[T]) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize,
{
    let text = serde_json::to_string(records)?;
    store.set_item(slot.key(), &text)?;
    debug!(slot = %slot, count = records.len(), "wrote collection");
    Ok(())
}

/// Read-modify-write a collection in one call.
///
/// `updater` runs against the freshest stored value. If the read or the
/// updater fails nothing is written and the error is passed through.
pub fn update_collection<S, T, F, U, R>(store: &mut S, slot: Slot, seed: F, updater: U) -> Result<R>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Vec<T>,
    U: FnOnce(&mut Vec<T>) -> Result<R>,
{
    let mut records = load_collection(&*store, slot, seed)?;
    let outcome = updater(&mut records)?;
    set_collection(store, slot, &records)?;
    Ok(outcome)
}

/// Read a single-object slot. Missing, unreadable or unparsable slots read as
/// `None`.
pub fn get_document<S, T>(store: &S, slot: Slot) -> Option<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    match read_slot(store, slot) {
        Ok(value) => value,
        Err(err) => {
            warn!(slot = %slot, error = %err, "slot read failed; treating as absent");
            None
        }
    }
}

/// Read a single-object slot ahead of a write. Store errors are returned.
pub fn load_document<S, T>(store: &S, slot: Slot) -> Result<Option<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    read_slot(store, slot)
}

/// Overwrite a single-object slot.
pub fn set_document<S, T>(store: &mut S, slot: Slot, value: &T) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize,
{
    let text = serde_json::to_string(value)?;
    store.set_item(slot.key(), &text)
}

/// Remove a single-object slot.
pub fn remove_document<S>(store: &mut S, slot: Slot) -> Result<()>
where
    S: KeyValueStore + ?Sized,
{
    store.remove_item(slot.key())
}

/// `Ok(None)` for a missing or unparsable slot, `Err` when the store fails.
fn read_slot<S, T>(store: &S, slot: Slot) -> Result<Option<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let Some(text) = store.get_item(slot.key())? else {
        return Ok(None);
    };
    match serde_json::from_str(&text) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            warn!(slot = %slot, error = %err, "slot holds unparsable data; treating as absent");
            Ok(None)
        }
    }
}

/// Pick an id of the form `<prefix><n>` where `n` starts at the clock's current
/// millisecond and is bumped until `taken` reports it free.
pub fn timestamp_id<C, F>(clock: &C, prefix: &str, taken: F) -> String
where
    C: Clock + ?Sized,
    F: Fn(&str) -> bool,
{
    let mut millis = clock.millis();
    loop {
        let candidate = format!("{}{}", prefix, millis);
        if !taken(&candidate) {
            return candidate;
        }
        millis += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::TaxdeskError;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: String,
        label: String,
    }

    fn row(id: &str, label: &str) -> Row {
        Row {
            id: id.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_first_read_persists_seed() {
        let mut store = MemoryStore::new();
        let rows = get_collection(&mut store, Slot::Returns, || vec![row("1", "seed")]);

        assert_eq!(rows, vec![row("1", "seed")]);
        assert_eq!(
            store.get_item("returns").unwrap().as_deref(),
            Some(r#"[{"id":"1","label":"seed"}]"#)
        );
    }

    #[test]
    fn test_stored_value_wins_over_seed() {
        let mut store = MemoryStore::new();
        set_collection(&mut store, Slot::Returns, &[row("2", "b"), row("1", "a")]).unwrap();

        let rows: Vec<Row> = get_collection(&mut store, Slot::Returns, || vec![row("9", "seed")]);
        assert_eq!(rows, vec![row("2", "b"), row("1", "a")]);
    }

    #[test]
    fn test_unparsable_slot_reseeds() {
        let mut store = MemoryStore::new();
        store.set_item("documents", "definitely not json").unwrap();

        let rows: Vec<Row> = get_collection(&mut store, Slot::Documents, Vec::new);
        assert!(rows.is_empty());
        assert_eq!(store.get_item("documents").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_empty_collection_stored_as_empty_array() {
        let mut store = MemoryStore::new();
        set_collection::<_, Row>(&mut store, Slot::Invoices, &[]).unwrap();
        assert_eq!(store.get_item("invoices").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_update_collection_writes_result() {
        let mut store = MemoryStore::new();
        let removed = update_collection(&mut store, Slot::Returns, || vec![row("1", "a")], |rows: &mut Vec<Row>| {
            Ok(rows.remove(0))
        })
        .unwrap();

        assert_eq!(removed, row("1", "a"));
        assert_eq!(store.get_item("returns").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_update_collection_error_skips_write() {
        let mut store = MemoryStore::new();
        set_collection(&mut store, Slot::Returns, &[row("1", "a")]).unwrap();

        let result: Result<()> = update_collection(&mut store, Slot::Returns, Vec::new, |rows: &mut Vec<Row>| {
            rows.clear();
            Err(TaxdeskError::InvalidInput("nope".to_string()))
        });

        assert!(result.is_err());
        let rows: Vec<Row> = get_collection(&mut store, Slot::Returns, Vec::new);
        assert_eq!(rows, vec![row("1", "a")]);
    }

    #[test]
    fn test_documents_read_none_when_garbage() {
        let mut store = MemoryStore::new();
        store.set_item("userProfile", "{oops").unwrap();
        let profile: Option<serde_json::Value> = get_document(&store, Slot::UserProfile);
        assert!(profile.is_none());

        set_document(&mut store, Slot::UserProfile, &serde_json::json!({"phone": "555"})).unwrap();
        let profile: Option<serde_json::Value> = get_document(&store, Slot::UserProfile);
        assert_eq!(profile.unwrap()["phone"], "555");

        remove_document(&mut store, Slot::UserProfile).unwrap();
        assert_eq!(store.get_item("userProfile").unwrap(), None);
    }

    struct LockedStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for LockedStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Err(TaxdeskError::Storage("database is locked".to_string()))
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
            self.inner.set_item(key, value)
        }

        fn remove_item(&mut self, key: &str) -> Result<()> {
            self.inner.remove_item(key)
        }

        fn keys(&self) -> Result<Vec<String>> {
            self.inner.keys()
        }
    }

    fn locked_with(rows: &[Row]) -> LockedStore {
        let mut inner = MemoryStore::new();
        set_collection(&mut inner, Slot::Returns, rows).unwrap();
        LockedStore { inner }
    }

    #[test]
    fn test_read_error_shows_seed_without_saving() {
        let mut store = locked_with(&[row("user-0", "mine")]);
        let rows: Vec<Row> = get_collection(&mut store, Slot::Returns, || vec![row("1", "seed")]);

        assert_eq!(rows, vec![row("1", "seed")]);
        assert_eq!(
            store.inner.get_item("returns").unwrap().as_deref(),
            Some(r#"[{"id":"user-0","label":"mine"}]"#)
        );
    }

    #[test]
    fn test_update_collection_read_error_writes_nothing() {
        let mut store = locked_with(&[row("user-0", "mine"), row("user-1", "also mine")]);
        let before = store.inner.get_item("returns").unwrap();

        let err = update_collection(&mut store, Slot::Returns, || vec![row("1", "seed")], |rows: &mut Vec<Row>| {
            rows.insert(0, row("new", "fresh"));
            Ok(())
        })
        .unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(store.inner.get_item("returns").unwrap(), before);
    }

    #[test]
    fn test_load_document_surfaces_read_error() {
        let store = locked_with(&[]);
        let loaded: Result<Option<serde_json::Value>> = load_document(&store, Slot::UserProfile);
        assert!(loaded.unwrap_err().is_retryable());

        let shown: Option<serde_json::Value> = get_document(&store, Slot::UserProfile);
        assert!(shown.is_none());
    }

    #[test]
    fn test_timestamp_id_skips_taken() {
        let clock = ManualClock::new(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());
        let taken = ["1700000000000", "1700000000001"];
        let id = timestamp_id(&clock, "", |candidate| taken.contains(&candidate));
        assert_eq!(id, "1700000000002");

        let receipt = timestamp_id(&clock, "REC-", |_| false);
        assert_eq!(receipt, "REC-1700000000000");
    }
}
