//! Durable single-value slots.
//!
//! A [`PersistedValue`] is a value bound to one key of a [`KeyValueStore`].
//! It reads the key once when constructed and writes it back synchronously
//! every time the value changes.  Storage problems are never surfaced to the
//! caller: the value degrades to in-memory operation for the rest of the
//! session and the failure is logged.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("state file is not a JSON object of strings: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

/// A flat string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Keeps all keys in one JSON object file.
///
/// Every `set` rewrites the whole file atomically (temp file, then rename),
/// so a crash mid-write leaves the previous contents intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let content = serde_json::to_string_pretty(entries)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(StoreError::Corrupt(err)) => {
                log::warn!("Replacing unreadable state file {:?}: {}", self.path, err);
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local store; nothing survives the session.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PersistedValue
// ---------------------------------------------------------------------------

/// A value that survives restarts through one key of a [`KeyValueStore`].
///
/// Values are stored as JSON text.  Several instances may share a key; the
/// last write wins and nothing coordinates them.
pub struct PersistedValue<T> {
    store: Arc<dyn KeyValueStore>,
    key: String,
    value: T,
    degraded: bool,
}

impl<T> PersistedValue<T>
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    /// Read `key` once, falling back to `fallback` when it is absent,
    /// undecodable, or the store cannot be read.
    ///
    /// Only an unreadable store degrades the value.  Corrupt contents do
    /// not, so the next `set` gets the chance to replace them.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, fallback: T) -> Self {
        let key = key.into();
        let mut degraded = false;

        let value = match store.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(err) => {
                    log::warn!("Ignoring undecodable value for '{}': {}", key, err);
                    fallback
                }
            },
            Ok(None) => fallback,
            Err(StoreError::Corrupt(err)) => {
                log::warn!("Ignoring unreadable state for '{}': {}", key, err);
                fallback
            }
            Err(err) => {
                log::warn!(
                    "Storage unavailable, keeping '{}' in memory only: {}",
                    key,
                    err
                );
                degraded = true;
                fallback
            }
        };

        Self {
            store,
            key,
            value,
            degraded,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// True once the backing store has failed; writes are skipped from then on.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Replace the value and write it through to the store.
    pub fn set(&mut self, value: T) {
        if value == self.value {
            return;
        }
        self.value = value;
        self.write();
    }

    fn write(&mut self) {
        if self.degraded {
            return;
        }
        let raw = match serde_json::to_string(&self.value) {
            Ok(raw) => raw,
            Err(err) => {
                log::error!("Failed to encode value for '{}': {}", self.key, err);
                return;
            }
        };
        if let Err(err) = self.store.set(&self.key, &raw) {
            log::warn!(
                "Failed to persist '{}', keeping it in memory only: {}",
                self.key,
                err
            );
            self.degraded = true;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A store whose every call fails, counting attempted writes.
    #[derive(Default)]
    struct BrokenStore {
        writes: AtomicUsize,
    }

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(io::Error::other("disk on fire").into())
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::other("disk on fire").into())
        }
    }

    /// Wraps a memory store and counts writes.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: AtomicUsize,
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value)
        }
    }

    fn memory() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    // -- PersistedValue ------------------------------------------------------

    #[test]
    fn absent_key_uses_fallback() {
        let value = PersistedValue::new(memory(), "search", "React".to_string());
        assert_eq!(value.get(), "React");
        assert!(!value.is_degraded());
    }

    #[test]
    fn written_value_is_rehydrated_by_a_new_instance() {
        let store = memory();
        let mut first = PersistedValue::new(store.clone(), "search", String::new());
        first.set("redux".to_string());

        let second = PersistedValue::new(store, "search", "fallback".to_string());
        assert_eq!(second.get(), "redux");
    }

    #[test]
    fn non_string_values_round_trip() {
        let store = memory();
        let mut first = PersistedValue::new(store.clone(), "count", 0u32);
        first.set(17);

        let second = PersistedValue::new(store, "count", 99u32);
        assert_eq!(*second.get(), 17);
    }

    #[test]
    fn undecodable_value_uses_fallback() {
        let store = memory();
        store.set("count", "not a number").unwrap();

        let value = PersistedValue::new(store, "count", 5u32);
        assert_eq!(*value.get(), 5);
        assert!(!value.is_degraded());
    }

    #[test]
    fn unavailable_store_degrades_to_memory() {
        crate::logging::initialize_for_tests();
        let broken = Arc::new(BrokenStore::default());
        let mut value = PersistedValue::new(broken.clone(), "search", "x".to_string());

        assert_eq!(value.get(), "x");
        assert!(value.is_degraded());

        value.set("y".to_string());
        value.set("z".to_string());
        assert_eq!(value.get(), "z");
        assert_eq!(broken.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_write_stops_further_writes() {
        struct ReadableButReadOnly(BrokenStore);

        impl KeyValueStore for ReadableButReadOnly {
            fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
                Ok(None)
            }

            fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
                self.0.set(key, value)
            }
        }

        let store = Arc::new(ReadableButReadOnly(BrokenStore::default()));
        let mut value = PersistedValue::new(store.clone(), "search", String::new());
        assert!(!value.is_degraded());

        value.set("a".to_string());
        value.set("ab".to_string());

        assert!(value.is_degraded());
        assert_eq!(value.get(), "ab");
        assert_eq!(store.0.writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unchanged_value_is_not_rewritten() {
        let store = Arc::new(CountingStore::default());
        let mut value = PersistedValue::new(store.clone(), "search", String::new());

        value.set("re".to_string());
        value.set("re".to_string());

        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shared_key_is_last_write_wins() {
        let store = memory();
        let mut a = PersistedValue::new(store.clone(), "search", String::new());
        let mut b = PersistedValue::new(store.clone(), "search", String::new());

        a.set("from a".to_string());
        b.set("from b".to_string());

        let c = PersistedValue::new(store, "search", String::new());
        assert_eq!(c.get(), "from b");
    }

    // -- FileStore -----------------------------------------------------------

    #[test]
    fn file_store_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));
        assert_eq!(store.get("search").unwrap(), None);
    }

    #[test]
    fn file_store_round_trips_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut value = PersistedValue::new(
            Arc::new(FileStore::new(&path)),
            "search",
            String::new(),
        );
        value.set("Redux".to_string());
        assert!(path.exists());

        let reopened =
            PersistedValue::new(Arc::new(FileStore::new(&path)), "search", "fb".to_string());
        assert_eq!(reopened.get(), "Redux");
    }

    #[test]
    fn file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();

        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn file_store_overwrites_corrupt_file_on_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();
        let store = FileStore::new(&path);

        assert!(matches!(store.get("a"), Err(StoreError::Corrupt(_))));
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn corrupt_state_file_is_replaced_on_next_set() {
        crate::logging::initialize_for_tests();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let mut value =
            PersistedValue::new(Arc::new(FileStore::new(&path)), "search", "fb".to_string());
        assert_eq!(value.get(), "fb");
        assert!(!value.is_degraded());

        value.set("redux".to_string());
        assert!(!value.is_degraded());

        let reopened =
            PersistedValue::new(Arc::new(FileStore::new(&path)), "search", "fb".to_string());
        assert_eq!(reopened.get(), "redux");
    }

    #[test]
    fn file_store_under_a_regular_file_is_unavailable() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let store: Arc<dyn KeyValueStore> =
            Arc::new(FileStore::new(blocker.path().join("state.json")));

        let mut value = PersistedValue::new(store, "search", "fb".to_string());
        assert_eq!(value.get(), "fb");
        assert!(value.is_degraded());

        value.set("still works".to_string());
        assert_eq!(value.get(), "still works");
    }
}
