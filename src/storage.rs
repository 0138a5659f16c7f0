//! Key-value persistence for the board state.
//!
//! Every store keeps its whole state as one JSON blob under a fixed key and
//! rewrites the blob on each mutation. Reads go through [`load_json`], which
//! never fails: a missing key, a backend error or a blob of the wrong shape
//! all come back as a [`Decoded`] variant the caller turns into a default.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{BoardError, Result};

/// Storage keys shared by all stores
pub mod keys {
    /// Word registry: JSON array of word entries
    pub const WORD_REGISTRY: &str = "word-suggestions";
    /// Template usage: JSON object of word to used templates
    pub const TEMPLATE_USAGE: &str = "used-templates";
    /// Sentence history: JSON array of sentence records
    pub const SENTENCE_RECORDS: &str = "motivation-sentences";
    /// Contributor statistics: JSON object of name to count
    pub const CONTRIBUTOR_STATS: &str = "contributor-stats";
    /// Last used contributor display name, stored as a bare string
    pub const CONTRIBUTOR_NAME: &str = "contributor-name";
}

/// Synchronous string key-value backend
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Replace the value under a key
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Delete a key; deleting an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;
    /// Delete every key
    fn clear(&self) -> Result<()>;
}

/// Result of decoding a persisted blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<T> {
    /// The blob was present and had the expected shape
    Value(T),
    /// Nothing stored under the key
    Missing,
    /// The blob was unreadable or had the wrong shape
    Corrupt(String),
}

impl<T> Decoded<T> {
    /// Decoded value, or `fallback()` for missing and corrupt blobs
    pub fn unwrap_or_else(self, fallback: impl FnOnce() -> T) -> T {
        match self {
            Self::Value(value) => value,
            Self::Missing | Self::Corrupt(_) => fallback(),
        }
    }

    /// True when the blob was present but unusable
    #[must_use]
    pub const fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt(_))
    }
}

impl<T: Default> Decoded<T> {
    /// Decoded value, or `T::default()` for missing and corrupt blobs
    pub fn unwrap_or_default(self) -> T {
        self.unwrap_or_else(T::default)
    }
}

/// Read and decode the JSON blob under `key`
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Decoded<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Decoded::Missing,
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored state, using defaults");
            crate::metrics::record_corrupt_state(key);
            return Decoded::Corrupt(e.to_string());
        },
    };

    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Decoded::Value(value),
        Err(e) => {
            warn!(key, error = %e, "Stored state is malformed, using defaults");
            crate::metrics::record_corrupt_state(key);
            Decoded::Corrupt(e.to_string())
        },
    }
}

/// Encode `value` and replace the blob under `key`
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)?;
    debug!(key, bytes = raw.len(), "Persisted state");
    Ok(())
}

/// In-process backend, the equivalent of a fresh browser profile
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with raw values
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| BoardError::Storage("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

/// Durable backend on an embedded `sled` database
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open (or create) the database in `dir`
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let db = sled::open(dir)?;
        debug!(path = %dir.display(), "Opened sled store");
        Ok(Self { db })
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.db.get(key.as_bytes())? {
            Some(data) => Ok(Some(String::from_utf8(data.to_vec())?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db.remove(key.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.db.clear()?;
        self.db.flush()?;
        Ok(())
    }
}
