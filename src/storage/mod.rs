//! Named key/value slots shared by the record store, the loader and the
//! theme coordinator.
//!
//! A slot holds a single string. Writers replace the whole value; there is no
//! locking between processes sharing the same backing file, so the last
//! writer wins.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use thiserror::Error;

mod file;

pub use file::{write_atomic, FileStore};

/// Slot holding the JSON array of project records.
pub const PROJECTS_KEY: &str = "project-cards-data";
/// Slot holding the theme flag.
pub const THEME_KEY: &str = "portfolio-theme";

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("storage quota exceeded writing {key:?} ({needed} bytes needed, quota {quota})")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub trait SlotStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SlotError>;
    fn remove(&self, key: &str) -> Result<(), SlotError>;
}

/// Process-local slots with an optional byte quota over keys and values.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn with_quota(quota: usize) -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            quota: Some(quota),
        }
    }
}

impl SlotStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        let guard = self.data.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SlotError> {
        let mut guard = self.data.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(quota) = self.quota {
            let others: usize = guard
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(SlotError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SlotError> {
        let mut guard = self.data.lock().unwrap_or_else(|e| e.into_inner());
        guard.remove(key);
        Ok(())
    }
}

#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<dyn SlotStore>,
}

impl StoreHandle {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self { inner: store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    pub fn in_memory_with_quota(quota: usize) -> Self {
        Self::new(Arc::new(MemoryStore::with_quota(quota)))
    }

    /// Opens (creating if needed) the slot file `slots.json` under `dir`.
    pub fn file(dir: &Path) -> Result<Self, SlotError> {
        Ok(Self::new(Arc::new(FileStore::open(dir)?)))
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        self.inner.get(key)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), SlotError> {
        self.inner.set(key, value)
    }

    pub fn remove(&self, key: &str) -> Result<(), SlotError> {
        self.inner.remove(key)
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle").finish_non_exhaustive()
    }
}
