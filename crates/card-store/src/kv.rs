use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Storage keys shared by the store components.
pub mod keys {
    pub const CARDS: &str = "cardflow.cards";
    pub const ORDERS: &str = "cardflow.orders";
    pub const BINDERS: &str = "cardflow.binders";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to persist key '{key}': {source}")]
    Persist {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to open storage directory {dir}: {source}")]
    OpenDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("binder name is required")]
    EmptyBinderName,
    #[error("a binder with that name already exists")]
    DuplicateBinderName,
}

/// Minimal JSON key-value persistence. `set` must be durable before it
/// returns (synchronous write-through, no batching).
pub trait KeyValueStore: Send {
    /// Raw JSON text stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Option<String>;
    /// Store raw JSON text under `key`.
    fn set(&mut self, key: &str, json: &str) -> Result<(), StoreError>;
    /// Remove `key` if present; removing an absent key is a no-op.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory backend for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, json: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), json.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File-backed backend: one `<key>.json` per key under a root directory.
/// Writes land in a temp file and rename into place, so a crash mid-write
/// never leaves a half-written value behind.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| StoreError::OpenDir {
            dir: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read key '{}': {}", key, e);
                None
            }
        }
    }

    fn set(&mut self, key: &str, json: &str) -> Result<(), StoreError> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root).map_err(|source| {
            StoreError::Persist {
                key: key.to_string(),
                source,
            }
        })?;
        tmp.write_all(json.as_bytes())
            .map_err(|source| StoreError::Persist {
                key: key.to_string(),
                source,
            })?;
        tmp.persist(self.path_for(key))
            .map_err(|e| StoreError::Persist {
                key: key.to_string(),
                source: e.error,
            })?;

        debug!("Persisted key '{}' ({} bytes)", key, json.len());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Persist {
                key: key.to_string(),
                source,
            }),
        }
    }
}
