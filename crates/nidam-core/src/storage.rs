//! Key/value persistence for the credit store
//!
//! The browser-local storage of the original UI becomes a small JSON map
//! persisted under the data directory. A malformed or missing file degrades
//! to an empty map rather than failing startup.

use crate::error::CoreError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File name of the persisted map inside the data directory
pub const STORE_FILE: &str = "nidam-store.json";

/// String key/value persistence. Implementations must tolerate concurrent
/// access from the UI thread and background tasks.
pub trait KvStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;
}

/// In-memory storage for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStorage {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.map.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Durable storage backed by `<data_dir>/nidam-store.json`
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    map: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or create on first write) the store file under `data_dir`.
    /// Unreadable or malformed content is treated as an empty map.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(STORE_FILE);
        let map = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Malformed store file, starting empty");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            map: Mutex::new(map),
        }
    }

    fn flush(&self, map: &HashMap<String, String>) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::Storage {
                message: format!("create {}: {}", parent.display(), e),
            })?;
        }
        let content = serde_json::to_string_pretty(map).map_err(|e| CoreError::Storage {
            message: format!("serialize store: {}", e),
        })?;
        std::fs::write(&self.path, content).map_err(|e| CoreError::Storage {
            message: format!("write {}: {}", self.path.display(), e),
        })
    }
}

impl KvStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut map = self.map.lock();
        map.insert(key.to_string(), value.to_string());
        self.flush(&map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k"), None);
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_file_storage_round_trip_across_instances() {
        let dir = TempDir::new().unwrap();

        let storage = FileStorage::open(dir.path());
        storage.set("nidam_credits", "42").unwrap();
        drop(storage);

        let reopened = FileStorage::open(dir.path());
        assert_eq!(reopened.get("nidam_credits"), Some("42".to_string()));
    }

    #[test]
    fn test_file_storage_malformed_file_is_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(STORE_FILE), "not json {{{").unwrap();

        let storage = FileStorage::open(dir.path());
        assert_eq!(storage.get("nidam_credits"), None);
    }

    #[test]
    fn test_file_storage_missing_dir_created_on_write() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("deeper").join("still");

        let storage = FileStorage::open(&nested);
        storage.set("k", "v").unwrap();
        assert!(nested.join(STORE_FILE).exists());
    }
}
