//! Small versioned key/value storage for state that should survive a reload
//!
//! Values are stored as a JSON envelope `{"version": n, "data": ...}`. A
//! stored value with a different version is treated as absent, so bumping
//! the version discards anything persisted by an older build. Storage is a
//! convenience: every failure falls back to the default value.

use std::collections::HashMap;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

/// A string key/value store
pub trait StorageBackend: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per item under a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn item_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.item_path(key)?;
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.item_path(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.item_path(key)?;
        match fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    data: Value,
}

fn report(key: &str, action: &str, error: &StorageError) {
    if cfg!(debug_assertions) {
        warn!(key, action, error = %error, "Storage operation failed");
    }
}

/// A typed value persisted under one key
pub struct VersionedStorage<T> {
    backend: Arc<dyn StorageBackend>,
    key: String,
    version: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> VersionedStorage<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(backend: Arc<dyn StorageBackend>, key: impl Into<String>, version: u32) -> Self {
        Self {
            backend,
            key: key.into(),
            version,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    fn try_get(&self) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.backend.get_item(&self.key)? else {
            return Ok(None);
        };
        let envelope: Envelope = serde_json::from_str(&raw)?;
        if envelope.version != self.version {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(envelope.data)?))
    }

    /// The stored value, or `T::default()` when absent, stale or unreadable
    pub fn get(&self) -> T {
        match self.try_get() {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                report(&self.key, "get", &e);
                T::default()
            }
        }
    }

    fn try_set(&self, value: &T) -> Result<(), StorageError> {
        let envelope = Envelope {
            version: self.version,
            data: serde_json::to_value(value)?,
        };
        self.backend
            .set_item(&self.key, &serde_json::to_string(&envelope)?)
    }

    pub fn set(&self, value: &T) {
        if let Err(e) = self.try_set(value) {
            report(&self.key, "set", &e);
        }
    }

    /// Read, modify and write back the stored value
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(&value);
    }

    pub fn clear(&self) {
        if let Err(e) = self.backend.remove_item(&self.key) {
            report(&self.key, "clear", &e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        seen_intro: bool,
        visits: u32,
    }

    #[test]
    fn test_missing_value_is_default() {
        let storage: VersionedStorage<Prefs> =
            VersionedStorage::new(Arc::new(MemoryStorage::new()), "prefs", 1);
        assert_eq!(storage.get(), Prefs::default());
    }

    #[test]
    fn test_set_then_get() {
        let storage = VersionedStorage::new(Arc::new(MemoryStorage::new()), "prefs", 1);
        storage.set(&Prefs {
            seen_intro: true,
            visits: 3,
        });
        storage.update(|p: &mut Prefs| p.visits += 1);
        assert_eq!(
            storage.get(),
            Prefs {
                seen_intro: true,
                visits: 4
            }
        );
    }

    #[test]
    fn test_version_bump_discards_old_value() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
        VersionedStorage::new(Arc::clone(&backend), "prefs", 1).set(&Prefs {
            seen_intro: true,
            visits: 1,
        });
        let newer: VersionedStorage<Prefs> = VersionedStorage::new(backend, "prefs", 2);
        assert_eq!(newer.get(), Prefs::default());
    }

    #[test]
    fn test_garbage_falls_back_to_default() {
        let backend = Arc::new(MemoryStorage::new());
        backend.set_item("prefs", "{not json").unwrap();
        let storage: VersionedStorage<Prefs> = VersionedStorage::new(backend, "prefs", 1);
        assert_eq!(storage.get(), Prefs::default());
    }

    #[test]
    fn test_file_storage_persists() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested");

        let storage = VersionedStorage::new(Arc::new(FileStorage::new(&dir)), "prefs", 1);
        storage.set(&Prefs {
            seen_intro: true,
            visits: 2,
        });
        assert!(dir.join("prefs.json").exists());

        let reopened: VersionedStorage<Prefs> =
            VersionedStorage::new(Arc::new(FileStorage::new(&dir)), "prefs", 1);
        assert_eq!(reopened.get().visits, 2);

        reopened.clear();
        assert!(!dir.join("prefs.json").exists());
        reopened.clear();
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileStorage::new(temp_dir.path());
        assert!(matches!(
            backend.set_item("../escape", "{}"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            backend.get_item(""),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
