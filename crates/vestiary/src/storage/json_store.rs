//! File-backed and in-memory key/value stores.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use log::debug;

use crate::error::StorageError;
use crate::storage::KeyValueStore;

/// One JSON document per key under a data directory.
///
/// Writes go through a temp file followed by a rename, so readers never
/// observe a partially written document.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Opens (or creates) the store rooted at `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::CreateDirectory {
            path: dir.clone(),
            source: e,
        })?;
        Ok(Self { dir })
    }

    /// Returns the canonical data directory: `<platform data dir>/vestiary`.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("vestiary"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let path = self.path_for(key);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Key '{}' not present at {}", key, path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(StorageError::ReadKey {
                    key: key.to_string(),
                    source: e,
                })
            }
        };

        let value =
            serde_json::from_str(&content).map_err(|e| StorageError::Deserialize {
                key: key.to_string(),
                source: e,
            })?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        let content = serde_json::to_vec(&value).map_err(|e| StorageError::Serialize {
            key: key.to_string(),
            source: e,
        })?;

        let path = self.path_for(key);
        let tmp_path = self.dir.join(format!("{}.json.tmp", key));

        let io_err = |e| StorageError::WriteKey {
            key: key.to_string(),
            source: e,
        };

        tokio::fs::write(&tmp_path, &content).await.map_err(io_err)?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(io_err)?;

        debug!("Wrote {} bytes to key '{}'", content.len(), key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::WriteKey {
                key: key.to_string(),
                source: e,
            }),
        }
    }
}

/// In-memory store for tests and previews.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds a key, bypassing the trait. Useful for corrupt-state tests.
    pub fn seed(&self, key: &str, value: serde_json::Value) {
        self.lock().insert(key.to_string(), value);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, serde_json::Value>> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn get_returns_none_for_absent_key() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(tmp.path()).unwrap();

        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(tmp.path()).unwrap();

        let value = json!({"items": [1, 2, 3]});
        store.set("closet", value.clone()).await.unwrap();

        assert_eq!(store.get("closet").await.unwrap(), Some(value));
        assert!(tmp.path().join("closet.json").exists());
        assert!(!tmp.path().join("closet.json.tmp").exists());
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(tmp.path()).unwrap();

        store.set("k", json!(1)).await.unwrap();
        store.set("k", json!(2)).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn remove_is_a_noop_for_absent_key() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(tmp.path()).unwrap();

        store.remove("missing").await.unwrap();

        store.set("k", json!(true)).await.unwrap();
        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_document_surfaces_as_deserialize_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(tmp.path()).unwrap();

        std::fs::write(tmp.path().join("closet.json"), b"{not json").unwrap();

        let err = store.get("closet").await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::StorageError::Deserialize { .. }
        ));
    }

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemoryStore::new();
        store.set("k", json!("v")).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!("v")));
        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }
}
