pub mod json_store;

pub use json_store::{JsonFileStore, MemoryStore};

use async_trait::async_trait;

use crate::error::StorageError;

/// Keyed persistence collaborator: JSON-serializable values under string
/// keys. Absence of a key is a normal "empty" state, not an error.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError>;

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
