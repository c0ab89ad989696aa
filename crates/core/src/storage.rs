//! The capability every storage backend exposes.
//!
//! Objects are JSON values addressed by `(namespace, key)`. Backends are
//! created by name through the component repository and shared behind an
//! `Arc<dyn Storage>` for the lifetime of the process.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StorageError;

/// The core Storage trait.
///
/// Implementations: files (built in). Plugins may register more kinds.
#[async_trait]
pub trait Storage: Send + Sync {
    /// The backend kind (e.g., "files").
    fn kind(&self) -> &str;

    /// Store `value` under `key`, replacing any previous object.
    async fn put(&self, namespace: &str, key: &str, value: Value) -> Result<(), StorageError>;

    /// Fetch a single object.
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StorageError>;

    /// Fetch every object in a namespace, keyed by object key.
    async fn all(&self, namespace: &str) -> Result<Map<String, Value>, StorageError>;

    /// Remove a single object. Returns whether anything was removed.
    async fn remove(&self, namespace: &str, key: &str) -> Result<bool, StorageError>;

    /// Remove a whole namespace.
    async fn purge(&self, namespace: &str) -> Result<(), StorageError>;
}
