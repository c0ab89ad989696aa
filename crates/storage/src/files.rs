//! File-based storage backend: one JSON document per object.
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/<namespace>/<key>
//! ```
//!
//! The root defaults to `<spool>/<storage name>` and can be overridden with a
//! `path` argument. Directories are created on first write. Writes go through
//! a temporary file and a rename so readers never see a half-written object.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tenantry_core::error::StorageError;
use tenantry_core::plugin::PluginConfig;
use tenantry_core::storage::Storage;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A directory-backed object store.
///
/// Mutations take the write half of an in-process lock, lookups the read
/// half, so concurrent tasks sharing one instance never interleave a rename
/// with a directory scan. Separate instances on the same root stay safe
/// because every write stages into its own temporary file.
pub struct FileStorage {
    root: PathBuf,
    lock: RwLock<()>,
}

impl FileStorage {
    /// Create a storage rooted at `root`. Nothing is touched on disk yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        debug!(root = %root.display(), "File storage created");
        Self {
            root,
            lock: RwLock::new(()),
        }
    }

    /// Build a storage from its component configuration.
    ///
    /// Accepted arguments:
    /// - `path` (string, optional): storage root; defaults to `<spool>/<name>`
    pub fn from_plugin_config(
        config: &PluginConfig,
        spool_path: &Path,
    ) -> Result<Self, StorageError> {
        let root = match config.args.get("path") {
            None | Some(Value::Null) => {
                validate_component(&config.name).map_err(|_| {
                    StorageError::InvalidArgs(format!("unusable storage name '{}'", config.name))
                })?;
                spool_path.join(&config.name)
            }
            Some(Value::String(path)) => PathBuf::from(path),
            Some(_) => return Err(StorageError::InvalidArgs("'path' must be a string".into())),
        };
        Ok(Self::new(root))
    }

    /// The directory this storage lives in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_path(&self, namespace: &str) -> Result<PathBuf, StorageError> {
        validate_component(namespace)?;
        Ok(self.root.join(namespace))
    }

    fn object_path(&self, namespace: &str, key: &str) -> Result<PathBuf, StorageError> {
        validate_component(key)?;
        Ok(self.namespace_path(namespace)?.join(key))
    }
}

/// Namespaces and keys map straight onto path components.
///
/// Leading dots are reserved for temporary files (and rule out `.`/`..`).
fn validate_component(component: &str) -> Result<(), StorageError> {
    let invalid = component.is_empty()
        || component.starts_with('.')
        || component.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StorageError::InvalidKey(component.to_string()));
    }
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read_object(path: &Path) -> Result<Option<Value>, StorageError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error(path, e)),
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StorageError::Corrupted {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

#[async_trait]
impl Storage for FileStorage {
    fn kind(&self) -> &str {
        crate::FILES_KIND
    }

    async fn put(&self, namespace: &str, key: &str, value: Value) -> Result<(), StorageError> {
        let path = self.object_path(namespace, key)?;
        let content = serde_json::to_vec(&value).map_err(|e| StorageError::Corrupted {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let _guard = self.lock.write().await;

        let dir = self.namespace_path(namespace)?;
        std::fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;

        // Unique per write, so handles on the same root never share one
        let mut staging = tempfile::Builder::new()
            .prefix(".")
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| io_error(&dir, e))?;
        staging
            .write_all(&content)
            .map_err(|e| io_error(staging.path(), e))?;
        staging
            .persist(&path)
            .map_err(|e| io_error(&path, e.error))?;

        debug!(namespace, key, bytes = content.len(), "Object stored");
        Ok(())
    }

    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StorageError> {
        let path = self.object_path(namespace, key)?;
        let _guard = self.lock.read().await;
        read_object(&path)
    }

    async fn all(&self, namespace: &str) -> Result<Map<String, Value>, StorageError> {
        let dir = self.namespace_path(namespace)?;
        let _guard = self.lock.read().await;

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(io_error(&dir, e)),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(&dir, e))?;
            let Ok(name) = entry.file_name().into_string() else {
                warn!(dir = %dir.display(), "Skipping object with a non UTF-8 name");
                continue;
            };
            if validate_component(&name).is_ok() && entry.path().is_file() {
                keys.push(name);
            }
        }
        keys.sort();

        let mut objects = Map::new();
        for key in keys {
            // Removed between the scan and the read: only possible from
            // another process, so just skip it.
            if let Some(value) = read_object(&dir.join(&key))? {
                objects.insert(key, value);
            }
        }
        Ok(objects)
    }

    async fn remove(&self, namespace: &str, key: &str) -> Result<bool, StorageError> {
        let path = self.object_path(namespace, key)?;
        let _guard = self.lock.write().await;

        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    async fn purge(&self, namespace: &str) -> Result<(), StorageError> {
        let dir = self.namespace_path(namespace)?;
        let _guard = self.lock.write().await;

        match std::fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&dir, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn storage() -> (TempDir, FileStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("core"));
        (dir, storage)
    }

    #[tokio::test]
    async fn put_then_get_persists() {
        let (dir, storage) = storage();
        storage
            .put("apps", "echo", json!({"type": "python", "version": 3}))
            .await
            .unwrap();

        // Visible on disk and through a fresh instance
        assert!(dir.path().join("core/apps/echo").is_file());
        let reopened = FileStorage::new(dir.path().join("core"));
        let value = reopened.get("apps", "echo").await.unwrap();
        assert_eq!(value, Some(json!({"type": "python", "version": 3})));
    }

    #[tokio::test]
    async fn missing_objects_and_namespaces_are_empty() {
        let (_dir, storage) = storage();
        assert_eq!(storage.get("apps", "ghost").await.unwrap(), None);
        assert!(storage.all("apps").await.unwrap().is_empty());
        assert!(!storage.remove("apps", "ghost").await.unwrap());
        storage.purge("apps").await.unwrap();
    }

    #[tokio::test]
    async fn put_replaces_previous_value() {
        let (_dir, storage) = storage();
        storage.put("apps", "echo", json!(1)).await.unwrap();
        storage.put("apps", "echo", json!(2)).await.unwrap();
        assert_eq!(storage.get("apps", "echo").await.unwrap(), Some(json!(2)));
        assert_eq!(storage.all("apps").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn all_lists_sorted_objects_in_namespace() {
        let (_dir, storage) = storage();
        storage.put("apps", "zeta", json!("z")).await.unwrap();
        storage.put("apps", "alpha", json!("a")).await.unwrap();
        storage.put("tasks", "other", json!("o")).await.unwrap();

        let apps = storage.all("apps").await.unwrap();
        let keys: Vec<&str> = apps.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
        assert_eq!(apps["alpha"], json!("a"));
    }

    #[tokio::test]
    async fn remove_and_purge() {
        let (_dir, storage) = storage();
        storage.put("apps", "echo", json!({})).await.unwrap();
        storage.put("apps", "ping", json!({})).await.unwrap();

        assert!(storage.remove("apps", "echo").await.unwrap());
        assert_eq!(storage.get("apps", "echo").await.unwrap(), None);

        storage.purge("apps").await.unwrap();
        assert!(storage.all("apps").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_path_like_keys() {
        let (_dir, storage) = storage();
        for bad in ["", ".", "..", "../escape", "a/b", ".hidden", "nul\0"] {
            let err = storage.put("apps", bad, json!(1)).await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)), "key {bad:?}");
        }
        let err = storage.all("..").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn corrupted_object_is_reported() {
        let (dir, storage) = storage();
        let ns = dir.path().join("core/apps");
        std::fs::create_dir_all(&ns).unwrap();
        std::fs::write(ns.join("broken"), b"{not json").unwrap();

        let err = storage.get("apps", "broken").await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupted { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn separate_handles_on_one_root_write_safely() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("core");
        let first = std::sync::Arc::new(FileStorage::new(&root));
        let second = std::sync::Arc::new(FileStorage::new(&root));

        let writers: Vec<_> = [first.clone(), second.clone()]
            .into_iter()
            .enumerate()
            .map(|(writer, storage)| {
                tokio::spawn(async move {
                    for round in 0..150 {
                        let pad = "x".repeat(4096);
                        let value = json!({"writer": writer, "round": round, "pad": pad});
                        storage.put("apps", "echo", value).await.unwrap();
                    }
                })
            })
            .collect();

        let reader = second.clone();
        let reads = tokio::spawn(async move {
            for _ in 0..150 {
                // Either absent or a complete object, never a torn one
                if let Some(value) = reader.get("apps", "echo").await.unwrap() {
                    assert!(value["writer"].is_u64());
                }
            }
        });

        for writer in writers {
            writer.await.unwrap();
        }
        reads.await.unwrap();

        let value = first.get("apps", "echo").await.unwrap().unwrap();
        assert_eq!(value["round"], json!(149));
        // No staging files left behind
        let entries = std::fs::read_dir(root.join("apps")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn root_defaults_to_spool_subdirectory() {
        let config = PluginConfig::named("core");
        let spool = Path::new("/var/spool/tenantry");
        let storage = FileStorage::from_plugin_config(&config, spool).unwrap();
        assert_eq!(storage.root(), Path::new("/var/spool/tenantry/core"));
        assert_eq!(storage.kind(), "files");
    }

    #[test]
    fn path_argument_overrides_root() {
        let config = PluginConfig::new("core", json!({"path": "/srv/objects"}));
        let spool = Path::new("/var/spool/tenantry");
        let storage = FileStorage::from_plugin_config(&config, spool).unwrap();
        assert_eq!(storage.root(), Path::new("/srv/objects"));

        let config = PluginConfig::new("core", json!({"path": 12}));
        let err = FileStorage::from_plugin_config(&config, Path::new("/spool")).err().unwrap();
        assert!(matches!(err, StorageError::InvalidArgs(_)));
    }
}
