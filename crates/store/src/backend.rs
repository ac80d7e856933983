use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::StoreError;

/// Raw key-value persistence, namespaced like the original object stores.
/// Values are opaque byte records; serialization lives with the typed
/// stores layered on top.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn read(&self, namespace: &str, id: &str) -> Result<Option<Vec<u8>>, StoreError>;
    async fn write(&self, namespace: &str, id: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Volatile backend for tests and for sessions that opt out of persistence.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn read(&self, namespace: &str, id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self.entries.lock().await;
        Ok(entries.get(&(namespace.to_string(), id.to_string())).cloned())
    }

    async fn write(&self, namespace: &str, id: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.insert((namespace.to_string(), id.to_string()), bytes.to_vec());
        Ok(())
    }
}

/// One JSON file per record under `<root>/<namespace>/`.
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn record_path(&self, namespace: &str, id: &str) -> PathBuf {
        // Ids are caller-supplied strings (file names among them); keep the
        // on-disk name to a safe character set.
        let safe: String = id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(namespace).join(format!("{safe}.json"))
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn read(&self, namespace: &str, id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.record_path(namespace, id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::backend(format!("read {:?}: {}", path, err))),
        }
    }

    async fn write(&self, namespace: &str, id: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.record_path(namespace, id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| StoreError::backend(format!("mkdir {:?}: {}", parent, err)))?;
        }
        debug!(?path, bytes = bytes.len(), "writing record");
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|err| StoreError::backend(format!("write {:?}: {}", path, err)))
    }
}
