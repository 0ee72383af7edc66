//! Object storage for original uploads and processed artifacts
//!
//! Blobs are addressed by slash-separated keys such as
//! `uploads/<session>/<file>` and `processed/<session>.txt`.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::error::{RedactError, Result};

/// Trait for blob storage backends
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a blob, replacing any existing object at `key`
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;

    /// Fetch a blob; `NotFound` if absent
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Check whether an object exists
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Remove an object; removing a missing key is not an error
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Reject keys that could escape the store root
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(RedactError::Validation("Object key is empty".to_string()));
    }
    let path = Path::new(key);
    let safe = path
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !safe {
        return Err(RedactError::Validation(format!(
            "Object key '{}' must be a relative path without '..'",
            key
        )));
    }
    Ok(())
}

/// Filesystem-backed object store
///
/// Objects live under a root directory. Writes go to a temp file and are
/// renamed into place.
pub struct FileObjectStore {
    root: PathBuf,
}

impl FileObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for FileObjectStore {
    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> Result<()> {
        let path = self.path_for(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                RedactError::Storage(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        // Unique temp name so concurrent writers never share a temp file
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("object");
        let tmp_path = path.with_file_name(format!("{}.{}.tmp", file_name, uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp_path, &data).await.map_err(|e| {
            RedactError::Storage(format!("Failed to upload {}: {}", key, e))
        })?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(|e| {
            RedactError::Storage(format!("Failed to upload {}: {}", key, e))
        })?;

        tracing::debug!(key = %key, bytes = data.len(), "Object stored");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RedactError::NotFound(format!("Object not found: {}", key)))
            }
            Err(e) => Err(RedactError::Storage(format!(
                "Failed to download {}: {}",
                key, e
            ))),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| RedactError::Storage(format!("Failed to stat {}: {}", key, e)))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RedactError::Storage(format!(
                "Failed to delete {}: {}",
                key, e
            ))),
        }
    }
}

/// In-memory object store for testing and single-process use
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, (Bytes, String)>>,
}

impl MemoryObjectStore {
    /// Content type recorded for a stored object
    pub async fn content_type(&self, key: &str) -> Option<String> {
        let objects = self.objects.read().await;
        objects.get(key).map(|(_, ct)| ct.clone())
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        validate_key(key)?;
        let mut objects = self.objects.write().await;
        objects.insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let objects = self.objects.read().await;
        objects
            .get(key)
            .map(|(data, _)| data.clone())
            .ok_or_else(|| RedactError::NotFound(format!("Object not found: {}", key)))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }
}
