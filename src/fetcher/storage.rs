use crate::fetcher::errors::StorageError;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// Key-addressable write target for downloaded media.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn put(&self, name: &str, bytes: Bytes) -> Result<(), StorageError>;
}

fn validate_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Writes each artifact as a file inside one directory.
#[derive(Debug, Clone)]
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn put(&self, name: &str, bytes: Bytes) -> Result<(), StorageError> {
        validate_name(name)?;
        let io_error = |source| StorageError::Io {
            name: name.to_string(),
            source,
        };

        tokio::fs::create_dir_all(&self.root).await.map_err(io_error)?;
        tokio::fs::write(self.root.join(name), &bytes)
            .await
            .map_err(io_error)
    }
}

/// In-process store, mostly for replay runs and tests.
#[derive(Debug, Default)]
pub struct MemoryMediaStore {
    items: Mutex<HashMap<String, Bytes>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> MutexGuard<'_, HashMap<String, Bytes>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, name: &str) -> Option<Bytes> {
        self.items().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.items().keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn put(&self, name: &str, bytes: Bytes) -> Result<(), StorageError> {
        validate_name(name)?;
        self.items().insert(name.to_string(), bytes);
        Ok(())
    }
}
