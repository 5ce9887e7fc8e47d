//! Blob store keeping file contents in memory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::process::domain::FileRef;
use crate::task::ports::{BlobStore, BlobStoreError, BlobStoreResult};

/// In-memory blob store serving files under a fixed base URL.
#[derive(Debug, Clone)]
pub struct InMemoryBlobStore {
    base_url: String,
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new("memory://blobs")
    }
}

impl InMemoryBlobStore {
    /// Creates an empty store serving files under `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            blobs: Arc::default(),
        }
    }

    /// Returns the stored contents of `file`.
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError::NotFound`] for unknown references.
    pub fn contents(&self, file: &FileRef) -> BlobStoreResult<Vec<u8>> {
        let blobs = self.blobs.read().map_err(lock_error)?;
        blobs
            .get(&file.reference)
            .cloned()
            .ok_or_else(|| BlobStoreError::NotFound(file.reference.clone()))
    }
}

fn lock_error(err: impl std::fmt::Display) -> BlobStoreError {
    BlobStoreError::storage(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn store(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> BlobStoreResult<FileRef> {
        if bytes.is_empty() {
            return Err(BlobStoreError::EmptyFile(filename.to_owned()));
        }
        let reference = Uuid::new_v4().to_string();
        let size_bytes = u64::try_from(bytes.len()).map_err(BlobStoreError::storage)?;
        let mut blobs = self.blobs.write().map_err(lock_error)?;
        blobs.insert(reference.clone(), bytes);
        Ok(FileRef::new(reference, filename, size_bytes, mime_type))
    }

    async fn resolve(&self, file: &FileRef) -> BlobStoreResult<String> {
        let blobs = self.blobs.read().map_err(lock_error)?;
        if !blobs.contains_key(&file.reference) {
            return Err(BlobStoreError::NotFound(file.reference.clone()));
        }
        Ok(format!("{}/{}", self.base_url, file.reference))
    }
}
