//! Blob storage for uploaded files.

use crate::process::domain::FileRef;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for blob store operations.
pub type BlobStoreResult<T> = Result<T, BlobStoreError>;

/// Stores file contents and turns references into download URLs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` and returns a reference carrying the file metadata.
    async fn store(&self, bytes: Vec<u8>, filename: &str, mime_type: &str)
    -> BlobStoreResult<FileRef>;

    /// Returns a URL the file can be downloaded from.
    async fn resolve(&self, file: &FileRef) -> BlobStoreResult<String>;
}

/// Errors returned by blob stores.
#[derive(Debug, Clone, Error)]
pub enum BlobStoreError {
    /// Uploads must carry content.
    #[error("file '{0}' is empty")]
    EmptyFile(String),

    /// The reference is unknown to the store.
    #[error("blob not found: {0}")]
    NotFound(String),

    /// Storage backend failure.
    #[error("blob storage error: {0}")]
    Storage(Arc<dyn std::error::Error + Send + Sync>),
}

impl BlobStoreError {
    /// Wraps a storage error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Arc::new(err))
    }
}
