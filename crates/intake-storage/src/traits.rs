//! Blob store abstraction trait
//!
//! This module defines the BlobStore trait that every storage backend implements.
//! The upload pipeline only ever talks to storage through it.

use async_trait::async_trait;
use bytes::Bytes;
use intake_core::{ResourceType, StorageBackend, TransformOptions};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage rejected credentials: {0}")]
    Unauthorized(String),

    #[error("Operation not supported: {0}")]
    Unsupported(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What the store reports back after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Key needed to delete or transform the object later.
    pub object_id: String,
    pub secure_url: String,
    /// Byte count as stored. Authoritative over any size the caller declared.
    pub bytes: u64,
    /// Lower-cased extension the object was stored with.
    pub format: String,
}

/// Blob store abstraction trait
///
/// Implemented by the local filesystem and S3-compatible backends, and by
/// in-memory doubles in tests. Object ids have the form `{folder}/{object_name}`
/// and never contain `..` or a leading `/`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` as `{folder}/{object_name}`.
    async fn upload(
        &self,
        data: Bytes,
        folder: &str,
        object_name: &str,
        resource_type: ResourceType,
    ) -> StorageResult<StoredObject>;

    /// Remove an object. Deleting an object that does not exist is not an error.
    async fn delete(&self, object_id: &str) -> StorageResult<()>;

    async fn exists(&self, object_id: &str) -> StorageResult<bool>;

    /// URL of a derivative (preview, thumbnail) of a stored object.
    ///
    /// Backends that cannot serve derivatives return [`StorageError::Unsupported`].
    fn transform_url(&self, object_id: &str, options: &TransformOptions) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
