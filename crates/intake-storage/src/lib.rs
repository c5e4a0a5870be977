//! Intake Storage Library
//!
//! Blob store abstraction used by the upload pipeline, with a local filesystem
//! backend and an S3-compatible backend.
//!
//! # Object id format
//!
//! Every backend stores an object under `{folder}/{object_name}` and hands that
//! string back as the object id. Ids must not contain `..`, a backslash or a
//! leading `/`. Key handling is centralized in the `keys` module so all backends
//! stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_blob_store;
pub use intake_core::{ResourceType, StorageBackend, TransformOptions};
#[cfg(feature = "storage-local")]
pub use local::LocalBlobStore;
#[cfg(feature = "storage-s3")]
pub use s3::S3BlobStore;
pub use traits::{BlobStore, StorageError, StorageResult, StoredObject};
