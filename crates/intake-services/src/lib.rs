//! Intake Services Layer
//!
//! Hosts the upload pipeline and the optional ClamAV scanner, and re-exports
//! what a composition root needs from storage and processing so callers can
//! depend on this crate alone.

#[cfg(feature = "clamav")]
pub mod clamav;
pub mod file_service;
pub mod naming;
pub mod preview;

#[cfg(feature = "clamav")]
pub use clamav::{ClamAvScanner, CLAMAV_ENGINE};
pub use file_service::{map_storage_error, FileService};
pub use intake_processing::{FileScanner, FileValidator, HeuristicScanner};
pub use intake_storage::{create_blob_store, BlobStore, StorageError, StorageResult, StoredObject};
pub use naming::{folder_for, unique_file_name};
pub use preview::{derive_previews, Derivatives, PreviewSizes};
