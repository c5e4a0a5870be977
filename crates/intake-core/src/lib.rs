//! Intake Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! every intake component: the validation pipeline, the blob-store adapters and the
//! upload service.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod transform_url;

// Re-export commonly used types
pub use config::Config;
pub use error::{ErrorMetadata, FileUploadError, LogLevel, UploadErrorCode};
pub use models::{
    FileInfo, FileMetadata, ScanResult, ScanStatus, SubmittedFile, ThreatInfo, ThreatSeverity,
    ThreatType, UploadContext, ValidationConfig, ValidationError, ValidationErrorCode,
    ValidationProfile, ValidationResult,
};
pub use storage_types::{ResourceType, StorageBackend};
pub use transform_url::{CropMode, TransformOptions};
