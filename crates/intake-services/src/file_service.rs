//! Upload pipeline
//!
//! validate → name → store → scan → (delete on dirty) → derive previews
//!
//! The blob store and the scanner are injected by the composition root. Every
//! blob store call is bounded by the configured timeout; nothing is retried.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use chrono::Utc;
use intake_core::models::file_info::extension_of;
use intake_core::{
    Config, FileMetadata, FileUploadError, ResourceType, ScanStatus, SubmittedFile,
    UploadContext, UploadErrorCode, ValidationConfig, ValidationErrorCode, ValidationResult,
};
use intake_processing::{FileScanner, FileValidator};
use intake_storage::{BlobStore, StorageError};
use uuid::Uuid;

use crate::naming::{folder_for, unique_file_name};
use crate::preview::{derive_previews, PreviewSizes};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_FOLDER_ROOT: &str = "lms";

pub struct FileService {
    store: Arc<dyn BlobStore>,
    scanner: Arc<dyn FileScanner>,
    validator: FileValidator,
    timeout: Duration,
    folder_root: String,
    preview_sizes: PreviewSizes,
}

impl FileService {
    pub fn new(
        store: Arc<dyn BlobStore>,
        scanner: Arc<dyn FileScanner>,
        validation: ValidationConfig,
    ) -> Self {
        Self {
            store,
            scanner,
            validator: FileValidator::new(validation),
            timeout: DEFAULT_TIMEOUT,
            folder_root: DEFAULT_FOLDER_ROOT.to_string(),
            preview_sizes: PreviewSizes::default(),
        }
    }

    /// Service with timeout, folder root and preview sizes taken from `config`.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn BlobStore>,
        scanner: Arc<dyn FileScanner>,
        validation: ValidationConfig,
    ) -> Self {
        Self::new(store, scanner, validation)
            .with_timeout(config.storage_timeout())
            .with_folder_root(config.storage_folder_root())
            .with_preview_sizes(PreviewSizes::from(config))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_folder_root(mut self, root: impl Into<String>) -> Self {
        self.folder_root = root.into();
        self
    }

    pub fn with_preview_sizes(mut self, sizes: PreviewSizes) -> Self {
        self.preview_sizes = sizes;
        self
    }

    pub fn validator(&self) -> &FileValidator {
        &self.validator
    }

    /// Validate, store, scan and describe one upload.
    ///
    /// On an unclean or failed scan the stored object is deleted before the
    /// error is returned. Validation runs on the blocking pool; the store and
    /// the scanner share one buffer.
    pub async fn upload_file(
        &self,
        data: impl Into<Bytes>,
        original_name: &str,
        context: &UploadContext,
    ) -> Result<FileMetadata, FileUploadError> {
        let start = Instant::now();
        let data: Bytes = data.into();

        let validation = self
            .validator
            .validate_bytes(
                data.clone(),
                original_name,
                context.declared_content_type.as_deref(),
            )
            .await
            .map_err(|e| e.with_file_name(original_name))?;
        if !validation.is_valid {
            tracing::warn!(
                file_name = %original_name,
                errors = %validation.error_summary(),
                "Upload rejected by validation"
            );
            return Err(rejection_error(&validation).with_file_name(original_name));
        }

        let extension = extension_of(original_name);
        let file_name = unique_file_name(original_name);
        let folder = folder_for(&self.folder_root, context);
        let resource_type = ResourceType::from_extension(&extension);

        let stored = self
            .bounded(
                "upload",
                self.store
                    .upload(data.clone(), &folder, &file_name, resource_type),
            )
            .await
            .map_err(|e| e.with_file_name(original_name))?;

        tracing::info!(
            object_id = %stored.object_id,
            size_bytes = stored.bytes,
            resource_type = %resource_type,
            "Upload to storage successful"
        );

        let scan = match self.scanner.scan_file(data, &file_name).await {
            Ok(scan) if scan.is_clean => scan,
            Ok(scan) => {
                tracing::warn!(
                    object_id = %stored.object_id,
                    threats = %scan.threat_names(),
                    engine = %scan.scan_engine,
                    "Stored file failed security scan, removing"
                );
                self.discard(&stored.object_id).await;
                return Err(FileUploadError::virus_detected(format!(
                    "Security threats detected: {}",
                    scan.threat_names()
                ))
                .with_file_name(original_name));
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    object_id = %stored.object_id,
                    engine = %self.scanner.engine(),
                    "Security scan failed, removing stored file"
                );
                self.discard(&stored.object_id).await;
                return Err(FileUploadError::upload_failed("Security scan could not complete")
                    .with_file_name(original_name)
                    .with_source(e));
            }
        };

        let derivatives = derive_previews(
            self.store.as_ref(),
            &stored.object_id,
            &extension,
            &self.preview_sizes,
        );

        tracing::info!(
            object_id = %stored.object_id,
            file_name = %file_name,
            size_bytes = stored.bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload completed"
        );

        Ok(FileMetadata {
            id: Uuid::new_v4(),
            original_name: original_name.to_string(),
            file_name,
            extension,
            size: stored.bytes,
            uploaded_at: Utc::now(),
            url: stored.secure_url,
            object_id: stored.object_id,
            preview_url: derivatives.preview_url,
            thumbnail_url: derivatives.thumbnail_url,
            scan_status: ScanStatus::Clean,
            scan_result: Some(scan),
        })
    }

    /// Upload a batch one file at a time, one result per file in input order.
    ///
    /// Fails as a whole only when the batch is larger than the profile allows.
    /// A file's own declared content type takes precedence over the context's.
    pub async fn upload_files(
        &self,
        files: &[SubmittedFile],
        context: &UploadContext,
    ) -> Result<Vec<Result<FileMetadata, FileUploadError>>, FileUploadError> {
        self.validator.check_batch_size(files.len())?;

        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let mut file_context = context.clone();
            if file.declared_content_type.is_some() {
                file_context.declared_content_type = file.declared_content_type.clone();
            }
            results.push(
                self.upload_file(file.data.clone(), &file.name, &file_context)
                    .await,
            );
        }
        Ok(results)
    }

    pub async fn validate_files(
        &self,
        files: &[SubmittedFile],
    ) -> Result<Vec<ValidationResult>, FileUploadError> {
        self.validator.validate_files_concurrent(files).await
    }

    /// Best-effort delete. Failures are logged and reported as `false`.
    pub async fn delete_file(&self, object_id: &str) -> bool {
        match self.bounded("delete", self.store.delete(object_id)).await {
            Ok(()) => {
                tracing::info!(object_id = %object_id, "File deleted from storage");
                true
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    object_id = %object_id,
                    "Failed to delete file from storage"
                );
                false
            }
        }
    }

    async fn discard(&self, object_id: &str) {
        if !self.delete_file(object_id).await {
            tracing::error!(
                object_id = %object_id,
                "Rejected file could not be removed from storage"
            );
        }
    }

    /// Run a blob store call under the storage timeout.
    async fn bounded<T, F>(&self, operation: &str, fut: F) -> Result<T, FileUploadError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(map_storage_error),
            Err(_) => {
                tracing::error!(
                    operation = operation,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Storage operation timed out"
                );
                Err(FileUploadError::network_error(format!(
                    "Storage {} timed out after {:.1}s",
                    operation,
                    self.timeout.as_secs_f64()
                )))
            }
        }
    }
}

/// Pipeline error for a storage failure.
pub fn map_storage_error(error: StorageError) -> FileUploadError {
    let code = match &error {
        StorageError::Unauthorized(_) => UploadErrorCode::Unauthorized,
        _ => UploadErrorCode::UploadFailed,
    };
    FileUploadError::new(code, error.to_string()).with_source(error)
}

/// Pipeline error for a file that failed validation.
fn rejection_error(result: &ValidationResult) -> FileUploadError {
    let code = if result.has_error(ValidationErrorCode::VirusDetected) {
        UploadErrorCode::VirusDetected
    } else if result.has_error(ValidationErrorCode::FileTooLarge) {
        UploadErrorCode::FileTooLarge
    } else {
        UploadErrorCode::InvalidFormat
    };
    FileUploadError::new(code, result.error_summary())
}
