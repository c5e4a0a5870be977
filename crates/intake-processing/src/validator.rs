//! File validator
//!
//! Runs every check against one file and collects the findings into a
//! [`ValidationResult`]. Validation problems are never returned as `Err`; the
//! only call-aborting condition is a batch larger than the profile allows.

use bytes::Bytes;
use futures::future::join_all;
use intake_core::{
    FileInfo, FileUploadError, SubmittedFile, ValidationConfig, ValidationError,
    ValidationErrorCode, ValidationResult,
};

use crate::content_type::check_content_type;
use crate::gate;
use crate::names::NameInspector;
use crate::sniffer::detect_type;
use crate::threats::ContentThreatScanner;

/// Build the [`FileInfo`] snapshot for one submission.
pub fn describe_file(bytes: &[u8], name: &str, declared_content_type: Option<&str>) -> FileInfo {
    FileInfo::new(
        name,
        bytes.len() as u64,
        declared_content_type.unwrap_or_default(),
        detect_type(bytes),
    )
}

/// Validates files against one immutable profile.
///
/// Cheap to clone and holds no per-call state, so clones can be moved onto
/// worker threads.
#[derive(Debug, Clone)]
pub struct FileValidator {
    config: ValidationConfig,
    names: NameInspector,
    threats: ContentThreatScanner,
}

impl FileValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            names: NameInspector::new(),
            threats: ContentThreatScanner::new(),
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate one file.
    ///
    /// Checks run in a fixed order and never short-circuit: name structure,
    /// size, format, content type, name security, then (when enabled) the
    /// threat pre-filter.
    pub fn validate_file(
        &self,
        bytes: &[u8],
        name: &str,
        declared_content_type: Option<&str>,
    ) -> ValidationResult {
        let info = describe_file(bytes, name, declared_content_type);
        let mut errors: Vec<ValidationError> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        let structure = self.names.inspect_structure(name);
        errors.extend(structure.errors);
        warnings.extend(structure.warnings);

        errors.extend(gate::check_size(&info, &self.config));
        errors.extend(gate::check_format(&info, &self.config));

        let content = check_content_type(&info, self.config.require_content_type_match);
        errors.extend(content.errors);
        warnings.extend(content.warnings);

        let security = self.names.inspect_security(name);
        errors.extend(security.errors);
        warnings.extend(security.warnings);

        if self.config.scanning_enabled() {
            let threats = self.threats.scan(bytes, &info);
            if !threats.is_empty() {
                let names = threats
                    .iter()
                    .map(|t| t.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                errors.push(ValidationError::new(
                    ValidationErrorCode::VirusDetected,
                    format!("Security threats detected: {}", names),
                    "content",
                ));
            }
        }

        let result = ValidationResult::new(errors, warnings, info);

        tracing::debug!(
            file_name = %name,
            size_bytes = result.file_info.size,
            detected_type = %result.file_info.detected_type,
            is_valid = result.is_valid,
            error_count = result.errors.len(),
            warning_count = result.warnings.len(),
            "File validated"
        );

        result
    }

    pub fn validate_submitted(&self, file: &SubmittedFile) -> ValidationResult {
        self.validate_file(
            &file.data,
            &file.name,
            file.declared_content_type.as_deref(),
        )
    }

    /// [`validate_file`](Self::validate_file) on the blocking pool, for
    /// callers on the async runtime.
    pub async fn validate_bytes(
        &self,
        data: Bytes,
        name: &str,
        declared_content_type: Option<&str>,
    ) -> Result<ValidationResult, FileUploadError> {
        let validator = self.clone();
        let name = name.to_string();
        let declared = declared_content_type.map(str::to_string);

        tokio::task::spawn_blocking(move || {
            validator.validate_file(&data, &name, declared.as_deref())
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Validation task failed");
            FileUploadError::upload_failed("Validation task failed").with_source(e)
        })
    }

    /// Fails with `TOO_MANY_FILES` when the batch exceeds the profile limit.
    pub fn check_batch_size(&self, count: usize) -> Result<(), FileUploadError> {
        match self.config.max_files {
            Some(max) if count > max => Err(FileUploadError::too_many_files(count, max)),
            _ => Ok(()),
        }
    }

    /// Validate a batch, one result per file in input order.
    ///
    /// The batch size is checked before any file is looked at.
    pub fn validate_files(
        &self,
        files: &[SubmittedFile],
    ) -> Result<Vec<ValidationResult>, FileUploadError> {
        self.check_batch_size(files.len())?;
        Ok(files.iter().map(|f| self.validate_submitted(f)).collect())
    }

    /// Same as [`validate_files`](Self::validate_files), with each file
    /// validated on the blocking pool. Results keep input order.
    pub async fn validate_files_concurrent(
        &self,
        files: &[SubmittedFile],
    ) -> Result<Vec<ValidationResult>, FileUploadError> {
        self.check_batch_size(files.len())?;

        let handles = files.iter().cloned().map(|file| {
            let validator = self.clone();
            tokio::task::spawn_blocking(move || validator.validate_submitted(&file))
        });

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| {
                joined.map_err(|e| {
                    tracing::error!(error = %e, "Validation task failed");
                    FileUploadError::upload_failed("Validation task failed").with_source(e)
                })
            })
            .collect()
    }
}
