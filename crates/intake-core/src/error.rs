//! Error types module
//!
//! `FileUploadError` is the only error the upload pipeline raises to its callers.
//! Validation problems are never raised through it during validation itself; they are
//! collected in a `ValidationResult` and only become a `FileUploadError` when an upload
//! is refused.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues and security rejections
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "VIRUS_DETECTED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Failure categories surfaced by the upload pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadErrorCode {
    InvalidFormat,
    FileTooLarge,
    TooManyFiles,
    VirusDetected,
    UploadFailed,
    NetworkError,
    Unauthorized,
}

impl UploadErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadErrorCode::InvalidFormat => "INVALID_FORMAT",
            UploadErrorCode::FileTooLarge => "FILE_TOO_LARGE",
            UploadErrorCode::TooManyFiles => "TOO_MANY_FILES",
            UploadErrorCode::VirusDetected => "VIRUS_DETECTED",
            UploadErrorCode::UploadFailed => "UPLOAD_FAILED",
            UploadErrorCode::NetworkError => "NETWORK_ERROR",
            UploadErrorCode::Unauthorized => "UNAUTHORIZED",
        }
    }
}

impl Display for UploadErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{code}: {message}")]
pub struct FileUploadError {
    pub code: UploadErrorCode,
    pub message: String,
    pub file_name: Option<String>,
    #[source]
    source: Option<anyhow::Error>,
}

impl FileUploadError {
    pub fn new(code: UploadErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            file_name: None,
            source: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::new(UploadErrorCode::InvalidFormat, message)
    }

    pub fn too_many_files(count: usize, max: usize) -> Self {
        Self::new(
            UploadErrorCode::TooManyFiles,
            format!("Too many files: {} submitted, at most {} allowed", count, max),
        )
    }

    pub fn virus_detected(message: impl Into<String>) -> Self {
        Self::new(UploadErrorCode::VirusDetected, message)
    }

    pub fn upload_failed(message: impl Into<String>) -> Self {
        Self::new(UploadErrorCode::UploadFailed, message)
    }

    pub fn network_error(message: impl Into<String>) -> Self {
        Self::new(UploadErrorCode::NetworkError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(UploadErrorCode::Unauthorized, message)
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

/// Static metadata for each code: (http_status, recoverable, suggested_action, sensitive, log_level).
fn upload_error_static_metadata(
    code: UploadErrorCode,
) -> (u16, bool, Option<&'static str>, bool, LogLevel) {
    match code {
        UploadErrorCode::InvalidFormat => (
            400,
            false,
            Some("Check the file name, type and size against the upload profile"),
            false,
            LogLevel::Debug,
        ),
        UploadErrorCode::FileTooLarge => (
            413,
            false,
            Some("Reduce file size or split the submission"),
            false,
            LogLevel::Debug,
        ),
        UploadErrorCode::TooManyFiles => (
            400,
            false,
            Some("Submit fewer files per request"),
            false,
            LogLevel::Debug,
        ),
        UploadErrorCode::VirusDetected => (
            422,
            false,
            Some("Remove active content from the file and upload a clean copy"),
            false,
            LogLevel::Warn,
        ),
        UploadErrorCode::UploadFailed => (
            500,
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        UploadErrorCode::NetworkError => (
            503,
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        UploadErrorCode::Unauthorized => (
            401,
            false,
            Some("Check storage credentials"),
            true,
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for FileUploadError {
    fn http_status_code(&self) -> u16 {
        upload_error_static_metadata(self.code).0
    }

    fn error_code(&self) -> &'static str {
        self.code.as_str()
    }

    fn is_recoverable(&self) -> bool {
        upload_error_static_metadata(self.code).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        upload_error_static_metadata(self.code).2
    }

    fn is_sensitive(&self) -> bool {
        upload_error_static_metadata(self.code).3
    }

    fn log_level(&self) -> LogLevel {
        upload_error_static_metadata(self.code).4
    }

    fn client_message(&self) -> String {
        match self.code {
            UploadErrorCode::UploadFailed => "Failed to store file".to_string(),
            UploadErrorCode::NetworkError => "Storage is temporarily unreachable".to_string(),
            UploadErrorCode::Unauthorized => "Storage rejected the credentials".to_string(),
            _ => self.message.clone(),
        }
    }
}
