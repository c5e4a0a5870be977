use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::file_info::FileInfo;
use crate::constants::{DEFAULT_MAX_FILES, MB};

/// Per-context validation rules. Immutable for the lifetime of a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Lower-case extensions, without the leading dot.
    pub allowed_formats: BTreeSet<String>,
    pub max_file_size: u64,
    pub max_files: Option<usize>,
    pub require_content_type_match: bool,
    pub enable_virus_scanning: bool,
    pub enable_malware_detection: bool,
}

impl ValidationConfig {
    /// General-purpose profile. Batch limit defaults to ten files.
    pub fn new<I, S>(allowed_formats: I, max_file_size: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_formats: allowed_formats
                .into_iter()
                .map(|s| s.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            max_file_size,
            max_files: Some(DEFAULT_MAX_FILES),
            require_content_type_match: true,
            enable_virus_scanning: true,
            enable_malware_detection: true,
        }
    }

    /// PDF and Word documents up to 50 MB.
    pub fn documents() -> Self {
        Self::new(["pdf", "doc", "docx"], 50 * MB)
    }

    /// MP4, QuickTime and AVI video up to 500 MB.
    pub fn videos() -> Self {
        Self::new(["mp4", "mov", "avi"], 500 * MB)
    }

    /// JPEG, PNG and GIF images up to 10 MB.
    pub fn images() -> Self {
        Self::new(["jpg", "jpeg", "png", "gif"], 10 * MB)
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = Some(max_files);
        self
    }

    pub fn without_max_files(mut self) -> Self {
        self.max_files = None;
        self
    }

    pub fn with_content_type_match(mut self, required: bool) -> Self {
        self.require_content_type_match = required;
        self
    }

    pub fn with_scanning(mut self, virus_scanning: bool, malware_detection: bool) -> Self {
        self.enable_virus_scanning = virus_scanning;
        self.enable_malware_detection = malware_detection;
        self
    }

    pub fn is_allowed(&self, extension: &str) -> bool {
        self.allowed_formats.contains(&extension.to_lowercase())
    }

    pub fn scanning_enabled(&self) -> bool {
        self.enable_virus_scanning || self.enable_malware_detection
    }

    /// Allowed formats as a comma separated list, in sorted order.
    pub fn allowed_formats_display(&self) -> String {
        self.allowed_formats
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Built-in validation presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationProfile {
    Documents,
    Videos,
    Images,
}

impl ValidationProfile {
    pub fn config(&self) -> ValidationConfig {
        match self {
            ValidationProfile::Documents => ValidationConfig::documents(),
            ValidationProfile::Videos => ValidationConfig::videos(),
            ValidationProfile::Images => ValidationConfig::images(),
        }
    }
}

impl FromStr for ValidationProfile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "documents" | "document" => Ok(ValidationProfile::Documents),
            "videos" | "video" => Ok(ValidationProfile::Videos),
            "images" | "image" => Ok(ValidationProfile::Images),
            _ => Err(anyhow::anyhow!("Invalid validation profile: {}", s)),
        }
    }
}

impl Display for ValidationProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ValidationProfile::Documents => write!(f, "documents"),
            ValidationProfile::Videos => write!(f, "videos"),
            ValidationProfile::Images => write!(f, "images"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorCode {
    InvalidFilename,
    InvalidCharacters,
    ReservedName,
    FilenameTooLong,
    PotentiallyMalicious,
    ExecutableFile,
    FileTooSmall,
    FileTooLarge,
    InvalidFormat,
    ContentTypeMismatch,
    VirusDetected,
}

impl ValidationErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationErrorCode::InvalidFilename => "INVALID_FILENAME",
            ValidationErrorCode::InvalidCharacters => "INVALID_CHARACTERS",
            ValidationErrorCode::ReservedName => "RESERVED_NAME",
            ValidationErrorCode::FilenameTooLong => "FILENAME_TOO_LONG",
            ValidationErrorCode::PotentiallyMalicious => "POTENTIALLY_MALICIOUS",
            ValidationErrorCode::ExecutableFile => "EXECUTABLE_FILE",
            ValidationErrorCode::FileTooSmall => "FILE_TOO_SMALL",
            ValidationErrorCode::FileTooLarge => "FILE_TOO_LARGE",
            ValidationErrorCode::InvalidFormat => "INVALID_FORMAT",
            ValidationErrorCode::ContentTypeMismatch => "CONTENT_TYPE_MISMATCH",
            ValidationErrorCode::VirusDetected => "VIRUS_DETECTED",
        }
    }
}

impl Display for ValidationErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// One problem found while validating a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: ValidationErrorCode,
    pub message: String,
    /// Which part of the input the problem relates to (`name`, `size`, `extension`, ...).
    pub field: String,
}

impl ValidationError {
    pub fn new(code: ValidationErrorCode, message: impl Into<String>, field: &str) -> Self {
        Self {
            code,
            message: message.into(),
            field: field.to_string(),
        }
    }
}

/// Outcome of validating one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
    pub file_info: FileInfo,
}

impl ValidationResult {
    /// Build a result; validity is derived from `errors` alone.
    pub fn new(errors: Vec<ValidationError>, warnings: Vec<String>, file_info: FileInfo) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            file_info,
        }
    }

    pub fn has_error(&self, code: ValidationErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    pub fn error_codes(&self) -> BTreeSet<ValidationErrorCode> {
        self.errors.iter().map(|e| e.code).collect()
    }

    /// All error messages joined with `"; "`.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
