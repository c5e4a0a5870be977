pub mod file_info;
pub mod metadata;
pub mod scan;
pub mod validation;

pub use file_info::{FileInfo, SubmittedFile};
pub use metadata::{FileMetadata, UploadContext};
pub use scan::{ScanResult, ScanStatus, ThreatInfo, ThreatSeverity, ThreatType};
pub use validation::{
    ValidationConfig, ValidationError, ValidationErrorCode, ValidationProfile, ValidationResult,
};
