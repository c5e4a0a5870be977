//! Size and format gate.

use intake_core::constants::MB;
use intake_core::{FileInfo, ValidationConfig, ValidationError, ValidationErrorCode};

/// Size and extension checks against one profile.
pub fn check(info: &FileInfo, config: &ValidationConfig) -> Vec<ValidationError> {
    let mut errors = check_size(info, config);
    errors.extend(check_format(info, config));
    errors
}

/// Non-empty and no larger than `max_file_size` (inclusive).
pub fn check_size(info: &FileInfo, config: &ValidationConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if info.size == 0 {
        errors.push(ValidationError::new(
            ValidationErrorCode::FileTooSmall,
            "File is empty",
            "size",
        ));
    }

    if info.size > config.max_file_size {
        errors.push(ValidationError::new(
            ValidationErrorCode::FileTooLarge,
            format!(
                "File size ({}MB) exceeds maximum allowed size ({}MB)",
                whole_megabytes(info.size),
                whole_megabytes(config.max_file_size)
            ),
            "size",
        ));
    }

    errors
}

/// Extension must be in the profile's allow-list.
pub fn check_format(info: &FileInfo, config: &ValidationConfig) -> Vec<ValidationError> {
    if config.is_allowed(&info.extension) {
        return Vec::new();
    }

    let message = if info.extension.is_empty() {
        format!(
            "File has no extension. Allowed formats: {}",
            config.allowed_formats_display()
        )
    } else {
        format!(
            "File format '.{}' is not allowed. Allowed formats: {}",
            info.extension,
            config.allowed_formats_display()
        )
    };

    vec![ValidationError::new(
        ValidationErrorCode::InvalidFormat,
        message,
        "extension",
    )]
}

fn whole_megabytes(bytes: u64) -> u64 {
    (bytes as f64 / MB as f64).round() as u64
}
