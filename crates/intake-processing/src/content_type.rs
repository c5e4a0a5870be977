//! Consistency between the sniffed content type and the file extension.

use intake_core::constants::{DOCX_MIME, OCTET_STREAM};
use intake_core::{FileInfo, ValidationError, ValidationErrorCode};

use crate::report::CheckReport;

/// MIME types a file with `extension` may legitimately sniff as.
///
/// `None` for extensions this check has no opinion about.
pub fn expected_types(extension: &str) -> Option<&'static [&'static str]> {
    let types: &'static [&'static str] = match extension {
        "pdf" => &["application/pdf"],
        "jpg" | "jpeg" => &["image/jpeg"],
        "png" => &["image/png"],
        "gif" => &["image/gif"],
        "mp4" => &["video/mp4"],
        // QuickTime files without a `qt  ` brand sniff as generic ISO media
        "mov" => &["video/quicktime", "video/mp4"],
        "avi" => &["video/x-msvideo", "video/avi"],
        "doc" => &["application/msword"],
        "docx" => &[DOCX_MIME],
        _ => return None,
    };
    Some(types)
}

/// Compare `info.detected_type` with what its extension implies.
///
/// A mismatch is an error when `require_match` is set and an informational
/// warning otherwise. Undetectable content only ever warns.
pub fn check_content_type(info: &FileInfo, require_match: bool) -> CheckReport {
    let mut report = CheckReport::default();

    let Some(expected) = expected_types(&info.extension) else {
        tracing::debug!(
            extension = %info.extension,
            detected_type = %info.detected_type,
            "Unknown extension, skipping content type consistency check"
        );
        return report;
    };

    if info.detected_type == OCTET_STREAM {
        report
            .warnings
            .push("Could not determine file type from content".to_string());
        return report;
    }

    if !expected.contains(&info.detected_type.as_str()) {
        let message = format!(
            "File content ({}) does not match extension '.{}' (expected {})",
            info.detected_type,
            info.extension,
            expected.join(" or ")
        );
        if require_match {
            report.errors.push(ValidationError::new(
                ValidationErrorCode::ContentTypeMismatch,
                message,
                "content_type",
            ));
        } else {
            report.warnings.push(message);
        }
    }

    // The declared type is untrusted; a disagreement is worth surfacing but never blocks
    let declared = info.content_type.trim().to_lowercase();
    if !declared.is_empty()
        && declared != OCTET_STREAM
        && declared != info.detected_type
        && expected.contains(&info.detected_type.as_str())
    {
        report.warnings.push(format!(
            "Declared content type {} differs from detected {}",
            declared, info.detected_type
        ));
    }

    report
}
