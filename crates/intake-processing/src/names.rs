//! Filename screening.
//!
//! Every check runs regardless of earlier failures so callers see all problems
//! with a name at once.

use std::sync::LazyLock;

use intake_core::constants::{is_executable_extension, MAX_FILENAME_LENGTH};
use intake_core::models::file_info::{base_name, extension_of};
use intake_core::{ValidationError, ValidationErrorCode};
use regex::Regex;

use crate::report::CheckReport;

pub type NameReport = CheckReport;

static RESERVED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(con|prn|aux|nul|com[1-9]|lpt[1-9])(\..*)?$")
        .expect("reserved name pattern is valid")
});

static SUSPICIOUS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\.(scr|pif|com|bat|cmd|exe|vbs|js|jar)$",
        r"(?i)\.(php|asp|jsp|cgi)$",
        r"(?i)(script|payload)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("suspicious name pattern is valid"))
    .collect()
});

const INVALID_CHARACTERS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Screens filenames for structural and security problems.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameInspector;

impl NameInspector {
    pub fn new() -> Self {
        Self
    }

    /// All name checks, structural first.
    pub fn inspect(&self, name: &str) -> NameReport {
        let mut report = self.inspect_structure(name);
        report.merge(self.inspect_security(name));
        report
    }

    /// Blank names, forbidden characters, reserved device names, path
    /// traversal and excessive length.
    pub fn inspect_structure(&self, name: &str) -> NameReport {
        let mut report = NameReport::default();

        if name.trim().is_empty() {
            report.errors.push(ValidationError::new(
                ValidationErrorCode::InvalidFilename,
                "Filename cannot be empty",
                "name",
            ));
        }

        if name
            .chars()
            .any(|c| INVALID_CHARACTERS.contains(&c) || (c as u32) < 0x20)
        {
            report.errors.push(ValidationError::new(
                ValidationErrorCode::InvalidCharacters,
                "Filename contains invalid characters",
                "name",
            ));
        }

        if RESERVED_NAME.is_match(name) {
            report.errors.push(ValidationError::new(
                ValidationErrorCode::ReservedName,
                "Filename uses a reserved system name",
                "name",
            ));
        }

        if name.contains("..") || name.contains('/') || name.contains('\\') {
            report.errors.push(ValidationError::new(
                ValidationErrorCode::PotentiallyMalicious,
                "Filename contains path traversal sequences",
                "name",
            ));
        }

        let length = name.chars().count();
        if length > MAX_FILENAME_LENGTH {
            report.errors.push(ValidationError::new(
                ValidationErrorCode::FilenameTooLong,
                format!(
                    "Filename is {} characters long, at most {} allowed",
                    length, MAX_FILENAME_LENGTH
                ),
                "name",
            ));
        }

        report
    }

    /// Executable extensions, disguised extensions and suspicious patterns.
    pub fn inspect_security(&self, name: &str) -> NameReport {
        let mut report = NameReport::default();

        let extension = extension_of(name);
        if is_executable_extension(&extension) {
            report.errors.push(ValidationError::new(
                ValidationErrorCode::ExecutableFile,
                format!("Executable files (.{}) are not allowed", extension),
                "extension",
            ));
        }

        // Warning only; see the suspicious pattern rule below for the hard block
        if base_name(name).matches('.').count() > 1 {
            report
                .warnings
                .push("File has multiple extensions and may be disguised".to_string());
        }

        if SUSPICIOUS_PATTERNS.iter().any(|p| p.is_match(name)) {
            report.errors.push(ValidationError::new(
                ValidationErrorCode::PotentiallyMalicious,
                "Filename matches a suspicious pattern",
                "name",
            ));
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(report: &NameReport) -> Vec<ValidationErrorCode> {
        report.errors.iter().map(|e| e.code).collect()
    }

    #[test]
    fn test_clean_name() {
        let report = NameInspector::new().inspect("report.pdf");
        assert!(report.is_clean());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_blank_name() {
        let report = NameInspector::new().inspect("   ");
        assert_eq!(codes(&report), vec![ValidationErrorCode::InvalidFilename]);
    }

    #[test]
    fn test_invalid_characters() {
        for name in ["a<b.pdf", "what?.pdf", "x*.png", "tab\there.pdf", "nul\0.pdf"] {
            let report = NameInspector::new().inspect_structure(name);
            assert!(
                codes(&report).contains(&ValidationErrorCode::InvalidCharacters),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_reserved_names() {
        for name in ["CON", "con.pdf", "Lpt1.txt", "com9.doc", "aux"] {
            let report = NameInspector::new().inspect_structure(name);
            assert!(
                codes(&report).contains(&ValidationErrorCode::ReservedName),
                "{name:?} should be reserved"
            );
        }
        for name in ["console.pdf", "com0.pdf", "lpt10.txt", "aux_notes.pdf"] {
            let report = NameInspector::new().inspect_structure(name);
            assert!(
                !codes(&report).contains(&ValidationErrorCode::ReservedName),
                "{name:?} should not be reserved"
            );
        }
    }

    #[test]
    fn test_path_traversal_is_malicious() {
        for name in ["../../etc/passwd.png", "a/b.pdf", "a\\b.pdf", "notes..pdf"] {
            let report = NameInspector::new().inspect(name);
            assert!(
                codes(&report).contains(&ValidationErrorCode::PotentiallyMalicious),
                "{name:?} should be flagged"
            );
        }
    }

    #[test]
    fn test_length_limit() {
        let ok = format!("{}.pdf", "a".repeat(251));
        assert!(NameInspector::new().inspect_structure(&ok).is_clean());

        let long = format!("{}.pdf", "a".repeat(252));
        let report = NameInspector::new().inspect_structure(&long);
        assert_eq!(codes(&report), vec![ValidationErrorCode::FilenameTooLong]);
    }

    #[test]
    fn test_executable_extension() {
        let report = NameInspector::new().inspect_security("video.EXE");
        let codes = codes(&report);
        assert!(codes.contains(&ValidationErrorCode::ExecutableFile));
        // also matches the script-extension rule
        assert!(codes.contains(&ValidationErrorCode::PotentiallyMalicious));
    }

    #[test]
    fn test_multiple_extensions_only_warn() {
        let report = NameInspector::new().inspect("holiday.photo.jpg");
        assert!(report.is_clean());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_suspicious_patterns() {
        for name in ["shell.php", "index.ASP", "my_script.pdf", "Payload.docx", "run.jsp"] {
            let report = NameInspector::new().inspect_security(name);
            assert!(
                codes(&report).contains(&ValidationErrorCode::PotentiallyMalicious),
                "{name:?} should be suspicious"
            );
        }
    }

    #[test]
    fn test_all_checks_run() {
        let report = NameInspector::new().inspect("../con.exe");
        let codes = codes(&report);
        assert!(codes.contains(&ValidationErrorCode::PotentiallyMalicious));
        assert!(codes.contains(&ValidationErrorCode::ExecutableFile));
    }
}
