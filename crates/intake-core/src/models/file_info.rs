use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::constants::is_executable_extension;

/// Facts derived from one submitted file. Computed once per validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    /// Content type declared by the caller. Untrusted.
    pub content_type: String,
    /// Lower-cased suffix after the last `.`; empty when there is none.
    pub extension: String,
    /// MIME type sniffed from the leading bytes.
    pub detected_type: String,
    pub is_executable: bool,
    pub has_multiple_extensions: bool,
}

impl FileInfo {
    pub fn new(
        name: impl Into<String>,
        size: u64,
        content_type: impl Into<String>,
        detected_type: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let extension = extension_of(&name);
        let has_multiple_extensions = base_name(&name).matches('.').count() > 1;
        let is_executable = is_executable_extension(&extension);

        Self {
            name,
            size,
            content_type: content_type.into(),
            extension,
            detected_type: detected_type.into(),
            is_executable,
            has_multiple_extensions,
        }
    }
}

/// A file as submitted by a client, before validation.
///
/// `data` is reference counted so batches can be fanned out without copying.
#[derive(Debug, Clone)]
pub struct SubmittedFile {
    pub name: String,
    pub data: Bytes,
    pub declared_content_type: Option<String>,
}

impl SubmittedFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            declared_content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.declared_content_type = Some(content_type.into());
        self
    }
}

/// Lower-cased text after the last `.` of `name`, or an empty string.
pub fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) => name[idx + 1..].to_lowercase(),
        None => String::new(),
    }
}

/// Final path component of `name`, splitting on both separator styles.
pub fn base_name(name: &str) -> &str {
    name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased_suffix() {
        assert_eq!(extension_of("Report.PDF"), "pdf");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of("trailing."), "");
    }

    #[test]
    fn test_file_info_flags() {
        let info = FileInfo::new("invoice.pdf.exe", 10, "application/pdf", "application/pdf");
        assert_eq!(info.extension, "exe");
        assert!(info.is_executable);
        assert!(info.has_multiple_extensions);

        let info = FileInfo::new("notes.docx", 10, "", "application/octet-stream");
        assert!(!info.is_executable);
        assert!(!info.has_multiple_extensions);
    }

    #[test]
    fn test_multiple_extensions_uses_base_name() {
        let info = FileInfo::new("v1.2/notes.txt", 1, "", "");
        assert!(!info.has_multiple_extensions);
    }
}
