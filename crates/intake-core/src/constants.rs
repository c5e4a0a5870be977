//! Application-wide constants.

/// MIME type returned when a byte signature is not recognised.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Office Open XML wordprocessing MIME type.
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Extensions that are always treated as executable content.
pub const EXECUTABLE_EXTENSIONS: &[&str] = &[
    "exe", "bat", "cmd", "com", "scr", "pif", "vbs", "js", "jar", "app", "deb", "pkg", "dmg",
    "run", "bin", "msi", "gadget",
];

/// Longest filename accepted, in characters.
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Batch size used when a profile does not set its own limit.
pub const DEFAULT_MAX_FILES: usize = 10;

pub const MB: u64 = 1024 * 1024;

/// Returns true when `extension` (any case) is in [`EXECUTABLE_EXTENSIONS`].
pub fn is_executable_extension(extension: &str) -> bool {
    let lower = extension.to_lowercase();
    EXECUTABLE_EXTENSIONS.contains(&lower.as_str())
}
