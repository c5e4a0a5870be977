//! Shared object key handling for storage backends.
//!
//! Key format: `{folder}/{object_name}`, e.g. `lms/assignments/42/1700000000000_ab12CD34_essay.pdf`.

use crate::traits::{StorageError, StorageResult};

/// Join a folder and an object name into an object id, rejecting anything that
/// could escape the storage root.
pub fn build_object_key(folder: &str, object_name: &str) -> StorageResult<String> {
    let folder = folder.trim_matches('/');

    if object_name.is_empty() || object_name.contains('/') {
        return Err(StorageError::InvalidKey(format!(
            "Invalid object name: {:?}",
            object_name
        )));
    }

    let key = if folder.is_empty() {
        object_name.to_string()
    } else {
        format!("{}/{}", folder, object_name)
    };

    validate_key(&key)?;
    Ok(key)
}

/// Reject keys containing `..`, a backslash, an empty segment or a leading `/`.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty()
        || key.starts_with('/')
        || key.contains("..")
        || key.contains('\\')
        || key.split('/').any(|segment| segment.is_empty())
    {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Lower-cased extension of an object name, empty when there is none.
pub fn format_of(object_name: &str) -> String {
    intake_core::models::file_info::extension_of(object_name)
}

/// Percent-encode each segment of a key for use in a URL path.
pub fn encode_key_for_url(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
