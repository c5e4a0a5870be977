//! Storage names and folders for accepted uploads.

use chrono::Utc;
use intake_core::models::file_info::{base_name, extension_of};
use intake_core::UploadContext;
use rand::distr::Alphanumeric;
use rand::Rng;

const RANDOM_SUFFIX_LEN: usize = 8;
const MAX_BASE_LEN: usize = 50;

/// Collision-resistant storage name: `{millis}_{random}_{base}.{ext}`.
///
/// The base is the sanitized original name without its extension, cut to 50
/// characters. Names without an extension get no trailing dot.
pub fn unique_file_name(original_name: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(char::from)
        .collect();

    let base = sanitized_base(original_name);
    let extension = extension_of(original_name);

    if extension.is_empty() {
        format!("{}_{}_{}", millis, suffix, base)
    } else {
        format!("{}_{}_{}.{}", millis, suffix, base, extension)
    }
}

/// Folder for an upload: per assignment, else per submission, else general.
pub fn folder_for(root: &str, context: &UploadContext) -> String {
    let leaf = if let Some(id) = non_blank(&context.assignment_id) {
        format!("assignments/{}", sanitize_segment(id))
    } else if let Some(id) = non_blank(&context.submission_id) {
        format!("submissions/{}", sanitize_segment(id))
    } else {
        "general".to_string()
    };

    let root = root.trim_matches('/');
    if root.is_empty() {
        leaf
    } else {
        format!("{}/{}", root, leaf)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn sanitized_base(original_name: &str) -> String {
    let file_name = base_name(original_name);
    let stem = match file_name.rfind('.') {
        Some(idx) => &file_name[..idx],
        None => file_name,
    };

    let base: String = sanitize_segment(stem).chars().take(MAX_BASE_LEN).collect();
    if base.trim_matches('_').is_empty() {
        "file".to_string()
    } else {
        base
    }
}

fn sanitize_segment(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
