use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scan::{ScanResult, ScanStatus};

/// Record of a stored upload. `object_id` is the only key needed to delete it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub id: Uuid,
    pub original_name: String,
    /// Generated storage-safe unique name.
    pub file_name: String,
    pub extension: String,
    /// Byte count reported by the blob store.
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    pub url: String,
    pub object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub scan_status: ScanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_result: Option<ScanResult>,
}

/// Where an upload belongs. Drives the storage folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadContext {
    pub assignment_id: Option<String>,
    pub submission_id: Option<String>,
    /// Content type the client claimed for the file, if any.
    pub declared_content_type: Option<String>,
}

impl UploadContext {
    pub fn for_assignment(assignment_id: impl Into<String>) -> Self {
        Self {
            assignment_id: Some(assignment_id.into()),
            ..Default::default()
        }
    }

    pub fn for_submission(submission_id: impl Into<String>) -> Self {
        Self {
            submission_id: Some(submission_id.into()),
            ..Default::default()
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.declared_content_type = Some(content_type.into());
        self
    }
}
