//! Test doubles for the upload pipeline.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use intake_core::{
    ResourceType, ScanResult, StorageBackend, ThreatInfo, ThreatSeverity, ThreatType,
    TransformOptions,
};
use intake_processing::FileScanner;
use intake_storage::{BlobStore, StorageError, StorageResult, StoredObject};

pub const CDN: &str = "https://cdn.test";

/// PDF header followed by enough body to look like a document.
pub fn pdf_bytes() -> Vec<u8> {
    b"%PDF-1.7\n1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n%%EOF".to_vec()
}

pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0u8; 32]);
    bytes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFailure {
    Backend,
    Unauthorized,
}

/// In-memory blob store that records every call.
#[derive(Default)]
pub struct RecordingBlobStore {
    objects: Mutex<HashMap<String, Bytes>>,
    deleted: Mutex<Vec<String>>,
    upload_delay: Option<Duration>,
    upload_failure: Option<StoreFailure>,
    transforms_supported: bool,
}

impl RecordingBlobStore {
    pub fn new() -> Self {
        Self {
            transforms_supported: true,
            ..Default::default()
        }
    }

    pub fn without_transforms(mut self) -> Self {
        self.transforms_supported = false;
        self
    }

    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = Some(delay);
        self
    }

    pub fn failing_uploads(mut self, failure: StoreFailure) -> Self {
        self.upload_failure = Some(failure);
        self
    }

    pub fn contains(&self, object_id: &str) -> bool {
        self.objects.lock().unwrap().contains_key(object_id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn object_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.objects.lock().unwrap().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn stored_bytes(&self, object_id: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(object_id).cloned()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn upload(
        &self,
        data: Bytes,
        folder: &str,
        object_name: &str,
        _resource_type: ResourceType,
    ) -> StorageResult<StoredObject> {
        if let Some(delay) = self.upload_delay {
            tokio::time::sleep(delay).await;
        }
        match self.upload_failure {
            Some(StoreFailure::Backend) => {
                return Err(StorageError::BackendError("bucket unavailable".into()))
            }
            Some(StoreFailure::Unauthorized) => {
                return Err(StorageError::Unauthorized("bad credentials".into()))
            }
            None => {}
        }

        let object_id = format!("{}/{}", folder, object_name);
        let bytes = data.len() as u64;
        self.objects.lock().unwrap().insert(object_id.clone(), data);

        Ok(StoredObject {
            secure_url: format!("{}/{}", CDN, object_id),
            object_id,
            bytes,
            format: intake_storage::keys::format_of(object_name),
        })
    }

    async fn delete(&self, object_id: &str) -> StorageResult<()> {
        self.deleted.lock().unwrap().push(object_id.to_string());
        self.objects.lock().unwrap().remove(object_id);
        Ok(())
    }

    async fn exists(&self, object_id: &str) -> StorageResult<bool> {
        Ok(self.contains(object_id))
    }

    fn transform_url(&self, object_id: &str, options: &TransformOptions) -> StorageResult<String> {
        if !self.transforms_supported {
            return Err(StorageError::Unsupported("no transform service".into()));
        }
        Ok(options.build(CDN, object_id))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[derive(Debug, Clone)]
pub enum Script {
    Clean,
    Infected(&'static str),
    Fail,
}

/// Scanner that answers with a fixed verdict, counts calls and keeps the
/// last buffer it was handed.
pub struct ScriptedScanner {
    script: Script,
    calls: Mutex<usize>,
    last_scanned: Mutex<Option<Bytes>>,
}

impl ScriptedScanner {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(0),
            last_scanned: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn last_scanned(&self) -> Option<Bytes> {
        self.last_scanned.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileScanner for ScriptedScanner {
    async fn scan_file(&self, data: Bytes, _file_name: &str) -> anyhow::Result<ScanResult> {
        *self.calls.lock().unwrap() += 1;
        *self.last_scanned.lock().unwrap() = Some(data);
        let threats = match &self.script {
            Script::Clean => vec![],
            Script::Infected(name) => vec![ThreatInfo::new(
                ThreatType::Malware,
                *name,
                ThreatSeverity::Critical,
                "scripted",
            )],
            Script::Fail => anyhow::bail!("scanner offline"),
        };
        Ok(ScanResult::new(threats, Utc::now(), 1, "scripted"))
    }

    fn engine(&self) -> &str {
        "scripted"
    }
}
