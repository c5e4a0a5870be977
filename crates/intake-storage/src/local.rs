use crate::keys::{build_object_key, encode_key_for_url, format_of, validate_key};
use crate::traits::{BlobStore, StorageError, StorageResult, StoredObject};
use async_trait::async_trait;
use bytes::Bytes;
use intake_core::{ResourceType, StorageBackend, TransformOptions};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem blob store
///
/// Objects live under `base_path` and are served from `base_url`. Derivative
/// URLs point at `transform_base_url` when one is configured, otherwise at
/// `base_url`, and rely on the serving layer to apply the operations.
#[derive(Clone)]
pub struct LocalBlobStore {
    base_path: PathBuf,
    base_url: String,
    transform_base_url: Option<String>,
}

impl LocalBlobStore {
    /// Create a new LocalBlobStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/intake/files")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:8080/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalBlobStore {
            base_path,
            base_url,
            transform_base_url: None,
        })
    }

    pub fn with_transform_base_url(mut self, transform_base_url: Option<String>) -> Self {
        self.transform_base_url = transform_base_url;
        self
    }

    /// Convert an object id to a filesystem path, refusing ids that could
    /// escape the base directory.
    fn key_to_path(&self, object_id: &str) -> StorageResult<PathBuf> {
        validate_key(object_id)?;

        let path = self.base_path.join(object_id);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        // Existing files may be symlinks; make sure they resolve inside the root
        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    fn generate_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            encode_key_for_url(key)
        )
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(
        &self,
        data: Bytes,
        folder: &str,
        object_name: &str,
        resource_type: ResourceType,
    ) -> StorageResult<StoredObject> {
        let key = build_object_key(folder, object_name)?;
        let path = self.key_to_path(&key)?;

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        // Report what actually landed on disk
        let bytes = fs::metadata(&path)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .len();

        let url = self.generate_url(&key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            resource_type = %resource_type,
            size_bytes = bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StoredObject {
            object_id: key,
            secure_url: url,
            bytes,
            format: format_of(object_name),
        })
    }

    async fn delete(&self, object_id: &str) -> StorageResult<()> {
        let path = self.key_to_path(object_id)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %object_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, object_id: &str) -> StorageResult<bool> {
        let path = self.key_to_path(object_id)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn transform_url(&self, object_id: &str, options: &TransformOptions) -> StorageResult<String> {
        validate_key(object_id)?;
        let base = self
            .transform_base_url
            .as_deref()
            .unwrap_or(&self.base_url);
        Ok(options.build(base, &encode_key_for_url(object_id)))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
