use crate::keys::{build_object_key, encode_key_for_url, format_of, validate_key};
use crate::traits::{BlobStore, StorageError, StorageResult, StoredObject};
use async_trait::async_trait;
use bytes::Bytes;
use intake_core::{ResourceType, StorageBackend, TransformOptions};
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};

/// S3-compatible blob store
#[derive(Clone)]
pub struct S3BlobStore {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    transform_base_url: Option<String>,
}

impl S3BlobStore {
    /// Create a new S3BlobStore instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Credentials come from the usual AWS_* environment variables
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3BlobStore {
            store,
            bucket,
            region,
            endpoint_url,
            transform_base_url: None,
        })
    }

    /// Image service that renders derivatives of objects in this bucket.
    pub fn with_transform_base_url(mut self, transform_base_url: Option<String>) -> Self {
        self.transform_base_url = transform_base_url;
        self
    }

    /// Public URL for an object.
    ///
    /// AWS: `https://{bucket}.s3.{region}.amazonaws.com/{key}`; custom endpoints
    /// use path-style `{endpoint}/{bucket}/{key}`.
    fn generate_url(&self, key: &str) -> String {
        let key = encode_key_for_url(key);
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}

/// Map object_store failures onto the categories the upload pipeline cares about.
fn map_object_store_error(err: ObjectStoreError, key: &str) -> StorageError {
    match err {
        ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
        ObjectStoreError::Unauthenticated { .. } | ObjectStoreError::PermissionDenied { .. } => {
            StorageError::Unauthorized(err.to_string())
        }
        other => StorageError::BackendError(other.to_string()),
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn upload(
        &self,
        data: Bytes,
        folder: &str,
        object_name: &str,
        resource_type: ResourceType,
    ) -> StorageResult<StoredObject> {
        let key = build_object_key(folder, object_name)?;
        let size = data.len() as u64;
        let location = Path::from(key.clone());

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store
            .put(&location, PutPayload::from(data))
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            match map_object_store_error(e, &key) {
                StorageError::BackendError(msg) => StorageError::UploadFailed(msg),
                other => other,
            }
        })?;

        // The head request gives the size as the bucket sees it
        let bytes = match self.store.head(&location).await {
            Ok(meta) => meta.size,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "S3 head after upload failed, using payload size"
                );
                size
            }
        };

        let url = self.generate_url(&key);

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            resource_type = %resource_type,
            size_bytes = bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(StoredObject {
            object_id: key,
            secure_url: url,
            bytes,
            format: format_of(object_name),
        })
    }

    async fn delete(&self, object_id: &str) -> StorageResult<()> {
        validate_key(object_id)?;
        let start = std::time::Instant::now();
        let location = Path::from(object_id.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %object_id,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                return Err(match map_object_store_error(e, object_id) {
                    StorageError::BackendError(msg) => StorageError::DeleteFailed(msg),
                    other => other,
                });
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %object_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn exists(&self, object_id: &str) -> StorageResult<bool> {
        validate_key(object_id)?;
        let location = Path::from(object_id.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(map_object_store_error(e, object_id)),
        }
    }

    fn transform_url(&self, object_id: &str, options: &TransformOptions) -> StorageResult<String> {
        validate_key(object_id)?;
        let base = self.transform_base_url.as_deref().ok_or_else(|| {
            StorageError::Unsupported(
                "S3 derivatives need TRANSFORM_BASE_URL to be configured".to_string(),
            )
        })?;
        Ok(options.build(base, &encode_key_for_url(object_id)))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
