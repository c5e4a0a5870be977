//! Configuration module
//!
//! Settings for the blob store, the upload pipeline and the optional ClamAV
//! scanner. Everything is read from the environment (with `.env` support) and
//! checked by [`Config::validate`] before use.

use std::env;
use std::time::Duration;

use crate::constants::DEFAULT_MAX_FILES;
use crate::storage_types::StorageBackend;

const STORAGE_TIMEOUT_SECS: u64 = 30;
const STORAGE_FOLDER_ROOT: &str = "lms";
const PREVIEW_WIDTH: u32 = 800;
const PREVIEW_HEIGHT: u32 = 600;
const THUMBNAIL_SIZE: u32 = 200;
const CLAMAV_PORT: u16 = 3310;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    environment: String,
    // Storage configuration
    storage_backend: StorageBackend,
    local_storage_path: Option<String>,
    local_storage_base_url: Option<String>,
    s3_bucket: Option<String>,
    s3_region: Option<String>,
    s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    aws_region: Option<String>,
    transform_base_url: Option<String>,
    storage_folder_root: String,
    storage_timeout_secs: u64,
    // Upload pipeline
    max_files_per_batch: usize,
    preview_width: u32,
    preview_height: u32,
    thumbnail_size: u32,
    // ClamAV configuration
    clamav_enabled: bool,
    clamav_host: String,
    clamav_port: u16,
    clamav_fail_closed: bool,
}

impl Config {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source and validate the result.
    /// `from_env` is a thin wrapper.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());
        let is_production = is_production_env(&environment);

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(s) => s.parse::<StorageBackend>()?,
            None => StorageBackend::Local,
        };

        let config = Config {
            environment,
            storage_backend,
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL"),
            s3_bucket: lookup("S3_BUCKET"),
            s3_region: lookup("S3_REGION"),
            s3_endpoint: lookup("S3_ENDPOINT"),
            aws_region: lookup("AWS_REGION"),
            transform_base_url: lookup("TRANSFORM_BASE_URL"),
            storage_folder_root: lookup("STORAGE_FOLDER_ROOT")
                .map(|s| s.trim().trim_matches('/').to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| STORAGE_FOLDER_ROOT.to_string()),
            storage_timeout_secs: lookup("STORAGE_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(STORAGE_TIMEOUT_SECS),
            max_files_per_batch: lookup("MAX_FILES_PER_BATCH")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_FILES),
            preview_width: lookup("PREVIEW_WIDTH")
                .and_then(|s| s.parse().ok())
                .unwrap_or(PREVIEW_WIDTH),
            preview_height: lookup("PREVIEW_HEIGHT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(PREVIEW_HEIGHT),
            thumbnail_size: lookup("THUMBNAIL_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(THUMBNAIL_SIZE),
            clamav_enabled: parse_bool(lookup("CLAMAV_ENABLED"), false),
            clamav_host: lookup("CLAMAV_HOST").unwrap_or_else(|| "localhost".to_string()),
            clamav_port: lookup("CLAMAV_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CLAMAV_PORT),
            clamav_fail_closed: parse_bool(lookup("CLAMAV_FAIL_CLOSED"), is_production),
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "STORAGE_TIMEOUT_SECS must be greater than zero"
            ));
        }

        if self.max_files_per_batch == 0 {
            return Err(anyhow::anyhow!(
                "MAX_FILES_PER_BATCH must be greater than zero"
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.environment)
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage_backend
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.local_storage_base_url.as_deref()
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.s3_bucket.as_deref()
    }

    /// `S3_REGION`, falling back to `AWS_REGION`.
    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn transform_base_url(&self) -> Option<&str> {
        self.transform_base_url.as_deref()
    }

    pub fn storage_folder_root(&self) -> &str {
        &self.storage_folder_root
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage_timeout_secs)
    }

    pub fn max_files_per_batch(&self) -> usize {
        self.max_files_per_batch
    }

    pub fn preview_width(&self) -> u32 {
        self.preview_width
    }

    pub fn preview_height(&self) -> u32 {
        self.preview_height
    }

    pub fn thumbnail_size(&self) -> u32 {
        self.thumbnail_size
    }

    pub fn clamav_enabled(&self) -> bool {
        self.clamav_enabled
    }

    pub fn clamav_host(&self) -> &str {
        &self.clamav_host
    }

    pub fn clamav_port(&self) -> u16 {
        self.clamav_port
    }

    pub fn clamav_fail_closed(&self) -> bool {
        self.clamav_fail_closed
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    value
        .and_then(|s| s.trim().to_lowercase().parse().ok())
        .unwrap_or(default)
}
