use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use intake_core::{Config, SubmittedFile, ValidationConfig, ValidationProfile};
use intake_processing::{FileScanner, HeuristicScanner};

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Validation settings for a profile, with command line overrides applied.
pub fn validation_config(
    profile: ValidationProfile,
    max_files: Option<usize>,
    lenient_content_type: bool,
) -> ValidationConfig {
    let mut config = profile.config();
    if let Some(max) = max_files {
        config = config.with_max_files(max);
    }
    if lenient_content_type {
        config = config.with_content_type_match(false);
    }
    config
}

/// Post-store scanner for the configured environment.
///
/// ClamAV when it is enabled and compiled in, the heuristic pre-filter otherwise.
pub fn build_scanner(config: &Config) -> Arc<dyn FileScanner> {
    #[cfg(feature = "clamav")]
    if config.clamav_enabled() {
        tracing::info!(
            host = %config.clamav_host(),
            port = config.clamav_port(),
            fail_closed = config.clamav_fail_closed(),
            "Using ClamAV scanner"
        );
        return Arc::new(intake_services::ClamAvScanner::from_config(config));
    }

    if config.clamav_enabled() {
        tracing::warn!("CLAMAV_ENABLED is set but ClamAV support is not compiled in");
    }
    Arc::new(HeuristicScanner::new())
}

pub async fn read_submission(
    path: &Path,
    content_type: Option<&str>,
) -> anyhow::Result<SubmittedFile> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file = SubmittedFile::new(name, data);
    Ok(match content_type {
        Some(ct) => file.with_content_type(ct),
        None => file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_overrides() {
        let config = validation_config(ValidationProfile::Images, Some(3), true);
        assert_eq!(config.max_files, Some(3));
        assert!(!config.require_content_type_match);
        assert!(config.is_allowed("png"));

        let config = validation_config(ValidationProfile::Documents, None, false);
        assert_eq!(config, ValidationConfig::documents());
    }

    #[tokio::test]
    async fn test_read_submission_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        tokio::fs::write(&path, b"%PDF-1.4").await.unwrap();

        let file = read_submission(&path, Some("application/pdf")).await.unwrap();
        assert_eq!(file.name, "notes.pdf");
        assert_eq!(&file.data[..], b"%PDF-1.4");
        assert_eq!(file.declared_content_type.as_deref(), Some("application/pdf"));

        let file = read_submission(&path, None).await.unwrap();
        assert!(file.declared_content_type.is_none());
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let err = read_submission(Path::new("/nonexistent/intake/x.pdf"), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
