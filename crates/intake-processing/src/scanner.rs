//! Scanners run against an upload after it has been stored.

use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use intake_core::{FileInfo, ScanResult};

use crate::sniffer::detect_type;
use crate::threats::ContentThreatScanner;

/// Engine identifier reported by [`HeuristicScanner`].
pub const HEURISTIC_ENGINE: &str = "heuristic-prefilter/1";

/// Post-store scan of an uploaded file.
///
/// Implementations report what their own tier found; `scan_engine` on the
/// result names the tier that actually ran. An `Err` means the scan could not
/// be completed. `data` is a shared handle so implementations can move it onto
/// the blocking pool without copying.
#[async_trait]
pub trait FileScanner: Send + Sync {
    async fn scan_file(&self, data: Bytes, file_name: &str) -> anyhow::Result<ScanResult>;

    /// Identifier written to `ScanResult::scan_engine`.
    fn engine(&self) -> &str;
}

/// Signature and content heuristics pre-filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScanner {
    threats: ContentThreatScanner,
}

impl HeuristicScanner {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileScanner for HeuristicScanner {
    async fn scan_file(&self, data: Bytes, file_name: &str) -> anyhow::Result<ScanResult> {
        let start = Instant::now();
        let threats = self.threats;
        let name = file_name.to_string();

        // Signature search covers the whole buffer
        let threats = tokio::task::spawn_blocking(move || {
            let info = FileInfo::new(name, data.len() as u64, "", detect_type(&data));
            threats.scan(&data, &info)
        })
        .await?;

        let result = ScanResult::new(
            threats,
            Utc::now(),
            start.elapsed().as_millis() as u64,
            HEURISTIC_ENGINE,
        );

        tracing::debug!(
            file_name = %file_name,
            is_clean = result.is_clean,
            duration_ms = result.scan_duration_ms,
            engine = HEURISTIC_ENGINE,
            "Heuristic scan completed"
        );

        Ok(result)
    }

    fn engine(&self) -> &str {
        HEURISTIC_ENGINE
    }
}
