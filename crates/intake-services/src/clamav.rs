use std::str;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use clamav_client::{clean, Tcp};
use intake_core::{Config, ScanResult, ThreatInfo, ThreatSeverity, ThreatType};
use intake_processing::{FileScanner, HeuristicScanner};

pub const CLAMAV_ENGINE: &str = "clamav";

/// [`FileScanner`] backed by a clamd daemon over TCP.
///
/// With `fail_closed` set, an unreachable daemon, an unparseable reply or a
/// timeout is an error. Otherwise the file goes through the heuristic
/// pre-filter instead and the result names that engine, never ClamAV.
#[derive(Debug, Clone)]
pub struct ClamAvScanner {
    host: String,
    port: u16,
    fail_closed: bool,
    /// Timeout in seconds for each scan operation (default: 30)
    timeout_secs: u64,
}

enum Verdict {
    Clean,
    Infected(String),
    Failed(String),
}

impl ClamAvScanner {
    /// Create a new ClamAvScanner.
    ///
    /// # Arguments
    /// * `host` - ClamAV daemon hostname
    /// * `port` - ClamAV daemon port (typically 3310)
    /// * `fail_closed` - If true, treat scan failures/timeouts as errors; if false, allow (fail-open)
    pub fn new(host: String, port: u16, fail_closed: bool) -> Self {
        Self::with_timeout(host, port, fail_closed, 30)
    }

    /// Create with a custom scan timeout (for large files or slow ClamAV instances).
    pub fn with_timeout(host: String, port: u16, fail_closed: bool, timeout_secs: u64) -> Self {
        Self {
            host,
            port,
            fail_closed,
            timeout_secs,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_timeout(
            config.clamav_host().to_string(),
            config.clamav_port(),
            config.clamav_fail_closed(),
            config.storage_timeout().as_secs().max(1),
        )
    }

    /// Sync client inside spawn_blocking to avoid !Send tokio futures.
    async fn verdict(&self, data: Bytes) -> Verdict {
        let address = format!("{}:{}", self.host, self.port);
        let timeout_secs = self.timeout_secs;

        let result = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            tokio::task::spawn_blocking(move || {
                let connection = Tcp {
                    host_address: address.as_str(),
                };
                let response = match clamav_client::scan_buffer(&data, connection, None)
                {
                    Ok(response) => response,
                    Err(e) => return Verdict::Failed(format!("ClamAV scan error: {}", e)),
                };
                match clean(&response) {
                    Ok(true) => Verdict::Clean,
                    Ok(false) => Verdict::Infected(virus_name(&response)),
                    Err(e) => Verdict::Failed(format!("Failed to parse ClamAV response: {}", e)),
                }
            }),
        )
        .await;

        match result {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => Verdict::Failed(format!("ClamAV scan task join error: {}", e)),
            Err(_) => Verdict::Failed(format!(
                "ClamAV scan timeout (exceeded {} seconds)",
                timeout_secs
            )),
        }
    }
}

/// Signature name from a `stream: Eicar-Signature FOUND` reply.
fn virus_name(response: &[u8]) -> String {
    let reply = str::from_utf8(response).map(str::trim).unwrap_or("");
    if !reply.contains("FOUND") {
        return "unknown".to_string();
    }
    reply
        .split(':')
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or("unknown")
        .to_string()
}

#[async_trait]
impl FileScanner for ClamAvScanner {
    async fn scan_file(&self, data: Bytes, file_name: &str) -> anyhow::Result<ScanResult> {
        let start = Instant::now();
        tracing::debug!(host = %self.host, port = %self.port, file_name = %file_name, "Starting ClamAV scan");

        let threats = match self.verdict(data.clone()).await {
            Verdict::Clean => {
                tracing::info!(
                    duration_ms = start.elapsed().as_millis(),
                    "File scan completed: clean"
                );
                Vec::new()
            }
            Verdict::Infected(name) => {
                tracing::warn!(
                    duration_ms = start.elapsed().as_millis(),
                    virus = %name,
                    file_name = %file_name,
                    "File scan detected virus"
                );
                vec![ThreatInfo::new(
                    ThreatType::Virus,
                    name,
                    ThreatSeverity::Critical,
                    "Reported by ClamAV",
                )]
            }
            Verdict::Failed(message) => {
                tracing::error!(error = %message, "ClamAV scan failed");
                if self.fail_closed {
                    anyhow::bail!(message);
                }
                tracing::warn!(
                    file_name = %file_name,
                    "ClamAV unavailable, falling back to heuristic scan (fail-open)"
                );
                return HeuristicScanner::new().scan_file(data, file_name).await;
            }
        };

        Ok(ScanResult::new(
            threats,
            Utc::now(),
            start.elapsed().as_millis() as u64,
            CLAMAV_ENGINE,
        ))
    }

    fn engine(&self) -> &str {
        CLAMAV_ENGINE
    }
}
