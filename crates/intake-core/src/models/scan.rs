use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatType {
    Virus,
    Malware,
    Trojan,
    SuspiciousContent,
    Phishing,
}

/// Ordinal severity. Used for sorting and display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatInfo {
    #[serde(rename = "type")]
    pub threat_type: ThreatType,
    pub name: String,
    pub severity: ThreatSeverity,
    pub description: String,
}

impl ThreatInfo {
    pub fn new(
        threat_type: ThreatType,
        name: impl Into<String>,
        severity: ThreatSeverity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            threat_type,
            name: name.into(),
            severity,
            description: description.into(),
        }
    }
}

/// Outcome of one scan pass.
///
/// `scan_engine` names the scanning tier that produced the result, for example
/// `heuristic-prefilter/1`. A clean result only means that tier found nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub is_clean: bool,
    pub threats: Vec<ThreatInfo>,
    pub scanned_at: DateTime<Utc>,
    pub scan_duration_ms: u64,
    pub scan_engine: String,
}

impl ScanResult {
    /// Build a result; cleanliness is derived from `threats` alone.
    pub fn new(
        threats: Vec<ThreatInfo>,
        scanned_at: DateTime<Utc>,
        scan_duration_ms: u64,
        scan_engine: impl Into<String>,
    ) -> Self {
        Self {
            is_clean: threats.is_empty(),
            threats,
            scanned_at,
            scan_duration_ms,
            scan_engine: scan_engine.into(),
        }
    }

    /// Threat names joined with `", "`.
    pub fn threat_names(&self) -> String {
        self.threats
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn max_severity(&self) -> Option<ThreatSeverity> {
        self.threats.iter().map(|t| t.severity).max()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Clean,
    Infected,
}
