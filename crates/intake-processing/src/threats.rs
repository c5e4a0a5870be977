//! Signature and content heuristics over raw file bytes.
//!
//! This is a pre-filter for obviously dangerous uploads. It does not attempt
//! the coverage of an antivirus engine.

use std::collections::HashSet;
use std::sync::LazyLock;

use intake_core::{FileInfo, ThreatInfo, ThreatSeverity, ThreatType};
use regex::Regex;
use url::{Host, Url};

/// How much of the file the text heuristics look at.
pub const HEURISTIC_PREFIX_BYTES: usize = 8 * 1024;

const EICAR_SIGNATURE: &[u8] =
    br"X5O!P%@AP[4\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*";

/// Byte signatures; `anchored` ones must appear at offset 0.
struct Signature {
    name: &'static str,
    bytes: &'static [u8],
    anchored: bool,
    description: &'static str,
}

const SIGNATURES: &[Signature] = &[
    Signature {
        name: "EICAR-Test-Signature",
        bytes: EICAR_SIGNATURE,
        anchored: false,
        description: "EICAR antivirus test file",
    },
    Signature {
        name: "PE-Executable-Header",
        bytes: b"MZ",
        anchored: true,
        description: "Windows executable header at start of file",
    },
    Signature {
        name: "ELF-Executable-Header",
        bytes: b"\x7fELF",
        anchored: true,
        description: "ELF executable header at start of file",
    },
];

static ACTIVE_CONTENT: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)<script", "<script"),
        (r"(?i)javascript:", "javascript:"),
        (r"(?i)vbscript:", "vbscript:"),
        (r"(?i)\bon\w+\s*=", "inline event handler"),
        (r"(?i)eval\(", "eval("),
        (r"(?i)document\.write", "document.write"),
    ]
    .into_iter()
    .map(|(pattern, label)| {
        (
            Regex::new(pattern).expect("active content pattern is valid"),
            label,
        )
    })
    .collect()
});

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://[^\s"'<>()\[\]{}]+"#).expect("url pattern is valid")
});

const SHORTENER_DOMAINS: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "goo.gl",
    "t.co",
    "ow.ly",
    "is.gd",
    "buff.ly",
    "rebrand.ly",
    "cutt.ly",
    "shorturl.at",
];

const DISPOSABLE_DOMAINS: &[&str] = &[
    "mailinator.com",
    "guerrillamail.com",
    "10minutemail.com",
    "tempmail.com",
    "temp-mail.org",
    "throwawaymail.com",
    "yopmail.com",
    "trashmail.com",
];

const SUSPICIOUS_URL_WORDS: &[&str] = &["phishing", "malware", "virus"];

/// Labels at least this long, made only of letters and digits, look generated.
const RANDOM_LABEL_MIN_LEN: usize = 20;

/// Signature and heuristic scanner over in-memory content.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentThreatScanner;

impl ContentThreatScanner {
    pub fn new() -> Self {
        Self
    }

    /// Signature pass followed by the content heuristics pass.
    pub fn scan(&self, bytes: &[u8], info: &FileInfo) -> Vec<ThreatInfo> {
        let mut threats = self.scan_signatures(bytes);
        threats.extend(self.scan_heuristics(bytes));

        if !threats.is_empty() {
            tracing::debug!(
                file_name = %info.name,
                threat_count = threats.len(),
                "Content threat scan found threats"
            );
        }

        threats
    }

    /// One HIGH severity VIRUS threat per matching signature.
    pub fn scan_signatures(&self, bytes: &[u8]) -> Vec<ThreatInfo> {
        SIGNATURES
            .iter()
            .filter(|sig| {
                if sig.anchored {
                    bytes.starts_with(sig.bytes)
                } else {
                    contains_subslice(bytes, sig.bytes)
                }
            })
            .map(|sig| {
                ThreatInfo::new(
                    ThreatType::Virus,
                    sig.name,
                    ThreatSeverity::High,
                    sig.description,
                )
            })
            .collect()
    }

    /// Active content and suspicious URLs in the leading text of the file.
    pub fn scan_heuristics(&self, bytes: &[u8]) -> Vec<ThreatInfo> {
        let prefix = &bytes[..bytes.len().min(HEURISTIC_PREFIX_BYTES)];
        let text = String::from_utf8_lossy(prefix);

        let mut threats = Vec::new();

        // First hit only
        if let Some((_, label)) = ACTIVE_CONTENT.iter().find(|(re, _)| re.is_match(&text)) {
            threats.push(ThreatInfo::new(
                ThreatType::SuspiciousContent,
                "Embedded-Active-Content",
                ThreatSeverity::Medium,
                format!("File contains embedded active content ({})", label),
            ));
        }

        let mut seen = HashSet::new();
        for url in URL_PATTERN.find_iter(&text).map(|m| m.as_str()) {
            if !seen.insert(url) {
                continue;
            }
            if let Some(reason) = suspicious_url_reason(url) {
                threats.push(ThreatInfo::new(
                    ThreatType::Phishing,
                    "Suspicious-URL",
                    ThreatSeverity::Medium,
                    format!("Suspicious URL {} ({})", url, reason),
                ));
            }
        }

        threats
    }
}

/// Why `url` looks like phishing, if it does.
///
/// Hosts are normalised by the URL parser, so decimal, hex and dotted IPv4
/// forms all count as IP literals.
fn suspicious_url_reason(url: &str) -> Option<&'static str> {
    if let Ok(parsed) = Url::parse(url) {
        match parsed.host() {
            Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => return Some("IP address host"),
            Some(Host::Domain(domain)) => {
                let host = domain.to_lowercase();
                if SHORTENER_DOMAINS.iter().any(|d| domain_matches(&host, d)) {
                    return Some("URL shortener");
                }
                if DISPOSABLE_DOMAINS.iter().any(|d| domain_matches(&host, d)) {
                    return Some("disposable email domain");
                }
                if has_random_subdomain(&host) {
                    return Some("random-looking subdomain");
                }
            }
            None => {}
        }
    }

    let lower = url.to_lowercase();
    if SUSPICIOUS_URL_WORDS.iter().any(|w| lower.contains(w)) {
        return Some("suspicious keyword");
    }
    None
}

fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Any label other than the last two that is long and purely alphanumeric.
fn has_random_subdomain(host: &str) -> bool {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 3 {
        return false;
    }
    labels[..labels.len() - 2].iter().any(|label| {
        label.len() >= RANDOM_LABEL_MIN_LEN && label.chars().all(|c| c.is_ascii_alphanumeric())
    })
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}
