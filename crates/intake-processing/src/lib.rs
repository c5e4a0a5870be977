//! Intake Processing Library
//!
//! Everything that looks at a file before it is stored: magic-byte sniffing,
//! filename screening, size and format gates, content-type consistency and a
//! signature/heuristic threat pre-filter. [`FileValidator`] composes them into
//! one verdict per file.
//!
//! The threat checks here are a pre-filter. They catch obviously dangerous
//! uploads and are not a substitute for an antivirus engine.

pub mod content_type;
pub mod gate;
pub mod names;
pub mod report;
pub mod scanner;
pub mod sniffer;
pub mod threats;
pub mod validator;

pub use content_type::{check_content_type, expected_types};
pub use names::{NameInspector, NameReport};
pub use report::CheckReport;
pub use scanner::{FileScanner, HeuristicScanner, HEURISTIC_ENGINE};
pub use sniffer::detect_type;
pub use threats::ContentThreatScanner;
pub use validator::{describe_file, FileValidator};
