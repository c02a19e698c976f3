//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for daily-rolling diagnostic log files
    pub log_dir: Option<String>,
    /// JSONL audit trail path
    pub audit_log: Option<String>,
}
