//! Orchestration configuration from TOML (`[orchestration]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [orchestration]
//! quorum_rule = "baseline"        # or "majority", "unanimous", "atleast:2", "75%"
//! default_perspective_count = 3
//! perspective_timeout_ms = 10000
//! max_attempts_limit = 3
//! early_termination = false
//! ```

use mpic_domain::{ConfigIssue, ConfigIssueCode, QuorumRule};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw orchestration configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestrationConfig {
    /// Minimum-quorum rule
    pub quorum_rule: String,
    /// Perspective count used when a request names none
    pub default_perspective_count: usize,
    /// Per-perspective deadline in milliseconds
    pub perspective_timeout_ms: u64,
    /// Highest `max_attempts` a request may ask for
    pub max_attempts_limit: usize,
    /// Stop waiting once the quorum outcome is decided
    pub early_termination: bool,
}

impl Default for FileOrchestrationConfig {
    fn default() -> Self {
        Self {
            quorum_rule: "baseline".to_string(),
            default_perspective_count: 3,
            perspective_timeout_ms: 10_000,
            max_attempts_limit: 3,
            early_termination: false,
        }
    }
}

impl FileOrchestrationConfig {
    /// Parse the rule string, falling back to the default rule on error
    pub fn parse_quorum_rule(&self) -> (QuorumRule, Vec<ConfigIssue>) {
        match self.quorum_rule.parse() {
            Ok(rule) => (rule, Vec::new()),
            Err(e) => (
                QuorumRule::default(),
                vec![ConfigIssue::error(
                    ConfigIssueCode::InvalidValue,
                    format!("orchestration.quorum_rule: {}", e),
                )],
            ),
        }
    }

    pub fn perspective_timeout(&self) -> Duration {
        Duration::from_millis(self.perspective_timeout_ms)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_quorum_rule().1;
        if self.perspective_timeout_ms == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "orchestration.perspective_timeout_ms cannot be 0",
            ));
        }
        issues
    }
}
