//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod caa;
mod logging;
mod orchestration;
mod output;
mod perspectives;

pub use caa::FileCaaConfig;
pub use logging::FileLoggingConfig;
pub use orchestration::FileOrchestrationConfig;
pub use output::FileOutputConfig;
pub use perspectives::{FilePerspectiveConfig, default_perspectives};

use mpic_application::OrchestratorConfig;
use mpic_domain::config::has_errors;
use mpic_domain::{ConfigIssue, Perspective};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration load or validation failure
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Quorum policy, deadlines and retry limits
    pub orchestration: FileOrchestrationConfig,
    /// CAA evaluation and resolver settings
    pub caa: FileCaaConfig,
    /// Perspective pool
    pub perspectives: Vec<FilePerspectiveConfig>,
    /// Diagnostic and audit log destinations
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            orchestration: FileOrchestrationConfig::default(),
            caa: FileCaaConfig::default(),
            perspectives: default_perspectives(),
            logging: FileLoggingConfig::default(),
            output: FileOutputConfig::default(),
        }
    }
}

impl FileConfig {
    /// Perspectives that parsed cleanly, in configuration order
    pub fn parsed_perspectives(&self) -> Vec<Perspective> {
        self.perspectives
            .iter()
            .filter_map(|p| p.to_perspective().ok())
            .collect()
    }

    /// Build the orchestrator configuration
    pub fn to_orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::new(self.parsed_perspectives())
            .with_quorum_rule(self.orchestration.parse_quorum_rule().0)
            .with_default_perspective_count(self.orchestration.default_perspective_count)
            .with_perspective_timeout(self.orchestration.perspective_timeout())
            .with_max_attempts_limit(self.orchestration.max_attempts_limit)
            .with_early_termination(self.orchestration.early_termination)
            .with_max_alias_hops(self.caa.max_alias_hops)
            .with_default_caa_domains(self.caa.default_caa_domains.clone())
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Section-level values (rule syntax, zero timeouts)
    /// 2. Perspective entries (RIR names, nameserver addresses)
    /// 3. The resulting deployment (pool size, duplicates, RIR diversity)
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.orchestration.validate());
        issues.extend(self.caa.validate());

        for perspective in &self.perspectives {
            if let Err(issue) = perspective.to_perspective() {
                issues.push(issue);
            }
            issues.extend(perspective.parse_nameservers().1);
        }

        issues.extend(self.to_orchestrator_config().validate());
        issues
    }

    /// Validate and fail on any error-severity issue
    ///
    /// Returns the warnings when the configuration is usable.
    pub fn ensure_valid(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let issues = self.validate();
        if has_errors(&issues) {
            return Err(ConfigValidationError::Invalid(
                issues.into_iter().map(|i| i.message).collect(),
            ));
        }
        Ok(issues)
    }
}
