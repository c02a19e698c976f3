//! Orchestrator configuration.
//!
//! [`OrchestratorConfig`] is everything the corroboration use case needs
//! from the deployment: the perspective pool, the quorum policy, deadlines
//! and retry limits. It is passed in at construction so quorum and timeout
//! behaviour can be exercised with fabricated perspectives.

use mpic_domain::config::{ConfigIssue, validate_deployment};
use mpic_domain::{Perspective, QuorumRule, ValidationPolicy};
use std::time::Duration;

/// Deployment-level corroboration settings.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Perspective pool cohorts are drawn from.
    pub perspectives: Vec<Perspective>,
    /// Minimum-quorum policy as a function of perspective count.
    pub quorum_rule: QuorumRule,
    /// Perspective count used when a request names none.
    pub default_perspective_count: usize,
    /// Deadline applied to each perspective independently.
    pub perspective_timeout: Duration,
    /// Upper bound on `max_attempts` a request may ask for.
    pub max_attempts_limit: usize,
    /// Stop waiting once the quorum outcome can no longer change.
    pub early_termination: bool,
    /// CNAME/DNAME hops followed before a lookup is declared failed.
    pub max_alias_hops: usize,
    /// CAA identities used when a request names none.
    pub default_caa_domains: Vec<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            perspectives: Vec::new(),
            quorum_rule: QuorumRule::default(),
            default_perspective_count: 3,
            perspective_timeout: Duration::from_secs(10),
            max_attempts_limit: 3,
            early_termination: false,
            max_alias_hops: 8,
            default_caa_domains: Vec::new(),
        }
    }
}

impl OrchestratorConfig {
    pub fn new(perspectives: Vec<Perspective>) -> Self {
        Self {
            perspectives,
            ..Self::default()
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_quorum_rule(mut self, rule: QuorumRule) -> Self {
        self.quorum_rule = rule;
        self
    }

    pub fn with_default_perspective_count(mut self, count: usize) -> Self {
        self.default_perspective_count = count;
        self
    }

    pub fn with_perspective_timeout(mut self, timeout: Duration) -> Self {
        self.perspective_timeout = timeout;
        self
    }

    pub fn with_max_attempts_limit(mut self, limit: usize) -> Self {
        self.max_attempts_limit = limit;
        self
    }

    pub fn with_early_termination(mut self, enabled: bool) -> Self {
        self.early_termination = enabled;
        self
    }

    pub fn with_max_alias_hops(mut self, hops: usize) -> Self {
        self.max_alias_hops = hops;
        self
    }

    pub fn with_default_caa_domains(mut self, domains: Vec<String>) -> Self {
        self.default_caa_domains = domains;
        self
    }

    // ==================== Validation ====================

    /// Limits requests are validated against.
    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            quorum_rule: self.quorum_rule,
            available_perspectives: self.perspectives.len(),
            default_perspective_count: self.default_perspective_count,
            max_attempts_limit: self.max_attempts_limit,
            default_caa_domains: self.default_caa_domains.clone(),
        }
    }

    /// Validate the deployment this config describes.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        validate_deployment(&self.perspectives, &self.validation_policy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpic_domain::Rir;
    use mpic_domain::config::has_errors;

    fn pool() -> Vec<Perspective> {
        vec![
            Perspective::new("us-east-1", Rir::Arin),
            Perspective::new("eu-west-1", Rir::Ripe),
            Perspective::new("ap-south-1", Rir::Apnic),
        ]
    }

    #[test]
    fn test_default() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.quorum_rule, QuorumRule::BaselineRequirements);
        assert_eq!(config.max_alias_hops, 8);
        assert!(!config.early_termination);
        assert_eq!(config.perspective_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_builder() {
        let config = OrchestratorConfig::new(pool())
            .with_quorum_rule(QuorumRule::Unanimous)
            .with_early_termination(true)
            .with_perspective_timeout(Duration::from_millis(500));

        let policy = config.validation_policy();
        assert_eq!(policy.available_perspectives, 3);
        assert_eq!(policy.quorum_rule, QuorumRule::Unanimous);
        assert!(config.early_termination);
    }

    #[test]
    fn test_validate_empty_pool() {
        assert!(has_errors(&OrchestratorConfig::default().validate()));
        assert!(!has_errors(&OrchestratorConfig::new(pool()).validate()));
    }
}
