//! Deployment configuration validation
//!
//! Checks the perspective pool and policy limits a deployment is started
//! with. Request validation lives in [`crate::request::validation`]; this
//! module covers what an operator configured.
//!
//! # Examples
//!
//! ```
//! use mpic_domain::{Perspective, QuorumRule, Rir};
//! use mpic_domain::config::{has_errors, validate_deployment};
//! use mpic_domain::request::ValidationPolicy;
//!
//! let pool = vec![
//!     Perspective::new("us-east-1", Rir::Arin),
//!     Perspective::new("eu-west-1", Rir::Ripe),
//!     Perspective::new("ap-south-1", Rir::Apnic),
//! ];
//! let policy = ValidationPolicy {
//!     quorum_rule: QuorumRule::BaselineRequirements,
//!     available_perspectives: pool.len(),
//!     default_perspective_count: 3,
//!     max_attempts_limit: 3,
//!     default_caa_domains: vec![],
//! };
//! assert!(!has_errors(&validate_deployment(&pool, &policy)));
//! ```

use crate::perspective::{Perspective, rir_count};
use crate::request::ValidationPolicy;
use crate::request::validation::MIN_PERSPECTIVE_COUNT;
use std::collections::HashSet;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the deployment cannot serve requests.
    Error,
    /// Non-fatal: requests are served but corroboration is weaker than expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// Fewer perspectives than any request needs.
    PoolTooSmall,
    /// Two perspectives share a code.
    DuplicatePerspective,
    /// Every perspective sits in one RIR.
    SingleRir,
    /// Default perspective count falls outside the pool.
    DefaultCountOutOfRange,
    /// The quorum rule admits no quorum at the default count.
    UnsatisfiableQuorumRule,
    /// `max_attempts_limit` is zero.
    NoAttemptsAllowed,
    /// No default CAA identities; every CAA request must name its own.
    NoDefaultCaaDomains,
    /// A configured value could not be parsed.
    InvalidValue,
    /// A deadline is zero.
    ZeroTimeout,
    /// DNSSEC failures are only caught when the upstream resolver validates.
    DnssecNotValidated,
}

/// A detected issue in the deployment configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }
}

/// Validate a perspective pool against the policy it will serve
pub fn validate_deployment(pool: &[Perspective], policy: &ValidationPolicy) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if pool.len() < MIN_PERSPECTIVE_COUNT {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::PoolTooSmall,
            format!(
                "{} perspective(s) configured; at least {} are required",
                pool.len(),
                MIN_PERSPECTIVE_COUNT
            ),
        ));
    }

    let mut seen = HashSet::new();
    for perspective in pool {
        if !seen.insert(perspective.code.as_str()) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::DuplicatePerspective,
                format!("perspective '{}' is configured more than once", perspective.code),
            ));
        }
    }

    if pool.len() >= MIN_PERSPECTIVE_COUNT && rir_count(pool) < 2 {
        issues.push(ConfigIssue::warning(
            ConfigIssueCode::SingleRir,
            "all perspectives belong to one RIR; cohorts cannot be network-diverse",
        ));
    }

    let default_count = policy.default_perspective_count;
    if !(MIN_PERSPECTIVE_COUNT..=pool.len()).contains(&default_count) {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::DefaultCountOutOfRange,
            format!(
                "default_perspective_count {} must be between {} and {}",
                default_count,
                MIN_PERSPECTIVE_COUNT,
                pool.len()
            ),
        ));
    } else if policy.quorum_rule.default_quorum(default_count).is_none() {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::UnsatisfiableQuorumRule,
            format!(
                "quorum rule {} admits no quorum for {} perspectives",
                policy.quorum_rule, default_count
            ),
        ));
    }

    if policy.max_attempts_limit == 0 {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::NoAttemptsAllowed,
            "max_attempts_limit must be at least 1",
        ));
    }

    if policy.default_caa_domains.is_empty() {
        issues.push(ConfigIssue::warning(
            ConfigIssueCode::NoDefaultCaaDomains,
            "no default caa_domains; CAA requests must name their own",
        ));
    }

    issues
}

/// Whether any issue is fatal
pub fn has_errors(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}
