//! CAA configuration from TOML (`[caa]` section)

use mpic_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw CAA configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCaaConfig {
    /// CAA identities used when a request names none
    pub default_caa_domains: Vec<String>,
    /// CNAME/DNAME hops followed before giving up
    pub max_alias_hops: usize,
    /// Ask the resolver to validate DNSSEC
    pub dnssec_validation: bool,
    /// Timeout for a single DNS query in milliseconds
    pub resolver_timeout_ms: u64,
}

impl Default for FileCaaConfig {
    fn default() -> Self {
        Self {
            default_caa_domains: Vec::new(),
            max_alias_hops: 8,
            dnssec_validation: false,
            resolver_timeout_ms: 5_000,
        }
    }
}

impl FileCaaConfig {
    pub fn resolver_timeout(&self) -> Duration {
        Duration::from_millis(self.resolver_timeout_ms)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.resolver_timeout_ms == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "caa.resolver_timeout_ms cannot be 0",
            ));
        }
        if self.max_alias_hops == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidValue,
                "caa.max_alias_hops is 0; any CNAME will fail the lookup",
            ));
        }
        if !self.dnssec_validation {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::DnssecNotValidated,
                "caa.dnssec_validation is off; DNSSEC failures are only reported if the perspective's nameservers validate",
            ));
        }
        issues
    }
}
