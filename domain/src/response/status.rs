//! Per-perspective status classification

use serde::{Deserialize, Serialize};

/// Why a perspective passed or failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckStatus {
    /// The check ran and the answer was "authorised"
    Success,
    /// A DNS lookup failed (timeout, SERVFAIL, REFUSED, unreachable, alias loop)
    DnsLookupFailure,
    /// DNSSEC validation failed somewhere on the resolution path
    DnssecFailure,
    /// The perspective did not answer within its deadline
    Timeout,
    /// The check ran and the answer was "not authorised"
    PolicyReject,
    /// The check could not run (panic, missing resolver, validator error)
    Error,
    /// Never dispatched or cancelled once the quorum outcome was decided
    NotEvaluated,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Success => "success",
            CheckStatus::DnsLookupFailure => "dns-lookup-failure",
            CheckStatus::DnssecFailure => "dnssec-failure",
            CheckStatus::Timeout => "timeout",
            CheckStatus::PolicyReject => "policy-reject",
            CheckStatus::Error => "error",
            CheckStatus::NotEvaluated => "not-evaluated",
        }
    }

    /// Failures of the environment rather than a policy answer
    pub fn is_failure(&self) -> bool {
        !matches!(self, CheckStatus::Success | CheckStatus::PolicyReject)
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_matches_as_str() {
        for status in [
            CheckStatus::Success,
            CheckStatus::DnsLookupFailure,
            CheckStatus::DnssecFailure,
            CheckStatus::Timeout,
            CheckStatus::PolicyReject,
            CheckStatus::Error,
            CheckStatus::NotEvaluated,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_is_failure() {
        assert!(!CheckStatus::Success.is_failure());
        assert!(!CheckStatus::PolicyReject.is_failure());
        assert!(CheckStatus::Timeout.is_failure());
    }
}
