//! Resolver answers as seen by the CAA evaluator

use super::name::DomainName;
use super::record::CaaRecord;
use serde::{Deserialize, Serialize};

/// DNSSEC trust state of a single lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DnssecState {
    /// The answer was cryptographically validated
    Validated,
    /// Validation was required and did not succeed (bogus, expired, missing)
    Failed,
    /// The zone is unsigned or validation is disabled
    #[default]
    NotApplicable,
}

impl DnssecState {
    pub fn is_failed(&self) -> bool {
        matches!(self, DnssecState::Failed)
    }
}

/// Answer for one name
///
/// When `alias_target` is set (CNAME, or a DNAME-synthesised alias) the
/// evaluator continues at the target and ignores `records`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaaLookup {
    pub records: Vec<CaaRecord>,
    pub alias_target: Option<DomainName>,
    pub dnssec: DnssecState,
}

impl CaaLookup {
    /// No records and no alias at this name
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<CaaRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn alias(target: DomainName) -> Self {
        Self {
            alias_target: Some(target),
            ..Self::default()
        }
    }

    pub fn with_dnssec(mut self, dnssec: DnssecState) -> Self {
        self.dnssec = dnssec;
        self
    }
}
