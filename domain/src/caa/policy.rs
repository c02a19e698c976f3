//! CAA record-set evaluation
//!
//! Applies issuance policy to the governing record set, i.e. the first
//! non-empty set found while climbing from the target towards the root.

use super::record::{CaaProperty, CaaRecord};
use crate::check::CertificateType;
use serde::{Deserialize, Serialize};

/// Why the governing record set permitted issuance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum PermitReason {
    /// No CAA records anywhere on the climbed chain
    NoRecords,
    /// Records exist but none apply to this certificate type
    NoApplicableProperty,
    /// An applicable record names an acceptable issuer
    Authorized { issuer: String },
}

/// Why the governing record set refused issuance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum RejectReason {
    /// A critical property this evaluator cannot interpret
    UnknownCriticalProperty { tag: String },
    /// Applicable records exist but none name an acceptable issuer
    NotAuthorized,
}

/// Policy decision for one record set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Permit(PermitReason),
    Reject(RejectReason),
}

impl PolicyDecision {
    pub fn is_permit(&self) -> bool {
        matches!(self, PolicyDecision::Permit(_))
    }

    pub fn describe(&self) -> String {
        match self {
            PolicyDecision::Permit(PermitReason::NoRecords) => {
                "no CAA records found; issuance permitted".to_string()
            }
            PolicyDecision::Permit(PermitReason::NoApplicableProperty) => {
                "no applicable CAA property; issuance permitted".to_string()
            }
            PolicyDecision::Permit(PermitReason::Authorized { issuer }) => {
                format!("issuer {} is authorized", issuer)
            }
            PolicyDecision::Reject(RejectReason::UnknownCriticalProperty { tag }) => {
                format!("unknown critical CAA property '{}'", tag)
            }
            PolicyDecision::Reject(RejectReason::NotAuthorized) => {
                "no acceptable issuer named by applicable CAA records".to_string()
            }
        }
    }
}

/// Evaluate a governing CAA record set
///
/// `acceptable_domains` is matched case-insensitively and order does not
/// matter.
///
/// # Example
///
/// ```
/// use mpic_domain::caa::{evaluate_record_set, CaaRecord};
/// use mpic_domain::CertificateType;
///
/// let records = vec![CaaRecord::issue("caatestsuite.com")];
/// let decision = evaluate_record_set(
///     &records,
///     CertificateType::TlsServer,
///     &["mozilla.com".to_string()],
/// );
/// assert!(!decision.is_permit());
/// ```
pub fn evaluate_record_set(
    records: &[CaaRecord],
    certificate_type: CertificateType,
    acceptable_domains: &[String],
) -> PolicyDecision {
    if records.is_empty() {
        return PolicyDecision::Permit(PermitReason::NoRecords);
    }

    if let Some(record) = records
        .iter()
        .find(|r| r.is_critical() && !r.property().is_known())
    {
        return PolicyDecision::Reject(RejectReason::UnknownCriticalProperty {
            tag: record.tag.to_ascii_lowercase(),
        });
    }

    let with_property = |wanted: CaaProperty| -> Vec<&CaaRecord> {
        records.iter().filter(|r| r.property() == wanted).collect()
    };

    let applicable = if certificate_type.is_wildcard() {
        let wild = with_property(CaaProperty::IssueWild);
        if wild.is_empty() {
            with_property(CaaProperty::Issue)
        } else {
            wild
        }
    } else {
        with_property(CaaProperty::Issue)
    };

    if applicable.is_empty() {
        return PolicyDecision::Permit(PermitReason::NoApplicableProperty);
    }

    let acceptable: Vec<String> = acceptable_domains
        .iter()
        .map(|d| d.trim().trim_end_matches('.').to_ascii_lowercase())
        .collect();

    applicable
        .iter()
        .filter_map(|r| r.issuer_domain())
        .find(|issuer| acceptable.contains(issuer))
        .map(|issuer| PolicyDecision::Permit(PermitReason::Authorized { issuer }))
        .unwrap_or(PolicyDecision::Reject(RejectReason::NotAuthorized))
}
