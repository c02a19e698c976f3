//! Request validation
//!
//! Everything here runs before any perspective is contacted. Each function
//! collects every issue it finds instead of stopping at the first one, so a
//! client sees the full list in one round trip.

use crate::caa::{DomainName, TargetName};
use crate::check::{
    CaaCheckParameters, CheckParameters, CheckType, DcvCheckParameters, DcvValidationDetails,
};
use crate::orchestration::{OrchestrationParameters, ResolvedOrchestrationParameters};
use crate::quorum::QuorumRule;
use serde::{Deserialize, Serialize};

use super::entities::MpicRequest;

/// Error key reported for any request validation failure
pub const REQUEST_VALIDATION_FAILED: &str = "request-validation-failed";

/// Identifies a specific validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationIssueCode {
    InvalidPerspectiveCount,
    InvalidQuorumCount,
    InvalidMaxAttempts,
    MissingTarget,
    InvalidTarget,
    MissingCheckParameters,
    MissingCaaDomains,
    InvalidCaaDomain,
    EmptyChallengeValue,
    InvalidDcvParameters,
}

impl ValidationIssueCode {
    pub fn key(&self) -> &'static str {
        match self {
            ValidationIssueCode::InvalidPerspectiveCount => "invalid-perspective-count",
            ValidationIssueCode::InvalidQuorumCount => "invalid-quorum-count",
            ValidationIssueCode::InvalidMaxAttempts => "invalid-max-attempts",
            ValidationIssueCode::MissingTarget => "missing-target",
            ValidationIssueCode::InvalidTarget => "invalid-target",
            ValidationIssueCode::MissingCheckParameters => "missing-check-parameters",
            ValidationIssueCode::MissingCaaDomains => "missing-caa-domains",
            ValidationIssueCode::InvalidCaaDomain => "invalid-caa-domain",
            ValidationIssueCode::EmptyChallengeValue => "empty-challenge-value",
            ValidationIssueCode::InvalidDcvParameters => "invalid-dcv-parameters",
        }
    }
}

/// A detected problem with a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub issue_type: ValidationIssueCode,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(issue_type: ValidationIssueCode, message: impl Into<String>) -> Self {
        Self {
            issue_type,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.issue_type.key(), self.message)
    }
}

/// Deployment limits a request is validated against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub quorum_rule: QuorumRule,
    /// Size of the configured perspective pool
    pub available_perspectives: usize,
    pub default_perspective_count: usize,
    pub max_attempts_limit: usize,
    /// CAA identities used when a request names none
    pub default_caa_domains: Vec<String>,
}

/// Fewest perspectives a corroboration may use
pub const MIN_PERSPECTIVE_COUNT: usize = 2;

/// Resolve orchestration parameters against deployment policy
///
/// # Example
///
/// ```
/// use mpic_domain::{OrchestrationParameters, QuorumRule};
/// use mpic_domain::request::validation::{resolve_orchestration, ValidationPolicy};
///
/// let policy = ValidationPolicy {
///     quorum_rule: QuorumRule::BaselineRequirements,
///     available_perspectives: 6,
///     default_perspective_count: 3,
///     max_attempts_limit: 3,
///     default_caa_domains: vec![],
/// };
/// assert!(resolve_orchestration(&OrchestrationParameters::new(3, 5), &policy).is_err());
/// let resolved = resolve_orchestration(&OrchestrationParameters::new(3, 2), &policy).unwrap();
/// assert_eq!(resolved.quorum_count, 2);
/// ```
pub fn resolve_orchestration(
    params: &OrchestrationParameters,
    policy: &ValidationPolicy,
) -> Result<ResolvedOrchestrationParameters, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    let perspective_count = params
        .perspective_count
        .unwrap_or(policy.default_perspective_count);
    let count_valid = (MIN_PERSPECTIVE_COUNT..=policy.available_perspectives)
        .contains(&perspective_count);
    if !count_valid {
        issues.push(ValidationIssue::new(
            ValidationIssueCode::InvalidPerspectiveCount,
            format!(
                "perspective_count {} must be between {} and {}",
                perspective_count, MIN_PERSPECTIVE_COUNT, policy.available_perspectives
            ),
        ));
    }

    let quorum_count = match params.quorum_count {
        Some(quorum) => {
            if quorum > perspective_count || (count_valid && !policy.quorum_rule.accepts(quorum, perspective_count)) {
                issues.push(ValidationIssue::new(
                    ValidationIssueCode::InvalidQuorumCount,
                    format!(
                        "quorum_count {} is outside the accepted range [{}, {}] for {} perspectives ({})",
                        quorum,
                        policy.quorum_rule.min_approvals_needed(perspective_count),
                        perspective_count,
                        perspective_count,
                        policy.quorum_rule
                    ),
                ));
            }
            quorum
        }
        None => match policy.quorum_rule.default_quorum(perspective_count) {
            Some(quorum) => quorum,
            None => {
                if count_valid {
                    issues.push(ValidationIssue::new(
                        ValidationIssueCode::InvalidQuorumCount,
                        format!(
                            "no quorum_count satisfies {} for {} perspectives",
                            policy.quorum_rule, perspective_count
                        ),
                    ));
                }
                perspective_count
            }
        },
    };

    let attempt_count = params.max_attempts.unwrap_or(1);
    if attempt_count == 0 || attempt_count > policy.max_attempts_limit {
        issues.push(ValidationIssue::new(
            ValidationIssueCode::InvalidMaxAttempts,
            format!(
                "max_attempts {} must be between 1 and {}",
                attempt_count, policy.max_attempts_limit
            ),
        ));
    }

    if issues.is_empty() {
        Ok(ResolvedOrchestrationParameters {
            perspective_count,
            quorum_count,
            attempt_count,
        })
    } else {
        Err(issues)
    }
}

/// Parse `domain_or_ip_target`
pub fn validate_target(target: &str) -> Result<TargetName, ValidationIssue> {
    if target.trim().is_empty() {
        return Err(ValidationIssue::new(
            ValidationIssueCode::MissingTarget,
            "domain_or_ip_target is required",
        ));
    }
    target.parse().map_err(|_| {
        ValidationIssue::new(
            ValidationIssueCode::InvalidTarget,
            format!("'{}' is not a domain name or IP address", target),
        )
    })
}

/// Extract and validate the parameter block for `check_type`
pub fn validate_check_parameters(
    request: &MpicRequest,
    check_type: CheckType,
    policy: &ValidationPolicy,
) -> Result<CheckParameters, Vec<ValidationIssue>> {
    match check_type {
        CheckType::Caa => validate_caa_parameters(request.caa_check_parameters.as_ref(), policy)
            .map(CheckParameters::Caa),
        CheckType::Dcv => validate_dcv_parameters(request.dcv_check_parameters.as_ref())
            .map(CheckParameters::Dcv),
    }
}

fn validate_caa_parameters(
    params: Option<&CaaCheckParameters>,
    policy: &ValidationPolicy,
) -> Result<CaaCheckParameters, Vec<ValidationIssue>> {
    let mut params = params.cloned().unwrap_or_else(|| CaaCheckParameters {
        certificate_type: Default::default(),
        caa_domains: Vec::new(),
    });
    if params.caa_domains.is_empty() {
        params.caa_domains = policy.default_caa_domains.clone();
    }

    let mut issues = Vec::new();
    if params.caa_domains.is_empty() {
        issues.push(ValidationIssue::new(
            ValidationIssueCode::MissingCaaDomains,
            "caa_domains must name at least one CAA identity",
        ));
    }
    for domain in &params.caa_domains {
        if domain.parse::<DomainName>().is_err() {
            issues.push(ValidationIssue::new(
                ValidationIssueCode::InvalidCaaDomain,
                format!("'{}' is not a valid CAA identity", domain),
            ));
        }
    }

    if issues.is_empty() {
        Ok(params)
    } else {
        Err(issues)
    }
}

fn validate_dcv_parameters(
    params: Option<&DcvCheckParameters>,
) -> Result<DcvCheckParameters, Vec<ValidationIssue>> {
    let Some(params) = params else {
        return Err(vec![ValidationIssue::new(
            ValidationIssueCode::MissingCheckParameters,
            "dcv_check_parameters is required for dcv checks",
        )]);
    };

    let mut issues = Vec::new();
    if params.validation_details.challenge_value().trim().is_empty() {
        issues.push(ValidationIssue::new(
            ValidationIssueCode::EmptyChallengeValue,
            "challenge_value must not be empty",
        ));
    }
    match &params.validation_details {
        DcvValidationDetails::HttpGeneric {
            http_token_path, ..
        } if !http_token_path.starts_with('/') => {
            issues.push(ValidationIssue::new(
                ValidationIssueCode::InvalidDcvParameters,
                format!("http_token_path '{}' must start with '/'", http_token_path),
            ));
        }
        DcvValidationDetails::DnsGeneric {
            dns_record_type, ..
        } if dns_record_type.trim().is_empty() => {
            issues.push(ValidationIssue::new(
                ValidationIssueCode::InvalidDcvParameters,
                "dns_record_type must not be empty",
            ));
        }
        _ => {}
    }

    if issues.is_empty() {
        Ok(params.clone())
    } else {
        Err(issues)
    }
}
