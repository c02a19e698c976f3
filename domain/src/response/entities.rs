//! Response entities
//!
//! Built once per request and never mutated after being returned.

use super::status::CheckStatus;
use crate::caa::CaaRecord;
use crate::check::CheckType;
use crate::orchestration::{OrchestrationParameters, ResolvedOrchestrationParameters};
use crate::perspective::Perspective;
use crate::quorum::QuorumTally;
use crate::request::validation::ValidationIssue;
use serde::{Deserialize, Serialize};

/// Diagnostic details of a CAA check at one perspective
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaaCheckDetails {
    /// Whether a governing record set was found
    pub caa_record_present: bool,
    /// Name the governing record set was found at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found_at: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<CaaRecord>,
    /// Names queried, in order (aliases and climbed parents)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queried_names: Vec<String>,
}

/// Diagnostic details of a DCV check at one perspective
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DcvCheckDetails {
    pub validation_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<String>,
}

/// Check-type-specific diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckDetails {
    Caa(CaaCheckDetails),
    Dcv(DcvCheckDetails),
}

/// Outcome of a check at one perspective
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerspectiveResult {
    pub perspective: String,
    pub check_type: CheckType,
    pub check_passed: bool,
    pub status_detail: CheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<CheckDetails>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl PerspectiveResult {
    pub fn new(
        perspective: &Perspective,
        check_type: CheckType,
        check_passed: bool,
        status_detail: CheckStatus,
    ) -> Self {
        Self {
            perspective: perspective.code.clone(),
            check_type,
            check_passed,
            status_detail,
            details: None,
            errors: Vec::new(),
        }
    }

    /// A failing result carrying one diagnostic message
    pub fn failure(
        perspective: &Perspective,
        check_type: CheckType,
        status_detail: CheckStatus,
        error: impl Into<String>,
    ) -> Self {
        Self::new(perspective, check_type, false, status_detail).with_error(error)
    }

    pub fn timeout(perspective: &Perspective, check_type: CheckType) -> Self {
        Self::failure(
            perspective,
            check_type,
            CheckStatus::Timeout,
            "perspective did not respond before its deadline",
        )
    }

    pub fn not_evaluated(perspective: &Perspective, check_type: CheckType) -> Self {
        Self::failure(
            perspective,
            check_type,
            CheckStatus::NotEvaluated,
            "cancelled after the quorum outcome was decided",
        )
    }

    pub fn with_details(mut self, details: CheckDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors.extend(errors);
        self
    }
}

/// Corroboration verdict for a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpicResponse {
    pub check_type: CheckType,
    pub domain_or_ip_target: String,
    pub is_valid: bool,
    pub request_orchestration_parameters: OrchestrationParameters,
    pub actual_orchestration_parameters: ResolvedOrchestrationParameters,
    /// One entry per perspective of the final attempt, ordered by code
    pub perspectives: Vec<PerspectiveResult>,
    /// Results of earlier attempts that did not corroborate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_attempt_results: Vec<Vec<PerspectiveResult>>,
}

impl MpicResponse {
    pub fn passed_count(&self) -> usize {
        self.perspectives.iter().filter(|p| p.check_passed).count()
    }

    /// Visual pass/fail summary of the final attempt (e.g., "[●●○]")
    pub fn summary(&self) -> String {
        QuorumTally::summary(self.perspectives.iter().map(|p| p.check_passed))
    }
}

/// Body returned when a request is rejected before dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_issues: Vec<ValidationIssue>,
}
