//! Corroboration request as received at the boundary

use crate::check::{CaaCheckParameters, CheckType, DcvCheckParameters};
use crate::core::error::DomainError;
use crate::orchestration::OrchestrationParameters;
use serde::{Deserialize, Serialize};

/// A request to corroborate a check across perspectives
///
/// `check_type` stays a raw string: an unrecognised value is a dispatch
/// failure, which the orchestrator reports separately from validation
/// failures.
///
/// # Example
///
/// ```
/// use mpic_domain::{MpicRequest, CheckType};
///
/// let json = r#"{
///     "check_type": "caa",
///     "domain_or_ip_target": "example.com",
///     "orchestration_parameters": {"perspective_count": 3, "quorum_count": 2},
///     "caa_check_parameters": {"certificate_type": "tls-server", "caa_domains": ["mozilla.com"]}
/// }"#;
/// let request: MpicRequest = serde_json::from_str(json).unwrap();
/// assert_eq!(request.parse_check_type().unwrap(), CheckType::Caa);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpicRequest {
    pub check_type: String,
    pub domain_or_ip_target: String,
    #[serde(default)]
    pub orchestration_parameters: Option<OrchestrationParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caa_check_parameters: Option<CaaCheckParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dcv_check_parameters: Option<DcvCheckParameters>,
}

impl MpicRequest {
    /// Build a CAA request
    pub fn caa(target: impl Into<String>, parameters: CaaCheckParameters) -> Self {
        Self {
            check_type: CheckType::Caa.as_str().to_string(),
            domain_or_ip_target: target.into(),
            orchestration_parameters: None,
            caa_check_parameters: Some(parameters),
            dcv_check_parameters: None,
        }
    }

    /// Build a DCV request
    pub fn dcv(target: impl Into<String>, parameters: DcvCheckParameters) -> Self {
        Self {
            check_type: CheckType::Dcv.as_str().to_string(),
            domain_or_ip_target: target.into(),
            orchestration_parameters: None,
            caa_check_parameters: None,
            dcv_check_parameters: Some(parameters),
        }
    }

    pub fn with_orchestration(mut self, parameters: OrchestrationParameters) -> Self {
        self.orchestration_parameters = Some(parameters);
        self
    }

    pub fn with_check_type(mut self, check_type: impl Into<String>) -> Self {
        self.check_type = check_type.into();
        self
    }

    pub fn parse_check_type(&self) -> Result<CheckType, DomainError> {
        self.check_type.parse()
    }

    /// Orchestration parameters as sent (all-`None` when absent)
    pub fn requested_orchestration(&self) -> OrchestrationParameters {
        self.orchestration_parameters.unwrap_or_default()
    }
}
