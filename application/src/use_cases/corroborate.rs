//! Corroborate use case
//!
//! Validates a request, fans the check out to a cohort of perspectives,
//! collects every result under its own deadline and reduces them to a
//! quorum verdict. A failed attempt is retried on the next cohort while the
//! request's `max_attempts` allows.

use crate::config::OrchestratorConfig;
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::caa_resolver::ResolverProvider;
use crate::ports::dcv_validator::DcvValidator;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::evaluate_caa::CaaEvaluator;
use crate::use_cases::run_perspective_check::PerspectiveCheckRunner;
use mpic_domain::request::{resolve_orchestration, validate_check_parameters, validate_target};
use mpic_domain::{
    CheckParameters, CheckStatus, CheckType, ErrorResponse, MpicRequest, MpicResponse,
    Perspective, PerspectiveResult, QuorumTally, ResolvedOrchestrationParameters, TargetName,
    ValidationIssue, build_cohorts,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Error key for requests rejected before dispatch
pub const REQUEST_VALIDATION_FAILED: &str = mpic_domain::request::REQUEST_VALIDATION_FAILED;

/// Error key for requests that could not be routed to a checker
pub const CHECK_DISPATCH_FAILED: &str = "check-dispatch-failed";

/// Errors that stop a request before any verdict is reached
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorroborationError {
    #[error("Request validation failed with {} issue(s)", .issues.len())]
    Validation { issues: Vec<ValidationIssue> },

    #[error("Cannot dispatch check type '{check_type}': {reason}")]
    Dispatch { check_type: String, reason: String },
}

impl CorroborationError {
    /// Stable identifier clients can match on
    pub fn error_key(&self) -> &'static str {
        match self {
            CorroborationError::Validation { .. } => REQUEST_VALIDATION_FAILED,
            CorroborationError::Dispatch { .. } => CHECK_DISPATCH_FAILED,
        }
    }

    /// HTTP-equivalent status code
    pub fn http_status(&self) -> u16 {
        match self {
            CorroborationError::Validation { .. } => 400,
            CorroborationError::Dispatch { .. } => 502,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CorroborationError::Validation { .. })
    }

    pub fn to_response(&self) -> ErrorResponse {
        let validation_issues = match self {
            CorroborationError::Validation { issues } => issues.clone(),
            CorroborationError::Dispatch { .. } => Vec::new(),
        };
        ErrorResponse {
            error: self.error_key().to_string(),
            message: self.to_string(),
            validation_issues,
        }
    }
}

/// Use case for corroborating a check across perspectives
pub struct CorroborateUseCase {
    config: OrchestratorConfig,
    resolvers: Arc<dyn ResolverProvider>,
    dcv_validator: Option<Arc<dyn DcvValidator>>,
    audit: Arc<dyn AuditLogger>,
}

impl CorroborateUseCase {
    pub fn new(config: OrchestratorConfig, resolvers: Arc<dyn ResolverProvider>) -> Self {
        Self {
            config,
            resolvers,
            dcv_validator: None,
            audit: Arc::new(NoAuditLogger),
        }
    }

    /// Install a DCV validator; without one, every DCV perspective reports `error`
    pub fn with_dcv_validator(mut self, validator: Arc<dyn DcvValidator>) -> Self {
        self.dcv_validator = Some(validator);
        self
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, request: &MpicRequest) -> Result<MpicResponse, CorroborationError> {
        self.execute_with_progress(request, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        request: &MpicRequest,
        progress: &dyn ProgressNotifier,
    ) -> Result<MpicResponse, CorroborationError> {
        let result = self.corroborate(request, progress).await;
        self.audit(request, &result);
        result
    }

    async fn corroborate(
        &self,
        request: &MpicRequest,
        progress: &dyn ProgressNotifier,
    ) -> Result<MpicResponse, CorroborationError> {
        let (resolved, target, check_type, parameters) = self.prepare(request)?;

        let cohorts = build_cohorts(&self.config.perspectives, resolved.perspective_count);
        if cohorts.is_empty() {
            return Err(CorroborationError::Dispatch {
                check_type: request.check_type.clone(),
                reason: "no cohort of the requested size can be formed".to_string(),
            });
        }

        info!(
            "Corroborating {} for {} with {} perspectives (quorum {}, up to {} attempt(s))",
            check_type,
            request.domain_or_ip_target,
            resolved.perspective_count,
            resolved.quorum_count,
            resolved.attempt_count
        );

        let runner = Arc::new(self.runner());
        let mut previous_attempt_results = Vec::new();
        let mut attempt = 1;

        loop {
            let cohort = &cohorts[(attempt - 1) % cohorts.len()];
            progress.on_attempt_start(attempt, cohort);

            let results = self
                .run_attempt(&runner, cohort, &target, request, &parameters, resolved.quorum_count, progress)
                .await;
            let tally =
                QuorumTally::from_results(resolved.quorum_count, results.iter().map(|r| r.check_passed));
            progress.on_attempt_complete(attempt, &tally);

            info!(
                "Attempt {}: {}/{} perspectives passed (quorum {})",
                attempt,
                tally.passed(),
                results.len(),
                resolved.quorum_count
            );

            if tally.is_valid() || attempt >= resolved.attempt_count {
                return Ok(MpicResponse {
                    check_type,
                    domain_or_ip_target: request.domain_or_ip_target.clone(),
                    is_valid: tally.is_valid(),
                    request_orchestration_parameters: request.requested_orchestration(),
                    actual_orchestration_parameters: resolved.with_attempt_count(attempt),
                    perspectives: results,
                    previous_attempt_results,
                });
            }

            debug!("Attempt {} not corroborated, retrying on next cohort", attempt);
            previous_attempt_results.push(results);
            attempt += 1;
        }
    }

    /// Validation and routing, in the order clients observe them
    fn prepare(
        &self,
        request: &MpicRequest,
    ) -> Result<(ResolvedOrchestrationParameters, TargetName, CheckType, CheckParameters), CorroborationError>
    {
        let policy = self.config.validation_policy();
        let mut issues = Vec::new();

        let resolved = resolve_orchestration(&request.requested_orchestration(), &policy)
            .map_err(|found| issues.extend(found))
            .ok();
        let target = validate_target(&request.domain_or_ip_target)
            .map_err(|issue| issues.push(issue))
            .ok();

        let (Some(resolved), Some(target)) = (resolved, target) else {
            return Err(CorroborationError::Validation { issues });
        };

        let check_type = request
            .parse_check_type()
            .map_err(|e| CorroborationError::Dispatch {
                check_type: request.check_type.clone(),
                reason: e.to_string(),
            })?;

        let parameters = validate_check_parameters(request, check_type, &policy)
            .map_err(|issues| CorroborationError::Validation { issues })?;

        Ok((resolved, target, check_type, parameters))
    }

    fn runner(&self) -> PerspectiveCheckRunner {
        let runner = PerspectiveCheckRunner::new(
            Arc::clone(&self.resolvers),
            self.config.perspective_timeout,
        )
        .with_evaluator(CaaEvaluator::new(self.config.max_alias_hops));
        match &self.dcv_validator {
            Some(validator) => runner.with_dcv_validator(Arc::clone(validator)),
            None => runner,
        }
    }

    /// Run one attempt on `cohort`; results come back in cohort order
    #[allow(clippy::too_many_arguments)]
    async fn run_attempt(
        &self,
        runner: &Arc<PerspectiveCheckRunner>,
        cohort: &[Perspective],
        target: &TargetName,
        request: &MpicRequest,
        parameters: &CheckParameters,
        quorum_count: usize,
        progress: &dyn ProgressNotifier,
    ) -> Vec<PerspectiveResult> {
        let check_type = parameters.check_type();
        let mut join_set = JoinSet::new();

        for (slot, perspective) in cohort.iter().enumerate() {
            let runner = Arc::clone(runner);
            let perspective = perspective.clone();
            let target = target.clone();
            let raw_target = request.domain_or_ip_target.clone();
            let parameters = parameters.clone();

            join_set.spawn(async move {
                let result = runner
                    .run(&perspective, &target, &raw_target, &parameters)
                    .await;
                (slot, result)
            });
        }

        let mut slots: Vec<Option<PerspectiveResult>> = vec![None; cohort.len()];
        let mut tally = QuorumTally::new(cohort.len(), quorum_count);
        let mut terminated_early = false;

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((slot, result)) => {
                    if !result.check_passed {
                        warn!(
                            "Perspective {} did not pass: {}",
                            result.perspective, result.status_detail
                        );
                    }
                    progress.on_perspective_complete(&result);
                    tally.record(result.check_passed);
                    slots[slot] = Some(result);
                }
                Err(e) => {
                    warn!("Perspective task join error: {}", e);
                    tally.record(false);
                }
            }

            if self.config.early_termination && tally.outcome().is_decided() && !join_set.is_empty() {
                debug!(
                    "Quorum outcome decided ({}), cancelling {} outstanding perspective(s)",
                    tally.outcome(),
                    join_set.len()
                );
                join_set.shutdown().await;
                terminated_early = true;
                break;
            }
        }

        slots
            .into_iter()
            .zip(cohort)
            .map(|(slot, perspective)| {
                slot.unwrap_or_else(|| {
                    if terminated_early {
                        PerspectiveResult::not_evaluated(perspective, check_type)
                    } else {
                        PerspectiveResult::failure(
                            perspective,
                            check_type,
                            CheckStatus::Error,
                            "perspective task did not complete",
                        )
                    }
                })
            })
            .collect()
    }

    fn audit(&self, request: &MpicRequest, result: &Result<MpicResponse, CorroborationError>) {
        let event = match result {
            Ok(response) => AuditEvent::new(
                "corroboration_complete",
                json!({
                    "check_type": response.check_type,
                    "target": response.domain_or_ip_target,
                    "is_valid": response.is_valid,
                    "orchestration": response.actual_orchestration_parameters,
                    "perspectives": response.perspectives.iter().map(|p| json!({
                        "perspective": p.perspective,
                        "check_passed": p.check_passed,
                        "status": p.status_detail,
                    })).collect::<Vec<_>>(),
                }),
            ),
            Err(e) => AuditEvent::new(
                "request_rejected",
                json!({
                    "check_type": request.check_type,
                    "target": request.domain_or_ip_target,
                    "error": e.error_key(),
                    "message": e.to_string(),
                }),
            ),
        };
        self.audit.log(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::caa_resolver::{
        CaaResolver, FixedCaaResolver, PerspectiveResolverMap, ResolverError,
        SharedResolverProvider,
    };
    use crate::ports::dcv_validator::{DcvError, DcvOutcome};
    use async_trait::async_trait;
    use mpic_domain::{
        CaaCheckParameters, CaaRecord, CertificateType, DcvCheckParameters,
        DcvValidationDetails, DomainName, OrchestrationParameters, Rir, ValidationIssueCode,
    };
    use std::sync::Mutex;
    use std::time::Duration;

    // ==================== Helpers ====================

    fn name(s: &str) -> DomainName {
        s.parse().unwrap()
    }

    fn pool() -> Vec<Perspective> {
        vec![
            Perspective::new("us-east-1", Rir::Arin),
            Perspective::new("us-west-2", Rir::Arin),
            Perspective::new("eu-west-1", Rir::Ripe),
            Perspective::new("eu-central-1", Rir::Ripe),
            Perspective::new("ap-south-1", Rir::Apnic),
            Perspective::new("sa-east-1", Rir::Lacnic),
        ]
    }

    fn use_case(resolver: Arc<FixedCaaResolver>) -> CorroborateUseCase {
        CorroborateUseCase::new(
            OrchestratorConfig::new(pool()),
            Arc::new(SharedResolverProvider::new(resolver)),
        )
    }

    fn caa_request(target: &str, domains: &[&str], n: usize, q: usize) -> MpicRequest {
        MpicRequest::caa(
            target,
            CaaCheckParameters::new(
                CertificateType::TlsServer,
                domains.iter().map(|s| s.to_string()).collect(),
            ),
        )
        .with_orchestration(OrchestrationParameters::new(n, q))
    }

    fn fixed() -> Arc<FixedCaaResolver> {
        Arc::new(FixedCaaResolver::new())
    }

    #[derive(Default)]
    struct RecordingAudit {
        events: Mutex<Vec<&'static str>>,
    }

    impl AuditLogger for RecordingAudit {
        fn log(&self, event: AuditEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    struct AlwaysPassDcv;

    #[async_trait]
    impl DcvValidator for AlwaysPassDcv {
        async fn validate(
            &self,
            _perspective: &Perspective,
            _target: &str,
            parameters: &DcvCheckParameters,
        ) -> Result<DcvOutcome, DcvError> {
            Ok(DcvOutcome::passed(parameters.validation_details.challenge_value()))
        }
    }

    // ==================== Scenarios ====================

    #[tokio::test]
    async fn test_no_records_anywhere_is_valid() {
        let resolver = fixed();
        let response = use_case(Arc::clone(&resolver))
            .execute(&caa_request("nocaa.example.com", &["ca.example"], 3, 2))
            .await
            .unwrap();

        assert!(response.is_valid);
        assert_eq!(response.perspectives.len(), 3);
        assert!(response.perspectives.iter().all(|p| p.check_passed));
        assert_eq!(response.actual_orchestration_parameters.attempt_count, 1);
    }

    #[tokio::test]
    async fn test_unauthorized_issuer_is_rejected() {
        let resolver = Arc::new(FixedCaaResolver::new().with_records(
            name("deny.basic.caatestsuite.com"),
            vec![CaaRecord::issue("caatestsuite.com")],
        ));
        let response = use_case(resolver)
            .execute(&caa_request("deny.basic.caatestsuite.com", &["mozilla.com"], 3, 2))
            .await
            .unwrap();

        assert!(!response.is_valid);
        assert_eq!(response.perspectives.len(), 3);
        assert!(
            response
                .perspectives
                .iter()
                .all(|p| p.status_detail == CheckStatus::PolicyReject)
        );
    }

    #[tokio::test]
    async fn test_unknown_critical_property_is_rejected() {
        let resolver = Arc::new(FixedCaaResolver::new().with_records(
            name("deny.critical.caatestsuite.com"),
            vec![
                CaaRecord::new(128, "caatestsuitedummyproperty", "test"),
                CaaRecord::issue("mozilla.com"),
            ],
        ));
        let response = use_case(resolver)
            .execute(&caa_request("deny.critical.caatestsuite.com", &["mozilla.com"], 3, 2))
            .await
            .unwrap();
        assert!(!response.is_valid);
    }

    #[tokio::test]
    async fn test_wildcard_falls_back_to_issue() {
        let resolver = Arc::new(FixedCaaResolver::new().with_records(
            name("example.com"),
            vec![CaaRecord::issue("mozilla.com")],
        ));
        let request = MpicRequest::caa(
            "example.com",
            CaaCheckParameters::new(CertificateType::TlsServerWildcard, vec!["mozilla.com".into()]),
        )
        .with_orchestration(OrchestrationParameters::new(3, 2));
        let response = use_case(resolver).execute(&request).await.unwrap();
        assert!(response.is_valid);
    }

    #[tokio::test]
    async fn test_quorum_above_perspective_count_is_validation_error() {
        let resolver = fixed();
        let err = use_case(Arc::clone(&resolver))
            .execute(&caa_request("example.com", &["mozilla.com"], 3, 5))
            .await
            .unwrap_err();

        assert_eq!(err.error_key(), "request-validation-failed");
        assert_eq!(err.http_status(), 400);
        match &err {
            CorroborationError::Validation { issues } => {
                assert_eq!(issues[0].issue_type, ValidationIssueCode::InvalidQuorumCount);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(resolver.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_check_type_is_dispatch_error() {
        let resolver = fixed();
        let request =
            caa_request("example.com", &["mozilla.com"], 3, 2).with_check_type("invalid_check_type");
        let err = use_case(Arc::clone(&resolver)).execute(&request).await.unwrap_err();

        assert_eq!(err.error_key(), "check-dispatch-failed");
        assert_eq!(err.http_status(), 502);
        assert_ne!(err.error_key(), REQUEST_VALIDATION_FAILED);
        assert_eq!(resolver.lookup_count(), 0);
    }

    // ==================== Validation ordering ====================

    #[tokio::test]
    async fn test_orchestration_issues_reported_before_dispatch() {
        let request = caa_request("example.com", &["mozilla.com"], 3, 5).with_check_type("bogus");
        let err = use_case(fixed()).execute(&request).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_invalid_target_collected_with_orchestration_issues() {
        let request = caa_request("not a domain", &["mozilla.com"], 3, 5);
        let err = use_case(fixed()).execute(&request).await.unwrap_err();
        let response = err.to_response();
        assert_eq!(response.validation_issues.len(), 2);
        assert_eq!(response.error, "request-validation-failed");
    }

    #[tokio::test]
    async fn test_dcv_without_validator_fails_every_perspective() {
        let request = MpicRequest::dcv(
            "example.com",
            DcvCheckParameters {
                validation_details: DcvValidationDetails::HttpGeneric {
                    http_token_path: "/.well-known/pki-validation/token".to_string(),
                    challenge_value: "abc".to_string(),
                },
            },
        )
        .with_orchestration(OrchestrationParameters::new(3, 2));

        let response = use_case(fixed()).execute(&request).await.unwrap();
        assert!(!response.is_valid);
        assert_eq!(response.check_type, CheckType::Dcv);
        assert_eq!(response.perspectives.len(), 3);
        assert!(response.perspectives.iter().all(|p| {
            !p.check_passed && p.status_detail == CheckStatus::Error
        }));

        let response = use_case(fixed())
            .with_dcv_validator(Arc::new(AlwaysPassDcv))
            .execute(&request)
            .await
            .unwrap();
        assert!(response.is_valid);
        assert_eq!(response.passed_count(), 3);
    }

    // ==================== Properties ====================

    #[tokio::test]
    async fn test_perspectives_ordered_by_code() {
        let response = use_case(fixed())
            .execute(&caa_request("example.com", &["mozilla.com"], 4, 3))
            .await
            .unwrap();
        let codes: Vec<_> = response.perspectives.iter().map(|p| p.perspective.clone()).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(codes, sorted);
        assert_eq!(codes.len(), 4);
    }

    #[tokio::test]
    async fn test_verdict_matches_pass_count() {
        let first_cohort = build_cohorts(&pool(), 3).remove(0);
        let failing: Arc<dyn CaaResolver> = Arc::new(
            FixedCaaResolver::new()
                .with_failure(name("example.com"), ResolverError::Timeout),
        );
        let provider = PerspectiveResolverMap::new()
            .with_resolver(first_cohort[0].code.clone(), failing)
            .with_fallback(fixed());
        let use_case = CorroborateUseCase::new(OrchestratorConfig::new(pool()), Arc::new(provider));

        let response = use_case
            .execute(&caa_request("example.com", &["mozilla.com"], 3, 2))
            .await
            .unwrap();
        assert_eq!(response.passed_count(), 2);
        assert!(response.is_valid);
        assert_eq!(response.summary().chars().filter(|c| *c == '○').count(), 1);
    }

    #[tokio::test]
    async fn test_retry_moves_to_next_cohort() {
        let cohorts = build_cohorts(&pool(), 3);
        let failing: Arc<dyn CaaResolver> = Arc::new(
            FixedCaaResolver::new()
                .with_failure(name("example.com"), ResolverError::Refused("example.com".into())),
        );
        let mut provider = PerspectiveResolverMap::new().with_fallback(fixed());
        for perspective in &cohorts[0] {
            provider = provider.with_resolver(perspective.code.clone(), Arc::clone(&failing));
        }
        let use_case = CorroborateUseCase::new(OrchestratorConfig::new(pool()), Arc::new(provider));
        let request = MpicRequest::caa(
            "example.com",
            CaaCheckParameters::new(CertificateType::TlsServer, vec!["mozilla.com".into()]),
        )
        .with_orchestration(OrchestrationParameters::new(3, 2).with_max_attempts(2));

        let response = use_case.execute(&request).await.unwrap();
        assert!(response.is_valid);
        assert_eq!(response.actual_orchestration_parameters.attempt_count, 2);
        assert_eq!(response.previous_attempt_results.len(), 1);
        assert!(response.previous_attempt_results[0].iter().all(|p| !p.check_passed));
        assert_eq!(response.request_orchestration_parameters.max_attempts, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_perspective_times_out() {
        let first_cohort = build_cohorts(&pool(), 3).remove(0);
        let slow: Arc<dyn CaaResolver> =
            Arc::new(FixedCaaResolver::new().with_delay(Duration::from_secs(60)));
        let provider = PerspectiveResolverMap::new()
            .with_resolver(first_cohort[2].code.clone(), slow)
            .with_fallback(fixed());
        let config = OrchestratorConfig::new(pool()).with_perspective_timeout(Duration::from_secs(5));
        let response = CorroborateUseCase::new(config, Arc::new(provider))
            .execute(&caa_request("example.com", &["mozilla.com"], 3, 2))
            .await
            .unwrap();

        assert!(response.is_valid);
        assert_eq!(response.perspectives[2].status_detail, CheckStatus::Timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_termination_marks_outstanding_not_evaluated() {
        let first_cohort = build_cohorts(&pool(), 3).remove(0);
        let slow: Arc<dyn CaaResolver> =
            Arc::new(FixedCaaResolver::new().with_delay(Duration::from_secs(60)));
        let provider = Arc::new(
            PerspectiveResolverMap::new()
                .with_resolver(first_cohort[1].code.clone(), slow)
                .with_fallback(fixed()),
        );
        let config = OrchestratorConfig::new(pool()).with_perspective_timeout(Duration::from_secs(120));

        let response = CorroborateUseCase::new(config.clone().with_early_termination(true), provider.clone())
            .execute(&caa_request("example.com", &["mozilla.com"], 3, 2))
            .await
            .unwrap();
        assert!(response.is_valid);
        assert_eq!(response.perspectives.len(), 3);
        assert_eq!(response.perspectives[1].status_detail, CheckStatus::NotEvaluated);

        let response = CorroborateUseCase::new(config, provider)
            .execute(&caa_request("example.com", &["mozilla.com"], 3, 2))
            .await
            .unwrap();
        assert!(response.perspectives.iter().all(|p| p.check_passed));
    }

    #[tokio::test]
    async fn test_defaults_fill_missing_orchestration() {
        let request = MpicRequest::caa(
            "example.com",
            CaaCheckParameters::new(CertificateType::TlsServer, vec!["mozilla.com".into()]),
        );
        let response = use_case(fixed()).execute(&request).await.unwrap();
        assert_eq!(response.actual_orchestration_parameters.perspective_count, 3);
        assert_eq!(response.actual_orchestration_parameters.quorum_count, 2);
        assert_eq!(response.request_orchestration_parameters, OrchestrationParameters::default());
    }

    #[tokio::test]
    async fn test_audit_records_outcomes_and_rejections() {
        let audit = Arc::new(RecordingAudit::default());
        let use_case = use_case(fixed()).with_audit_logger(audit.clone());

        use_case
            .execute(&caa_request("example.com", &["mozilla.com"], 3, 2))
            .await
            .unwrap();
        let _ = use_case
            .execute(&caa_request("example.com", &["mozilla.com"], 3, 5))
            .await;

        let events = audit.events.lock().unwrap().clone();
        assert_eq!(events, vec!["corroboration_complete", "request_rejected"]);
    }
}
