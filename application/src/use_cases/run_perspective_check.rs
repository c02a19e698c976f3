//! Run Perspective Check use case
//!
//! Runs one check at one perspective and always produces a
//! [`PerspectiveResult`]: resolver construction errors, validator errors,
//! deadline expiry and panics are folded into a failing result.

use crate::ports::caa_resolver::ResolverProvider;
use crate::ports::dcv_validator::DcvValidator;
use crate::use_cases::evaluate_caa::CaaEvaluator;
use futures::FutureExt;
use mpic_domain::{
    CaaCheckParameters, CheckDetails, CheckParameters, CheckStatus, CheckType,
    DcvCheckDetails, DcvCheckParameters, Perspective, PerspectiveResult, TargetName,
};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-perspective check runner
pub struct PerspectiveCheckRunner {
    resolvers: Arc<dyn ResolverProvider>,
    dcv_validator: Option<Arc<dyn DcvValidator>>,
    evaluator: CaaEvaluator,
    timeout: Duration,
}

impl PerspectiveCheckRunner {
    pub fn new(resolvers: Arc<dyn ResolverProvider>, timeout: Duration) -> Self {
        Self {
            resolvers,
            dcv_validator: None,
            evaluator: CaaEvaluator::default(),
            timeout,
        }
    }

    pub fn with_dcv_validator(mut self, validator: Arc<dyn DcvValidator>) -> Self {
        self.dcv_validator = Some(validator);
        self
    }

    pub fn with_evaluator(mut self, evaluator: CaaEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Run `parameters` against `target` from `perspective`
    pub async fn run(
        &self,
        perspective: &Perspective,
        target: &TargetName,
        raw_target: &str,
        parameters: &CheckParameters,
    ) -> PerspectiveResult {
        let check_type = parameters.check_type();
        let check = AssertUnwindSafe(self.run_unguarded(perspective, target, raw_target, parameters))
            .catch_unwind();

        match tokio::time::timeout(self.timeout, check).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => {
                warn!("Check at {} panicked", perspective);
                PerspectiveResult::failure(
                    perspective,
                    check_type,
                    CheckStatus::Error,
                    "check panicked",
                )
            }
            Err(_) => {
                warn!("Check at {} timed out after {:?}", perspective, self.timeout);
                PerspectiveResult::timeout(perspective, check_type)
            }
        }
    }

    async fn run_unguarded(
        &self,
        perspective: &Perspective,
        target: &TargetName,
        raw_target: &str,
        parameters: &CheckParameters,
    ) -> PerspectiveResult {
        match parameters {
            CheckParameters::Caa(caa) => self.run_caa(perspective, target, caa).await,
            CheckParameters::Dcv(dcv) => self.run_dcv(perspective, raw_target, dcv).await,
        }
    }

    async fn run_caa(
        &self,
        perspective: &Perspective,
        target: &TargetName,
        parameters: &CaaCheckParameters,
    ) -> PerspectiveResult {
        let resolver = match self.resolvers.resolver_for(perspective) {
            Ok(resolver) => resolver,
            Err(e) => {
                warn!("No resolver for {}: {}", perspective, e);
                return PerspectiveResult::failure(
                    perspective,
                    CheckType::Caa,
                    CheckStatus::DnsLookupFailure,
                    e.to_string(),
                );
            }
        };

        let evaluation = self
            .evaluator
            .evaluate(
                resolver.as_ref(),
                target,
                parameters.certificate_type,
                &parameters.caa_domains,
            )
            .await;
        debug!(
            "CAA at {}: {} ({})",
            perspective, evaluation.passed, evaluation.status
        );

        PerspectiveResult::new(perspective, CheckType::Caa, evaluation.passed, evaluation.status)
            .with_details(CheckDetails::Caa(evaluation.details))
            .with_errors(evaluation.errors)
    }

    async fn run_dcv(
        &self,
        perspective: &Perspective,
        raw_target: &str,
        parameters: &DcvCheckParameters,
    ) -> PerspectiveResult {
        let Some(validator) = &self.dcv_validator else {
            return PerspectiveResult::failure(
                perspective,
                CheckType::Dcv,
                CheckStatus::Error,
                "no DCV validator installed",
            );
        };

        let method = parameters.validation_details.method_name().to_string();
        match validator.validate(perspective, raw_target, parameters).await {
            Ok(outcome) => {
                let status = if outcome.passed {
                    CheckStatus::Success
                } else {
                    CheckStatus::PolicyReject
                };
                PerspectiveResult::new(perspective, CheckType::Dcv, outcome.passed, status)
                    .with_details(CheckDetails::Dcv(DcvCheckDetails {
                        validation_method: method,
                        observed: outcome.observed,
                    }))
            }
            Err(e) => {
                warn!("DCV at {} failed: {}", perspective, e);
                PerspectiveResult::failure(perspective, CheckType::Dcv, CheckStatus::Error, e.to_string())
            }
        }
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
        CaaLookup, CaaRecord, CertificateType, DcvValidationDetails, DomainName, Rir,
    };

    fn perspective() -> Perspective {
        Perspective::new("us-east-1", Rir::Arin)
    }

    fn caa_params(domains: &[&str]) -> CheckParameters {
        CheckParameters::Caa(CaaCheckParameters::new(
            CertificateType::TlsServer,
            domains.iter().map(|s| s.to_string()).collect(),
        ))
    }

    fn dcv_params() -> CheckParameters {
        CheckParameters::Dcv(DcvCheckParameters {
            validation_details: DcvValidationDetails::HttpGeneric {
                http_token_path: "/.well-known/pki-validation/token".to_string(),
                challenge_value: "abc123".to_string(),
            },
        })
    }

    fn runner(resolver: FixedCaaResolver, timeout: Duration) -> PerspectiveCheckRunner {
        PerspectiveCheckRunner::new(
            Arc::new(SharedResolverProvider::new(Arc::new(resolver))),
            timeout,
        )
    }

    async fn run(runner: &PerspectiveCheckRunner, params: &CheckParameters) -> PerspectiveResult {
        let target: TargetName = "example.com".parse().unwrap();
        runner.run(&perspective(), &target, "example.com", params).await
    }

    struct PanickingResolver;

    #[async_trait]
    impl CaaResolver for PanickingResolver {
        async fn lookup(&self, _name: &DomainName) -> Result<CaaLookup, ResolverError> {
            panic!("resolver exploded")
        }
    }

    struct EchoValidator {
        observed: String,
    }

    #[async_trait]
    impl DcvValidator for EchoValidator {
        async fn validate(
            &self,
            _perspective: &Perspective,
            _target: &str,
            parameters: &DcvCheckParameters,
        ) -> Result<DcvOutcome, DcvError> {
            if parameters.validation_details.challenge_value() == self.observed {
                Ok(DcvOutcome::passed(self.observed.clone()))
            } else {
                Ok(DcvOutcome::failed(Some(self.observed.clone())))
            }
        }
    }

    struct FailingValidator;

    #[async_trait]
    impl DcvValidator for FailingValidator {
        async fn validate(
            &self,
            _perspective: &Perspective,
            _target: &str,
            _parameters: &DcvCheckParameters,
        ) -> Result<DcvOutcome, DcvError> {
            Err(DcvError::Unreachable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_caa_result_carries_details() {
        let resolver = FixedCaaResolver::new().with_records(
            "example.com".parse().unwrap(),
            vec![CaaRecord::issue("ca.example")],
        );
        let result = run(&runner(resolver, Duration::from_secs(5)), &caa_params(&["ca.example"])).await;
        assert!(result.check_passed);
        assert_eq!(result.status_detail, CheckStatus::Success);
        assert_eq!(result.perspective, "us-east-1");
        match result.details {
            Some(CheckDetails::Caa(details)) => {
                assert!(details.caa_record_present);
                assert_eq!(details.found_at.as_deref(), Some("example.com"));
            }
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_yields_timeout() {
        let resolver = FixedCaaResolver::new().with_delay(Duration::from_secs(30));
        let result = run(&runner(resolver, Duration::from_secs(2)), &caa_params(&["ca.example"])).await;
        assert!(!result.check_passed);
        assert_eq!(result.status_detail, CheckStatus::Timeout);
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let runner = PerspectiveCheckRunner::new(
            Arc::new(SharedResolverProvider::new(Arc::new(PanickingResolver))),
            Duration::from_secs(5),
        );
        let result = run(&runner, &caa_params(&["ca.example"])).await;
        assert!(!result.check_passed);
        assert_eq!(result.status_detail, CheckStatus::Error);
    }

    #[tokio::test]
    async fn test_missing_resolver_is_lookup_failure() {
        let runner = PerspectiveCheckRunner::new(
            Arc::new(PerspectiveResolverMap::new()),
            Duration::from_secs(5),
        );
        let result = run(&runner, &caa_params(&["ca.example"])).await;
        assert_eq!(result.status_detail, CheckStatus::DnsLookupFailure);
    }

    #[tokio::test]
    async fn test_dcv_routed_to_validator() {
        let base = runner(FixedCaaResolver::new(), Duration::from_secs(5));
        let result = run(&base, &dcv_params()).await;
        assert_eq!(result.status_detail, CheckStatus::Error);

        let passing = runner(FixedCaaResolver::new(), Duration::from_secs(5))
            .with_dcv_validator(Arc::new(EchoValidator { observed: "abc123".to_string() }));
        let result = run(&passing, &dcv_params()).await;
        assert!(result.check_passed);
        assert_eq!(result.check_type, CheckType::Dcv);

        let mismatch = runner(FixedCaaResolver::new(), Duration::from_secs(5))
            .with_dcv_validator(Arc::new(EchoValidator { observed: "other".to_string() }));
        let result = run(&mismatch, &dcv_params()).await;
        assert!(!result.check_passed);
        assert_eq!(result.status_detail, CheckStatus::PolicyReject);

        let failing = runner(FixedCaaResolver::new(), Duration::from_secs(5))
            .with_dcv_validator(Arc::new(FailingValidator));
        let result = run(&failing, &dcv_params()).await;
        assert_eq!(result.status_detail, CheckStatus::Error);
        assert_eq!(result.errors.len(), 1);
    }
}
