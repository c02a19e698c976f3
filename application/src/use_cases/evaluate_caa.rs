//! Evaluate CAA use case
//!
//! Finds the record set that governs a target and applies issuance policy
//! to it. Runs once per perspective against that perspective's resolver.
//!
//! ```text
//!   sub.www.example.com ── no records
//!        www.example.com ── CNAME cdn.example.net
//!        cdn.example.net ── no records
//!            example.net ── 0 issue "ca.example"   <- governs
//! ```
//!
//! After an alias only the alias target's own ancestors are climbed.

use crate::ports::caa_resolver::CaaResolver;
use mpic_domain::caa::PermitReason;
use mpic_domain::{
    CaaCheckDetails, CertificateType, CheckStatus, DomainName, PolicyDecision, TargetName,
    evaluate_record_set,
};
use std::collections::HashSet;
use tracing::debug;

/// Result of a CAA evaluation at one perspective
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaaEvaluation {
    pub passed: bool,
    pub status: CheckStatus,
    pub details: CaaCheckDetails,
    pub errors: Vec<String>,
}

impl CaaEvaluation {
    fn decided(decision: &PolicyDecision, details: CaaCheckDetails) -> Self {
        let passed = decision.is_permit();
        Self {
            passed,
            status: if passed {
                CheckStatus::Success
            } else {
                CheckStatus::PolicyReject
            },
            details,
            errors: if passed {
                Vec::new()
            } else {
                vec![decision.describe()]
            },
        }
    }

    fn failed(status: CheckStatus, details: CaaCheckDetails, error: String) -> Self {
        Self {
            passed: false,
            status,
            details,
            errors: vec![error],
        }
    }
}

/// DNS-tree-climbing CAA evaluator
#[derive(Debug, Clone, Copy)]
pub struct CaaEvaluator {
    max_alias_hops: usize,
}

impl Default for CaaEvaluator {
    fn default() -> Self {
        Self { max_alias_hops: 8 }
    }
}

impl CaaEvaluator {
    pub fn new(max_alias_hops: usize) -> Self {
        Self { max_alias_hops }
    }

    /// Evaluate CAA for `target`
    ///
    /// A wildcard target (`*.example.com`) is evaluated as a wildcard
    /// certificate whatever `certificate_type` says. IP targets are outside
    /// CAA and permit without any lookup.
    pub async fn evaluate(
        &self,
        resolver: &dyn CaaResolver,
        target: &TargetName,
        certificate_type: CertificateType,
        caa_domains: &[String],
    ) -> CaaEvaluation {
        let Some(start) = target.domain() else {
            return CaaEvaluation::decided(
                &PolicyDecision::Permit(PermitReason::NoRecords),
                CaaCheckDetails::default(),
            );
        };
        let certificate_type = if target.is_wildcard() {
            CertificateType::TlsServerWildcard
        } else {
            certificate_type
        };

        let mut details = CaaCheckDetails::default();
        let mut visited: HashSet<DomainName> = HashSet::new();
        let mut alias_hops = 0;
        let mut current = Some(start.clone());

        while let Some(name) = current.take() {
            if !visited.insert(name.clone()) {
                return CaaEvaluation::failed(
                    CheckStatus::DnsLookupFailure,
                    details,
                    format!("alias loop detected at {}", name),
                );
            }
            details.queried_names.push(name.to_string());
            debug!("CAA lookup at {}", name);

            let lookup = match resolver.lookup(&name).await {
                Ok(lookup) => lookup,
                Err(e) => {
                    return CaaEvaluation::failed(
                        CheckStatus::DnsLookupFailure,
                        details,
                        format!("CAA lookup for {} failed: {}", name, e),
                    );
                }
            };

            if lookup.dnssec.is_failed() {
                return CaaEvaluation::failed(
                    CheckStatus::DnssecFailure,
                    details,
                    format!("DNSSEC validation failed for {}", name),
                );
            }

            if let Some(alias) = lookup.alias_target {
                alias_hops += 1;
                if alias_hops > self.max_alias_hops {
                    return CaaEvaluation::failed(
                        CheckStatus::DnsLookupFailure,
                        details,
                        format!("more than {} alias hops from {}", self.max_alias_hops, start),
                    );
                }
                debug!("{} is an alias for {}", name, alias);
                current = Some(alias);
                continue;
            }

            if !lookup.records.is_empty() {
                let decision = evaluate_record_set(&lookup.records, certificate_type, caa_domains);
                debug!("CAA record set at {}: {}", name, decision.describe());
                details.caa_record_present = true;
                details.found_at = Some(name.to_string());
                details.records = lookup.records;
                return CaaEvaluation::decided(&decision, details);
            }

            current = name.parent();
        }

        CaaEvaluation::decided(&PolicyDecision::Permit(PermitReason::NoRecords), details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::caa_resolver::{FixedCaaResolver, ResolverError};
    use mpic_domain::CaaRecord;

    fn name(s: &str) -> DomainName {
        s.parse().unwrap()
    }

    fn target(s: &str) -> TargetName {
        s.parse().unwrap()
    }

    fn domains(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    async fn run(resolver: &FixedCaaResolver, t: &str, acceptable: &[&str]) -> CaaEvaluation {
        CaaEvaluator::default()
            .evaluate(resolver, &target(t), CertificateType::TlsServer, &domains(acceptable))
            .await
    }

    #[tokio::test]
    async fn test_no_records_anywhere_permits() {
        let resolver = FixedCaaResolver::new();
        let result = run(&resolver, "a.b.example.com", &["ca.example"]).await;
        assert!(result.passed);
        assert_eq!(result.status, CheckStatus::Success);
        assert!(!result.details.caa_record_present);
        assert_eq!(
            result.details.queried_names,
            vec!["a.b.example.com", "b.example.com", "example.com", "com"]
        );
    }

    #[tokio::test]
    async fn test_governing_set_found_by_climbing() {
        let resolver = FixedCaaResolver::new()
            .with_records(name("example.com"), vec![CaaRecord::issue("caatestsuite.com")]);

        let result = run(&resolver, "deny.example.com", &["mozilla.com"]).await;
        assert!(!result.passed);
        assert_eq!(result.status, CheckStatus::PolicyReject);
        assert_eq!(result.details.found_at.as_deref(), Some("example.com"));

        let result = run(&resolver, "deny.example.com", &["caatestsuite.com"]).await;
        assert!(result.passed);
    }

    #[tokio::test]
    async fn test_irrelevant_records_stop_the_climb() {
        let resolver = FixedCaaResolver::new()
            .with_records(name("sub.example.com"), vec![CaaRecord::new(0, "iodef", "mailto:x@example.com")])
            .with_records(name("example.com"), vec![CaaRecord::issue("other.example")]);

        let result = run(&resolver, "sub.example.com", &["ca.example"]).await;
        assert!(result.passed);
        assert_eq!(resolver.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_critical_property_rejects() {
        let resolver = FixedCaaResolver::new().with_records(
            name("critical.example.com"),
            vec![
                CaaRecord::new(128, "caatestsuitedummyproperty", "test"),
                CaaRecord::issue("ca.example"),
            ],
        );
        let result = run(&resolver, "critical.example.com", &["ca.example"]).await;
        assert!(!result.passed);
        assert_eq!(result.status, CheckStatus::PolicyReject);
    }

    #[tokio::test]
    async fn test_wildcard_target_forces_wildcard_semantics() {
        let resolver = FixedCaaResolver::new().with_records(
            name("example.com"),
            vec![CaaRecord::issue("ca.example"), CaaRecord::issuewild(";")],
        );
        let plain = run(&resolver, "example.com", &["ca.example"]).await;
        assert!(plain.passed);

        let wild = run(&resolver, "*.example.com", &["ca.example"]).await;
        assert!(!wild.passed);
    }

    #[tokio::test]
    async fn test_wildcard_falls_back_to_issue() {
        let resolver = FixedCaaResolver::new()
            .with_records(name("example.com"), vec![CaaRecord::issue("ca.example")]);
        let result = CaaEvaluator::default()
            .evaluate(
                &resolver,
                &target("example.com"),
                CertificateType::TlsServerWildcard,
                &domains(&["ca.example"]),
            )
            .await;
        assert!(result.passed);
    }

    #[tokio::test]
    async fn test_cname_climbs_alias_target_chain() {
        let resolver = FixedCaaResolver::new()
            .with_cname(name("www.example.com"), name("cdn.example.net"))
            .with_records(name("example.net"), vec![CaaRecord::issue("caatestsuite.com")])
            .with_records(name("example.com"), vec![CaaRecord::issue("ca.example")]);

        let result = run(&resolver, "www.example.com", &["ca.example"]).await;
        assert!(!result.passed);
        assert_eq!(result.details.found_at.as_deref(), Some("example.net"));
        assert!(
            !resolver
                .queried_names()
                .contains(&name("example.com"))
        );
    }

    #[tokio::test]
    async fn test_cname_chain() {
        let resolver = FixedCaaResolver::new()
            .with_cname(name("a.example"), name("b.example"))
            .with_cname(name("b.example"), name("c.example"))
            .with_records(name("c.example"), vec![CaaRecord::issue("ca.example")]);
        let result = run(&resolver, "a.example", &["ca.example"]).await;
        assert!(result.passed);
        assert_eq!(result.details.queried_names, vec!["a.example", "b.example", "c.example"]);
    }

    #[tokio::test]
    async fn test_dname_followed() {
        let resolver = FixedCaaResolver::new()
            .with_dname(name("old.example"), name("new.example"))
            .with_records(name("new.example"), vec![CaaRecord::issue("caatestsuite.com")]);
        let result = run(&resolver, "www.old.example", &["mozilla.com"]).await;
        assert!(!result.passed);
        assert_eq!(result.details.found_at.as_deref(), Some("new.example"));
    }

    #[tokio::test]
    async fn test_alias_loop_is_lookup_failure() {
        let resolver = FixedCaaResolver::new()
            .with_cname(name("a.example"), name("b.example"))
            .with_cname(name("b.example"), name("a.example"));
        let result = run(&resolver, "a.example", &["ca.example"]).await;
        assert!(!result.passed);
        assert_eq!(result.status, CheckStatus::DnsLookupFailure);
    }

    #[tokio::test]
    async fn test_alias_hop_limit() {
        let resolver = FixedCaaResolver::new()
            .with_cname(name("a.example"), name("b.example"))
            .with_cname(name("b.example"), name("c.example"))
            .with_cname(name("c.example"), name("d.example"));
        let result = CaaEvaluator::new(2)
            .evaluate(&resolver, &target("a.example"), CertificateType::TlsServer, &[])
            .await;
        assert_eq!(result.status, CheckStatus::DnsLookupFailure);
    }

    #[tokio::test]
    async fn test_resolver_failure_is_not_empty() {
        let resolver = FixedCaaResolver::new()
            .with_failure(name("example.com"), ResolverError::ServFail("example.com".into()));
        let result = run(&resolver, "www.example.com", &["ca.example"]).await;
        assert!(!result.passed);
        assert_eq!(result.status, CheckStatus::DnsLookupFailure);
        assert_eq!(result.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_dnssec_failure_rejects_regardless_of_content() {
        let resolver = FixedCaaResolver::new().with_dnssec_failure(name("example.com"));
        let result = run(&resolver, "www.example.com", &["ca.example"]).await;
        assert!(!result.passed);
        assert_eq!(result.status, CheckStatus::DnssecFailure);
    }

    #[tokio::test]
    async fn test_ip_target_skips_lookup() {
        let resolver = FixedCaaResolver::new();
        let result = run(&resolver, "192.0.2.1", &["ca.example"]).await;
        assert!(result.passed);
        assert_eq!(resolver.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_acceptable_domain_order_irrelevant() {
        let resolver = FixedCaaResolver::new()
            .with_records(name("example.com"), vec![CaaRecord::new(0, "IsSuE", "CA.Example")]);
        let a = run(&resolver, "example.com", &["other.example", "ca.example"]).await;
        let b = run(&resolver, "example.com", &["ca.example", "other.example"]).await;
        assert!(a.passed);
        assert_eq!(a.passed, b.passed);
    }
}
