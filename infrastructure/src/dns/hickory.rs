//! hickory-resolver adapter for the CAA resolver port
//!
//! Each perspective gets its own `TokioAsyncResolver` with caching disabled,
//! so every lookup goes to that perspective's nameservers.

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::error::ProtoErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::rdata::caa::{CAA, Value};
use hickory_resolver::proto::rr::{RData, RecordType};
use mpic_application::{CaaResolver, PerspectiveResolverMap, ResolverError};
use mpic_domain::{CRITICAL_FLAG, CaaLookup, CaaRecord, DnssecState, DomainName};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{FileCaaConfig, FilePerspectiveConfig};

/// Resolver settings shared by every perspective
#[derive(Debug, Clone, Copy)]
pub struct HickoryOptions {
    pub timeout: Duration,
    pub validate_dnssec: bool,
}

impl From<&FileCaaConfig> for HickoryOptions {
    fn from(config: &FileCaaConfig) -> Self {
        Self {
            timeout: config.resolver_timeout(),
            validate_dnssec: config.dnssec_validation,
        }
    }
}

/// CAA lookups through hickory-resolver
pub struct HickoryCaaResolver {
    resolver: TokioAsyncResolver,
    validate_dnssec: bool,
}

impl HickoryCaaResolver {
    /// Query `nameservers` on `port`; an empty list uses hickory's defaults
    pub fn new(nameservers: &[IpAddr], port: u16, options: HickoryOptions) -> Self {
        let config = if nameservers.is_empty() {
            ResolverConfig::default()
        } else {
            ResolverConfig::from_parts(
                None,
                vec![],
                NameServerConfigGroup::from_ips_clear(nameservers, port, true),
            )
        };

        let mut opts = ResolverOpts::default();
        opts.timeout = options.timeout;
        opts.attempts = 2;
        opts.cache_size = 0;
        opts.preserve_intermediates = true;
        opts.validate = options.validate_dnssec;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            validate_dnssec: options.validate_dnssec,
        }
    }

    fn dnssec_state(&self) -> DnssecState {
        if self.validate_dnssec {
            DnssecState::Validated
        } else {
            DnssecState::NotApplicable
        }
    }

    /// CNAME at `name`, if any; CAA answers with no data hide it
    async fn cname_target(&self, name: &DomainName) -> Result<Option<DomainName>, ResolveError> {
        match self.resolver.lookup(fqdn(name), RecordType::CNAME).await {
            Ok(lookup) => Ok(lookup.record_iter().find_map(|record| match record.data() {
                Some(RData::CNAME(cname)) => to_domain_name(&cname.0.to_utf8()),
                _ => None,
            })),
            Err(e) if is_empty_answer(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl CaaResolver for HickoryCaaResolver {
    async fn lookup(&self, name: &DomainName) -> Result<CaaLookup, ResolverError> {
        let lookup = match self.resolver.lookup(fqdn(name), RecordType::CAA).await {
            Ok(lookup) => lookup,
            Err(e) if is_empty_answer(&e) => {
                debug!("No CAA records at {}", name);
                let alias = match self.cname_target(name).await {
                    Ok(alias) => alias,
                    Err(e) => return failed_lookup(name, &e),
                };
                let lookup = match alias {
                    Some(target) => CaaLookup::alias(target),
                    None => CaaLookup::empty(),
                };
                return Ok(lookup.with_dnssec(self.dnssec_state()));
            }
            Err(e) => return failed_lookup(name, &e),
        };

        let mut alias_target = None;
        let mut records = Vec::new();
        for record in lookup.record_iter() {
            match record.data() {
                Some(RData::CNAME(cname)) if alias_target.is_none() => {
                    alias_target = to_domain_name(&cname.0.to_utf8());
                }
                Some(RData::CAA(caa)) => records.push(to_caa_record(caa)),
                _ => {}
            }
        }

        let lookup = match alias_target {
            Some(target) => CaaLookup::alias(target),
            None => CaaLookup::with_records(records),
        };
        Ok(lookup.with_dnssec(self.dnssec_state()))
    }
}

/// Build one resolver per configured perspective
pub fn build_resolver_map(
    perspectives: &[FilePerspectiveConfig],
    options: HickoryOptions,
) -> PerspectiveResolverMap {
    perspectives.iter().fold(PerspectiveResolverMap::new(), |map, perspective| {
        let (nameservers, _) = perspective.parse_nameservers();
        let resolver = HickoryCaaResolver::new(&nameservers, perspective.port, options);
        map.with_resolver(perspective.code.clone(), Arc::new(resolver))
    })
}

fn fqdn(name: &DomainName) -> String {
    format!("{}.", name)
}

fn to_domain_name(raw: &str) -> Option<DomainName> {
    raw.parse().ok()
}

fn to_caa_record(caa: &CAA) -> CaaRecord {
    let flag = if caa.issuer_critical() { CRITICAL_FLAG } else { 0 };
    let value = match caa.value() {
        Value::Issuer(name, params) => {
            let issuer = name
                .as_ref()
                .map(|n| n.to_utf8().trim_end_matches('.').to_string())
                .unwrap_or_default();
            let params: Vec<String> = params
                .iter()
                .map(|kv| format!("{}={}", kv.key(), kv.value()))
                .collect();
            if params.is_empty() && issuer.is_empty() {
                ";".to_string()
            } else if params.is_empty() {
                issuer
            } else {
                format!("{}; {}", issuer, params.join("; "))
            }
        }
        Value::Url(url) => url.to_string(),
        Value::Unknown(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    };
    CaaRecord::new(flag, caa.tag().as_str(), value)
}

/// NOERROR/NODATA and NXDOMAIN both mean "nothing here"
fn is_empty_answer(error: &ResolveError) -> bool {
    matches!(
        error.kind(),
        ResolveErrorKind::NoRecordsFound { response_code, .. }
            if *response_code == ResponseCode::NoError || *response_code == ResponseCode::NXDomain
    )
}

/// Error text hickory's DNSSEC verifier uses for validation failures
const DNSSEC_FAILURE_MARKERS: &[&str] = &["validat", "verify", "rrsig", "dnskey", "nsec", "dnssec"];

fn is_dnssec_failure(error: &ResolveError) -> bool {
    let ResolveErrorKind::Proto(proto) = error.kind() else {
        return false;
    };
    let text = match proto.kind() {
        ProtoErrorKind::RrsigsNotPresent { .. } => return true,
        ProtoErrorKind::Message(text) => text.to_ascii_lowercase(),
        ProtoErrorKind::Msg(text) => text.to_ascii_lowercase(),
        _ => return false,
    };
    DNSSEC_FAILURE_MARKERS
        .iter()
        .any(|marker| text.contains(marker))
}

/// A query that produced no answer: DNSSEC failures become a failed lookup
fn failed_lookup(name: &DomainName, error: &ResolveError) -> Result<CaaLookup, ResolverError> {
    if is_dnssec_failure(error) {
        warn!("DNSSEC validation failed for {}: {}", name, error);
        return Ok(CaaLookup::empty().with_dnssec(DnssecState::Failed));
    }
    Err(classify(name, error))
}

fn classify(name: &DomainName, error: &ResolveError) -> ResolverError {
    match error.kind() {
        ResolveErrorKind::Timeout => ResolverError::Timeout,
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
            ResponseCode::ServFail => ResolverError::ServFail(name.to_string()),
            ResponseCode::Refused => ResolverError::Refused(name.to_string()),
            other => ResolverError::Other(format!("{} for {}", other, name)),
        },
        ResolveErrorKind::NoConnections | ResolveErrorKind::Io(_) => {
            ResolverError::Unreachable(error.to_string())
        }
        _ => ResolverError::Other(error.to_string()),
    }
}
