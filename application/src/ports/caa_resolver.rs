//! CAA resolver port
//!
//! Defines how the CAA evaluator looks up record sets. Each perspective gets
//! its own resolver instance through a [`ResolverProvider`], so answers and
//! failures at one vantage point never leak into another.

use async_trait::async_trait;
use mpic_domain::{CaaLookup, CaaRecord, DnssecState, DomainName, Perspective};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Errors a resolver can report for a single lookup
///
/// None of these mean "no records"; the evaluator treats every variant as a
/// lookup failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error("DNS query timed out")]
    Timeout,

    #[error("Server failure (SERVFAIL) for {0}")]
    ServFail(String),

    #[error("Query refused (REFUSED) for {0}")]
    Refused(String),

    #[error("Nameserver unreachable: {0}")]
    Unreachable(String),

    #[error("Resolver unavailable for perspective {0}")]
    Unavailable(String),

    #[error("Resolver error: {0}")]
    Other(String),
}

/// Looks up the CAA record set at exactly one name
///
/// Implementations do not climb the tree; they report what exists at `name`
/// (records, or an alias to follow) and the DNSSEC state of the answer.
#[async_trait]
pub trait CaaResolver: Send + Sync {
    async fn lookup(&self, name: &DomainName) -> Result<CaaLookup, ResolverError>;
}

/// Hands out the resolver a perspective should use
pub trait ResolverProvider: Send + Sync {
    fn resolver_for(&self, perspective: &Perspective) -> Result<Arc<dyn CaaResolver>, ResolverError>;
}

/// Every perspective shares one resolver
pub struct SharedResolverProvider {
    resolver: Arc<dyn CaaResolver>,
}

impl SharedResolverProvider {
    pub fn new(resolver: Arc<dyn CaaResolver>) -> Self {
        Self { resolver }
    }
}

impl ResolverProvider for SharedResolverProvider {
    fn resolver_for(&self, _perspective: &Perspective) -> Result<Arc<dyn CaaResolver>, ResolverError> {
        Ok(Arc::clone(&self.resolver))
    }
}

/// Resolvers keyed by perspective code
///
/// Perspectives without an entry fall back to `fallback` when one is set,
/// and otherwise report [`ResolverError::Unavailable`].
#[derive(Default)]
pub struct PerspectiveResolverMap {
    resolvers: HashMap<String, Arc<dyn CaaResolver>>,
    fallback: Option<Arc<dyn CaaResolver>>,
}

impl PerspectiveResolverMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(mut self, code: impl Into<String>, resolver: Arc<dyn CaaResolver>) -> Self {
        self.resolvers.insert(code.into(), resolver);
        self
    }

    pub fn with_fallback(mut self, resolver: Arc<dyn CaaResolver>) -> Self {
        self.fallback = Some(resolver);
        self
    }
}

impl ResolverProvider for PerspectiveResolverMap {
    fn resolver_for(&self, perspective: &Perspective) -> Result<Arc<dyn CaaResolver>, ResolverError> {
        self.resolvers
            .get(&perspective.code)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| ResolverError::Unavailable(perspective.code.clone()))
    }
}

/// Resolver that serves answers from a fixed table
///
/// Names without an entry have no records. DNAME entries synthesise an
/// alias for every name strictly below the owner. Every lookup is recorded
/// so callers can assert which names were (or were not) queried.
#[derive(Default)]
pub struct FixedCaaResolver {
    answers: HashMap<DomainName, Result<CaaLookup, ResolverError>>,
    dnames: Vec<(DomainName, DomainName)>,
    delay: Option<Duration>,
    queried: Mutex<Vec<DomainName>>,
}

impl FixedCaaResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, name: DomainName, records: Vec<CaaRecord>) -> Self {
        self.answers
            .insert(name, Ok(CaaLookup::with_records(records)));
        self
    }

    /// `name` is a CNAME pointing at `target`
    pub fn with_cname(mut self, name: DomainName, target: DomainName) -> Self {
        self.answers.insert(name, Ok(CaaLookup::alias(target)));
        self
    }

    /// Names below `owner` are rewritten onto `target`
    pub fn with_dname(mut self, owner: DomainName, target: DomainName) -> Self {
        self.dnames.push((owner, target));
        self
    }

    /// Answers at `name` fail DNSSEC validation
    pub fn with_dnssec_failure(mut self, name: DomainName) -> Self {
        let lookup = match self.answers.remove(&name) {
            Some(Ok(lookup)) => lookup,
            _ => CaaLookup::empty(),
        };
        self.answers
            .insert(name, Ok(lookup.with_dnssec(DnssecState::Failed)));
        self
    }

    pub fn with_failure(mut self, name: DomainName, error: ResolverError) -> Self {
        self.answers.insert(name, Err(error));
        self
    }

    /// Sleep before answering every lookup
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn lookup_count(&self) -> usize {
        self.queried.lock().map(|q| q.len()).unwrap_or(0)
    }

    /// Names looked up so far, in order
    pub fn queried_names(&self) -> Vec<DomainName> {
        self.queried.lock().map(|q| q.clone()).unwrap_or_default()
    }

    fn answer(&self, name: &DomainName) -> Result<CaaLookup, ResolverError> {
        if let Some(answer) = self.answers.get(name) {
            return answer.clone();
        }
        let synthesised = self
            .dnames
            .iter()
            .find_map(|(owner, target)| name.replace_suffix(owner, target));
        Ok(synthesised.map(CaaLookup::alias).unwrap_or_default())
    }
}

#[async_trait]
impl CaaResolver for FixedCaaResolver {
    async fn lookup(&self, name: &DomainName) -> Result<CaaLookup, ResolverError> {
        if let Ok(mut queried) = self.queried.lock() {
            queried.push(name.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpic_domain::Rir;

    fn name(s: &str) -> DomainName {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_fixed_resolver_answers() {
        let resolver = FixedCaaResolver::new()
            .with_records(name("example.com"), vec![CaaRecord::issue("ca.example")])
            .with_cname(name("www.example.com"), name("cdn.example.net"))
            .with_failure(name("broken.example"), ResolverError::ServFail("broken.example".into()));

        let lookup = resolver.lookup(&name("example.com")).await.unwrap();
        assert_eq!(lookup.records.len(), 1);

        let lookup = resolver.lookup(&name("www.example.com")).await.unwrap();
        assert_eq!(lookup.alias_target, Some(name("cdn.example.net")));

        let lookup = resolver.lookup(&name("unknown.example")).await.unwrap();
        assert_eq!(lookup, CaaLookup::empty());

        assert!(resolver.lookup(&name("broken.example")).await.is_err());
        assert_eq!(resolver.lookup_count(), 4);
    }

    #[tokio::test]
    async fn test_dname_synthesises_alias() {
        let resolver =
            FixedCaaResolver::new().with_dname(name("old.example"), name("new.example"));
        let lookup = resolver.lookup(&name("www.old.example")).await.unwrap();
        assert_eq!(lookup.alias_target, Some(name("www.new.example")));

        let lookup = resolver.lookup(&name("old.example")).await.unwrap();
        assert!(lookup.alias_target.is_none());
    }

    #[tokio::test]
    async fn test_dnssec_failure_keeps_records() {
        let resolver = FixedCaaResolver::new()
            .with_records(name("signed.example"), vec![CaaRecord::issue("ca.example")])
            .with_dnssec_failure(name("signed.example"));
        let lookup = resolver.lookup(&name("signed.example")).await.unwrap();
        assert!(lookup.dnssec.is_failed());
        assert_eq!(lookup.records.len(), 1);
    }

    #[test]
    fn test_resolver_map_fallback() {
        let fixed: Arc<dyn CaaResolver> = Arc::new(FixedCaaResolver::new());
        let p1 = Perspective::new("us-east-1", Rir::Arin);
        let p2 = Perspective::new("eu-west-1", Rir::Ripe);

        let map = PerspectiveResolverMap::new().with_resolver("us-east-1", Arc::clone(&fixed));
        assert!(map.resolver_for(&p1).is_ok());
        assert_eq!(
            map.resolver_for(&p2).err(),
            Some(ResolverError::Unavailable("eu-west-1".to_string()))
        );

        let map = map.with_fallback(fixed);
        assert!(map.resolver_for(&p2).is_ok());
    }
}
