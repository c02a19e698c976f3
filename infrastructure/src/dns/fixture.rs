//! Fixed-response zone fixtures
//!
//! Loads a TOML description of CAA answers into a
//! [`FixedCaaResolver`], so corroboration can run without touching the
//! network.
//!
//! ```toml
//! [[zone]]
//! name = "deny.basic.caatestsuite.com"
//! records = [{ flag = 0, tag = "issue", value = "caatestsuite.com" }]
//!
//! [[zone]]
//! name = "www.example.com"
//! cname = "cdn.example.net"
//!
//! [[zone]]
//! name = "broken.example"
//! failure = "servfail"
//! ```

use mpic_application::{FixedCaaResolver, ResolverError};
use mpic_domain::{CaaRecord, DomainName};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a fixture
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse fixture: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid name '{0}' in fixture")]
    InvalidName(String),

    #[error("unknown failure kind '{0}' (expected servfail, refused, timeout or unreachable)")]
    UnknownFailure(String),
}

#[derive(Debug, Default, Deserialize)]
struct ZoneFixture {
    #[serde(default)]
    zone: Vec<ZoneEntry>,
}

#[derive(Debug, Deserialize)]
struct ZoneEntry {
    name: String,
    #[serde(default)]
    records: Vec<CaaRecord>,
    cname: Option<String>,
    dname: Option<String>,
    #[serde(default)]
    dnssec_failure: bool,
    failure: Option<String>,
}

/// Load a fixture file
pub fn load_fixture(path: &Path) -> Result<FixedCaaResolver, FixtureError> {
    let text = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_fixture(&text)
}

/// Parse fixture text
pub fn parse_fixture(text: &str) -> Result<FixedCaaResolver, FixtureError> {
    let fixture: ZoneFixture = toml::from_str(text)?;
    fixture
        .zone
        .into_iter()
        .try_fold(FixedCaaResolver::new(), |resolver, entry| entry.apply(resolver))
}

impl ZoneEntry {
    fn apply(self, mut resolver: FixedCaaResolver) -> Result<FixedCaaResolver, FixtureError> {
        let name = parse_name(&self.name)?;

        if let Some(kind) = &self.failure {
            let error = match kind.to_ascii_lowercase().as_str() {
                "servfail" => ResolverError::ServFail(name.to_string()),
                "refused" => ResolverError::Refused(name.to_string()),
                "timeout" => ResolverError::Timeout,
                "unreachable" => ResolverError::Unreachable(name.to_string()),
                _ => return Err(FixtureError::UnknownFailure(kind.clone())),
            };
            return Ok(resolver.with_failure(name, error));
        }

        if let Some(target) = &self.dname {
            resolver = resolver.with_dname(name.clone(), parse_name(target)?);
        }
        if let Some(target) = &self.cname {
            resolver = resolver.with_cname(name.clone(), parse_name(target)?);
        } else if !self.records.is_empty() {
            resolver = resolver.with_records(name.clone(), self.records);
        }
        if self.dnssec_failure {
            resolver = resolver.with_dnssec_failure(name);
        }
        Ok(resolver)
    }
}

fn parse_name(raw: &str) -> Result<DomainName, FixtureError> {
    raw.parse()
        .map_err(|_| FixtureError::InvalidName(raw.to_string()))
}
