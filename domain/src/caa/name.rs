//! Normalised DNS names used while climbing the CAA tree

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// A fully-qualified domain name, lowercased, without trailing dot
///
/// # Example
///
/// ```
/// use mpic_domain::DomainName;
///
/// let name: DomainName = "Sub1.Deny.Basic.CAATestSuite.com.".parse().unwrap();
/// assert_eq!(name.as_str(), "sub1.deny.basic.caatestsuite.com");
/// assert_eq!(name.parent().unwrap().as_str(), "deny.basic.caatestsuite.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    pub fn label_count(&self) -> usize {
        self.labels().count()
    }

    /// The name with its leftmost label removed
    ///
    /// Returns `None` at a single-label (top-level) name.
    pub fn parent(&self) -> Option<DomainName> {
        self.0
            .split_once('.')
            .map(|(_, rest)| DomainName(rest.to_string()))
    }

    /// Whether `self` is strictly below `ancestor`
    pub fn is_subdomain_of(&self, ancestor: &DomainName) -> bool {
        self.0.len() > ancestor.0.len()
            && self.0.ends_with(ancestor.as_str())
            && self.0.as_bytes()[self.0.len() - ancestor.0.len() - 1] == b'.'
    }

    /// Replace the `from` suffix with `to` (DNAME substitution)
    ///
    /// Returns `None` when `self` is not strictly below `from`.
    pub fn replace_suffix(&self, from: &DomainName, to: &DomainName) -> Option<DomainName> {
        if !self.is_subdomain_of(from) {
            return None;
        }
        let prefix = &self.0[..self.0.len() - from.0.len()];
        format!("{}{}", prefix, to.as_str()).parse().ok()
    }
}

impl std::fmt::Display for DomainName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DomainName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidDomainName(s.to_string());
        let normalized = s.trim().trim_end_matches('.').to_ascii_lowercase();

        if normalized.is_empty() || normalized.len() > MAX_NAME_LEN {
            return Err(invalid());
        }

        for label in normalized.split('.') {
            if label.is_empty() || label.len() > MAX_LABEL_LEN {
                return Err(invalid());
            }
            let valid_chars = label
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
            if !valid_chars || label.starts_with('-') || label.ends_with('-') {
                return Err(invalid());
            }
        }

        Ok(DomainName(normalized))
    }
}

impl TryFrom<String> for DomainName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DomainName> for String {
    fn from(name: DomainName) -> Self {
        name.0
    }
}

/// What a request's `domain_or_ip_target` turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetName {
    /// A plain domain name
    Domain(DomainName),
    /// `*.` prefixed name; the wildcard label is stripped
    Wildcard(DomainName),
    /// An IPv4 or IPv6 literal
    IpAddress(std::net::IpAddr),
}

impl TargetName {
    /// The name CAA evaluation starts from, if any
    pub fn domain(&self) -> Option<&DomainName> {
        match self {
            TargetName::Domain(name) | TargetName::Wildcard(name) => Some(name),
            TargetName::IpAddress(_) => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, TargetName::Wildcard(_))
    }
}

impl std::str::FromStr for TargetName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let unbracketed = trimmed.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = unbracketed.parse::<std::net::IpAddr>() {
            return Ok(TargetName::IpAddress(ip));
        }
        if let Some(rest) = trimmed.strip_prefix("*.") {
            return rest.parse().map(TargetName::Wildcard);
        }
        trimmed.parse().map(TargetName::Domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> DomainName {
        s.parse().unwrap()
    }

    #[test]
    fn test_normalization() {
        assert_eq!(name("Example.COM.").as_str(), "example.com");
        assert_eq!(name("  example.com ").as_str(), "example.com");
    }

    #[test]
    fn test_invalid_names() {
        assert!("".parse::<DomainName>().is_err());
        assert!("exa mple.com".parse::<DomainName>().is_err());
        assert!("example..com".parse::<DomainName>().is_err());
        assert!("-example.com".parse::<DomainName>().is_err());
        assert!("<script>.com".parse::<DomainName>().is_err());
        assert!(format!("{}.com", "a".repeat(64)).parse::<DomainName>().is_err());
    }

    #[test]
    fn test_parent_chain() {
        let mut current = Some(name("sub2.sub1.deny.basic.caatestsuite.com"));
        let mut chain = Vec::new();
        while let Some(n) = current {
            chain.push(n.to_string());
            current = n.parent();
        }
        assert_eq!(
            chain,
            vec![
                "sub2.sub1.deny.basic.caatestsuite.com",
                "sub1.deny.basic.caatestsuite.com",
                "deny.basic.caatestsuite.com",
                "basic.caatestsuite.com",
                "caatestsuite.com",
                "com",
            ]
        );
    }

    #[test]
    fn test_is_subdomain_of() {
        assert!(name("a.example.com").is_subdomain_of(&name("example.com")));
        assert!(!name("badexample.com").is_subdomain_of(&name("example.com")));
        assert!(!name("example.com").is_subdomain_of(&name("example.com")));
    }

    #[test]
    fn test_replace_suffix() {
        let replaced = name("www.old.example")
            .replace_suffix(&name("old.example"), &name("new.example"))
            .unwrap();
        assert_eq!(replaced.as_str(), "www.new.example");
        assert!(
            name("old.example")
                .replace_suffix(&name("old.example"), &name("new.example"))
                .is_none()
        );
    }

    #[test]
    fn test_target_name() {
        assert!(matches!(
            "example.com".parse::<TargetName>().unwrap(),
            TargetName::Domain(_)
        ));
        let wildcard: TargetName = "*.example.com".parse().unwrap();
        assert!(wildcard.is_wildcard());
        assert_eq!(wildcard.domain().unwrap().as_str(), "example.com");
        assert!(matches!(
            "2001:db8::1".parse::<TargetName>().unwrap(),
            TargetName::IpAddress(_)
        ));
        assert!(matches!(
            "192.0.2.1".parse::<TargetName>().unwrap(),
            TargetName::IpAddress(_)
        ));
    }

    #[test]
    fn test_serde_roundtrip_normalizes() {
        let parsed: DomainName = serde_json::from_str("\"WWW.Example.com.\"").unwrap();
        assert_eq!(parsed.as_str(), "www.example.com");
        assert!(serde_json::from_str::<DomainName>("\"bad name\"").is_err());
    }
}
