//! CAA resource records

use serde::{Deserialize, Serialize};

/// Issuer-critical bit of the CAA flags octet
pub const CRITICAL_FLAG: u8 = 0b1000_0000;

/// A single CAA record as returned by the resolver
///
/// # Example
///
/// ```
/// use mpic_domain::caa::{CaaProperty, CaaRecord};
///
/// let record = CaaRecord::new(0, "IsSuE", "caatestsuite.com; account=1");
/// assert_eq!(record.property(), CaaProperty::Issue);
/// assert_eq!(record.issuer_domain().as_deref(), Some("caatestsuite.com"));
/// assert!(!record.is_critical());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaaRecord {
    pub flag: u8,
    pub tag: String,
    pub value: String,
}

impl CaaRecord {
    pub fn new(flag: u8, tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            flag,
            tag: tag.into(),
            value: value.into(),
        }
    }

    /// Shorthand for a non-critical `issue` record
    pub fn issue(value: impl Into<String>) -> Self {
        Self::new(0, "issue", value)
    }

    /// Shorthand for a non-critical `issuewild` record
    pub fn issuewild(value: impl Into<String>) -> Self {
        Self::new(0, "issuewild", value)
    }

    pub fn is_critical(&self) -> bool {
        self.flag & CRITICAL_FLAG != 0
    }

    pub fn property(&self) -> CaaProperty {
        CaaProperty::from_tag(&self.tag)
    }

    /// Issuer domain named by an `issue`/`issuewild` value
    ///
    /// The issuer is everything before the first `;`. Returns `None` for an
    /// empty issuer (`";"`), which authorises no CA at all.
    pub fn issuer_domain(&self) -> Option<String> {
        let issuer = self
            .value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .trim_end_matches('.')
            .to_ascii_lowercase();
        (!issuer.is_empty()).then_some(issuer)
    }
}

impl std::fmt::Display for CaaRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} \"{}\"", self.flag, self.tag, self.value)
    }
}

/// Property tags this evaluator understands
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CaaProperty {
    Issue,
    IssueWild,
    Iodef,
    IssueMail,
    IssueVmc,
    ContactEmail,
    ContactPhone,
    /// Any other tag, lowercased
    Unknown(String),
}

impl CaaProperty {
    /// Case-insensitive tag lookup
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "issue" => CaaProperty::Issue,
            "issuewild" => CaaProperty::IssueWild,
            "iodef" => CaaProperty::Iodef,
            "issuemail" => CaaProperty::IssueMail,
            "issuevmc" => CaaProperty::IssueVmc,
            "contactemail" => CaaProperty::ContactEmail,
            "contactphone" => CaaProperty::ContactPhone,
            other => CaaProperty::Unknown(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, CaaProperty::Unknown(_))
    }
}
