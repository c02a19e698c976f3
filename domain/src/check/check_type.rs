//! Check type: the closed set of checks a perspective can run.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Kind of check corroborated across perspectives
///
/// Requests carry the check type as a raw string so that an unrecognised
/// value can be reported as a dispatch failure instead of a parse error.
///
/// # Example
///
/// ```
/// use mpic_domain::CheckType;
///
/// assert_eq!("caa".parse::<CheckType>().ok(), Some(CheckType::Caa));
/// assert_eq!("DCV".parse::<CheckType>().ok(), Some(CheckType::Dcv));
/// assert!("invalid_check_type".parse::<CheckType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckType {
    /// Certification Authority Authorization policy check
    Caa,
    /// Domain Control Validation
    Dcv,
}

impl CheckType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckType::Caa => "caa",
            CheckType::Dcv => "dcv",
        }
    }

    /// All supported check types
    pub fn all() -> &'static [CheckType] {
        &[CheckType::Caa, CheckType::Dcv]
    }
}

impl std::fmt::Display for CheckType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CheckType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "caa" => Ok(CheckType::Caa),
            "dcv" => Ok(CheckType::Dcv),
            _ => Err(DomainError::UnknownCheckType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("Caa".parse::<CheckType>().unwrap(), CheckType::Caa);
        assert_eq!(" dcv ".parse::<CheckType>().unwrap(), CheckType::Dcv);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "dns-01".parse::<CheckType>().unwrap_err();
        assert!(err.is_unknown_check_type());
    }

    #[test]
    fn test_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&CheckType::Caa).unwrap(), "\"caa\"");
    }
}
