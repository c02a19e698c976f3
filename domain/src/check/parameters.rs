//! Check-type-specific request parameters

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Certificate profile being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CertificateType {
    /// Regular (non-wildcard) TLS server certificate
    #[default]
    #[serde(rename = "tls-server")]
    TlsServer,
    /// Wildcard TLS server certificate
    #[serde(rename = "tls-server:wildcard")]
    TlsServerWildcard,
}

impl CertificateType {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, CertificateType::TlsServerWildcard)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateType::TlsServer => "tls-server",
            CertificateType::TlsServerWildcard => "tls-server:wildcard",
        }
    }
}

impl std::fmt::Display for CertificateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CertificateType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tls-server" | "regular" => Ok(CertificateType::TlsServer),
            "tls-server:wildcard" | "wildcard" => Ok(CertificateType::TlsServerWildcard),
            _ => Err(DomainError::UnknownCertificateType(s.to_string())),
        }
    }
}

/// Parameters for a CAA check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaaCheckParameters {
    #[serde(default)]
    pub certificate_type: CertificateType,
    /// Acceptable CAA issuer identities (e.g. `"letsencrypt.org"`)
    #[serde(default)]
    pub caa_domains: Vec<String>,
}

impl CaaCheckParameters {
    pub fn new(certificate_type: CertificateType, caa_domains: Vec<String>) -> Self {
        Self {
            certificate_type,
            caa_domains,
        }
    }
}

/// How a DCV challenge is expected to be published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "validation_method", rename_all = "kebab-case")]
pub enum DcvValidationDetails {
    /// Challenge served over HTTP at `http_token_path`
    HttpGeneric {
        http_token_path: String,
        challenge_value: String,
    },
    /// Challenge published in a DNS record at `<dns_name_prefix>.<target>`
    DnsGeneric {
        #[serde(default)]
        dns_name_prefix: Option<String>,
        dns_record_type: String,
        challenge_value: String,
    },
}

impl DcvValidationDetails {
    pub fn challenge_value(&self) -> &str {
        match self {
            DcvValidationDetails::HttpGeneric {
                challenge_value, ..
            }
            | DcvValidationDetails::DnsGeneric {
                challenge_value, ..
            } => challenge_value,
        }
    }

    pub fn method_name(&self) -> &'static str {
        match self {
            DcvValidationDetails::HttpGeneric { .. } => "http-generic",
            DcvValidationDetails::DnsGeneric { .. } => "dns-generic",
        }
    }
}

/// Parameters for a DCV check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DcvCheckParameters {
    pub validation_details: DcvValidationDetails,
}

/// Validated, check-type-specific parameters handed to every perspective
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckParameters {
    Caa(CaaCheckParameters),
    Dcv(DcvCheckParameters),
}

impl CheckParameters {
    pub fn check_type(&self) -> super::CheckType {
        match self {
            CheckParameters::Caa(_) => super::CheckType::Caa,
            CheckParameters::Dcv(_) => super::CheckType::Dcv,
        }
    }
}
