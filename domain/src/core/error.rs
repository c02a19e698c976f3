//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// These are raised when parsing raw strings into domain value objects.
/// Request-level problems are reported as
/// [`ValidationIssue`](crate::request::validation::ValidationIssue)s instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown check type: {0}")]
    UnknownCheckType(String),

    #[error("Unknown certificate type: {0}")]
    UnknownCertificateType(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Unknown regional internet registry: {0}")]
    UnknownRir(String),

    #[error("Invalid quorum rule: {0}")]
    InvalidQuorumRule(String),
}

impl DomainError {
    /// Check if this error came from an unroutable check type
    pub fn is_unknown_check_type(&self) -> bool {
        matches!(self, DomainError::UnknownCheckType(_))
    }
}
