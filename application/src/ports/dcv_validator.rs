//! DCV validator port
//!
//! Domain control validation shares the orchestration and quorum core with
//! CAA. Only the boundary is defined here; a deployment that serves DCV
//! checks installs its own validator.

use async_trait::async_trait;
use mpic_domain::{DcvCheckParameters, Perspective};
use thiserror::Error;

/// Errors a validator can report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DcvError {
    #[error("Validation endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("Validation timed out")]
    Timeout,

    #[error("Validation error: {0}")]
    Other(String),
}

/// What a perspective observed for a DCV challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcvOutcome {
    pub passed: bool,
    /// Content found at the challenge location, if any
    pub observed: Option<String>,
}

impl DcvOutcome {
    pub fn passed(observed: impl Into<String>) -> Self {
        Self {
            passed: true,
            observed: Some(observed.into()),
        }
    }

    pub fn failed(observed: Option<String>) -> Self {
        Self {
            passed: false,
            observed,
        }
    }
}

/// Runs a DCV challenge from one perspective
#[async_trait]
pub trait DcvValidator: Send + Sync {
    async fn validate(
        &self,
        perspective: &Perspective,
        target: &str,
        parameters: &DcvCheckParameters,
    ) -> Result<DcvOutcome, DcvError>;
}
