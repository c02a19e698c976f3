//! Orchestration parameters
//!
//! [`OrchestrationParameters`] is what a request asks for; every field is
//! optional and falls back to deployment defaults.
//! [`ResolvedOrchestrationParameters`] is what was actually used and is
//! echoed back in the response.

use serde::{Deserialize, Serialize};

/// Request-level orchestration parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrchestrationParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quorum_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<usize>,
}

impl OrchestrationParameters {
    pub fn new(perspective_count: usize, quorum_count: usize) -> Self {
        Self {
            perspective_count: Some(perspective_count),
            quorum_count: Some(quorum_count),
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

/// Orchestration parameters after defaults and validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOrchestrationParameters {
    pub perspective_count: usize,
    pub quorum_count: usize,
    /// Upper bound on attempts while planning; attempts used once reported
    pub attempt_count: usize,
}

impl ResolvedOrchestrationParameters {
    pub fn with_attempt_count(mut self, attempt_count: usize) -> Self {
        self.attempt_count = attempt_count;
        self
    }
}
