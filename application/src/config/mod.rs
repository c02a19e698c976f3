//! Application-level configuration.
//!
//! - [`OrchestratorConfig`]: perspective pool, quorum policy, deadlines and retry limits

pub mod orchestrator_config;

pub use orchestrator_config::OrchestratorConfig;
