//! Orchestration domain: how many perspectives, how many must agree, how
//! many attempts.

pub mod parameters;

pub use parameters::{OrchestrationParameters, ResolvedOrchestrationParameters};
