//! Application layer for open-mpic
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::OrchestratorConfig;
pub use ports::{
    audit_logger::{AuditEvent, AuditLogger, NoAuditLogger},
    caa_resolver::{
        CaaResolver, FixedCaaResolver, PerspectiveResolverMap, ResolverError, ResolverProvider,
        SharedResolverProvider,
    },
    dcv_validator::{DcvError, DcvOutcome, DcvValidator},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::corroborate::{
    CHECK_DISPATCH_FAILED, CorroborateUseCase, CorroborationError, REQUEST_VALIDATION_FAILED,
};
pub use use_cases::evaluate_caa::{CaaEvaluation, CaaEvaluator};
pub use use_cases::run_perspective_check::PerspectiveCheckRunner;
