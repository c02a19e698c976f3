//! Domain layer for open-mpic
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Multi-Perspective Issuance Corroboration
//!
//! A check (CAA or DCV) is run from several network perspectives at once.
//! The result is trusted only when at least `quorum_count` of them agree:
//!
//! - **Cohort**: the perspectives one attempt runs on, spread across RIRs
//! - **Quorum**: how many passes make the verdict valid
//! - **Attempt**: one cohort's run; a failed attempt may be retried on the next cohort
//!
//! ## CAA policy
//!
//! [`caa::evaluate_record_set`] decides whether a CA may issue for a name
//! given the record set that governs it. Finding that record set (tree
//! climbing, alias following) is done by the application layer.

pub mod caa;
pub mod check;
pub mod config;
pub mod core;
pub mod orchestration;
pub mod perspective;
pub mod quorum;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use caa::{
    CRITICAL_FLAG, CaaLookup, CaaProperty, CaaRecord, DnssecState, DomainName, PolicyDecision,
    TargetName, evaluate_record_set,
};
pub use check::{
    CaaCheckParameters, CertificateType, CheckParameters, CheckType, DcvCheckParameters,
    DcvValidationDetails,
};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::error::DomainError;
pub use orchestration::{OrchestrationParameters, ResolvedOrchestrationParameters};
pub use perspective::{Perspective, Rir, build_cohorts};
pub use quorum::{QuorumOutcome, QuorumRule, QuorumTally};
pub use request::{MpicRequest, ValidationIssue, ValidationIssueCode, ValidationPolicy};
pub use response::{
    CaaCheckDetails, CheckDetails, CheckStatus, DcvCheckDetails, ErrorResponse, MpicResponse,
    PerspectiveResult,
};
