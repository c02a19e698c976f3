//! Port definitions (interfaces for external adapters)

pub mod audit_logger;
pub mod caa_resolver;
pub mod dcv_validator;
pub mod progress;
