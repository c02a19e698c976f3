//! Request boundary: the request shape and its validation rules

pub mod entities;
pub mod validation;

pub use entities::MpicRequest;
pub use validation::{
    REQUEST_VALIDATION_FAILED, ValidationIssue, ValidationIssueCode, ValidationPolicy,
    resolve_orchestration, validate_check_parameters, validate_target,
};
