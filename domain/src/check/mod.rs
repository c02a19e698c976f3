//! Check definitions
//!
//! A check is the unit of work each perspective runs. CAA and DCV share the
//! orchestration and quorum core; they differ only in the parameters carried
//! to each perspective.

pub mod check_type;
pub mod parameters;

pub use check_type::CheckType;
pub use parameters::{
    CaaCheckParameters, CertificateType, CheckParameters, DcvCheckParameters,
    DcvValidationDetails,
};
