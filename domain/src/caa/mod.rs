//! CAA (Certification Authority Authorization) domain
//!
//! Value objects and pure policy for CAA evaluation. The tree climb that
//! drives a resolver lives in the application layer; everything here is
//! synchronous and side-effect free.

pub mod lookup;
pub mod name;
pub mod policy;
pub mod record;

pub use lookup::{CaaLookup, DnssecState};
pub use name::{DomainName, TargetName};
pub use policy::{PermitReason, PolicyDecision, RejectReason, evaluate_record_set};
pub use record::{CRITICAL_FLAG, CaaProperty, CaaRecord};
