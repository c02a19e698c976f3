//! Quorum corroboration domain
//!
//! A result is trusted only when at least `quorum_count` independent
//! perspectives agree that the check passed.
//!
//! ```text
//! perspectives:  [pass] [pass] [fail]
//!                   \      |      /
//!                    QuorumTally (quorum_count = 2)
//!                          |
//!                   is_valid = 2 >= 2
//! ```
//!
//! The legal range of `quorum_count` is set by the deployment's
//! [`QuorumRule`].

pub mod rule;
pub mod tally;

pub use rule::QuorumRule;
pub use tally::{QuorumOutcome, QuorumTally};
