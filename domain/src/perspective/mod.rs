//! Perspectives: the network vantage points a check is corroborated from

pub mod cohort;
pub mod entities;

pub use cohort::{build_cohorts, rir_count};
pub use entities::{Perspective, Rir};
