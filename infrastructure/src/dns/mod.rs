//! DNS adapters implementing the CAA resolver port
//!
//! - [`hickory`]: live lookups, one resolver per perspective
//! - [`fixture`]: fixed answers loaded from a TOML zone description

pub mod fixture;
pub mod hickory;

pub use fixture::{FixtureError, load_fixture, parse_fixture};
pub use hickory::{HickoryCaaResolver, HickoryOptions, build_resolver_map};
