//! Infrastructure layer for open-mpic
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod dns;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileCaaConfig, FileConfig, FileLoggingConfig,
    FileOrchestrationConfig, FileOutputConfig, FilePerspectiveConfig,
};
pub use dns::{
    FixtureError, HickoryCaaResolver, HickoryOptions, build_resolver_map, load_fixture,
};
pub use logging::JsonlAuditLogger;
