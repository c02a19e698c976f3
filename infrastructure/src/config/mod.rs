//! Configuration file loading for open-mpic
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `MPIC_` environment variables (`MPIC_ORCHESTRATION__EARLY_TERMINATION=true`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./mpic.toml` or `./.mpic.toml`
//! 4. Global: `$XDG_CONFIG_HOME/open-mpic/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileCaaConfig, FileConfig, FileLoggingConfig, FileOrchestrationConfig,
    FileOutputConfig, FilePerspectiveConfig, default_perspectives,
};
pub use loader::ConfigLoader;
