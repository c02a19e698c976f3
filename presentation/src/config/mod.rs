//! Presentation-level configuration
//!
//! Settings that decide how a verdict is shown, merged from the config
//! file and the command line.

use crate::cli::commands::OutputFormat as CliOutputFormat;
use mpic_domain::OutputFormat;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Show per-perspective progress while checks run
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    /// Apply command-line overrides (CLI > config file)
    pub fn with_cli_overrides(mut self, format: Option<CliOutputFormat>, quiet: bool) -> Self {
        if let Some(format) = format {
            self.format = format.into();
        }
        if quiet || self.format == OutputFormat::Json {
            self.show_progress = false;
        }
        self
    }
}
