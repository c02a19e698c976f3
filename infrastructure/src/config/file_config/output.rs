//! `[output]` section: how verdicts are rendered by the binary

use mpic_domain::OutputFormat;
use serde::{Deserialize, Serialize};

/// Rendering preferences; the command line overrides each of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// `None` leaves the choice to the presentation default (summary)
    pub format: Option<OutputFormat>,
    pub color: bool,
    /// Per-perspective progress on stderr while an attempt runs
    pub show_progress: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            show_progress: true,
        }
    }
}
