//! Output format value object

use serde::{Deserialize, Serialize};

/// How a corroboration verdict is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Verdict plus every perspective result and its diagnostics
    Full,
    /// Verdict and one line per perspective (default)
    #[default]
    Summary,
    /// The response body as JSON
    Json,
}
