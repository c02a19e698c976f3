//! Output formatter trait

use mpic_domain::{ErrorResponse, MpicResponse};

/// Trait for rendering corroboration results
pub trait OutputFormatter {
    /// Verdict plus every perspective's diagnostics
    fn format(&self, response: &MpicResponse) -> String;

    /// Response body as JSON
    fn format_json(&self, response: &MpicResponse) -> String;

    /// Verdict and one line per perspective
    fn format_summary(&self, response: &MpicResponse) -> String;

    /// A request rejected before any perspective ran
    fn format_error(&self, error: &ErrorResponse) -> String;
}
