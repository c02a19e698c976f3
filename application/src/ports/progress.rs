//! Progress notification port
//!
//! Defines the interface for reporting progress during corroboration.

use mpic_domain::{Perspective, PerspectiveResult, QuorumTally};

/// Callback for progress updates during corroboration
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain lines, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when an attempt starts on a cohort
    fn on_attempt_start(&self, attempt: usize, cohort: &[Perspective]);

    /// Called as each perspective reports back
    fn on_perspective_complete(&self, result: &PerspectiveResult);

    /// Called when an attempt's results are all in
    fn on_attempt_complete(&self, attempt: usize, tally: &QuorumTally);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_attempt_start(&self, _attempt: usize, _cohort: &[Perspective]) {}
    fn on_perspective_complete(&self, _result: &PerspectiveResult) {}
    fn on_attempt_complete(&self, _attempt: usize, _tally: &QuorumTally) {}
}
