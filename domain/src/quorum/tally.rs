//! Quorum tally
//!
//! Counts perspective outcomes as they arrive and reports when the final
//! verdict is already fixed.

use serde::{Deserialize, Serialize};

/// Outcome of a quorum tally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuorumOutcome {
    /// Enough perspectives passed
    Corroborated,
    /// Too many perspectives failed for the quorum to be reached
    NotCorroborated,
    /// Outcome still depends on outstanding perspectives
    Pending,
}

impl QuorumOutcome {
    pub fn is_decided(&self) -> bool {
        !matches!(self, QuorumOutcome::Pending)
    }
}

impl std::fmt::Display for QuorumOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuorumOutcome::Corroborated => write!(f, "Corroborated"),
            QuorumOutcome::NotCorroborated => write!(f, "Not corroborated"),
            QuorumOutcome::Pending => write!(f, "Pending"),
        }
    }
}

/// Running count of perspective results against a fixed quorum
///
/// # Example
///
/// ```
/// use mpic_domain::quorum::{QuorumOutcome, QuorumTally};
///
/// let mut tally = QuorumTally::new(3, 2);
/// tally.record(true);
/// assert_eq!(tally.outcome(), QuorumOutcome::Pending);
/// tally.record(true);
/// assert_eq!(tally.outcome(), QuorumOutcome::Corroborated);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumTally {
    total: usize,
    quorum: usize,
    passed: usize,
    failed: usize,
}

impl QuorumTally {
    pub fn new(total: usize, quorum: usize) -> Self {
        Self {
            total,
            quorum,
            passed: 0,
            failed: 0,
        }
    }

    /// Build a finished tally from a list of pass/fail flags
    pub fn from_results(quorum: usize, passed: impl IntoIterator<Item = bool>) -> Self {
        let flags: Vec<bool> = passed.into_iter().collect();
        let mut tally = Self::new(flags.len(), quorum);
        for flag in flags {
            tally.record(flag);
        }
        tally
    }

    pub fn record(&mut self, passed: bool) {
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn quorum(&self) -> usize {
        self.quorum
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn outstanding(&self) -> usize {
        self.total.saturating_sub(self.passed + self.failed)
    }

    /// The quorum verdict: `passed >= quorum`
    pub fn is_valid(&self) -> bool {
        self.quorum > 0 && self.passed >= self.quorum
    }

    /// Whether the verdict can still change
    pub fn outcome(&self) -> QuorumOutcome {
        if self.is_valid() {
            QuorumOutcome::Corroborated
        } else if self.passed + self.outstanding() < self.quorum {
            QuorumOutcome::NotCorroborated
        } else {
            QuorumOutcome::Pending
        }
    }

    /// Generate a visual summary (e.g., "[●●○]")
    pub fn summary(results: impl IntoIterator<Item = bool>) -> String {
        let mut summary = String::from("[");
        for passed in results {
            summary.push(if passed { '●' } else { '○' });
        }
        summary.push(']');
        summary
    }
}
