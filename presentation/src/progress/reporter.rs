//! Progress reporting for corroboration runs

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use mpic_application::ports::progress::ProgressNotifier;
use mpic_domain::{Perspective, PerspectiveResult, QuorumTally};
use std::sync::Mutex;

/// Reports progress with one bar per attempt
pub struct ProgressReporter {
    multi: MultiProgress,
    attempt_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            attempt_bar: Mutex::new(None),
        }
    }

    fn attempt_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn result_line(result: &PerspectiveResult) -> String {
        if result.check_passed {
            format!("{} {}", "v".green(), result.perspective)
        } else {
            format!(
                "{} {} ({})",
                "x".red(),
                result.perspective,
                result.status_detail.as_str()
            )
        }
    }

    fn tally_line(tally: &QuorumTally) -> String {
        let verdict = if tally.is_valid() {
            "corroborated".green()
        } else {
            "not corroborated".red()
        };
        format!("{}/{} passed, {}", tally.passed(), tally.total(), verdict)
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_attempt_start(&self, attempt: usize, cohort: &[Perspective]) {
        let pb = self.multi.add(ProgressBar::new(cohort.len() as u64));
        pb.set_style(Self::attempt_style());
        pb.set_prefix(format!("Attempt {}", attempt));
        pb.set_message("Querying perspectives...");

        if let Ok(mut slot) = self.attempt_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_perspective_complete(&self, result: &PerspectiveResult) {
        if let Ok(slot) = self.attempt_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(Self::result_line(result));
            pb.inc(1);
        }
    }

    fn on_attempt_complete(&self, _attempt: usize, tally: &QuorumTally) {
        if let Ok(mut slot) = self.attempt_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(Self::tally_line(tally));
        }
    }
}

/// Plain line-based progress on stderr (no bars)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_attempt_start(&self, attempt: usize, cohort: &[Perspective]) {
        let codes: Vec<&str> = cohort.iter().map(|p| p.code.as_str()).collect();
        eprintln!(
            "{} {} ({})",
            "->".cyan(),
            format!("Attempt {}", attempt).bold(),
            codes.join(", ")
        );
    }

    fn on_perspective_complete(&self, result: &PerspectiveResult) {
        eprintln!("  {}", ProgressReporter::result_line(result));
    }

    fn on_attempt_complete(&self, _attempt: usize, tally: &QuorumTally) {
        eprintln!("  {}", ProgressReporter::tally_line(tally));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpic_domain::{CheckStatus, CheckType, Rir};

    #[test]
    fn test_result_line_includes_status_on_failure() {
        colored::control::set_override(false);
        let p = Perspective::new("us-east-1", Rir::Arin);
        let failed = PerspectiveResult::timeout(&p, CheckType::Caa);
        assert_eq!(ProgressReporter::result_line(&failed), "x us-east-1 (timeout)");

        let passed = PerspectiveResult::new(&p, CheckType::Caa, true, CheckStatus::Success);
        assert_eq!(ProgressReporter::result_line(&passed), "v us-east-1");
    }

    #[test]
    fn test_reporter_without_attempt_is_noop() {
        let reporter = ProgressReporter::new();
        let p = Perspective::new("eu-west-1", Rir::Ripe);
        reporter.on_perspective_complete(&PerspectiveResult::timeout(&p, CheckType::Caa));
        reporter.on_attempt_complete(1, &QuorumTally::new(1, 1));
    }
}
