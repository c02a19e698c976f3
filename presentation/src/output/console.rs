//! Console output formatter for corroboration results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use mpic_domain::{CheckDetails, ErrorResponse, MpicResponse, PerspectiveResult};

/// Formats corroboration results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete response
    pub fn format(response: &MpicResponse) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("MPIC Corroboration"));
        output.push('\n');
        output.push_str(&Self::overview(response));

        output.push_str(&Self::section_header("Final Attempt"));
        for result in &response.perspectives {
            output.push_str(&Self::perspective_block(result));
        }

        for (index, attempt) in response.previous_attempt_results.iter().enumerate() {
            output.push_str(&Self::section_header(&format!("Attempt {}", index + 1)));
            for result in attempt {
                output.push_str(&Self::perspective_line(result));
            }
        }

        output.push_str(&format!("\n{}\n", Self::verdict(response)));
        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(response: &MpicResponse) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the verdict and one line per perspective
    pub fn format_summary(response: &MpicResponse) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", Self::verdict(response)));
        output.push_str(&Self::overview(response));
        for result in &response.perspectives {
            output.push_str(&Self::perspective_line(result));
        }

        output
    }

    /// Format a rejected request
    pub fn format_error(error: &ErrorResponse) -> String {
        let mut output = format!("{} {}\n", "Error:".red().bold(), error.error);
        output.push_str(&format!("  {}\n", error.message));
        for issue in &error.validation_issues {
            output.push_str(&format!("  * {}\n", issue));
        }
        output
    }

    /// Format a rejected request as JSON
    pub fn format_error_json(error: &ErrorResponse) -> String {
        serde_json::to_string_pretty(error).unwrap_or_else(|_| "{}".to_string())
    }

    fn verdict(response: &MpicResponse) -> String {
        let params = &response.actual_orchestration_parameters;
        let label = if response.is_valid {
            "CORROBORATED".green().bold()
        } else {
            "NOT CORROBORATED".red().bold()
        };
        format!(
            "{} {} {}/{} (quorum {})",
            label,
            response.summary(),
            response.passed_count(),
            params.perspective_count,
            params.quorum_count
        )
    }

    fn overview(response: &MpicResponse) -> String {
        let params = &response.actual_orchestration_parameters;
        format!(
            "{} {} ({})\n{} {} perspectives, quorum {}, {} attempt(s)\n",
            "Target:".cyan().bold(),
            response.domain_or_ip_target,
            response.check_type.as_str(),
            "Run:".cyan().bold(),
            params.perspective_count,
            params.quorum_count,
            params.attempt_count
        )
    }

    fn status_mark(result: &PerspectiveResult) -> colored::ColoredString {
        if result.check_passed {
            "v".green()
        } else {
            "x".red()
        }
    }

    fn perspective_line(result: &PerspectiveResult) -> String {
        format!(
            "  {} {:<24} {}\n",
            Self::status_mark(result),
            result.perspective,
            result.status_detail.as_str().dimmed()
        )
    }

    fn perspective_block(result: &PerspectiveResult) -> String {
        let mut output = format!(
            "\n{}\n",
            format!("── {} ──", result.perspective).yellow().bold()
        );
        output.push_str(&format!(
            "{} {}\n",
            Self::status_mark(result),
            result.status_detail.as_str()
        ));

        match &result.details {
            Some(CheckDetails::Caa(details)) => {
                if !details.queried_names.is_empty() {
                    output.push_str(&format!(
                        "  {} {}\n",
                        "queried:".dimmed(),
                        details.queried_names.join(" -> ")
                    ));
                }
                match &details.found_at {
                    Some(name) if details.caa_record_present => {
                        output.push_str(&format!("  {} {}\n", "found at:".dimmed(), name));
                        let records = details
                            .records
                            .iter()
                            .map(|r| r.to_string())
                            .collect::<Vec<_>>()
                            .join("\n");
                        output.push_str(&Self::indent(&records, "    "));
                        output.push('\n');
                    }
                    _ => output.push_str(&format!("  {}\n", "no CAA records".dimmed())),
                }
            }
            Some(CheckDetails::Dcv(details)) => {
                output.push_str(&format!(
                    "  {} {}\n",
                    "method:".dimmed(),
                    details.validation_method
                ));
                if let Some(observed) = &details.observed {
                    output.push_str(&format!("  {} {}\n", "observed:".dimmed(), observed));
                }
            }
            None => {}
        }

        for error in &result.errors {
            output.push_str(&format!("  {} {}\n", "error:".red(), error));
        }

        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, response: &MpicResponse) -> String {
        Self::format(response)
    }

    fn format_json(&self, response: &MpicResponse) -> String {
        Self::format_json(response)
    }

    fn format_summary(&self, response: &MpicResponse) -> String {
        Self::format_summary(response)
    }

    fn format_error(&self, error: &ErrorResponse) -> String {
        Self::format_error(error)
    }
}
