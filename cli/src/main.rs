//! CLI entrypoint for open-mpic
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use mpic_application::{
    AuditLogger, CorroborateUseCase, CorroborationError, NoAuditLogger, ProgressNotifier,
    ResolverProvider, SharedResolverProvider,
};
use mpic_domain::{MpicRequest, MpicResponse, OutputFormat, Severity};
use mpic_infrastructure::{
    ConfigLoader, FileConfig, HickoryOptions, JsonlAuditLogger, build_resolver_map, load_fixture,
};
use mpic_presentation::{Cli, ConsoleFormatter, OutputConfig, ProgressReporter, SimpleProgress};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const EXIT_NOT_CORROBORATED: u8 = 1;
const EXIT_INVALID_REQUEST: u8 = 2;
const EXIT_DISPATCH_FAILED: u8 = 3;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(ExitCode::SUCCESS);
    }

    // Load configuration
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };

    let _log_guard = init_logging(cli.verbose, config.logging.log_dir.as_deref());
    info!("Starting open-mpic");

    for issue in config.ensure_valid()? {
        if issue.severity == Severity::Warning {
            warn!("{}", issue.message);
        }
    }

    let output_config = OutputConfig {
        format: config.output.format.unwrap_or_default(),
        color: config.output.color,
        show_progress: config.output.show_progress,
    }
    .with_cli_overrides(cli.output, cli.quiet);
    if !output_config.color {
        colored::control::set_override(false);
    }

    let request = match &cli.request {
        Some(path) => read_request(path)?,
        None => cli.to_request(),
    };

    // === Dependency Injection ===
    let resolvers = build_resolvers(&cli, &config)?;
    let use_case = CorroborateUseCase::new(config.to_orchestrator_config(), resolvers)
        .with_audit_logger(audit_logger(&config));

    let result = if output_config.show_progress {
        let progress: Box<dyn ProgressNotifier> = if cli.verbose > 0 {
            Box::new(SimpleProgress)
        } else {
            Box::new(ProgressReporter::new())
        };
        use_case
            .execute_with_progress(&request, progress.as_ref())
            .await
    } else {
        use_case.execute(&request).await
    };

    Ok(report(result, output_config.format))
}

/// Print the outcome and map it to an exit code
fn report(result: Result<MpicResponse, CorroborationError>, format: OutputFormat) -> ExitCode {
    match result {
        Ok(response) => {
            let output = match format {
                OutputFormat::Full => ConsoleFormatter::format(&response),
                OutputFormat::Summary => ConsoleFormatter::format_summary(&response),
                OutputFormat::Json => ConsoleFormatter::format_json(&response),
            };
            println!("{}", output);

            if response.is_valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_NOT_CORROBORATED)
            }
        }
        Err(error) => {
            let body = error.to_response();
            match format {
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_error_json(&body)),
                _ => eprint!("{}", ConsoleFormatter::format_error(&body)),
            }

            if error.is_validation() {
                ExitCode::from(EXIT_INVALID_REQUEST)
            } else {
                ExitCode::from(EXIT_DISPATCH_FAILED)
            }
        }
    }
}

/// Console logging from `-v`, plus a daily file when `log_dir` is set
fn init_logging(verbose: u8, log_dir: Option<&str>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(level));

    let (file, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "open-mpic.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new("debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(console).with(file).init();
    guard
}

fn read_request(path: &Path) -> Result<MpicRequest> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request file {}", path.display()))?;
    serde_json::from_str(&body)
        .with_context(|| format!("failed to parse request file {}", path.display()))
}

/// Resolvers for every perspective: a zone fixture or live DNS
fn build_resolvers(cli: &Cli, config: &FileConfig) -> Result<Arc<dyn ResolverProvider>> {
    if let Some(path) = &cli.zone_fixture {
        info!("Answering DNS from fixture {}", path.display());
        let fixture = load_fixture(path)?;
        return Ok(Arc::new(SharedResolverProvider::new(Arc::new(fixture))));
    }

    let options = HickoryOptions::from(&config.caa);
    Ok(Arc::new(build_resolver_map(&config.perspectives, options)))
}

fn audit_logger(config: &FileConfig) -> Arc<dyn AuditLogger> {
    match config
        .logging
        .audit_log
        .as_deref()
        .and_then(JsonlAuditLogger::new)
    {
        Some(logger) => Arc::new(logger),
        None => Arc::new(NoAuditLogger),
    }
}
