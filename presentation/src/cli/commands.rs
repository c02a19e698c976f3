//! CLI command definitions

use clap::{Parser, ValueEnum};
use mpic_domain::{
    CaaCheckParameters, CertificateType, CheckType, MpicRequest, OrchestrationParameters,
};
use std::path::PathBuf;

/// Output format for corroboration results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Verdict plus every perspective's diagnostics
    Full,
    /// Verdict and one line per perspective
    Summary,
    /// Response body as JSON
    Json,
}

impl From<OutputFormat> for mpic_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => mpic_domain::OutputFormat::Full,
            OutputFormat::Summary => mpic_domain::OutputFormat::Summary,
            OutputFormat::Json => mpic_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for open-mpic
#[derive(Parser, Debug)]
#[command(name = "open-mpic")]
#[command(author, version, about = "Multi-perspective issuance corroboration for CAA and DCV checks")]
#[command(long_about = r#"
open-mpic runs a CAA (or DCV) check from several network perspectives and
reports whether a quorum of them agree that issuance is permitted.

Each perspective climbs the DNS tree from the target, following CNAME and
DNAME aliases, until it finds the CAA record set that governs the name.

Configuration files are loaded from (in priority order):
1. MPIC_* environment variables
2. --config <path>     Explicit config file
3. ./mpic.toml         Project-level config
4. ~/.config/open-mpic/config.toml   Global config

Exit codes: 0 corroborated, 1 not corroborated, 2 invalid request,
3 check could not be dispatched.

Example:
  open-mpic example.com --caa-domain letsencrypt.org
  open-mpic '*.example.com' --caa-domain letsencrypt.org -p 3 -q 2
  open-mpic --request request.json --output json
"#)]
pub struct Cli {
    /// Domain name, wildcard name or IP address to check
    #[arg(required_unless_present_any = ["request", "show_config"])]
    pub target: Option<String>,

    /// Check type (caa or dcv)
    #[arg(long, default_value = "caa", value_name = "TYPE")]
    pub check_type: String,

    /// Acceptable CAA issuer identity (can be specified multiple times)
    #[arg(long = "caa-domain", value_name = "DOMAIN")]
    pub caa_domains: Vec<String>,

    /// Evaluate as a wildcard certificate
    #[arg(long)]
    pub wildcard: bool,

    /// Number of perspectives to run the check from
    #[arg(short = 'p', long, value_name = "N")]
    pub perspective_count: Option<usize>,

    /// Number of perspectives that must pass
    #[arg(short = 'q', long, value_name = "N")]
    pub quorum_count: Option<usize>,

    /// Attempts allowed, each on a fresh cohort
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<usize>,

    /// Read the full request body from a JSON file
    #[arg(long, value_name = "PATH", conflicts_with = "target")]
    pub request: Option<PathBuf>,

    /// Answer DNS queries from a TOML zone fixture instead of the network
    #[arg(long, value_name = "PATH")]
    pub zone_fixture: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Orchestration parameters given on the command line
    pub fn orchestration_parameters(&self) -> Option<OrchestrationParameters> {
        let params = OrchestrationParameters {
            perspective_count: self.perspective_count,
            quorum_count: self.quorum_count,
            max_attempts: self.max_attempts,
        };
        (params != OrchestrationParameters::default()).then_some(params)
    }

    /// Build a request from the flags (ignores `--request`)
    ///
    /// The check type is passed through untouched so an unknown value is
    /// reported the same way a remote client would see it.
    pub fn to_request(&self) -> MpicRequest {
        let certificate_type = if self.wildcard {
            CertificateType::TlsServerWildcard
        } else {
            CertificateType::TlsServer
        };
        let caa_check_parameters = match self.check_type.parse::<CheckType>() {
            Ok(CheckType::Dcv) => None,
            _ => Some(CaaCheckParameters::new(certificate_type, self.caa_domains.clone())),
        };

        MpicRequest {
            check_type: self.check_type.clone(),
            domain_or_ip_target: self.target.clone().unwrap_or_default(),
            orchestration_parameters: self.orchestration_parameters(),
            caa_check_parameters,
            dcv_check_parameters: None,
        }
    }
}
