//! Perspective pool from TOML (`[[perspectives]]` array)
//!
//! ```toml
//! [[perspectives]]
//! code = "us-east-1"
//! rir = "arin"
//! nameservers = ["8.8.8.8"]
//! ```
//!
//! A perspective without nameservers uses the resolver's built-in defaults.

use mpic_domain::{ConfigIssue, ConfigIssueCode, Perspective, Rir};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// One configured perspective
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePerspectiveConfig {
    pub code: String,
    pub rir: String,
    /// Recursive resolvers this perspective queries
    #[serde(default)]
    pub nameservers: Vec<String>,
    /// Port the nameservers listen on
    #[serde(default = "default_dns_port")]
    pub port: u16,
}

fn default_dns_port() -> u16 {
    53
}

impl FilePerspectiveConfig {
    pub fn new(code: &str, rir: &str, nameserver: &str) -> Self {
        Self {
            code: code.to_string(),
            rir: rir.to_string(),
            nameservers: vec![nameserver.to_string()],
            port: default_dns_port(),
        }
    }

    pub fn to_perspective(&self) -> Result<Perspective, ConfigIssue> {
        let rir: Rir = self.rir.parse().map_err(|e| {
            ConfigIssue::error(
                ConfigIssueCode::InvalidValue,
                format!("perspectives.{}.rir: {}", self.code, e),
            )
        })?;
        Ok(Perspective::new(self.code.clone(), rir))
    }

    /// Parse nameserver addresses, reporting each one that is not an IP
    pub fn parse_nameservers(&self) -> (Vec<IpAddr>, Vec<ConfigIssue>) {
        let mut ips = Vec::new();
        let mut issues = Vec::new();
        for server in &self.nameservers {
            match server.parse() {
                Ok(ip) => ips.push(ip),
                Err(_) => issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidValue,
                    format!(
                        "perspectives.{}.nameservers: '{}' is not an IP address",
                        self.code, server
                    ),
                )),
            }
        }
        (ips, issues)
    }
}

/// Built-in pool: three public resolvers in three registries
pub fn default_perspectives() -> Vec<FilePerspectiveConfig> {
    vec![
        FilePerspectiveConfig::new("google-public-dns", "arin", "8.8.8.8"),
        FilePerspectiveConfig::new("quad9", "ripe", "9.9.9.9"),
        FilePerspectiveConfig::new("cloudflare", "apnic", "1.1.1.1"),
    ]
}
