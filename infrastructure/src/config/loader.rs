//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_CONFIG_FILES: [&str; 2] = ["mpic.toml", ".mpic.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `MPIC_`-prefixed environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./mpic.toml` or `./.mpic.toml`
    /// 4. Global config: `$XDG_CONFIG_HOME/open-mpic/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// The merged figment, before extraction
    pub fn figment(config_path: Option<&PathBuf>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("MPIC_").split("__"))
    }

    /// Load a single file over the defaults, ignoring every other source
    pub fn load_file(path: &Path) -> Result<FileConfig, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("open-mpic").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");
        println!("  [     ] Env:     MPIC_* variables");

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./mpic.toml or ./.mpic.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpic_domain::QuorumRule;
    use std::io::Write;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.perspectives.len(), 3);
        assert!(!config.orchestration.early_termination);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("open-mpic"));
    }

    #[test]
    fn test_load_file_merges_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[orchestration]
quorum_rule = "unanimous"

[caa]
default_caa_domains = ["ca.example"]
"#
        )
        .unwrap();

        let config = ConfigLoader::load_file(file.path()).unwrap();
        assert_eq!(
            config.orchestration.parse_quorum_rule().0,
            QuorumRule::Unanimous
        );
        assert_eq!(config.caa.default_caa_domains, vec!["ca.example"]);
        assert_eq!(config.orchestration.default_perspective_count, 3);
        assert_eq!(config.perspectives.len(), 3);
    }

    #[test]
    fn test_load_file_rejects_bad_types() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[orchestration]\nmax_attempts_limit = \"many\"").unwrap();
        assert!(ConfigLoader::load_file(file.path()).is_err());
    }
}
