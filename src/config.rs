use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "backporter.toml";

/// Main configuration structure for the backporter
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BackporterConfig {
    /// GitHub configuration
    pub github: GitHubConfig,
    /// Backport behaviour
    pub backport: BackportConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token, used when neither `--token` nor GITHUB_TOKEN is set
    pub token: Option<String>,
    /// API root for GitHub Enterprise installations
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BackportConfig {
    /// Labels starting with this prefix name a target branch
    pub label_prefix: String,
    /// Directory the repository is cloned into
    pub workdir_root: PathBuf,
    /// Name of the remote the working copy is cloned from
    pub remote: String,
}

impl Default for BackportConfig {
    fn default() -> Self {
        Self {
            label_prefix: crate::backport::DEFAULT_LABEL_PREFIX.to_string(),
            workdir_root: PathBuf::from("."),
            remote: "origin".to_string(),
        }
    }
}

impl BackportConfig {
    /// Working copy location for a repository
    pub fn workdir_for(&self, repository_name: &str) -> PathBuf {
        self.workdir_root.join(repository_name)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level, overridden by RUST_LOG
    pub log_level: String,
    /// Emit JSON lines instead of human readable output
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl BackporterConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. backporter.toml in the working directory
    /// 3. Environment variables (prefixed with BACKPORTER__)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE), Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix("BACKPORTER")
            .separator("__")
            .try_parsing(true)
    }

    fn load_from(file: &Path, environment: Environment) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(file).required(false))
            .add_source(environment)
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        BackporterConfig::environment().source(Some(source))
    }

    #[test]
    fn test_defaults_without_file_or_environment() {
        let dir = TempDir::new().unwrap();
        let config =
            BackporterConfig::load_from(&dir.path().join(CONFIG_FILE), environment(&[])).unwrap();

        assert_eq!(config, BackporterConfig::default());
        assert_eq!(config.backport.label_prefix, "backport-");
        assert_eq!(config.backport.remote, "origin");
        assert_eq!(config.observability.log_level, "info");
        assert!(!config.observability.json_logs);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "[backport]\nlabel_prefix = \"cherry-pick/\"\nworkdir_root = \"/tmp/work\"\n\n[observability]\njson_logs = true\n",
        )
        .unwrap();

        let config = BackporterConfig::load_from(&path, environment(&[])).unwrap();

        assert_eq!(config.backport.label_prefix, "cherry-pick/");
        assert_eq!(config.backport.workdir_for("repo"), PathBuf::from("/tmp/work/repo"));
        assert_eq!(config.backport.remote, "origin");
        assert!(config.observability.json_logs);
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[github]\ntoken = \"from-file\"\n").unwrap();

        let config = BackporterConfig::load_from(
            &path,
            environment(&[
                ("BACKPORTER__GITHUB__TOKEN", "from-env"),
                ("BACKPORTER__OBSERVABILITY__LOG_LEVEL", "debug"),
            ]),
        )
        .unwrap();

        assert_eq!(config.github.token.as_deref(), Some("from-env"));
        assert_eq!(config.observability.log_level, "debug");
    }
}
