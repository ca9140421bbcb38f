//! Configuration management for CiteForge
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Contribution scoring configuration
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Input data locations
    #[serde(default)]
    pub data: DataConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoringConfig {
    /// Compute document pairs on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Minimum number of candidate pairs before going parallel
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,

    /// Wall-clock budget for one contribution (unset = unbounded)
    pub deadline_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// Directory holding one text file per document
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Citation edge list, relative to `data_dir` unless absolute
    #[serde(default = "default_citations_file")]
    pub citations_file: PathBuf,

    /// Extension of the document text files
    #[serde(default = "default_text_extension")]
    pub text_extension: String,

    /// Distance snapshot to seed from and write back to
    pub distances_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full env-filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Service name attached to log lines
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_parallel() -> bool { true }
fn default_parallel_threshold() -> usize { 64 }
fn default_data_dir() -> PathBuf { PathBuf::from("test_data") }
fn default_citations_file() -> PathBuf { PathBuf::from("citations.tsv") }
fn default_text_extension() -> String { "txt".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { false }
fn default_service_name() -> String { "citeforge".to_string() }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            parallel_threshold: default_parallel_threshold(),
            deadline_ms: None,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            citations_file: default_citations_file(),
            text_extension: default_text_extension(),
            distances_file: None,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            service_name: default_service_name(),
        }
    }
}

impl ScoringConfig {
    /// Get the deadline budget as Duration
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

impl DataConfig {
    /// Resolve the citation file against the data directory
    pub fn citations_path(&self) -> PathBuf {
        if self.citations_file.is_absolute() {
            self.citations_file.clone()
        } else {
            self.data_dir.join(&self.citations_file)
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SCORING__PARALLEL_THRESHOLD=128
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            data: DataConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.scoring.parallel);
        assert_eq!(config.scoring.parallel_threshold, 64);
        assert!(config.scoring.deadline().is_none());
        assert_eq!(config.data.text_extension, "txt");
    }

    #[test]
    fn test_citations_path_relative_to_data_dir() {
        let config = AppConfig::default();
        assert_eq!(
            config.data.citations_path(),
            PathBuf::from("test_data").join("citations.tsv")
        );
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(
                "[scoring]\ndeadline_ms = 2500\n\n[data]\ndata_dir = \"corpus\"\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.scoring.deadline(), Some(Duration::from_millis(2500)));
        assert!(config.scoring.parallel);
        assert_eq!(config.data.data_dir, PathBuf::from("corpus"));
        assert_eq!(config.observability.service_name, "citeforge");
    }
}
