//! Configuration schema (refshift.toml)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// SQL dialect configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectConfig {
    /// BigQuery SQL dialect
    BigQuery,

    /// Snowflake SQL dialect
    Snowflake,

    /// PostgreSQL SQL dialect
    Postgres,

    /// Generic ANSI SQL
    Ansi,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self::Ansi
    }
}

/// Usage tracking configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Disable the usage tracking event entirely
    #[serde(default)]
    pub disabled: bool,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQL dialect used for tokenizing scripts
    #[serde(default)]
    pub dialect: DialectConfig,

    /// Path to the dbt manifest.json
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,

    /// Usage tracking settings
    #[serde(default)]
    pub tracking: TrackingConfig,
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("target/manifest.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: DialectConfig::default(),
            manifest_path: default_manifest_path(),
            tracking: TrackingConfig::default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.display().to_string(), e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    IoError(String, String),

    #[error("failed to parse config: {0}")]
    ParseError(String),
}
