use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::dialect::{Dialect, DocumentFormat};
use crate::constants::DEFAULT_EXTENSION;

fn default_extension() -> Option<String> {
    Some(DEFAULT_EXTENSION.to_string())
}

/// How an [`ArtifactsReader`](crate::reader::ArtifactsReader) parses and
/// validates definition files.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default)]
    pub format: DocumentFormat,
    /// Extension of the files read from a directory, `None` reads every file
    #[serde(default = "default_extension")]
    pub extension: Option<String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            format: DocumentFormat::default(),
            extension: default_extension(),
        }
    }
}

impl ReaderConfig {
    pub fn legacy() -> Self {
        Self {
            dialect: Dialect::Legacy,
            ..Self::default()
        }
    }

    pub fn json() -> Self {
        Self {
            format: DocumentFormat::Json,
            extension: Some("json".to_string()),
            ..Self::default()
        }
    }
}

/// Settings of the corpus validator
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct ValidatorConfig {
    #[serde(default)]
    pub reader: ReaderConfig,
    /// File names exempt from duplicate Registry key checks, they repeat
    /// keys on purpose
    #[serde(default)]
    pub legacy_files: Vec<String>,
}

impl ValidatorConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: ValidatorConfig = serde_yaml::from_str(&content)
            .context("Failed to parse YAML config")?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_yaml_file(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .context(format!("Failed to write config to {}", path.display()))?;

        info!("Saved configuration to {}", path.display());
        Ok(())
    }
}

/// Load a configuration file, or the defaults when no path is given.
pub fn load_config(config_path: Option<&Path>) -> Result<ValidatorConfig> {
    match config_path {
        Some(path) => ValidatorConfig::from_yaml_file(path),
        None => {
            debug!("No config path provided, using default configuration");
            Ok(ValidatorConfig::default())
        }
    }
}
