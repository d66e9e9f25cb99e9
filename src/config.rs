//! Configuration
//!
//! Read from the first of these found in the workspace root:
//! - `.fhirconnect-nav.yaml`
//! - `.fhirconnect-nav.yml`
//! - `.fhirconnect-nav.json`
//!
//! Every section is optional; missing values fall back to the built-in
//! defaults.

use crate::navigation::NavigableKeys;
use crate::rules::RuleTable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Well-known configuration file names, in lookup order
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".fhirconnect-nav.yaml",
    ".fhirconnect-nav.yml",
    ".fhirconnect-nav.json",
];

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Workspace scanning settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory names never descended into
    pub exclude_dirs: Vec<String>,

    /// File extensions treated as YAML (without the dot, case-insensitive)
    pub extensions: Vec<String>,

    /// Follow symbolic links while walking
    pub follow_links: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: vec![
                "target".to_string(),
                "build".to_string(),
                "_build".to_string(),
            ],
            extensions: vec!["yaml".to_string(), "yml".to_string()],
            follow_links: true,
        }
    }
}

/// Complete navigation configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub scan: ScanConfig,
    pub rules: RuleTable,
    pub keys: NavigableKeys,
}

impl NavConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let mut config: Self = match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown config file format: {}",
                    ext
                )))
            }
        };

        config.rules = config.rules.with_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Find a configuration file in `root`, or fall back to defaults
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        match Self::find_file(root) {
            Some(path) => {
                log::debug!("Using configuration {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    fn find_file(root: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.extensions.iter().any(|e| e.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "scan.extensions must not contain empty entries".to_string(),
            ));
        }
        if let Some(key) = self.keys.entries.iter().find(|k| k.path.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "navigable key for {} has an empty path",
                key.category
            )));
        }
        Ok(())
    }
}
