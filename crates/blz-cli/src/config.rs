//! # CLI Configuration
//!
//! Read from a YAML file (`--config`, else `blz.yaml` in the working
//! directory if present). Environment variables override file values:
//!
//! | Key | Variable | Meaning |
//! |-----|----------|---------|
//! | `bank_data` | `BLZ_BANK_DATA` | Bundesbank master-data file. |
//! | `mapping` | `BLZ_MAPPING` | Special-account mapping file. |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "blz.yaml";

/// Data file locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Bundesbank master-data file.
    #[serde(default)]
    pub bank_data: Option<PathBuf>,
    /// Special-account mapping file.
    #[serde(default)]
    pub mapping: Option<PathBuf>,
}

impl Config {
    /// Parse a YAML document. An empty document yields the defaults.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).context("invalid configuration")
    }

    /// Load `explicit`, or the default file if it exists, then apply
    /// environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
        };
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config: {}", path.display()))?;
                tracing::debug!(path = %path.display(), "configuration loaded");
                Self::from_yaml(&text).with_context(|| format!("in {}", path.display()))?
            }
            None => Self::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply overrides looked up by environment variable name.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup("BLZ_BANK_DATA").filter(|v| !v.is_empty()) {
            self.bank_data = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("BLZ_MAPPING").filter(|v| !v.is_empty()) {
            self.mapping = Some(PathBuf::from(path));
        }
        self
    }
}
