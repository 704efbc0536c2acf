//! Configuration file support for Keelson.
//!
//! Keelson supports two configuration file locations:
//! - Global: `<keelson home>/config.toml` - User-wide defaults
//! - Project: `.keelson/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the per-project configuration directory.
pub const PROJECT_CONFIG_DIR: &str = ".keelson";

/// Keelson configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Target used when none is given on the command line
    pub target: Option<String>,

    /// Extra features enabled in every resolution session
    pub features: Vec<String>,

    /// Check required capabilities after resolution (default: true)
    pub verify_caps: Option<bool>,
}

impl BuildConfig {
    /// Whether capability verification is enabled.
    pub fn verify_caps(&self) -> bool {
        self.verify_caps.unwrap_or(true)
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Features accumulate; scalar settings are replaced.
    pub fn merge(&mut self, other: Config) {
        if other.build.target.is_some() {
            self.build.target = other.build.target;
        }
        for feature in other.build.features {
            if !self.build.features.contains(&feature) {
                self.build.features.push(feature);
            }
        }
        if other.build.verify_caps.is_some() {
            self.build.verify_caps = other.build.verify_caps;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.keelson/config.toml)
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the project config path (.keelson/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_DIR).join("config.toml")
}
