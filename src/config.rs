//! Configuration management for hvprobe.
//!
//! Handles loading collector and per-asset configuration from TOML files and
//! environment variables.

use crate::error::{ProbeError, Result};
use crate::query::QUERY_TIMEOUT_SECS;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for hvprobe.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProbeConfig {
    /// Collector-level settings shared by every asset.
    #[serde(default)]
    pub check: CheckConfig,

    /// Per-asset settings keyed by asset name.
    #[serde(default)]
    pub assets: HashMap<String, AssetConfig>,
}

/// Collector-level check configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Hyper-V host the management session connects to.
    pub hypervisor: Option<String>,

    /// Query timeout in seconds.
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
}

fn default_query_timeout() -> u64 {
    QUERY_TIMEOUT_SECS
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            hypervisor: None,
            query_timeout_secs: default_query_timeout(),
        }
    }
}

impl CheckConfig {
    /// Returns the query timeout.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    /// Applies `HVPROBE_HYPERVISOR` when no hypervisor is configured.
    pub fn apply_env_defaults(&mut self) {
        if self.hypervisor.is_none() {
            self.hypervisor = std::env::var("HVPROBE_HYPERVISOR").ok();
        }
    }
}

/// Per-asset configuration.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AssetConfig {
    /// Identity in `DOMAIN\user` or `user@domain` form.
    pub username: Option<String>,

    /// Password (not recommended to store in config).
    pub password: Option<String>,

    /// Hyper-V guest GUID (`Msvm_ComputerSystem.Name`).
    pub guid: Option<String>,
}

impl AssetConfig {
    /// Applies `HVPROBE_USERNAME` / `HVPROBE_PASSWORD` as defaults.
    pub fn apply_env_defaults(&mut self) {
        if self.username.is_none() {
            self.username = std::env::var("HVPROBE_USERNAME").ok();
        }
        if self.password.is_none() {
            self.password = std::env::var("HVPROBE_PASSWORD").ok();
        }
    }
}

impl fmt::Debug for AssetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("guid", &self.guid)
            .finish()
    }
}

impl ProbeConfig {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hvprobe")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file, then fills unset values from the
    /// environment (including a `.env` file, if present).
    pub fn load(path: &Path) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::load_from_file(path)?;
        config.check.apply_env_defaults();
        for asset in config.assets.values_mut() {
            asset.apply_env_defaults();
        }
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the default configuration.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ProbeError::parse(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ProbeError::parse(format!("Configuration error in {}:\n  {}", path.display(), e))
        })
    }

    /// Gets the configuration for a named asset.
    pub fn get_asset(&self, name: &str) -> Option<&AssetConfig> {
        self.assets.get(name)
    }
}
