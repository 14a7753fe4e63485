//! Application configuration management.
//!
//! This module handles loading and saving the CLI configuration, which
//! records the portal location, the paired thermostat and the last used
//! username. Passwords never land here; they live in the OS keychain.
//!
//! Configuration is stored at `~/.config/ethermostaat/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Duration;
use ethermostaat_core::api::DEFAULT_API_URL;
use ethermostaat_core::cache::DEFAULT_MAX_AGE_SECS;
use serde::{Deserialize, Serialize};

/// Application name used for config directory paths
const APP_NAME: &str = "ethermostaat";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default)]
    pub last_username: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_max_age_secs: Option<i64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Portal URL from the config file, else the production portal.
    /// `--api-url` / `ETHERMOSTAAT_API_URL` take precedence in `main`.
    pub fn api_url(&self) -> String {
        self.api_url
            .clone()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::seconds(self.cache_max_age_secs.unwrap_or(DEFAULT_MAX_AGE_SECS).max(0))
    }
}
