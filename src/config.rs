//! Client configuration.
//!
//! Loaded from `<config_dir>/food-notes/config.json` when present, then
//! overridden by environment variables:
//! - `FOOD_NOTES_API_URL` - GraphQL endpoint
//! - `FOOD_NOTES_STORAGE_URL` - object storage base URL
//! - `FOOD_NOTES_TOKEN` - bearer token (takes precedence over a stored sign-in)
//! - `FOOD_NOTES_SYNC_MODE` - `refetch` or `merge`
//! - `FOOD_NOTES_URL_EXPIRY_SECS` - display URL lifetime

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_API_URL;
use crate::controller::SyncMode;
use crate::storage::{DEFAULT_EXPIRY_SECS, DEFAULT_STORAGE_URL};

const APP_NAME: &str = "food-notes";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GraphQL endpoint of the notes API.
    pub api_url: String,
    /// Base URL of the object storage service.
    pub storage_url: String,
    /// Bearer token from the last sign-in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub sync_mode: SyncMode,
    /// Lifetime of resolved image URLs, in seconds.
    pub url_expiry_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            storage_url: DEFAULT_STORAGE_URL.to_string(),
            token: None,
            sync_mode: SyncMode::Refetch,
            url_expiry_secs: DEFAULT_EXPIRY_SECS,
        }
    }
}

impl Config {
    /// Load from `path` (or the default location) and apply the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };
        let mut config = Self::read(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read the config file only. A missing file yields the defaults.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Override fields from environment-style lookups.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("FOOD_NOTES_API_URL") {
            self.api_url = url;
        }
        if let Some(url) = lookup("FOOD_NOTES_STORAGE_URL") {
            self.storage_url = url;
        }
        if let Some(token) = lookup("FOOD_NOTES_TOKEN").filter(|t| !t.is_empty()) {
            self.token = Some(token);
        }
        if let Some(mode) = lookup("FOOD_NOTES_SYNC_MODE") {
            self.sync_mode = mode
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("Invalid FOOD_NOTES_SYNC_MODE")?;
        }
        if let Some(secs) = lookup("FOOD_NOTES_URL_EXPIRY_SECS") {
            self.url_expiry_secs = secs
                .parse()
                .context("Invalid FOOD_NOTES_URL_EXPIRY_SECS")?;
        }
        Ok(())
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
