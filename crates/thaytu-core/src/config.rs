use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::indicator::DEFAULT_ROTATION_INTERVAL;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:7860";
pub const SERVER_URL_ENV: &str = "THAYTU_SERVER_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub server_url: Option<String>,
    pub rotate_loading_phrases: Option<bool>,
    pub rotation_interval_ms: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the user config directory; a missing file means defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Server URL: environment first, then the config file, then the default
    pub fn server_url(&self) -> String {
        std::env::var(SERVER_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    pub fn rotate_loading_phrases(&self) -> bool {
        self.rotate_loading_phrases.unwrap_or(true)
    }

    pub fn rotation_interval(&self) -> Duration {
        self.rotation_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_ROTATION_INTERVAL)
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("thaytu").join("config.json"))
    }

    /// Where the log file goes; the terminal itself is busy drawing the UI
    pub fn log_path() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::config_dir)
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;

        Ok(data_dir.join("thaytu").join("thaytu.log"))
    }
}
