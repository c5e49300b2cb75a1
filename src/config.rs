// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_LOOKBACK_DAYS: u64 = 30;
/// A century; longer windows reach dates the upstream cannot format.
pub const MAX_LOOKBACK_DAYS: u64 = 36_500;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub quandl: QuandlConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 33508,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuandlConfig {
    pub base_url: String,
    pub api_key_file: PathBuf,
    /// Days of history requested, counted back from today.
    pub lookback_days: u64,
}

impl Default for QuandlConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.quandl.com/api/v3/datasets/WIKI".to_string(),
            api_key_file: PathBuf::from("quandl_API_KEY.txt"),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `config.toml` in the working
    /// directory is used when present, otherwise the hardcoded defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => load_config(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    load_config(fallback)?
                } else {
                    Config::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.quandl.lookback_days > MAX_LOOKBACK_DAYS {
            bail!(
                "quandl.lookback_days must be at most {}, got {}",
                MAX_LOOKBACK_DAYS,
                self.quandl.lookback_days
            );
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}
