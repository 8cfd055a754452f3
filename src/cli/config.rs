//! Configuration file support.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::Currency;

const APP_DIR: &str = "renewalradar";

/// Application configuration loaded from config file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Subscription database location
    pub db_path: Option<PathBuf>,

    /// Days before renewal at which subscriptions display as expiring
    pub expiring_days: Option<i64>,

    /// Default currency for converted reports
    pub report_currency: Option<String>,
}

impl Config {
    /// Load configuration from the default config file location.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))?;
        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(config)
    }

    /// Returns the path to the config file.
    ///
    /// Default: `~/.config/renewalradar/config.toml`
    pub fn config_path() -> PathBuf {
        Self::app_dir().join("config.toml")
    }

    fn app_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Resolve the database path.
    ///
    /// Precedence order:
    /// 1. CLI `--db` argument
    /// 2. Config file `db_path` setting
    /// 3. `subscriptions.db` in the config directory
    pub fn db_path(&self, cli_db: Option<&PathBuf>) -> PathBuf {
        cli_db
            .cloned()
            .or_else(|| self.db_path.clone())
            .unwrap_or_else(|| Self::app_dir().join("subscriptions.db"))
    }

    /// The configured report currency, if set and valid.
    pub fn report_currency(&self) -> Result<Option<Currency>> {
        self.report_currency
            .as_deref()
            .map(Currency::new)
            .transpose()
            .context("invalid report_currency in config file")
    }
}
