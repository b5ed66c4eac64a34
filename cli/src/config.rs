use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub database_path: PathBuf,
    /// Upper bound on how long a store call waits for the database lock
    pub busy_timeout_ms: u64,
    /// Favorites older than this are reversed by `sweep`
    pub unfavorite_after_hours: i64,
    pub sweep_limit: usize,
    /// Used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("chirp.db"),
            busy_timeout_ms: 5_000,
            unfavorite_after_hours: 24,
            sweep_limit: 10,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// `None` when the configured hours do not fit a duration
    pub fn unfavorite_after(&self) -> Option<chrono::Duration> {
        chrono::Duration::try_hours(self.unfavorite_after_hours)
    }

    /// Favorites applied at or before the returned time are due at `now`
    pub fn due_before(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        self.unfavorite_after()
            .and_then(|after| now.checked_sub_signed(after))
            .with_context(|| {
                format!("unfavorite_after_hours = {} is out of range", self.unfavorite_after_hours)
            })
    }
}

/// Load the config file, writing the defaults first if it does not exist
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        let toml = toml::to_string(&config).context("Failed to serialize default config")?;
        fs::write(path, toml)
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;
        return Ok(config);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    if config.unfavorite_after_hours < 0 {
        anyhow::bail!("unfavorite_after_hours must not be negative");
    }
    config.due_before(Utc::now())?;

    Ok(config)
}
