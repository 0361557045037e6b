use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub notify: NotifyConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file holding foods and users; `:memory:` is accepted
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Receives a summary of every new donation
    pub admin_email: String,
    #[serde(default = "default_from")]
    pub from: String,
    /// Mail relay URL; without it messages are only logged
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_notify_timeout")]
    pub timeout_seconds: u64,
}

impl NotifyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// One hundred years
pub const MAX_RETENTION_SECONDS: u64 = 100 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_sweep_interval")]
    pub interval_seconds: u64,
    #[serde(default = "default_retention")]
    pub retention_seconds: u64,
}

impl SweepConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    /// Retention window, capped at `MAX_RETENTION_SECONDS`
    pub fn retention(&self) -> chrono::Duration {
        let seconds = self.retention_seconds.min(MAX_RETENTION_SECONDS);
        chrono::Duration::seconds(i64::try_from(seconds).unwrap_or(i64::MAX))
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_sweep_interval(),
            retention_seconds: default_retention(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub path: String,
    /// Megabytes per file before rotation
    pub size: u64,
    pub max_files: usize,
}

fn default_from() -> String {
    "noreply@localhost".to_string()
}

fn default_notify_timeout() -> u64 {
    5
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_retention() -> u64 {
    3600
}

pub fn load_config(path: &str) -> Result<Config> {
    let config_text = fs::read_to_string(Path::new(path))
        .with_context(|| format!("Failed to read config file {path}"))?;
    let config: Config =
        toml::from_str(&config_text).with_context(|| format!("Invalid config file {path}"))?;

    if config.sweep.interval_seconds == 0 {
        anyhow::bail!("sweep.interval_seconds must be greater than zero");
    }
    if config.sweep.retention_seconds > MAX_RETENTION_SECONDS {
        anyhow::bail!(
            "sweep.retention_seconds must be at most {MAX_RETENTION_SECONDS} (one hundred years)"
        );
    }

    Ok(config)
}
