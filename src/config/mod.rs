use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    /// XTide station name, passed verbatim to `tide -l`.
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_program")]
    pub program: String,
    /// Forecast horizon in days.
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

/// Longest forecast horizon accepted, in days.
pub const MAX_DAYS: u32 = 3650;
/// Longest retention accepted, in days.
pub const MAX_RETENTION_DAYS: u32 = 36500;

/// Keys a complete configuration file carries.
pub const CONFIG_KEYS: [&str; 6] = [
    "database",
    "location",
    "program",
    "days",
    "timeout_secs",
    "retention_days",
];

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_program() -> String {
    "/usr/bin/tide".to_string()
}
fn default_days() -> u32 {
    7
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_retention_days() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            location: String::new(),
            program: default_program(),
            days: default_days(),
            timeout_secs: default_timeout_secs(),
            retention_days: default_retention_days(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tidecache")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("tidecache.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("tidecache.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            log::debug!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> AppResult<Self> {
        let mut cfg: Config = serde_yaml::from_str(content)?;
        cfg.database = expand_tilde(&cfg.database).to_string_lossy().to_string();
        Ok(cfg)
    }

    /// Keys from [`CONFIG_KEYS`] absent from a config file's text.
    pub fn missing_keys(content: &str) -> AppResult<Vec<&'static str>> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        let map = value.as_mapping();
        Ok(CONFIG_KEYS
            .iter()
            .copied()
            .filter(|k| map.is_none_or(|m| !m.contains_key(*k)))
            .collect())
    }

    /// Checks the refresh pipeline needs before it can run.
    pub fn validate(&self) -> AppResult<()> {
        if self.location.trim().is_empty() {
            return Err(AppError::Config(
                "location must be specified (set `location:` in the config file)".into(),
            ));
        }
        if self.days == 0 || self.days > MAX_DAYS {
            return Err(AppError::Config(format!(
                "days must be between 1 and {MAX_DAYS}"
            )));
        }
        if self.retention_days > MAX_RETENTION_DAYS {
            return Err(AppError::Config(format!(
                "retention_days must be at most {MAX_RETENTION_DAYS}"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::Config("timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.retention_days))
    }

    /// Write the config file to `path` (unless `is_test`) and create the
    /// database file.
    pub fn init_all(&self, path: &Path, is_test: bool) -> io::Result<()> {
        if !is_test {
            create_parent(path)?;
            let yaml = serde_yaml::to_string(self).map_err(io::Error::other)?;
            let mut file = fs::File::create(path)?;
            file.write_all(yaml.as_bytes())?;
            success(format!("Config file: {}", path.display()));
        }

        let db_path = PathBuf::from(&self.database);
        create_parent(&db_path)?;
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        success(format!("Database:    {}", db_path.display()));

        Ok(())
    }
}

fn create_parent(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
