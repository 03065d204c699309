//! Configuration management
//!
//! Review settings live in a TOML file. Every field is optional; a missing
//! file means defaults.
//!
//! ```toml
//! intervals_minutes = [5, 30, 720, 1440, 2880, 5760, 10080, 21600, 43200]
//! auto_resolve_streak = 9
//! default_user = "local"
//! data_dir = "/home/me/.local/share/mew-review"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::review::intervals::DEFAULT_INTERVALS_MINUTES;
use crate::review::{IntervalTable, Scheduler, SchedulerError};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error(transparent)]
    Intervals(#[from] SchedulerError),

    #[error("auto_resolve_streak must be at least 1")]
    InvalidAutoResolve,

    #[error("default_user must not be blank")]
    BlankDefaultUser,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Review scheduling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Interval ladder in minutes, shortest first
    #[serde(default = "default_intervals")]
    pub intervals_minutes: Vec<i64>,
    /// Resolve words after this many correct answers in a row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_resolve_streak: Option<u32>,
    /// Learner used when none is given
    #[serde(default = "default_user")]
    pub default_user: String,
    /// Overrides the platform data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_intervals() -> Vec<i64> {
    DEFAULT_INTERVALS_MINUTES.to_vec()
}

fn default_user() -> String {
    "local".to_string()
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            intervals_minutes: default_intervals(),
            auto_resolve_streak: None,
            default_user: default_user(),
            data_dir: None,
        }
    }
}

impl ReviewConfig {
    /// Default config file location (e.g., ~/.config/mew-review/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mew-review").join("config.toml"))
    }

    /// Load from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        log::info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        IntervalTable::from_minutes(&self.intervals_minutes)?;
        if self.auto_resolve_streak == Some(0) {
            return Err(ConfigError::InvalidAutoResolve);
        }
        if self.default_user.trim().is_empty() {
            return Err(ConfigError::BlankDefaultUser);
        }
        Ok(())
    }

    pub fn interval_table(&self) -> Result<IntervalTable> {
        Ok(IntervalTable::from_minutes(&self.intervals_minutes)?)
    }

    /// Scheduler configured from these settings
    pub fn scheduler(&self) -> Result<Scheduler> {
        Ok(Scheduler::new(self.interval_table()?).with_auto_resolve(self.auto_resolve_streak))
    }
}
