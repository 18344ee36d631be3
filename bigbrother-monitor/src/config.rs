//! Monitor configuration
//!
//! Layered, lowest priority first:
//! - Built-in defaults
//! - Optional TOML file (`--config`, or the `BIGBROTHER_CONFIG` variable)
//! - Command-line overrides
//!
//! The resulting value is immutable and passed explicitly to the scheduler.
//!
//! ```toml
//! targets_path = "/etc/bigbrother/instances.json"
//! output_path = "/var/www/bigbrother/monitoring_results.json"
//! log_path = "/var/log/bigbrother/monitor.log"
//! period_secs = 60
//! command_timeout_secs = 10
//! memo_path = "/opt/bigbrother.memo"
//! ```

use crate::error::ConfigError;
use crate::execution::DEFAULT_COMMAND_TIMEOUT;
use crate::metrics::memo::DEFAULT_MEMO_PATH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable naming the config file when `--config` is absent
pub const CONFIG_ENV_VAR: &str = "BIGBROTHER_CONFIG";

pub const DEFAULT_TARGETS_PATH: &str = "instances.json";
pub const DEFAULT_OUTPUT_PATH: &str = "live_data/monitoring_results.json";
pub const DEFAULT_LOG_PATH: &str = "live_data/monitor.log";
pub const DEFAULT_PERIOD_SECS: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Target-list JSON, re-read every cycle
    pub targets_path: PathBuf,
    /// Snapshot written at the end of every cycle
    pub output_path: PathBuf,
    /// Rolling log file name; the file written today is `<log_path>.YYYY-MM-DD`.
    /// `None` or an empty path keeps logging on the console only
    pub log_path: Option<PathBuf>,
    /// Pause between two cycles
    pub period_secs: i64,
    /// Upper bound for each diagnostic command
    pub command_timeout_secs: u64,
    /// Memo file read on every instance
    pub memo_path: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            targets_path: PathBuf::from(DEFAULT_TARGETS_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            log_path: Some(PathBuf::from(DEFAULT_LOG_PATH)),
            period_secs: DEFAULT_PERIOD_SECS,
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT.as_secs(),
            memo_path: DEFAULT_MEMO_PATH.to_string(),
        }
    }
}

/// Values given on the command line, each one replacing the layer below
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub targets_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    pub period_secs: Option<i64>,
    pub command_timeout_secs: Option<u64>,
    pub memo_path: Option<String>,
}

impl MonitorConfig {
    /// Load from `path`, else from `$BIGBROTHER_CONFIG`, else defaults
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);

        match path.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::load_file(&path).await,
            None => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load a TOML file, missing keys keep their default
    pub async fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::ConfigFileUnreadable {
                path: path.to_path_buf(),
                source,
            })?;

        let config = Self::from_toml(&content).map_err(|source| ConfigError::ConfigFileMalformed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply command-line overrides on top of this configuration
    pub fn merge(self, overrides: ConfigOverrides) -> Self {
        Self {
            targets_path: overrides.targets_path.unwrap_or(self.targets_path),
            output_path: overrides.output_path.unwrap_or(self.output_path),
            log_path: overrides.log_path.or(self.log_path),
            period_secs: overrides.period_secs.unwrap_or(self.period_secs),
            command_timeout_secs: overrides.command_timeout_secs.unwrap_or(self.command_timeout_secs),
            memo_path: overrides.memo_path.unwrap_or(self.memo_path),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period_secs <= 0 {
            return Err(ConfigError::InvalidPeriod(self.period_secs));
        }
        if self.command_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(self.command_timeout_secs));
        }
        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs.max(0).unsigned_abs())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Log file to write, if any
    pub fn log_file(&self) -> Option<&Path> {
        self.log_path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}
