//! Error taxonomy for the monitor
//!
//! Two families live here:
//! - `CollectError`: recovered inside the owning parser, logged, and turned
//!   into absent fields. Never escapes a collection pass.
//! - `ConfigError` / `PersistenceError`: fatal for the cycle, bubbled up to
//!   the scheduler as `MonitorError`.

use std::path::PathBuf;

/// Per-command failure, recovered locally by the metric collector
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("Timeout running command '{command}'")]
    CommandTimeout { command: String },

    #[error("Error running command '{command}' (exit code {}):\n{stderr}", display_code(.code))]
    CommandFailure {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{parser}: unexpected output '{line}'")]
    ParseMismatch { parser: &'static str, line: String },

    #[error("Cannot convert '{value}': {reason}")]
    Conversion { value: String, reason: String },
}

impl CollectError {
    pub(crate) fn mismatch(parser: &'static str, line: impl Into<String>) -> Self {
        Self::ParseMismatch {
            parser,
            line: line.into(),
        }
    }

    pub(crate) fn conversion(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Conversion {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

/// Invalid configuration or target list, fatal before any collection
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid period: {0} (must be a positive number of seconds)")]
    InvalidPeriod(i64),

    #[error("Invalid command timeout: {0}s")]
    InvalidTimeout(u64),

    #[error("Cannot read target list {path}: {source}")]
    TargetsUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed target list {path}: {source}")]
    TargetsMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot read config file {path}: {source}")]
    ConfigFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file {path}: {source}")]
    ConfigFileMalformed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Snapshot could not be written (or read back)
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Cannot create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Cannot read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed snapshot {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that aborts a cycle
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_carries_code_and_stderr() {
        let err = CollectError::CommandFailure {
            command: "df /data".to_string(),
            code: Some(1),
            stderr: "df: /data: No such file or directory".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("No such file"));

        let err = CollectError::CommandFailure {
            command: "nproc".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("exit code none"));
    }

    #[test]
    fn test_monitor_error_is_transparent() {
        let err: MonitorError = ConfigError::InvalidPeriod(0).into();
        assert_eq!(err.to_string(), ConfigError::InvalidPeriod(0).to_string());
    }
}
