//! Snapshot of one collection pass and its persistence
//!
//! The snapshot file is the only contract with the dashboard: it is fully
//! replaced each cycle, and every metric field is nullable (null = unknown).
//!
//! ```json
//! {
//!    "metadata": {"timestamp": "2022-12-16 13:44:43", "timedelta": "0:00:07"},
//!    "instances": [{"name": "apollo-1", "ip": "192.168.10.101", "cpu": 80, ...}],
//!    "storages": [{"name": "nas", "type": "NAS", "disk_space_total": 957150424, ...}]
//! }
//! ```

use crate::error::PersistenceError;
use crate::metrics::{
    CpuMetrics, DiskMetrics, LoadMetrics, MemoryMetrics, NetworkMetrics, UptimeMetrics, UsageMemo,
};
use crate::targets::{InstanceTarget, StorageTarget};
use crate::units::format_elapsed;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Indentation of the written JSON file
const JSON_INDENT: &[u8] = b"   ";

/// Run metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Wall-clock instant at pass start
    pub timestamp: String,
    /// Pass duration as `H:MM:SS`
    pub timedelta: String,
}

impl Metadata {
    pub fn new(started_at: DateTime<Local>, elapsed: Duration) -> Self {
        Self {
            timestamp: started_at.format(DATETIME_FORMAT).to_string(),
            timedelta: format_elapsed(elapsed),
        }
    }
}

/// Instance descriptor merged with every metric fragment, in pipeline order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    #[serde(flatten)]
    pub target: InstanceTarget,
    #[serde(flatten)]
    pub cpu: CpuMetrics,
    #[serde(flatten)]
    pub load: LoadMetrics,
    #[serde(flatten)]
    pub memory: MemoryMetrics,
    #[serde(flatten)]
    pub disk: DiskMetrics,
    #[serde(flatten)]
    pub network: NetworkMetrics,
    #[serde(flatten)]
    pub uptime: UptimeMetrics,
    #[serde(flatten)]
    pub memo: UsageMemo,
}

impl InstanceRecord {
    /// Record with every metric absent
    pub fn unknown(target: InstanceTarget) -> Self {
        Self {
            target,
            cpu: CpuMetrics::default(),
            load: LoadMetrics::default(),
            memory: MemoryMetrics::default(),
            disk: DiskMetrics::default(),
            network: NetworkMetrics::default(),
            uptime: UptimeMetrics::default(),
            memo: UsageMemo::default(),
        }
    }
}

/// Storage descriptor merged with its disk space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageRecord {
    #[serde(flatten)]
    pub target: StorageTarget,
    #[serde(flatten)]
    pub disk: DiskMetrics,
}

/// Everything gathered during one pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub metadata: Metadata,
    pub instances: Vec<InstanceRecord>,
    pub storages: Vec<StorageRecord>,
}

impl Snapshot {
    pub fn new(metadata: Metadata, instances: Vec<InstanceRecord>, storages: Vec<StorageRecord>) -> Self {
        Self {
            metadata,
            instances,
            storages,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(out)
    }
}

/// Write the snapshot, replacing any previous one
///
/// The content goes to a sibling temporary file first and is renamed over
/// the destination, so readers see either the old or the new snapshot.
pub async fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), PersistenceError> {
    let content = snapshot.to_json()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| PersistenceError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let tmp_path = temporary_path(path);
    let write_error = |source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Err(e) = tokio::fs::write(&tmp_path, &content).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_error(e));
    }
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_error(e));
    }

    Ok(())
}

/// Read a snapshot back from disk
pub async fn load_snapshot(path: &Path) -> Result<Snapshot, PersistenceError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PersistenceError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&content).map_err(|source| PersistenceError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn temporary_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".to_string());
    path.with_file_name(format!(".{}.tmp", file_name))
}
