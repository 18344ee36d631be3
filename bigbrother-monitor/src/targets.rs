//! Target list: the instances and storages to visit each cycle
//!
//! Read fresh from disk at the start of every cycle and never mutated by the
//! pipeline. Identity of a target is its (name, ip) pair.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Compute instance monitored with the full command set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceTarget {
    pub name: String,
    pub ip: String,
    #[serde(default)]
    pub user: Option<String>,
    pub net_interface: String,
}

/// Storage endpoint, only its disk space is monitored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageTarget {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub ip: String,
    #[serde(default)]
    pub user: Option<String>,
    pub disk_path: String,
}

/// Either kind of target, for code that only needs how to reach it
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Instance(&'a InstanceTarget),
    Storage(&'a StorageTarget),
}

impl<'a> Target<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Target::Instance(t) => &t.name,
            Target::Storage(t) => &t.name,
        }
    }

    pub fn ip(&self) -> &'a str {
        match self {
            Target::Instance(t) => &t.ip,
            Target::Storage(t) => &t.ip,
        }
    }

    pub fn user(&self) -> Option<&'a str> {
        match self {
            Target::Instance(t) => t.user.as_deref(),
            Target::Storage(t) => t.user.as_deref(),
        }
    }
}

/// Content of the target-list JSON file
///
/// Both sections are required, possibly empty. A file missing one of them is
/// malformed rather than an empty fleet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetList {
    pub instances: Vec<InstanceTarget>,
    pub storages: Vec<StorageTarget>,
}

impl TargetList {
    /// Load and validate the target list from disk
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::TargetsUnreadable {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_json(&content).map_err(|source| ConfigError::TargetsMalformed {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn len(&self) -> usize {
        self.instances.len() + self.storages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
