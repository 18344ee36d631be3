/*!
Test harness for monitoring passes

Owns a temporary directory holding the target list and the snapshot, so a
test only has to provide targets and a runner:
- `write_targets` / `write_raw_targets` prepare the input
- `run_once` runs a full pass and reads the snapshot back from disk
- assertion helpers check records and raw JSON
*/

use anyhow::{Context, Result};
use bigbrother_monitor::{
    load_snapshot, monitor_once, CommandRunner, InstanceRecord, MonitorConfig, Snapshot, TargetList,
};
use serde_json::Value;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

pub struct TestHarness {
    // removed with the harness
    _dir: TempDir,
    config: MonitorConfig,
}

impl TestHarness {
    pub fn new() -> Result<Self> {
        init_test_logging();

        let dir = TempDir::new().context("Failed to create temporary directory")?;
        let config = MonitorConfig {
            targets_path: dir.path().join("instances.json"),
            output_path: dir.path().join("live_data").join("monitoring_results.json"),
            log_path: None,
            ..Default::default()
        };

        Ok(Self { _dir: dir, config })
    }

    /// Adjust the configuration used by `run_once`
    pub fn with_config(mut self, update: impl FnOnce(&mut MonitorConfig)) -> Self {
        update(&mut self.config);
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn write_targets(&self, targets: &TargetList) -> Result<()> {
        let content = serde_json::to_string_pretty(targets)?;
        self.write_raw_targets(&content)
    }

    pub fn write_raw_targets(&self, content: &str) -> Result<()> {
        std::fs::write(&self.config.targets_path, content)
            .with_context(|| format!("Failed to write {}", self.config.targets_path.display()))
    }

    /// Run one pass, then check the file on disk matches what was returned
    pub async fn run_once<R: CommandRunner>(&self, runner: &R) -> Result<Snapshot> {
        let snapshot = monitor_once(&self.config, runner).await?;
        let written = self.read_snapshot().await?;

        if written != snapshot {
            anyhow::bail!("Snapshot on disk differs from the one returned by the pass");
        }
        Ok(written)
    }

    pub async fn read_snapshot(&self) -> Result<Snapshot> {
        Ok(load_snapshot(&self.config.output_path).await?)
    }

    pub fn read_snapshot_json(&self) -> Result<Value> {
        let content = std::fs::read_to_string(&self.config.output_path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Route tracing output through the test writer, once per test binary
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// Assert every metric of the record is absent
pub fn assert_all_absent(record: &InstanceRecord) {
    assert_eq!(
        *record,
        InstanceRecord::unknown(record.target.clone()),
        "expected every metric of {} to be absent",
        record.target.name
    );
}

/// Assert a JSON field exists and is null
pub fn assert_null_field(value: &Value, field: &str) {
    match value.get(field) {
        Some(Value::Null) => {}
        Some(other) => panic!("field '{}' should be null, got {}", field, other),
        None => panic!("field '{}' is missing", field),
    }
}
