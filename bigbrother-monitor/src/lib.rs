//! BigBrother Monitor - periodic metrics collection over a fleet of machines
//!
//! Every cycle the monitor:
//! - Reads the target list (compute instances and storage endpoints)
//! - Runs a fixed set of diagnostic commands on each, locally or over ssh
//! - Parses each tool's text output into typed, nullable metrics
//! - Replaces the JSON snapshot consumed by the dashboard
//!
//! A failing command or unexpected output only blanks the metrics it feeds.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod metrics;
pub mod scheduler;
pub mod snapshot;
pub mod targets;
pub mod units;

pub use aggregator::Collector;
pub use config::{ConfigOverrides, MonitorConfig};
pub use error::{CollectError, ConfigError, MonitorError, PersistenceError};
pub use execution::{CommandResult, CommandRunner, DiagnosticCommand, ShellCommandRunner};
pub use scheduler::{monitor_once, Scheduler, SchedulerState};
pub use snapshot::{load_snapshot, write_snapshot, InstanceRecord, Metadata, Snapshot, StorageRecord};
pub use targets::{InstanceTarget, StorageTarget, TargetList};
