//! Cycle driver
//!
//! `Idle` until `run()` is called, then `Running` forever: load targets,
//! collect, write the snapshot, sleep. Any `MonitorError` is logged and
//! returned, ending the loop; restarting is left to the process supervisor.

use crate::aggregator::Collector;
use crate::config::MonitorConfig;
use crate::error::{ConfigError, MonitorError};
use crate::execution::CommandRunner;
use crate::snapshot::{write_snapshot, Snapshot};
use crate::targets::TargetList;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

pub struct Scheduler<R: CommandRunner> {
    config: MonitorConfig,
    runner: R,
    state: SchedulerState,
}

impl<R: CommandRunner> Scheduler<R> {
    /// Validate the configuration; an invalid period never reaches the loop
    pub fn new(config: MonitorConfig, runner: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            runner,
            state: SchedulerState::Idle,
        })
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// One pass: load targets, collect, write
    pub async fn run_once(&self) -> Result<Snapshot, MonitorError> {
        let result = monitor_once(&self.config, &self.runner).await;
        if let Err(e) = &result {
            error!("Monitoring pass failed: {}", e);
        }
        result
    }

    /// Loop until a pass fails
    pub async fn run(&mut self) -> Result<(), MonitorError> {
        self.state = SchedulerState::Running;
        let period = self.config.period();

        loop {
            self.run_once().await?;

            info!("{}", "-".repeat(80));
            info!("Sleep {}s...", period.as_secs());
            info!("{}", "-".repeat(80));
            tokio::time::sleep(period).await;
        }
    }
}

/// Run a single pass with `runner` and write its snapshot
pub async fn monitor_once<R: CommandRunner>(
    config: &MonitorConfig,
    runner: &R,
) -> Result<Snapshot, MonitorError> {
    let targets = TargetList::load(&config.targets_path).await?;

    let collector = Collector::new(runner, config.memo_path.clone());
    let snapshot = collector.collect_pass(&targets).await;

    info!("Write snapshot to {}", config.output_path.display());
    write_snapshot(&config.output_path, &snapshot).await?;

    Ok(snapshot)
}
