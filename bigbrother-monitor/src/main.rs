//! BigBrother Monitor - collects fleet metrics into a JSON snapshot
//!
//! Runs forever by default, one pass every `--period` seconds. With `--once`
//! it runs a single pass and exits.

use anyhow::{Context, Result};
use bigbrother_monitor::config::{ConfigOverrides, MonitorConfig, CONFIG_ENV_VAR};
use bigbrother_monitor::{logging, Scheduler, ShellCommandRunner};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bigbrother-monitor")]
#[command(about = "Periodic metrics collection over instances and storages")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Target list (instances and storages)
    #[arg(long)]
    instances_json: Option<PathBuf>,

    /// Snapshot written after each pass
    #[arg(long)]
    out_json: Option<PathBuf>,

    /// Rolling log file; the active file is `<LOG>.YYYY-MM-DD` (UTC date)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Seconds between two passes
    #[arg(long, allow_negative_numbers = true)]
    period: Option<i64>,

    /// Upper bound in seconds for each diagnostic command
    #[arg(long)]
    command_timeout: Option<u64>,

    /// Memo file read on every instance
    #[arg(long)]
    memo_path: Option<String>,

    /// Run a single pass and exit
    #[arg(long)]
    once: bool,

    /// Log to the file only
    #[arg(long)]
    no_console: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            targets_path: self.instances_json.clone(),
            output_path: self.out_json.clone(),
            log_path: self.log.clone(),
            period_secs: self.period,
            command_timeout_secs: self.command_timeout,
            memo_path: self.memo_path.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = MonitorConfig::load(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?
        .merge(cli.overrides());

    let _log_guard = logging::init(config.log_file(), !cli.no_console)
        .context("Failed to initialize logging")?;

    info!("BigBrother monitor v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(path) = config.log_file() {
        info!("Log file: {}", logging::active_log_file(path).display());
    }
    info!(
        "Targets: {}, snapshot: {}, period: {}s",
        config.targets_path.display(),
        config.output_path.display(),
        config.period_secs
    );

    let runner = ShellCommandRunner::new(config.command_timeout());
    let mut scheduler = Scheduler::new(config, runner).context("Invalid configuration")?;

    if cli.once {
        scheduler.run_once().await.context("Monitoring pass failed")?;
        return Ok(());
    }

    scheduler.run().await.context("Monitor execution failed")?;

    Ok(())
}
