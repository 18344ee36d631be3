//! Logging setup: `[LEVEL] message` on the console, timestamped lines in a
//! daily rolling file.
//!
//! The configured log path is a prefix: lines for a given day go to
//! `<path>.YYYY-MM-DD`, dated in UTC, and only the last 7 files are kept.
//!
//! `RUST_LOG` overrides the default filter.

use anyhow::{Context, Result};
use chrono::Utc;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder as RollingBuilder, Rotation};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,bigbrother_monitor=debug";

/// Rolled log files kept on disk
const MAX_LOG_FILES: usize = 7;

/// Console format: `[INFO] Monitor 3 instances`
pub struct BracketLevel;

impl<S, N> FormatEvent<S, N> for BracketLevel
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        write!(writer, "[{}] ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber
///
/// The returned guard flushes the log file when dropped and must live as
/// long as the process logs.
pub fn init(log_path: Option<&Path>, console: bool) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console_layer = console.then(|| tracing_subscriber::fmt::layer().event_format(BracketLevel));

    let (file_layer, guard) = match log_path {
        Some(path) => {
            let (writer, guard) = rolling_writer(path)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

/// File the rolling writer appends to today for the configured `path`
pub fn active_log_file(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}", Utc::now().format("%Y-%m-%d")));
    PathBuf::from(name)
}

fn rolling_writer(path: &Path) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("Invalid log path: {}", path.display()))?;

    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory {}", directory.display()))?;

    let appender = RollingBuilder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_name.to_string_lossy())
        .max_log_files(MAX_LOG_FILES)
        .build(directory)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// In-memory log sink shared with the subscriber
    #[derive(Clone, Default)]
    pub(crate) struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_console_format() {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .event_format(BracketLevel)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Monitor {} instances", 2);
            tracing::error!("Timeout running command 'nproc'");
        });

        let output = buffer.contents();
        assert_eq!(output, "[INFO] Monitor 2 instances\n[ERROR] Timeout running command 'nproc'\n");
    }

    #[test]
    fn test_init_creates_log_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("live_data").join("monitor.log");

        let guard = init(Some(&log_path), false).unwrap();
        tracing::info!("written to file");
        drop(guard);

        let active = active_log_file(&log_path);
        assert_eq!(
            active.file_name().unwrap().to_string_lossy(),
            format!("monitor.log.{}", Utc::now().format("%Y-%m-%d"))
        );
        assert!(std::fs::read_to_string(&active).unwrap().contains("written to file"));
        assert!(!log_path.exists());
    }
}
