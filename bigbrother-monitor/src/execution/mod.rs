//! Command execution module for the monitor
//!
//! Runs one diagnostic command against one target:
//! - Loopback targets run the command directly through `sh -c`
//! - Remote targets wrap it in `timeout <secs> ssh <dst> <command>`
//! - Every call is bounded by the configured timeout
//!
//! Errors never leave this module: spawn failures, timeouts and non-zero
//! exits are all represented as `CommandResult` variants.

use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command as AsyncCommand;
use tracing::debug;

/// Exit status used by coreutils `timeout` when the time limit expired
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Default upper bound for one command
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Hosts that are reached without ssh
pub const LOOPBACK_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

/// Extra time granted to the ssh wrapper so its own timeout fires first
const REMOTE_GRACE: Duration = Duration::from_secs(2);

/// Outcome of one command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Success(String),
    Timeout,
    /// `code` is `None` when the process could not be spawned or was killed by a signal
    Failure { code: Option<i32>, stderr: String },
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandResult::Success(_))
    }
}

/// Executes a shell command against a target
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn run(&self, command: &str, ip: &str, user: Option<&str>) -> CommandResult;
}

/// The seven fixed commands issued against targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticCommand {
    CpuCount,
    LoadAverage,
    Memory,
    DiskSpace { path: String },
    NetworkRate { interface: String },
    Uptime,
    UsageMemo { path: String },
}

impl DiagnosticCommand {
    pub fn command_line(&self) -> String {
        match self {
            DiagnosticCommand::CpuCount => "nproc".to_string(),
            DiagnosticCommand::LoadAverage => "top -b -n1 -i".to_string(),
            DiagnosticCommand::Memory => "free".to_string(),
            DiagnosticCommand::DiskSpace { path } => format!("df {}", shell_words::quote(path)),
            DiagnosticCommand::NetworkRate { interface } => {
                format!("iftop -i {} -n -t -s 1", shell_words::quote(interface))
            }
            DiagnosticCommand::Uptime => "uptime --pretty".to_string(),
            DiagnosticCommand::UsageMemo { path } => format!("cat {}", shell_words::quote(path)),
        }
    }
}

pub fn is_loopback(ip: &str) -> bool {
    LOOPBACK_HOSTS.contains(&ip)
}

/// ssh destination: `user@ip`, or the bare ip when no user is set
pub fn destination(ip: &str, user: Option<&str>) -> String {
    match user {
        Some(user) => format!("{}@{}", user, ip),
        None => ip.to_string(),
    }
}

/// Build the full command line for a target, ssh-wrapped unless loopback
pub fn wrap_for_remote(command: &str, ip: &str, user: Option<&str>, timeout: Duration) -> String {
    if is_loopback(ip) {
        return command.to_string();
    }

    format!(
        "timeout {} ssh -o BatchMode=yes {} {}",
        timeout.as_secs().max(1),
        destination(ip, user),
        shell_words::quote(command)
    )
}

/// Runs commands through `sh -c`, locally or over ssh
#[derive(Debug, Clone)]
pub struct ShellCommandRunner {
    timeout: Duration,
}

impl ShellCommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn execute(&self, command_line: &str, limit: Duration) -> CommandResult {
        let child = AsyncCommand::new("sh")
            .arg("-c")
            .arg(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                return CommandResult::Failure {
                    code: None,
                    stderr: format!("Failed to spawn command: {}", e),
                }
            }
        };

        // Dropping the future on timeout kills the child
        let output = match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return CommandResult::Failure {
                    code: None,
                    stderr: format!("Failed to wait for command: {}", e),
                }
            }
            Err(_) => return CommandResult::Timeout,
        };

        match output.status.code() {
            Some(0) => CommandResult::Success(String::from_utf8_lossy(&output.stdout).into_owned()),
            Some(TIMEOUT_EXIT_CODE) => CommandResult::Timeout,
            code => CommandResult::Failure {
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            },
        }
    }
}

impl Default for ShellCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT)
    }
}

impl CommandRunner for ShellCommandRunner {
    async fn run(&self, command: &str, ip: &str, user: Option<&str>) -> CommandResult {
        let start_time = Instant::now();
        let command_line = wrap_for_remote(command, ip, user, self.timeout);
        let limit = if is_loopback(ip) {
            self.timeout
        } else {
            self.timeout + REMOTE_GRACE
        };

        debug!("Executing command: {} (timeout: {:?})", command_line, self.timeout);
        let result = self.execute(&command_line, limit).await;
        debug!(
            "Command '{}' finished in {}ms (success: {})",
            command_line,
            start_time.elapsed().as_millis(),
            result.is_success()
        );

        result
    }
}
