/*!
Scripted command runner for tests without ssh or real tools

Answers each command from a table of (command prefix, result) rules, optionally
restricted to one host, and records every call for later assertions. Host rules
come first, then the longest matching prefix wins. Commands with no matching
rule fail like a missing binary (exit 127).
*/

use bigbrother_monitor::{CommandResult, CommandRunner};
use std::sync::{Arc, Mutex};

/// Exit status returned when no rule matches
pub const NOT_FOUND_EXIT_CODE: i32 = 127;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub ip: String,
    pub user: Option<String>,
}

#[derive(Debug, Clone)]
struct Rule {
    host: Option<String>,
    prefix: String,
    result: CommandResult,
}

/// Cloning shares the rules and the call log
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    rules: Arc<Mutex<Vec<Rule>>>,
    invocations: Arc<Mutex<Vec<Invocation>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix` on every host
    pub fn respond(&self, prefix: &str, result: CommandResult) -> &Self {
        self.push_rule(None, prefix, result)
    }

    pub fn respond_ok(&self, prefix: &str, output: &str) -> &Self {
        self.respond(prefix, CommandResult::Success(output.to_string()))
    }

    /// Answer commands starting with `prefix` on `ip` only
    pub fn respond_on(&self, ip: &str, prefix: &str, result: CommandResult) -> &Self {
        self.push_rule(Some(ip.to_string()), prefix, result)
    }

    /// Every command sent to `ip` fails like an unreachable ssh host
    pub fn unreachable(&self, ip: &str) -> &Self {
        self.respond_on(
            ip,
            "",
            CommandResult::Failure {
                code: Some(255),
                stderr: format!("ssh: connect to host {} port 22: No route to host", ip),
            },
        )
    }

    /// Every command sent to `ip` times out
    pub fn hanging(&self, ip: &str) -> &Self {
        self.respond_on(ip, "", CommandResult::Timeout)
    }

    fn push_rule(&self, host: Option<String>, prefix: &str, result: CommandResult) -> &Self {
        self.rules.lock().unwrap().push(Rule {
            host,
            prefix: prefix.to_string(),
            result,
        });
        self
    }

    fn lookup(&self, command: &str, ip: &str) -> CommandResult {
        let rules = self.rules.lock().unwrap();
        let best = |host: Option<&str>| {
            rules
                .iter()
                .filter(|rule| rule.host.as_deref() == host && command.starts_with(&rule.prefix))
                .max_by_key(|rule| rule.prefix.len())
        };

        best(Some(ip))
            .or_else(|| best(None))
            .map(|rule| rule.result.clone())
            .unwrap_or_else(|| CommandResult::Failure {
                code: Some(NOT_FOUND_EXIT_CODE),
                stderr: format!("sh: 1: {}: not found", command.split(' ').next().unwrap_or(command)),
            })
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Commands sent to `ip`, in order
    pub fn commands_for(&self, ip: &str) -> Vec<String> {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .filter(|inv| inv.ip == ip)
            .map(|inv| inv.command.clone())
            .collect()
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &str, ip: &str, user: Option<&str>) -> CommandResult {
        self.invocations.lock().unwrap().push(Invocation {
            command: command.to_string(),
            ip: ip.to_string(),
            user: user.map(str::to_string),
        });
        tracing::debug!("[STUB] {} on {}", command, ip);

        self.lookup(command, ip)
    }
}
