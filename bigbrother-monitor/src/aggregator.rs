//! Collection pass: runs the diagnostic commands against every target and
//! merges the parsed fragments into records.
//!
//! Targets are visited strictly in listed order, instances first. A failing
//! command only blanks the fragment it feeds; the pass always completes.

use crate::execution::{destination, CommandRunner, DiagnosticCommand};
use crate::metrics::{self, MetricFragment};
use crate::snapshot::{InstanceRecord, Metadata, Snapshot, StorageRecord};
use crate::targets::{InstanceTarget, StorageTarget, Target, TargetList};
use crate::units::kib_to_human;
use chrono::Local;
use std::time::Instant;
use tracing::{debug, error, info};

/// Disk path checked on every instance
pub const INSTANCE_DISK_PATH: &str = "/";

/// Drives one runner over the target list
pub struct Collector<'a, R: CommandRunner> {
    runner: &'a R,
    memo_path: String,
}

impl<'a, R: CommandRunner> Collector<'a, R> {
    pub fn new(runner: &'a R, memo_path: impl Into<String>) -> Self {
        Self {
            runner,
            memo_path: memo_path.into(),
        }
    }

    /// Run one command and parse it, logging and blanking the fragment on error
    async fn collect<F: MetricFragment>(&self, target: Target<'_>, command: DiagnosticCommand) -> F {
        let command_line = command.command_line();
        let result = self.runner.run(&command_line, target.ip(), target.user()).await;

        match metrics::from_result::<F>(result, &command_line) {
            Ok(fragment) => fragment,
            Err(e) => {
                error!(
                    "{} ({}) [{}] {}",
                    target.name(),
                    destination(target.ip(), target.user()),
                    F::NAME,
                    e
                );
                F::default()
            }
        }
    }

    /// Full command set, in pipeline order
    pub async fn collect_instance(&self, instance: &InstanceTarget) -> InstanceRecord {
        let target = Target::Instance(instance);

        let cpu = self.collect(target, DiagnosticCommand::CpuCount).await;
        let load = self.collect(target, DiagnosticCommand::LoadAverage).await;
        let memory = self.collect(target, DiagnosticCommand::Memory).await;
        let disk = self
            .collect(
                target,
                DiagnosticCommand::DiskSpace {
                    path: INSTANCE_DISK_PATH.to_string(),
                },
            )
            .await;
        let network = self
            .collect(
                target,
                DiagnosticCommand::NetworkRate {
                    interface: instance.net_interface.clone(),
                },
            )
            .await;
        let uptime = self.collect(target, DiagnosticCommand::Uptime).await;
        let memo = self
            .collect(
                target,
                DiagnosticCommand::UsageMemo {
                    path: self.memo_path.clone(),
                },
            )
            .await;

        InstanceRecord {
            target: instance.clone(),
            cpu,
            load,
            memory,
            disk,
            network,
            uptime,
            memo,
        }
    }

    /// Disk space of the storage's configured path
    pub async fn collect_storage(&self, storage: &StorageTarget) -> StorageRecord {
        let disk = self
            .collect(
                Target::Storage(storage),
                DiagnosticCommand::DiskSpace {
                    path: storage.disk_path.clone(),
                },
            )
            .await;

        StorageRecord {
            target: storage.clone(),
            disk,
        }
    }

    /// Visit every instance then every storage and build the snapshot
    pub async fn collect_pass(&self, targets: &TargetList) -> Snapshot {
        let started_at = Local::now();
        let start_time = Instant::now();

        let total = targets.instances.len();
        info!("Monitor {} instances", total);
        let mut instances = Vec::with_capacity(total);
        for (i, instance) in targets.instances.iter().enumerate() {
            info!("[{}/{}] {} ({})", i + 1, total, instance.name, instance.ip);
            let record = self.collect_instance(instance).await;
            info!(
                "   cpu: {:?}, mem: {}/{}, disk: {}/{}, uptime: {:?}d",
                record.cpu.cpu,
                kib_to_human(record.memory.mem_used),
                kib_to_human(record.memory.mem_total),
                kib_to_human(record.disk.disk_space_used),
                kib_to_human(record.disk.disk_space_total),
                record.uptime.uptime
            );
            debug!(">> {:?}", record);
            instances.push(record);
        }

        let total = targets.storages.len();
        info!("Monitor {} storages", total);
        let mut storages = Vec::with_capacity(total);
        for (i, storage) in targets.storages.iter().enumerate() {
            info!(
                "[{}/{}] {} ({} - {})",
                i + 1,
                total,
                storage.name,
                storage.ip,
                storage.disk_path
            );
            let record = self.collect_storage(storage).await;
            info!(
                "   disk: {}/{}",
                kib_to_human(record.disk.disk_space_used),
                kib_to_human(record.disk.disk_space_total)
            );
            debug!(">> {:?}", record);
            storages.push(record);
        }

        let metadata = Metadata::new(started_at, start_time.elapsed());
        debug!(">> {:?}", metadata);

        Snapshot::new(metadata, instances, storages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::CommandResult;
    use crate::logging::tests::Buffer;
    use crate::logging::BracketLevel;
    use std::sync::Mutex;

    /// Answers by command prefix, records every call
    struct CannedRunner {
        answers: Vec<(&'static str, CommandResult)>,
        calls: Mutex<Vec<(String, String, Option<String>)>>,
    }

    impl CannedRunner {
        fn new(answers: Vec<(&'static str, CommandResult)>) -> Self {
            Self {
                answers,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn commands(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|c| c.0.clone()).collect()
        }
    }

    impl CommandRunner for CannedRunner {
        async fn run(&self, command: &str, ip: &str, user: Option<&str>) -> CommandResult {
            self.calls
                .lock()
                .unwrap()
                .push((command.to_string(), ip.to_string(), user.map(str::to_string)));
            self.answers
                .iter()
                .find(|(prefix, _)| command.starts_with(prefix))
                .map(|(_, result)| result.clone())
                .unwrap_or(CommandResult::Failure {
                    code: Some(127),
                    stderr: format!("sh: {}: not found", command),
                })
        }
    }

    fn ok(text: &str) -> CommandResult {
        CommandResult::Success(text.to_string())
    }

    fn instance() -> InstanceTarget {
        InstanceTarget {
            name: "apollo-1".to_string(),
            ip: "192.168.10.101".to_string(),
            user: Some("rdteam".to_string()),
            net_interface: "ens4".to_string(),
        }
    }

    fn storage() -> StorageTarget {
        StorageTarget {
            name: "nas".to_string(),
            kind: "NAS".to_string(),
            ip: "192.168.10.20".to_string(),
            user: None,
            disk_path: "/volume1".to_string(),
        }
    }

    const DF: &str = "Filesystem     1K-blocks     Used Available Use% Mounted on\n\
                      /dev/md2       957150424 24655784 883800368   3% /volume1\n";

    #[tokio::test]
    async fn test_instance_commands_run_in_pipeline_order() {
        let runner = CannedRunner::new(vec![]);
        let collector = Collector::new(&runner, "/opt/bigbrother.memo");
        collector.collect_instance(&instance()).await;

        assert_eq!(
            runner.commands(),
            vec![
                "nproc",
                "top -b -n1 -i",
                "free",
                "df /",
                "iftop -i ens4 -n -t -s 1",
                "uptime --pretty",
                "cat /opt/bigbrother.memo",
            ]
        );
        let calls = runner.calls.lock().unwrap();
        assert!(calls
            .iter()
            .all(|(_, ip, user)| ip == "192.168.10.101" && user.as_deref() == Some("rdteam")));
    }

    #[tokio::test]
    async fn test_failing_commands_only_blank_their_fragment() {
        let runner = CannedRunner::new(vec![
            ("nproc", ok("16\n")),
            ("free", CommandResult::Timeout),
            ("cat", ok("  MK: training run\n")),
        ]);
        let collector = Collector::new(&runner, "/opt/bigbrother.memo");
        let record = collector.collect_instance(&instance()).await;

        assert_eq!(record.cpu.cpu, Some(16));
        assert_eq!(record.memory.mem_total, None);
        assert_eq!(record.memory.mem_used, None);
        assert_eq!(record.load.load_avg_1, None);
        assert_eq!(record.memo.usage_memo.as_deref(), Some("MK: training run"));
        assert_eq!(record.target, instance());
    }

    #[tokio::test]
    async fn test_failure_log_names_the_ssh_destination() {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .event_format(BracketLevel)
            .with_writer(move || writer.clone())
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let runner = CannedRunner::new(vec![("free", CommandResult::Timeout)]);
        let collector = Collector::new(&runner, "/opt/bigbrother.memo");
        collector.collect_instance(&instance()).await;
        collector.collect_storage(&storage()).await;

        let output = buffer.contents();
        assert!(output.contains("[ERROR] apollo-1 (rdteam@192.168.10.101) [free] Timeout running command 'free'\n"));
        assert!(output.contains("[ERROR] nas (192.168.10.20) [df] Error running command 'df /volume1'"));
    }

    #[tokio::test]
    async fn test_storage_checks_its_disk_path() {
        let runner = CannedRunner::new(vec![("df /volume1", ok(DF))]);
        let collector = Collector::new(&runner, "/opt/bigbrother.memo");
        let record = collector.collect_storage(&storage()).await;

        assert_eq!(runner.commands(), vec!["df /volume1"]);
        assert_eq!(record.disk.disk_file_sys.as_deref(), Some("/dev/md2"));
        assert_eq!(record.disk.disk_space_total, Some(957150424));
        assert_eq!(record.disk.disk_space_used, Some(24655784));
    }

    #[tokio::test]
    async fn test_pass_keeps_target_order_and_unreachable_targets() {
        let runner = CannedRunner::new(vec![("df /volume1", ok(DF))]);
        let collector = Collector::new(&runner, "/opt/bigbrother.memo");

        let mut second = instance();
        second.name = "apollo-2".to_string();
        let targets = TargetList {
            instances: vec![instance(), second],
            storages: vec![storage()],
        };

        let snapshot = collector.collect_pass(&targets).await;

        assert_eq!(snapshot.instances.len(), 2);
        assert_eq!(snapshot.instances[0].target.name, "apollo-1");
        assert_eq!(snapshot.instances[1].target.name, "apollo-2");
        assert_eq!(snapshot.instances[1], InstanceRecord::unknown(targets.instances[1].clone()));
        assert_eq!(snapshot.storages[0].disk.disk_space_avail, Some(883800368));
        assert_eq!(snapshot.metadata.timedelta, "0:00:00");
        assert_eq!(runner.commands().len(), 2 * 7 + 1);
    }
}
