/*!
Sample outputs of the diagnostic tools, captured on real machines

Values parsed from these samples:
- `NPROC`: cpu = 80
- `TOP`: load = 12.09 / 12.26 / 15.26 (comma locale)
- `FREE`: mem_total = 528221324, mem_used = 2856272
- `DF_ROOT`: /dev/mapper/ubuntu--vg-ubuntu--lv, 957150424 / 24655784 / 883800368
- `DF_STORAGE`: nas:/volume1, 23053657984 / 14380298752 / 8673359232
- `IFTOP`: send = 13312 b/s, receive = 42189 b/s
- `UPTIME`: 18 days
- `MEMO`: "MK - training until friday"
*/

use crate::runner_stub::ScriptedRunner;
use bigbrother_monitor::{InstanceTarget, StorageTarget, TargetList};

pub const NPROC: &str = "80\n";

pub const TOP: &str = "top - 09:20:25 up 18 days,  1:58,  0 users,  load average: 12,09, 12,26, 15,26
Tasks: 809 total,  11 running, 798 sleeping,   0 stopped,   0 zombie
%Cpu(s):  8,9 us,  4,0 sy,  0,0 ni, 85,8 id,  1,3 wa,  0,0 hi,  0,0 si,  0,0 st
MiB Mem : 515841,1 total, 301515,1 free,   2789,3 used, 211536,7 buff/cache
MiB Swap:   8192,0 total,   8065,0 free,    127,0 used. 509381,1 avail Mem
";

pub const FREE: &str = "               total        used        free      shared  buff/cache   available
Mem:       528221324     2856272   308751440        5476   216613612   521607216
Swap:        8388604      130048     8258556
";

pub const DF_ROOT: &str = "Filesystem                        1K-blocks     Used Available Use% Mounted on
/dev/mapper/ubuntu--vg-ubuntu--lv 957150424 24655784 883800368   3% /
";

pub const DF_STORAGE: &str = "Filesystem         1K-blocks        Used  Available Use% Mounted on
nas:/volume1     23053657984 14380298752 8673359232  63% /mnt/nas
";

pub const IFTOP: &str = "interface: ens4
IP address is: 192.168.10.107
MAC address is: 04:d9:f5:13:8e:e1
Listening on ens4
   # Host name (port/service if enabled)            last 2s   last 10s   last 40s cumulative
--------------------------------------------------------------------------------------------
   1 192.168.10.107                           =>     13,0Kb     13,0Kb     13,0Kb     3,25KB
     192.168.10.205                           <=     40,4Kb     40,4Kb     40,4Kb     10,1KB
--------------------------------------------------------------------------------------------
Total send rate:                                     13,0Kb     13,0Kb     13,0Kb
Total receive rate:                                  41,2Kb     41,2Kb     41,2Kb
Total send and receive rate:                         54,2Kb     54,2Kb     54,2Kb
--------------------------------------------------------------------------------------------
Peak rate (sent/received/total):                     13,0Kb     41,1Kb     54,1Kb
Cumulative (sent/received/total):                    3,25KB     10,3KB     13,5KB
============================================================================================
";

pub const UPTIME: &str = "up 2 weeks, 4 days, 11 hours, 58 minutes\n";

pub const MEMO: &str = "MK - training until friday\n";

/// Runner answering every diagnostic command with the samples above
pub fn healthy_runner() -> ScriptedRunner {
    let runner = ScriptedRunner::new();
    runner
        .respond_ok("nproc", NPROC)
        .respond_ok("top", TOP)
        .respond_ok("free", FREE)
        .respond_ok("df /", DF_ROOT)
        .respond_ok("iftop", IFTOP)
        .respond_ok("uptime", UPTIME)
        .respond_ok("cat", MEMO);
    runner
}

/// Fluent builder for target lists
#[derive(Debug, Default)]
pub struct TargetListBuilder {
    list: TargetList,
}

impl TargetListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instance(mut self, name: &str, ip: &str, user: Option<&str>, net_interface: &str) -> Self {
        self.list.instances.push(InstanceTarget {
            name: name.to_string(),
            ip: ip.to_string(),
            user: user.map(str::to_string),
            net_interface: net_interface.to_string(),
        });
        self
    }

    pub fn storage(mut self, name: &str, kind: &str, ip: &str, user: Option<&str>, disk_path: &str) -> Self {
        self.list.storages.push(StorageTarget {
            name: name.to_string(),
            kind: kind.to_string(),
            ip: ip.to_string(),
            user: user.map(str::to_string),
            disk_path: disk_path.to_string(),
        });
        self
    }

    pub fn build(self) -> TargetList {
        self.list
    }
}
