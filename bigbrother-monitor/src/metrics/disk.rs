//! Disk space from the second line of `df <path>`
//!
//! ```text
//! Filesystem                        1K-blocks     Used Available Use% Mounted on
//! /dev/mapper/ubuntu--vg-ubuntu--lv 957150424 24655784 883800368   3% /
//! ```
//!
//! Sizes are 1K blocks. A filesystem name long enough to make `df` wrap onto
//! its own line is reported as a mismatch.

use super::{nth_line, output_lines, parse_unsigned, MetricFragment};
use crate::error::CollectError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskMetrics {
    pub disk_file_sys: Option<String>,
    pub disk_space_total: Option<u64>,
    pub disk_space_used: Option<u64>,
    pub disk_space_avail: Option<u64>,
}

impl MetricFragment for DiskMetrics {
    const NAME: &'static str = "df";

    fn parse(raw: &str) -> Result<Self, CollectError> {
        let lines = output_lines(raw);
        let line = nth_line(&lines, 1, Self::NAME)?;

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            return Err(CollectError::mismatch(Self::NAME, line));
        }

        let percent = parts[4]
            .strip_suffix('%')
            .filter(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
        if percent.is_none() {
            return Err(CollectError::mismatch(Self::NAME, line));
        }

        let total = parse_unsigned(parts[1])?;
        let used = parse_unsigned(parts[2])?;
        let avail = parse_unsigned(parts[3])?;
        if used > total {
            return Err(CollectError::conversion(line, "used space exceeds total"));
        }

        Ok(Self {
            disk_file_sys: Some(parts[0].to_string()),
            disk_space_total: Some(total),
            disk_space_used: Some(used),
            disk_space_avail: Some(avail),
        })
    }
}
