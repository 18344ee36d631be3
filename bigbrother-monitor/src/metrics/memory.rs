//! Memory usage from the second line of `free`
//!
//! ```text
//!                total        used        free      shared  buff/cache   available
//! Mem:       528221324     2856272   308751440        5476   216613612   521607216
//! Swap:        8388604      130048     8258556
//! ```
//!
//! Values are KiB as printed by `free`; `mem_used` is the tool's own "used"
//! column.

use super::{nth_line, output_lines, parse_unsigned, MetricFragment};
use crate::error::CollectError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    pub mem_total: Option<u64>,
    pub mem_used: Option<u64>,
}

impl MetricFragment for MemoryMetrics {
    const NAME: &'static str = "free";

    fn parse(raw: &str) -> Result<Self, CollectError> {
        let lines = output_lines(raw);
        let line = nth_line(&lines, 1, Self::NAME)?;

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 || parts[0] != "Mem:" {
            return Err(CollectError::mismatch(Self::NAME, line));
        }

        let total = parse_unsigned(parts[1])?;
        let used = parse_unsigned(parts[2])?;
        if used > total {
            return Err(CollectError::conversion(line, "used memory exceeds total"));
        }

        Ok(Self {
            mem_total: Some(total),
            mem_used: Some(used),
        })
    }
}
