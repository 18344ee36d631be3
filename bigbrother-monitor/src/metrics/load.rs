//! Load averages from the first line of `top -b -n1 -i`
//!
//! ```text
//! top - 09:20:25 up 3 days,  1:58,  0 users,  load average: 12,09, 12,26, 15,26
//! Tasks: 809 total,  11 running, 798 sleeping,   0 stopped,   0 zombie
//! ```
//!
//! Some locales print a comma as decimal separator, so the three values are
//! split on ", " (comma followed by a space) and counted from the right.

use super::{output_lines, parse_decimal, MetricFragment};
use crate::error::CollectError;
use serde::{Deserialize, Serialize};

const MARKER: &str = "load average: ";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadMetrics {
    pub load_avg_1: Option<f64>,
    pub load_avg_5: Option<f64>,
    pub load_avg_15: Option<f64>,
}

impl MetricFragment for LoadMetrics {
    const NAME: &'static str = "top";

    fn parse(raw: &str) -> Result<Self, CollectError> {
        let lines = output_lines(raw);
        let first = lines[0];

        let start = first
            .find(MARKER)
            .ok_or_else(|| CollectError::mismatch(Self::NAME, first))?;
        let values = &first[start + MARKER.len()..];

        let parts: Vec<&str> = values.rsplitn(3, ", ").collect();
        if parts.len() != 3 || parts.iter().any(|p| p.trim().is_empty()) {
            return Err(CollectError::mismatch(Self::NAME, first));
        }

        // rsplitn yields right to left
        Ok(Self {
            load_avg_1: Some(parse_decimal(parts[2])?),
            load_avg_5: Some(parse_decimal(parts[1])?),
            load_avg_15: Some(parse_decimal(parts[0])?),
        })
    }
}
