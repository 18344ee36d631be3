//! CPU count from `nproc`
//!
//! ```text
//! 80
//! ```

use super::{output_lines, parse_unsigned, MetricFragment};
use crate::error::CollectError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuMetrics {
    pub cpu: Option<u32>,
}

impl MetricFragment for CpuMetrics {
    const NAME: &'static str = "nproc";

    fn parse(raw: &str) -> Result<Self, CollectError> {
        let lines = output_lines(raw);
        let first = lines[0];

        let digits_end = first
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(first.len());
        if digits_end == 0 {
            return Err(CollectError::mismatch(Self::NAME, first));
        }

        let count = parse_unsigned(&first[..digits_end])?;
        let count = u32::try_from(count).map_err(|e| CollectError::conversion(&first[..digits_end], e.to_string()))?;

        Ok(Self { cpu: Some(count) })
    }
}
