//! Free-text usage memo read from a well-known file on the target

use super::MetricFragment;
use crate::error::CollectError;
use serde::{Deserialize, Serialize};

/// Default location of the memo on every target
pub const DEFAULT_MEMO_PATH: &str = "/opt/bigbrother.memo";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageMemo {
    pub usage_memo: Option<String>,
}

impl MetricFragment for UsageMemo {
    const NAME: &'static str = "memo";

    fn parse(raw: &str) -> Result<Self, CollectError> {
        Ok(Self {
            usage_memo: Some(raw.trim().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memo_is_trimmed_verbatim() {
        let memo = UsageMemo::parse("  MK - benchmark until friday\nplease ask first\n\n").unwrap();
        assert_eq!(
            memo.usage_memo.as_deref(),
            Some("MK - benchmark until friday\nplease ask first")
        );
    }
}
