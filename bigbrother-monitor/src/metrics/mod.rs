//! Metric parsers for the monitor
//!
//! One small grammar per external tool, each behind the same narrow
//! interface: raw command output in, a typed fragment of optional fields out.
//! - `cpu`: `nproc`
//! - `load`: `top -b -n1 -i`
//! - `memory`: `free`
//! - `disk`: `df <path>`
//! - `network`: `iftop -t`
//! - `uptime`: `uptime --pretty`
//! - `memo`: `cat <memo path>`
//!
//! A fragment is either fully parsed or all-absent, never partially filled.

pub mod cpu;
pub mod disk;
pub mod load;
pub mod memo;
pub mod memory;
pub mod network;
pub mod uptime;

pub use cpu::CpuMetrics;
pub use disk::DiskMetrics;
pub use load::LoadMetrics;
pub use memo::UsageMemo;
pub use memory::MemoryMetrics;
pub use network::NetworkMetrics;
pub use uptime::UptimeMetrics;

use crate::error::CollectError;
use crate::execution::CommandResult;

/// A group of metric fields produced by a single diagnostic command
///
/// `Default` must be the all-absent value.
pub trait MetricFragment: Default + Sized {
    /// Short name used in log lines
    const NAME: &'static str;

    /// Parse successful command output
    fn parse(raw: &str) -> Result<Self, CollectError>;
}

/// Turn a command result into a fragment, or the reason it stays absent
pub fn from_result<F: MetricFragment>(result: CommandResult, command: &str) -> Result<F, CollectError> {
    match result {
        CommandResult::Success(raw) => F::parse(&raw),
        CommandResult::Timeout => Err(CollectError::CommandTimeout {
            command: command.to_string(),
        }),
        CommandResult::Failure { code, stderr } => Err(CollectError::CommandFailure {
            command: command.to_string(),
            code,
            stderr,
        }),
    }
}

/// Output lines after trimming the whole text
pub(crate) fn output_lines(raw: &str) -> Vec<&str> {
    raw.trim().split('\n').collect()
}

/// Line `index` of the trimmed output, or a mismatch naming the parser
pub(crate) fn nth_line<'a>(lines: &[&'a str], index: usize, parser: &'static str) -> Result<&'a str, CollectError> {
    lines
        .get(index)
        .copied()
        .ok_or_else(|| CollectError::mismatch(parser, lines.join("\n")))
}

/// Token made only of ASCII digits, parsed as an unsigned integer
pub(crate) fn parse_unsigned(token: &str) -> Result<u64, CollectError> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CollectError::conversion(token, "not an unsigned integer"));
    }
    token
        .parse()
        .map_err(|e: std::num::ParseIntError| CollectError::conversion(token, e.to_string()))
}

/// Decimal number that may use a comma as decimal separator
pub(crate) fn parse_decimal(token: &str) -> Result<f64, CollectError> {
    let normalized = token.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(CollectError::conversion(token, "not a finite number")),
        Err(e) => Err(CollectError::conversion(token, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_results_keep_every_field_absent() {
        let failures = [
            CommandResult::Timeout,
            CommandResult::Failure {
                code: Some(255),
                stderr: "ssh: connect to host 10.0.0.9 port 22: No route to host".to_string(),
            },
            CommandResult::Failure {
                code: None,
                stderr: String::new(),
            },
        ];

        for result in failures {
            let err = from_result::<MemoryMetrics>(result.clone(), "free").unwrap_err();
            assert!(matches!(
                err,
                CollectError::CommandTimeout { .. } | CollectError::CommandFailure { .. }
            ));
            assert_eq!(from_result::<CpuMetrics>(result.clone(), "nproc").unwrap_or_default(), CpuMetrics::default());
            assert_eq!(
                from_result::<DiskMetrics>(result.clone(), "df /").unwrap_or_default(),
                DiskMetrics::default()
            );
            assert_eq!(
                from_result::<UsageMemo>(result, "cat /opt/bigbrother.memo").unwrap_or_default(),
                UsageMemo::default()
            );
        }
    }

    #[test]
    fn test_timeout_is_reported_as_timeout() {
        let err = from_result::<CpuMetrics>(CommandResult::Timeout, "nproc").unwrap_err();
        assert_eq!(err.to_string(), "Timeout running command 'nproc'");
    }

    #[test]
    fn test_parse_unsigned_rejects_signs_and_garbage() {
        assert_eq!(parse_unsigned("528221324").unwrap(), 528221324);
        assert!(parse_unsigned("-1").is_err());
        assert!(parse_unsigned("+1").is_err());
        assert!(parse_unsigned("").is_err());
        assert!(parse_unsigned("99999999999999999999999").is_err());
    }

    #[test]
    fn test_parse_decimal_accepts_comma_separator() {
        assert_eq!(parse_decimal("12,09").unwrap(), 12.09);
        assert_eq!(parse_decimal("0.52").unwrap(), 0.52);
        assert!(parse_decimal("NaN").is_err());
        assert!(parse_decimal("1,2,3").is_err());
    }
}
