//! Unit conversions shared by parsers and log output

use crate::error::CollectError;
use std::time::Duration;

/// Binary multipliers for iftop rate suffixes, in order
const RATE_SUFFIXES: [char; 4] = ['K', 'M', 'G', 'T'];

/// Convert an iftop rate token such as `13,0Kb`, `812b` or `0b` to bits/s
///
/// The trailing `b` marks bits and is mandatory. An optional K/M/G/T suffix
/// multiplies by successive powers of 1024. Without suffix the value must be
/// a plain integer.
pub fn rate_to_bits(token: &str) -> Result<u64, CollectError> {
    let body = token
        .strip_suffix('b')
        .ok_or_else(|| CollectError::conversion(token, "expecting a value in bits"))?
        .replace(',', ".");

    if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) {
        return body
            .parse()
            .map_err(|e: std::num::ParseIntError| CollectError::conversion(token, e.to_string()));
    }

    let suffix = body
        .chars()
        .last()
        .ok_or_else(|| CollectError::conversion(token, "empty rate"))?;
    let power = RATE_SUFFIXES
        .iter()
        .position(|s| *s == suffix)
        .ok_or_else(|| CollectError::conversion(token, "not supporting network rate > Tb"))?;

    let number = &body[..body.len() - suffix.len_utf8()];
    let value: f64 = number
        .parse()
        .map_err(|e: std::num::ParseFloatError| CollectError::conversion(token, e.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(CollectError::conversion(token, "not a positive finite number"));
    }

    let bits = (value * 1024f64.powi(power as i32 + 1)).round();
    if bits > u64::MAX as f64 {
        return Err(CollectError::conversion(token, "rate out of range"));
    }

    Ok(bits as u64)
}

/// Render a KiB count the way `df -h` would (`512K`, `3.4M`, `12G`, ...)
pub fn kib_to_human(value_kib: Option<u64>) -> String {
    let Some(value_kib) = value_kib else {
        return "None".to_string();
    };

    if value_kib < 1024 {
        return format!("{}K", value_kib);
    }

    let mut value = value_kib as f64;
    for unit in ["M", "G", "T"] {
        value /= 1024.0;
        if value < 10.0 {
            return format!("{:.1}{}", value, unit);
        }
        if value < 1024.0 {
            return format!("{:.0}{}", value, unit);
        }
    }

    value /= 1024.0;
    if value < 10.0 {
        format!("{:.1}P", value)
    } else {
        format!("{:.0}P", value)
    }
}

/// Format a duration as `H:MM:SS`, prefixed by `N day(s), ` past 24 hours
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs_f64().round() as u64;
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let clock = format!("{}:{:02}:{:02}", hours, minutes, seconds);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_to_bits_documented_values() {
        assert_eq!(rate_to_bits("13,0Kb").unwrap(), 13312);
        assert_eq!(rate_to_bits("0b").unwrap(), 0);
        assert_eq!(rate_to_bits("812b").unwrap(), 812);
    }

    #[test]
    fn test_rate_to_bits_multipliers() {
        assert_eq!(rate_to_bits("1Mb").unwrap(), 1024 * 1024);
        assert_eq!(rate_to_bits("1.5Gb").unwrap(), 1_610_612_736);
        assert_eq!(rate_to_bits("2Tb").unwrap(), 2 * 1024u64.pow(4));
    }

    #[test]
    fn test_rate_to_bits_rejects_unsupported() {
        // bytes instead of bits
        assert!(rate_to_bits("3,25KB").is_err());
        // beyond T
        assert!(rate_to_bits("1Pb").is_err());
        // decimal without suffix
        assert!(rate_to_bits("1,5b").is_err());
        assert!(rate_to_bits("b").is_err());
        assert!(rate_to_bits("Kb").is_err());
        assert!(rate_to_bits("-1Kb").is_err());
        assert!(rate_to_bits("").is_err());
    }

    #[test]
    fn test_kib_to_human() {
        assert_eq!(kib_to_human(None), "None");
        assert_eq!(kib_to_human(Some(512)), "512K");
        assert_eq!(kib_to_human(Some(3_500)), "3.4M");
        assert_eq!(kib_to_human(Some(2_856_272)), "2.7G");
        assert_eq!(kib_to_human(Some(528_221_324)), "504G");
        assert_eq!(kib_to_human(Some(957_150_424)), "913G");
        assert_eq!(kib_to_human(Some(23_053_657_984)), "21T");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(4_400)), "0:00:04");
        assert_eq!(format_elapsed(Duration::from_secs(3_725)), "1:02:05");
        assert_eq!(format_elapsed(Duration::from_secs(86_400)), "1 day, 0:00:00");
        assert_eq!(format_elapsed(Duration::from_secs(2 * 86_400 + 61)), "2 days, 0:01:01");
    }
}
