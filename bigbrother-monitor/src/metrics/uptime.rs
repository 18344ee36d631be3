//! Uptime in days from `uptime --pretty`
//!
//! ```text
//! up 2 weeks, 4 days, 11 hours, 58 minutes
//! ```
//!
//! Weeks and days are summed into whole days; hours and minutes count for
//! nothing. Any other unit (`years` included) or any component not shaped
//! like `<int> <unit>` voids the whole value rather than just the component.

use super::{output_lines, parse_unsigned, MetricFragment};
use crate::error::CollectError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UptimeMetrics {
    /// days
    pub uptime: Option<u64>,
}

impl MetricFragment for UptimeMetrics {
    const NAME: &'static str = "uptime";

    fn parse(raw: &str) -> Result<Self, CollectError> {
        let lines = output_lines(raw);
        let first = lines[0];

        let components = first
            .strip_prefix("up ")
            .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
            .ok_or_else(|| CollectError::mismatch(Self::NAME, first))?;

        let mut days: u64 = 0;
        for item in components.split(',') {
            let fields: Vec<&str> = item.trim().split(' ').collect();
            let [value, unit] = fields.as_slice() else {
                return Err(CollectError::mismatch(
                    Self::NAME,
                    format!("unexpected item '{}' in '{}'", item, first),
                ));
            };

            let value = parse_unsigned(value)?;
            let weight = match *unit {
                "week" | "weeks" => 7,
                "day" | "days" => 1,
                "hour" | "hours" | "minute" | "minutes" => 0,
                _ => {
                    return Err(CollectError::mismatch(
                        Self::NAME,
                        format!("unexpected unit '{}' in '{}'", unit, first),
                    ))
                }
            };

            days = value
                .checked_mul(weight)
                .and_then(|d| days.checked_add(d))
                .ok_or_else(|| CollectError::conversion(first, "uptime out of range"))?;
        }

        Ok(Self { uptime: Some(days) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weeks_and_days_are_summed() {
        let uptime = UptimeMetrics::parse("up 2 weeks, 4 days, 11 hours, 58 minutes\n").unwrap();
        assert_eq!(uptime.uptime, Some(18));
    }

    #[test]
    fn test_singular_units() {
        let uptime = UptimeMetrics::parse("up 1 week, 1 day, 1 hour, 1 minute").unwrap();
        assert_eq!(uptime.uptime, Some(8));
    }

    #[test]
    fn test_minutes_only_is_zero_days() {
        assert_eq!(UptimeMetrics::parse("up 45 minutes").unwrap().uptime, Some(0));
    }

    #[test]
    fn test_unknown_unit_voids_whole_value() {
        assert!(UptimeMetrics::parse("up 3 years").is_err());
        assert!(UptimeMetrics::parse("up 1 year, 2 weeks, 3 days").is_err());
    }

    #[test]
    fn test_malformed_component_voids_whole_value() {
        assert!(UptimeMetrics::parse("up 2  weeks, 4 days").is_err());
        assert!(UptimeMetrics::parse("up 2 weeks, four days").is_err());
        assert!(UptimeMetrics::parse("up 2 weeks, 4").is_err());
    }

    #[test]
    fn test_missing_prefix_is_mismatch() {
        assert!(matches!(
            UptimeMetrics::parse(" 10:02:11 up 3 days,  1:58,  0 users"),
            Err(CollectError::ParseMismatch { .. })
        ));
        assert!(UptimeMetrics::parse("up").is_err());
    }
}
