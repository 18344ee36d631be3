//! Network throughput from `iftop -i <iface> -n -t -s 1`
//!
//! ```text
//! --------------------------------------------------------------------------------------------
//! Total send rate:                                     13,0Kb     13,0Kb     13,0Kb
//! Total receive rate:                                  41,2Kb     41,2Kb     41,2Kb
//! Total send and receive rate:                         54,2Kb     54,2Kb     54,2Kb
//! --------------------------------------------------------------------------------------------
//! Peak rate (sent/received/total):                     13,0Kb     41,1Kb     54,1Kb
//! Cumulative (sent/received/total):                    3,25KB     10,3KB     13,5KB
//! ============================================================================================
//! ```
//!
//! The two "Total" lines are located at a fixed offset from the end of the
//! output (7th and 6th lines from the bottom). Any change in iftop's summary
//! block breaks this and turns into a mismatch. The first column ("last 2s")
//! is used.

use super::{output_lines, MetricFragment};
use crate::error::CollectError;
use crate::units::rate_to_bits;
use serde::{Deserialize, Serialize};

const SEND_PREFIX: &str = "Total send rate:";
const RECEIVE_PREFIX: &str = "Total receive rate:";

/// Distance of the send-rate line from the end of the output
const SEND_LINE_FROM_END: usize = 7;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    /// bits/s
    pub net_send_rate: Option<u64>,
    /// bits/s
    pub net_receive_rate: Option<u64>,
}

impl MetricFragment for NetworkMetrics {
    const NAME: &'static str = "iftop";

    fn parse(raw: &str) -> Result<Self, CollectError> {
        let lines = output_lines(raw);
        if lines.len() < SEND_LINE_FROM_END {
            return Err(CollectError::mismatch(Self::NAME, lines.join("\n")));
        }

        let send_line = lines[lines.len() - SEND_LINE_FROM_END];
        let receive_line = lines[lines.len() - SEND_LINE_FROM_END + 1];

        let (send, receive) = match (
            first_value(send_line, SEND_PREFIX),
            first_value(receive_line, RECEIVE_PREFIX),
        ) {
            (Some(send), Some(receive)) => (send, receive),
            _ => {
                return Err(CollectError::mismatch(
                    Self::NAME,
                    format!("{}\n{}", send_line, receive_line),
                ))
            }
        };

        Ok(Self {
            net_send_rate: Some(rate_to_bits(send)?),
            net_receive_rate: Some(rate_to_bits(receive)?),
        })
    }
}

/// First whitespace-separated value after `prefix`, which must start the line
fn first_value<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(prefix)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    rest.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    const IFTOP: &str = "interface: ens4
IP address is: 192.168.10.107
MAC address is: 04:d9:f5:13:8e:e1
Listening on ens4
   # Host name (port/service if enabled)            last 2s   last 10s   last 40s cumulative
--------------------------------------------------------------------------------------------
   1 192.168.10.107                           =>     13,0Kb     13,0Kb     13,0Kb     3,25KB
     192.168.10.205                           <=     40,4Kb     40,4Kb     40,4Kb     10,1KB
   2 239.255.255.250                          =>         0b         0b         0b         0B
     192.168.10.45                            <=       812b       812b       812b       203B
--------------------------------------------------------------------------------------------
Total send rate:                                     13,0Kb     13,0Kb     13,0Kb
Total receive rate:                                  41,2Kb     41,2Kb     41,2Kb
Total send and receive rate:                         54,2Kb     54,2Kb     54,2Kb
--------------------------------------------------------------------------------------------
Peak rate (sent/received/total):                     13,0Kb     41,1Kb     54,1Kb
Cumulative (sent/received/total):                    3,25KB     10,3KB     13,5KB
============================================================================================
";

    #[test]
    fn test_parse_iftop() {
        let net = NetworkMetrics::parse(IFTOP).unwrap();
        assert_eq!(net.net_send_rate, Some(13312));
        // 41.2 * 1024 = 42188.8
        assert_eq!(net.net_receive_rate, Some(42189));
    }

    #[test]
    fn test_idle_interface() {
        let idle = "Total send rate:                                         0b         0b         0b
Total receive rate:                                    812b       812b       812b
Total send and receive rate:                           812b       812b       812b
----------------------------------------------------------------------------------
Peak rate (sent/received/total):                         0b       812b       812b
Cumulative (sent/received/total):                        0B       203B       203B
==================================================================================";
        let net = NetworkMetrics::parse(idle).unwrap();
        assert_eq!(net.net_send_rate, Some(0));
        assert_eq!(net.net_receive_rate, Some(812));
    }

    #[test]
    fn test_short_output_is_mismatch() {
        assert!(matches!(
            NetworkMetrics::parse("interface: ens4\nListening on ens4"),
            Err(CollectError::ParseMismatch { .. })
        ));
    }

    #[test]
    fn test_shifted_summary_is_mismatch() {
        let shifted = format!("{}\nextra trailing line", IFTOP.trim());
        assert!(NetworkMetrics::parse(&shifted).is_err());
    }

    #[test]
    fn test_unit_in_bytes_is_conversion_error() {
        let bytes = IFTOP.replace("13,0Kb     13,0Kb     13,0Kb\n", "13,0KB     13,0KB     13,0KB\n");
        assert!(matches!(
            NetworkMetrics::parse(&bytes),
            Err(CollectError::Conversion { .. })
        ));
    }
}
