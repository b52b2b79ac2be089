//! Parsing of display latency dump text.
//!
//! The dump is line oriented: the first line is a single integer, the
//! display's VSync period in nanoseconds, and each following line is a tab
//! separated triple whose third field is a frame's presentation timestamp.
//! Devices occasionally emit blank or truncated lines mid dump, so parsing
//! never fails; lines that do not match are skipped.

use crate::TimestampNs;

/// One parsed latency dump: optional header plus the presentation
/// timestamps in device order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatencyDump {
    /// VSync period in nanoseconds, when the first line carried one.
    pub vsync_period: Option<TimestampNs>,
    /// Third-column presentation timestamps, in dump order.
    pub timestamps: Vec<TimestampNs>,
}

impl LatencyDump {
    /// A dump with no header and no timestamps.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Parse the raw text of one latency dump.
///
/// Malformed lines (wrong field count, unparseable timestamp) are skipped
/// and logged at debug level. Empty input yields an empty dump.
pub fn parse_latency_dump(raw: &str) -> LatencyDump {
    let mut dump = LatencyDump::empty();

    for (index, line) in raw.lines().enumerate() {
        // Header: a lone integer on the first line.
        if index == 0 {
            if let Ok(vsync) = line.trim().parse::<TimestampNs>() {
                dump.vsync_period = Some(vsync);
                continue;
            }
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            if !line.trim().is_empty() {
                log::debug!("skipping malformed latency line: {line:?}");
            }
            continue;
        }
        match fields[2].trim().parse::<TimestampNs>() {
            Ok(timestamp) => dump.timestamps.push(timestamp),
            Err(e) => log::debug!("unparseable presentation timestamp in {line:?}: {e}"),
        }
    }

    dump
}
