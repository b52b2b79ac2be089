//! Run-event log recorded by the workload controller.
//!
//! The workload under test emits timestamped events as it runs; the only
//! kind that matters here is the loop restart, which becomes a segment
//! boundary at aggregation time. The log is a JSON array, read once at run
//! end.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading an event log.
#[derive(Error, Debug)]
pub enum EventLogError {
    #[error("failed to read event log {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse event log {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One timestamped event from the workload's run log, tagged by its
/// `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunEvent {
    /// The workload restarted its main loop; starts a new segment.
    #[serde(rename = "START_LOOP")]
    StartLoop {
        /// Milliseconds on the device clock the frame history uses.
        timestamp_ms: i64,
    },
    /// Any other event type, carried through but never a boundary.
    #[serde(other)]
    Other,
}

/// Load a JSON array of run events from `path`.
pub fn load_events(path: &Path) -> Result<Vec<RunEvent>, EventLogError> {
    let raw = fs::read_to_string(path).map_err(|source| EventLogError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| EventLogError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// The segment boundaries: one per start-loop event, in log order.
pub fn loop_boundaries_ms(events: &[RunEvent]) -> Vec<i64> {
    events
        .iter()
        .filter_map(|event| match event {
            RunEvent::StartLoop { timestamp_ms } => Some(*timestamp_ms),
            RunEvent::Other => None,
        })
        .collect()
}
