use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Timer discipline for the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleMode {
    /// Rest a full interval after each cycle completes, however long the
    /// cycle took.
    FixedDelay,
    /// Hold a fixed cadence from the start of the run; ticks a slow cycle
    /// overran are skipped, not compressed.
    FixedRate,
}

impl std::fmt::Display for ScheduleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScheduleMode::FixedDelay => "fixed-delay",
            ScheduleMode::FixedRate => "fixed-rate",
        };
        f.write_str(name)
    }
}

/// Configuration for the poll loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Time between poll cycles, in milliseconds.
    pub interval_ms: u64,
    /// Timer discipline.
    pub mode: ScheduleMode,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            mode: ScheduleMode::FixedDelay,
        }
    }
}

impl PollConfig {
    /// Poll interval as a `Duration`. A zero interval is floored to 1 ms;
    /// the fixed-rate tick grid never advances otherwise.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}
