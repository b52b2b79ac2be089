//! Run orchestration around the framepulse core: a dedicated poll thread,
//! device timestamp sources, the run-event log, and end-of-run aggregation
//! into a report file and metric sink.

pub mod collector;
pub mod config;
pub mod events;
pub mod scheduler;
pub mod source;

// Re-export commonly used types for external use
pub use crate::collector::{finalize_run, run_cycle, CollectorError};
pub use crate::config::{PollConfig, ScheduleMode};
pub use crate::events::{load_events, loop_boundaries_ms, RunEvent};
pub use crate::scheduler::{start_polling, PollHandle};
pub use crate::source::{AdbShellSource, ScriptedSource, SourceError, TimestampSource};
