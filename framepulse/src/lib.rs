//! FRAMEPULSE - display frame-presentation sampling and statistics
//!
//! Polls of a device's display pipeline return overlapping windows of frame
//! presentation timestamps. This crate deduplicates those windows into one
//! strictly increasing history, slices the history into benchmark segments,
//! and derives per-segment frame-time and FPS statistics plus a text report.

pub mod aggregate;
pub mod error;
pub mod metric;
pub mod parse;
pub mod report;
pub mod sampler;

// Re-export commonly used types for external use
pub use crate::aggregate::{
    analyze_run, analyze_slice, FrameInterval, RunSummary, Segment, SegmentStats,
};
pub use crate::error::AggregateError;
pub use crate::parse::{parse_latency_dump, LatencyDump};
pub use crate::sampler::{CycleOutcome, Sampler};

/// Nanosecond presentation timestamp, as reported by the display pipeline.
///
/// The wire format is a signed 64-bit counter; real values are non-negative.
pub type TimestampNs = i64;

/// Sentinel the display pipeline reports for a frame slot that has not been
/// presented yet. Carries no information and never enters the history.
pub const PENDING_TIMESTAMP: TimestampNs = i64::MAX;
