//! Slicing a run's presentation history into segments and computing
//! per-segment frame statistics.
//!
//! Segments are delimited by boundary events recorded externally while the
//! workload ran (a loop restart, typically). The history itself is the
//! sampler's output: strictly increasing presentation timestamps in
//! nanoseconds.

use serde::Serialize;

use crate::error::AggregateError;
use crate::TimestampNs;

/// Nanoseconds per millisecond; the event log records boundaries in ms.
pub const NANOS_PER_MILLI: i64 = 1_000_000;

const NANOS_PER_SECOND: f64 = 1.0e9;

/// One presented-frame interval inside a segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameInterval {
    /// Time between consecutive presentations, in nanoseconds.
    pub frame_time_ns: TimestampNs,
    /// Instantaneous rate implied by this interval.
    pub fps: f64,
}

/// Summary statistics for a segment with at least two samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentStats {
    /// Number of frame intervals in the segment.
    pub frame_count: usize,
    /// Elapsed time covered by those intervals, in nanoseconds.
    pub total_time_ns: TimestampNs,
    pub min_frame_time_ns: TimestampNs,
    pub max_frame_time_ns: TimestampNs,
    /// Integer mean interval: total over count.
    pub avg_frame_time_ns: TimestampNs,
    pub min_fps: f64,
    pub max_fps: f64,
    /// Rate over the whole segment, `count * 1e9 / total_time_ns`. Not the
    /// mean of the per-interval rates.
    pub avg_fps: f64,
}

/// One slice of the run between consecutive boundary events.
#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    /// Zero-based position within the run.
    pub index: usize,
    /// Lower bound of the slice, in nanoseconds.
    pub start_ns: TimestampNs,
    /// Upper bound of the slice, in nanoseconds.
    pub end_ns: TimestampNs,
    /// Consecutive-presentation intervals inside the slice.
    pub intervals: Vec<FrameInterval>,
    /// `None` when fewer than two samples landed in the slice: a spurious
    /// boundary event, reported but carrying no metrics.
    pub stats: Option<SegmentStats>,
}

/// Everything derived from one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// VSync period reported by the display, when a poll captured one.
    pub vsync_period_ns: Option<TimestampNs>,
    pub segments: Vec<Segment>,
}

impl RunSummary {
    /// Segments that produced statistics.
    pub fn live_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.stats.is_some())
    }
}

/// Compute the intervals and statistics for the samples of `history` that
/// fall within `[start_ns, end_ns]`.
///
/// Samples below `start_ns` are skipped and the walk stops at the first
/// sample above `end_ns`. The first qualifying sample only establishes the
/// timing baseline and produces no interval; fewer than two qualifying
/// samples therefore produce no statistics.
pub fn analyze_slice(
    history: &[TimestampNs],
    start_ns: TimestampNs,
    end_ns: TimestampNs,
) -> (Vec<FrameInterval>, Option<SegmentStats>) {
    let mut intervals = Vec::new();
    let mut previous: Option<TimestampNs> = None;

    let mut total_time_ns: TimestampNs = 0;
    let mut min_frame_time_ns = TimestampNs::MAX;
    let mut max_frame_time_ns: TimestampNs = 0;
    let mut min_fps = f64::MAX;
    let mut max_fps: f64 = 0.0;

    for &timestamp in history {
        if timestamp < start_ns {
            continue;
        }
        if timestamp > end_ns {
            break;
        }

        if let Some(previous) = previous {
            let frame_time_ns = timestamp - previous;
            let fps = NANOS_PER_SECOND / frame_time_ns as f64;

            total_time_ns += frame_time_ns;
            min_frame_time_ns = min_frame_time_ns.min(frame_time_ns);
            max_frame_time_ns = max_frame_time_ns.max(frame_time_ns);
            min_fps = min_fps.min(fps);
            max_fps = max_fps.max(fps);

            intervals.push(FrameInterval { frame_time_ns, fps });
        }
        previous = Some(timestamp);
    }

    if intervals.is_empty() {
        return (intervals, None);
    }

    let frame_count = intervals.len();
    let stats = SegmentStats {
        frame_count,
        total_time_ns,
        min_frame_time_ns,
        max_frame_time_ns,
        avg_frame_time_ns: total_time_ns / frame_count as i64,
        min_fps,
        max_fps,
        avg_fps: frame_count as f64 * NANOS_PER_SECOND / total_time_ns as f64,
    };
    (intervals, Some(stats))
}

/// Slice the full run history on the given boundary events and compute
/// every segment's statistics.
///
/// Boundaries arrive in milliseconds (the event log's unit) and must be
/// strictly increasing. Segment 0 runs from time zero to the first
/// boundary; the final segment always extends to the last recorded sample,
/// because no event marks run completion. With no boundaries at all the
/// whole history is one segment.
pub fn analyze_run(
    history: &[TimestampNs],
    vsync_period_ns: Option<TimestampNs>,
    boundaries_ms: &[i64],
) -> Result<RunSummary, AggregateError> {
    for pair in boundaries_ms.windows(2) {
        if pair[1] <= pair[0] {
            return Err(AggregateError::UnorderedBoundaries {
                previous_ms: pair[0],
                next_ms: pair[1],
            });
        }
    }

    let last = history.last().copied().unwrap_or(0);
    let mut segments = Vec::with_capacity(boundaries_ms.len() + 1);
    let mut start_ns: TimestampNs = 0;

    for &boundary_ms in boundaries_ms {
        let end_ns = boundary_ms.saturating_mul(NANOS_PER_MILLI);
        let (intervals, stats) = analyze_slice(history, start_ns, end_ns);
        segments.push(Segment {
            index: segments.len(),
            start_ns,
            end_ns,
            intervals,
            stats,
        });
        start_ns = end_ns;
    }

    let (intervals, stats) = analyze_slice(history, start_ns, last);
    segments.push(Segment {
        index: segments.len(),
        start_ns,
        end_ns: last,
        intervals,
        stats,
    });

    Ok(RunSummary {
        vsync_period_ns,
        segments,
    })
}
