//! Named metric entries handed to a reporting sink.
//!
//! Every segment with statistics yields six entries: min/max/avg FPS and
//! min/max/avg frame time, tagged with unit and direction so the sink can
//! rank runs without knowing the metric names.

use serde::Serialize;

use crate::aggregate::{RunSummary, SegmentStats};

/// Whether larger or smaller values indicate better behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    UpBetter,
    DownBetter,
}

/// A metric's numeric payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
}

/// One named measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricEntry {
    /// Dotted metric name, e.g. `run_0.min_fps`.
    pub name: String,
    pub value: MetricValue,
    /// Unit string: `fps` or `ns`.
    pub unit: &'static str,
    pub direction: Direction,
}

/// Destination for metric entries.
///
/// Implemented for `Vec<MetricEntry>` so tests and the CLI can capture
/// entries directly; reporting backends supply their own implementation.
pub trait MetricSink {
    fn record(&mut self, entry: MetricEntry);
}

impl MetricSink for Vec<MetricEntry> {
    fn record(&mut self, entry: MetricEntry) {
        self.push(entry);
    }
}

/// Record the six metrics for one segment's statistics.
pub fn record_segment_metrics(sink: &mut dyn MetricSink, index: usize, stats: &SegmentStats) {
    sink.record(fps_metric(format!("run_{index}.min_fps"), stats.min_fps));
    sink.record(fps_metric(format!("run_{index}.max_fps"), stats.max_fps));
    sink.record(fps_metric(format!("run_{index}.fps"), stats.avg_fps));

    sink.record(frame_time_metric(
        format!("run_{index}.min_frametime"),
        stats.min_frame_time_ns,
    ));
    sink.record(frame_time_metric(
        format!("run_{index}.max_frametime"),
        stats.max_frame_time_ns,
    ));
    sink.record(frame_time_metric(
        format!("run_{index}.frametime"),
        stats.avg_frame_time_ns,
    ));
}

/// Record metrics for every segment of the run that produced statistics.
/// Spurious segments contribute nothing.
pub fn record_run_metrics(sink: &mut dyn MetricSink, summary: &RunSummary) {
    for segment in &summary.segments {
        if let Some(stats) = &segment.stats {
            record_segment_metrics(sink, segment.index, stats);
        }
    }
}

fn fps_metric(name: String, value: f64) -> MetricEntry {
    MetricEntry {
        name,
        value: MetricValue::Float(value),
        unit: "fps",
        direction: Direction::UpBetter,
    }
}

fn frame_time_metric(name: String, value: i64) -> MetricEntry {
    MetricEntry {
        name,
        value: MetricValue::Int(value),
        unit: "ns",
        direction: Direction::DownBetter,
    }
}
