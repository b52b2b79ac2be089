//! Poll-cycle driving and end-of-run aggregation.

use std::fs::File;
use std::path::Path;

use framepulse::aggregate::analyze_run;
use framepulse::metric::{record_run_metrics, MetricSink};
use framepulse::report::write_report;
use framepulse::{parse_latency_dump, AggregateError, CycleOutcome, RunSummary, Sampler};
use thiserror::Error;

use crate::events::{loop_boundaries_ms, EventLogError, RunEvent};
use crate::source::TimestampSource;

/// Errors that fail a run outright.
///
/// Per-cycle trouble never lands here; it is logged and the next tick
/// retries by cadence.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// Segment analysis rejected its input.
    #[error(transparent)]
    Analysis(#[from] AggregateError),

    /// The run-event log could not be loaded.
    #[error(transparent)]
    Events(#[from] EventLogError),

    /// The report artifact could not be created or written.
    #[error("failed to write report {path}: {source}")]
    Report {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The poll thread panicked and its sampler state is lost.
    #[error("poll thread panicked")]
    PollThreadPanicked,
}

/// Run one poll cycle: fetch a dump, parse it, feed it to the sampler.
///
/// Transient failures are contained here. A failed fetch contributes zero
/// samples and is logged; it never propagates.
pub fn run_cycle(sampler: &mut Sampler, source: &mut dyn TimestampSource) -> CycleOutcome {
    let raw = match source.fetch_latency_dump() {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("latency fetch from {} failed: {e}", source.name());
            return CycleOutcome::default();
        }
    };

    let outcome = sampler.ingest_dump(&parse_latency_dump(&raw));
    if outcome.missed_window() {
        log::warn!("no overlap with previous poll, we missed some frames");
    }
    log::debug!(
        "cycle from {}: examined {}, appended {}",
        source.name(),
        outcome.examined,
        outcome.appended,
    );
    outcome
}

/// Aggregate a finished run: slice on the event log's boundaries, write
/// the report artifact, and record per-segment metrics into `sink`.
///
/// The report file is the run's one fatal I/O path; everything earlier was
/// already contained cycle by cycle.
pub fn finalize_run(
    sampler: &Sampler,
    events: &[RunEvent],
    report_path: &Path,
    sink: &mut dyn MetricSink,
) -> Result<RunSummary, CollectorError> {
    if events.is_empty() {
        log::warn!("no run events given; assuming a single run with no loading period to exclude");
    }

    let boundaries_ms = loop_boundaries_ms(events);
    let summary = analyze_run(sampler.history(), sampler.vsync_period(), &boundaries_ms)?;

    let report_error = |source| CollectorError::Report {
        path: report_path.display().to_string(),
        source,
    };
    let file = File::create(report_path).map_err(report_error)?;
    write_report(&summary, file).map_err(report_error)?;
    log::info!("wrote report to {}", report_path.display());

    record_run_metrics(sink, &summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ScriptedSource, SourceError};
    use framepulse::metric::MetricEntry;

    /// A source whose device is unreachable.
    struct DeadSource;

    impl TimestampSource for DeadSource {
        fn fetch_latency_dump(&mut self) -> Result<String, SourceError> {
            Err(SourceError::Command {
                command: "adb shell dumpsys SurfaceFlinger --latency test".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no device"),
            })
        }

        fn name(&self) -> String {
            "dead".to_string()
        }
    }

    fn sampled_run() -> Sampler {
        let mut sampler = Sampler::new();
        sampler.ingest_cycle(&[16_666_667, 50_000_000, 150_000_000]);
        sampler.ingest_cycle(&[150_000_000, 250_000_000, 350_000_000]);
        sampler
    }

    #[test]
    fn test_run_cycle_contains_fetch_failure() {
        let mut sampler = Sampler::new();
        let outcome = run_cycle(&mut sampler, &mut DeadSource);

        assert_eq!(outcome, CycleOutcome::default());
        assert!(sampler.history().is_empty());
        assert!(sampler.awaiting_header());
    }

    #[test]
    fn test_run_cycle_feeds_sampler() {
        let mut sampler = Sampler::new();
        let mut source = ScriptedSource::new([
            "16666667\n0\t0\t100\n0\t0\t200\n",
            "16666667\n0\t0\t200\n0\t0\t300\n",
        ]);

        run_cycle(&mut sampler, &mut source);
        let outcome = run_cycle(&mut sampler, &mut source);

        assert_eq!(sampler.history(), &[100, 200, 300]);
        assert_eq!(sampler.vsync_period(), Some(16_666_667));
        assert!(outcome.overlap);

        // Exhausted script: an empty dump is a quiet no-op.
        let outcome = run_cycle(&mut sampler, &mut source);
        assert_eq!(outcome, CycleOutcome::default());
    }

    #[test]
    fn test_finalize_run_writes_report_and_metrics() {
        let sampler = sampled_run();
        let events = [
            RunEvent::Other,
            RunEvent::StartLoop { timestamp_ms: 200 },
        ];

        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("report.txt");
        let mut sink: Vec<MetricEntry> = Vec::new();

        let summary = finalize_run(&sampler, &events, &report_path, &mut sink).unwrap();
        assert_eq!(summary.segments.len(), 2);

        let report = std::fs::read_to_string(&report_path).unwrap();
        assert!(report.starts_with("VSync Period: 16666667\n\n"));
        assert!(report.contains("Started run 1 at: 200000000 ns\n"));

        // Both segments are live: two samples either side of the boundary.
        assert_eq!(sink.len(), 12);
        assert!(sink.iter().any(|m| m.name == "run_1.fps"));
    }

    #[test]
    fn test_finalize_run_report_failure_is_fatal() {
        let sampler = sampled_run();
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("missing").join("report.txt");
        let mut sink: Vec<MetricEntry> = Vec::new();

        let err = finalize_run(&sampler, &[], &report_path, &mut sink).unwrap_err();
        assert!(matches!(err, CollectorError::Report { .. }));
        // Nothing was recorded for the failed run.
        assert!(sink.is_empty());
    }

    #[test]
    fn test_finalize_run_rejects_unordered_events() {
        let sampler = sampled_run();
        let events = [
            RunEvent::StartLoop { timestamp_ms: 300 },
            RunEvent::StartLoop { timestamp_ms: 200 },
        ];

        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("report.txt");
        let mut sink: Vec<MetricEntry> = Vec::new();

        let err = finalize_run(&sampler, &events, &report_path, &mut sink).unwrap_err();
        assert!(matches!(err, CollectorError::Analysis(_)));
        assert!(!report_path.exists(), "no artifact for a failed run");
    }

    #[test]
    fn test_finalize_run_without_events_single_segment() {
        let sampler = sampled_run();
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("report.txt");
        let mut sink: Vec<MetricEntry> = Vec::new();

        let summary = finalize_run(&sampler, &[], &report_path, &mut sink).unwrap();
        assert_eq!(summary.segments.len(), 1);
        assert_eq!(sink.len(), 6);
    }
}
