//! Human-readable run report.
//!
//! One block per segment: a header with the segment's start time, a line
//! per frame interval, then either the summary statistics or a note that
//! the segment was spurious.

use std::io;

use crate::aggregate::{RunSummary, Segment};

/// Render the report for one run as a string.
pub fn render_report(summary: &RunSummary) -> String {
    let mut out = String::new();

    match summary.vsync_period_ns {
        Some(vsync) => out.push_str(&format!("VSync Period: {vsync}\n\n")),
        None => out.push_str("VSync Period: unknown\n\n"),
    }

    for segment in &summary.segments {
        render_segment(&mut out, segment);
    }

    out
}

/// Write the rendered report to `writer`.
///
/// This is the run's one fatal I/O path: a failure here fails the run.
pub fn write_report<W: io::Write>(summary: &RunSummary, mut writer: W) -> io::Result<()> {
    writer.write_all(render_report(summary).as_bytes())
}

fn render_segment(out: &mut String, segment: &Segment) {
    out.push_str(&format!(
        "Started run {} at: {} ns\n",
        segment.index, segment.start_ns
    ));
    out.push_str("Frame Time\t\tFrames Per Second\n");

    for interval in &segment.intervals {
        out.push_str(&format!(
            "{} ns\t\t{:.2} fps\n",
            interval.frame_time_ns, interval.fps
        ));
    }

    let stats = match &segment.stats {
        Some(stats) => stats,
        None => {
            out.push_str("No samples in period, assuming spurious boundary event.\n\n");
            return;
        }
    };

    out.push_str("\nSTATS\n");
    out.push_str(&format!(
        "max Frame Time: {} ns\tmin FPS = {:.2} fps\n",
        stats.max_frame_time_ns, stats.min_fps
    ));
    out.push_str(&format!(
        "min Frame Time: {} ns\tmax FPS = {:.2} fps\n",
        stats.min_frame_time_ns, stats.max_fps
    ));
    out.push_str(&format!(
        "avg Frame Time: {} ns\tavg FPS = {:.2} fps\n",
        stats.avg_frame_time_ns, stats.avg_fps
    ));
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::analyze_run;

    #[test]
    fn test_report_single_segment() {
        let summary = analyze_run(&[100, 200, 400, 700], Some(16_666_667), &[]).unwrap();
        let report = render_report(&summary);

        assert!(report.starts_with("VSync Period: 16666667\n\n"));
        assert!(report.contains("Started run 0 at: 0 ns\n"));
        assert!(report.contains("Frame Time\t\tFrames Per Second\n"));
        assert!(report.contains("100 ns\t\t10000000.00 fps\n"));
        assert!(report.contains("\nSTATS\n"));
        assert!(report.contains("max Frame Time: 300 ns\tmin FPS = 3333333.33 fps\n"));
        assert!(report.contains("min Frame Time: 100 ns\tmax FPS = 10000000.00 fps\n"));
        assert!(report.contains("avg Frame Time: 200 ns\tavg FPS = 5000000.00 fps\n"));
    }

    #[test]
    fn test_report_spurious_segment() {
        let history = [50_000_000, 150_000_000, 250_000_000];
        let summary = analyze_run(&history, None, &[200]).unwrap();
        let report = render_report(&summary);

        assert!(report.contains("Started run 1 at: 200000000 ns\n"));
        assert!(report.contains("No samples in period, assuming spurious boundary event.\n"));
        // The spurious block carries no statistics.
        assert_eq!(report.matches("STATS").count(), 1);
    }

    #[test]
    fn test_report_unknown_vsync() {
        let summary = analyze_run(&[], None, &[]).unwrap();
        let report = render_report(&summary);
        assert!(report.starts_with("VSync Period: unknown\n\n"));
    }

    #[test]
    fn test_write_report_matches_render() {
        let summary = analyze_run(&[100, 200], Some(16_666_667), &[]).unwrap();
        let mut bytes = Vec::new();
        write_report(&summary, &mut bytes).unwrap();
        assert_eq!(bytes, render_report(&summary).into_bytes());
    }
}
