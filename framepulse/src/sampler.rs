//! Presentation-timestamp sampling across repeated latency polls.
//!
//! Consecutive polls of the display pipeline see overlapping windows of the
//! same monotonically increasing timestamps. The sampler deduplicates them
//! into a single strictly increasing history, using the overlap itself as
//! the signal that no frames were lost between polls.

use crate::parse::LatencyDump;
use crate::{TimestampNs, PENDING_TIMESTAMP};

/// What one poll cycle's batch did to the sampler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Timestamps examined, not counting a consumed header element.
    pub examined: usize,
    /// Timestamps appended to the history.
    pub appended: usize,
    /// Whether any timestamp was already known: the pending sentinel or an
    /// exact match of the newest recorded sample.
    pub overlap: bool,
}

impl CycleOutcome {
    /// True when the batch carried samples but none overlapped the previous
    /// poll: frames presented between the two polls may have rolled out of
    /// the device's window unrecorded.
    pub fn missed_window(&self) -> bool {
        self.examined > 0 && !self.overlap
    }
}

/// Deduplicating sampler for display presentation timestamps.
///
/// Owns the history for one benchmark run. The poll thread holds the
/// sampler exclusively while polling; aggregation reads the history only
/// after the thread has handed the sampler back.
#[derive(Debug, Clone)]
pub struct Sampler {
    /// Largest timestamp ever appended; 0 until the first append.
    latest_seen: TimestampNs,
    /// Strictly increasing presentation history.
    history: Vec<TimestampNs>,
    /// VSync period from the first captured header.
    vsync_period: Option<TimestampNs>,
    /// Set until the first non-empty batch delivers the header element.
    awaiting_header: bool,
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler {
    pub fn new() -> Self {
        Self {
            latest_seen: 0,
            history: Vec::new(),
            vsync_period: None,
            awaiting_header: true,
        }
    }

    /// Clear all run state so the sampler can collect a fresh run.
    pub fn reset(&mut self) {
        self.latest_seen = 0;
        self.history.clear();
        self.vsync_period = None;
        self.awaiting_header = true;
    }

    /// Examine one timestamp from a poll batch.
    ///
    /// Returns true when the timestamp carries no new information: the
    /// pending-frame sentinel, or an exact match of the newest sample
    /// already recorded (the overlap that confirms continuity between
    /// polls). Strictly newer timestamps are appended and return false;
    /// strictly older ones are stale window contents and return false
    /// without being recorded.
    ///
    /// The order of these checks guarantees at most one insertion per
    /// distinct timestamp across cycle boundaries.
    pub fn sample(&mut self, timestamp: TimestampNs) -> bool {
        if timestamp == PENDING_TIMESTAMP {
            return true;
        }
        if timestamp < self.latest_seen {
            return false;
        }
        if timestamp == self.latest_seen {
            return true;
        }
        self.history.push(timestamp);
        self.latest_seen = timestamp;
        false
    }

    /// Feed one poll cycle's raw batch of timestamps through the sampler.
    ///
    /// While the sampler is still awaiting the header, the leading element
    /// of the first non-empty batch is consumed as the VSync period and is
    /// not sampled; a header-only batch is otherwise a no-op. Callers
    /// holding a parsed dump should prefer [`Sampler::ingest_dump`], which
    /// strips the header every cycle.
    pub fn ingest_cycle(&mut self, batch: &[TimestampNs]) -> CycleOutcome {
        let samples = if self.awaiting_header {
            match batch.split_first() {
                Some((&header, rest)) => {
                    self.capture_vsync(header);
                    rest
                }
                None => batch,
            }
        } else {
            batch
        };

        self.sample_batch(samples)
    }

    /// Feed one parsed latency dump through the sampler.
    ///
    /// The dump's header value becomes the VSync period only while the
    /// sampler is still awaiting one; later dumps re-report the same header
    /// and it is ignored.
    pub fn ingest_dump(&mut self, dump: &LatencyDump) -> CycleOutcome {
        if self.awaiting_header {
            if let Some(vsync) = dump.vsync_period {
                self.capture_vsync(vsync);
            }
        }
        self.sample_batch(&dump.timestamps)
    }

    /// Presentation timestamps recorded so far, strictly increasing.
    pub fn history(&self) -> &[TimestampNs] {
        &self.history
    }

    /// Consume the sampler, keeping only its history.
    pub fn into_history(self) -> Vec<TimestampNs> {
        self.history
    }

    /// The deduplication boundary: newest recorded timestamp, 0 before the
    /// first sample.
    pub fn latest_seen(&self) -> TimestampNs {
        self.latest_seen
    }

    /// VSync period captured from the first header, if any cycle carried one.
    pub fn vsync_period(&self) -> Option<TimestampNs> {
        self.vsync_period
    }

    /// Whether no header has been seen yet this run.
    pub fn awaiting_header(&self) -> bool {
        self.awaiting_header
    }

    fn capture_vsync(&mut self, vsync: TimestampNs) {
        self.vsync_period = Some(vsync);
        self.awaiting_header = false;
        log::debug!("captured vsync period: {vsync} ns");
    }

    fn sample_batch(&mut self, samples: &[TimestampNs]) -> CycleOutcome {
        let before = self.history.len();
        let mut overlap = false;
        for &timestamp in samples {
            if self.sample(timestamp) {
                overlap = true;
            }
        }
        CycleOutcome {
            examined: samples.len(),
            appended: self.history.len() - before,
            overlap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_check_ordering() {
        let mut sampler = Sampler::new();

        // Sentinel: already seen, no mutation.
        assert!(sampler.sample(PENDING_TIMESTAMP));
        assert!(sampler.history().is_empty());

        // New sample: appended, not an overlap.
        assert!(!sampler.sample(100));
        assert_eq!(sampler.history(), &[100]);
        assert_eq!(sampler.latest_seen(), 100);

        // Older than the boundary: dropped, not an overlap.
        assert!(!sampler.sample(50));
        assert_eq!(sampler.history(), &[100]);

        // Exactly the boundary: overlap, no mutation.
        assert!(sampler.sample(100));
        assert_eq!(sampler.history(), &[100]);

        assert!(!sampler.sample(150));
        assert_eq!(sampler.history(), &[100, 150]);
    }

    #[test]
    fn test_history_strictly_increasing_across_cycles() {
        let mut sampler = Sampler::new();
        sampler.ingest_cycle(&[16_666_667, 100, 200, 300]);
        sampler.ingest_cycle(&[200, 300, 300, 250, 400, PENDING_TIMESTAMP]);
        sampler.ingest_cycle(&[100, 400, 500, 450, 600]);

        assert_eq!(sampler.history(), &[100, 200, 300, 400, 500, 600]);
        for pair in sampler.history().windows(2) {
            assert!(pair[0] < pair[1], "history not strictly increasing: {pair:?}");
        }
    }

    #[test]
    fn test_reingesting_seen_batch_is_idempotent() {
        let mut sampler = Sampler::new();
        sampler.ingest_cycle(&[16_666_667, 100, 200, 300]);
        let before = sampler.history().to_vec();

        let outcome = sampler.ingest_cycle(&[100, 200, 300]);
        assert_eq!(sampler.history(), before.as_slice());
        assert_eq!(outcome.appended, 0);
        assert!(outcome.overlap);
    }

    #[test]
    fn test_first_cycle_header_only() {
        let mut sampler = Sampler::new();
        let outcome = sampler.ingest_cycle(&[16_666_667]);

        assert_eq!(sampler.vsync_period(), Some(16_666_667));
        assert!(!sampler.awaiting_header());
        assert!(sampler.history().is_empty());
        assert_eq!(outcome.examined, 0);
        assert!(!outcome.missed_window());
    }

    #[test]
    fn test_empty_batch_keeps_awaiting_header() {
        let mut sampler = Sampler::new();
        let outcome = sampler.ingest_cycle(&[]);
        assert!(sampler.awaiting_header());
        assert_eq!(outcome, CycleOutcome::default());

        sampler.ingest_cycle(&[16_666_667, 100]);
        assert_eq!(sampler.vsync_period(), Some(16_666_667));
        assert_eq!(sampler.history(), &[100]);
    }

    #[test]
    fn test_header_consumed_only_on_first_cycle() {
        let mut sampler = Sampler::new();
        sampler.ingest_cycle(&[16_666_667, 100, 200]);

        // Second cycle batches carry samples only; nothing is stripped.
        let outcome = sampler.ingest_cycle(&[100, 200, 300]);
        assert_eq!(outcome.examined, 3);
        assert_eq!(outcome.appended, 1);
        assert!(outcome.overlap);
        assert_eq!(sampler.history(), &[100, 200, 300]);
    }

    #[test]
    fn test_sentinel_and_boundary_batch_reports_overlap() {
        let mut sampler = Sampler::new();
        sampler.ingest_cycle(&[16_666_667, 500]);
        assert_eq!(sampler.latest_seen(), 500);

        assert!(sampler.sample(PENDING_TIMESTAMP));
        assert!(sampler.sample(500));
        assert!(sampler.sample(500));
        assert_eq!(sampler.history(), &[500]);

        let outcome = sampler.ingest_cycle(&[PENDING_TIMESTAMP, 500, 500]);
        assert!(outcome.overlap);
        assert_eq!(outcome.appended, 0);
        assert!(!outcome.missed_window());
    }

    #[test]
    fn test_missed_window_detection() {
        let mut sampler = Sampler::new();
        sampler.ingest_cycle(&[16_666_667, 500]);

        // No element matches the boundary: the polls did not overlap.
        let outcome = sampler.ingest_cycle(&[600, 700]);
        assert!(outcome.missed_window());
        assert_eq!(sampler.history(), &[500, 600, 700]);

        // Boundary match present: continuity confirmed.
        let outcome = sampler.ingest_cycle(&[700, 800]);
        assert!(!outcome.missed_window());
    }

    #[test]
    fn test_negative_timestamp_never_recorded() {
        let mut sampler = Sampler::new();
        sampler.ingest_cycle(&[16_666_667]);
        assert!(!sampler.sample(-5));
        assert!(sampler.history().is_empty());
    }

    #[test]
    fn test_reset_clears_run_state() {
        let mut sampler = Sampler::new();
        sampler.ingest_cycle(&[16_666_667, 100, 200]);

        sampler.reset();
        assert!(sampler.history().is_empty());
        assert_eq!(sampler.latest_seen(), 0);
        assert_eq!(sampler.vsync_period(), None);
        assert!(sampler.awaiting_header());
    }

    #[test]
    fn test_ingest_dump_strips_header_every_cycle() {
        let mut sampler = Sampler::new();

        let first = LatencyDump {
            vsync_period: Some(16_666_667),
            timestamps: vec![100, 200],
        };
        let outcome = sampler.ingest_dump(&first);
        assert_eq!(outcome.examined, 2);
        assert_eq!(sampler.vsync_period(), Some(16_666_667));

        // Later dumps re-report the header; the first capture wins.
        let second = LatencyDump {
            vsync_period: Some(8_333_333),
            timestamps: vec![200, 300],
        };
        sampler.ingest_dump(&second);
        assert_eq!(sampler.vsync_period(), Some(16_666_667));
        assert_eq!(sampler.history(), &[100, 200, 300]);
    }

    #[test]
    fn test_ingest_dump_without_header_keeps_waiting() {
        let mut sampler = Sampler::new();

        let headerless = LatencyDump {
            vsync_period: None,
            timestamps: vec![100],
        };
        sampler.ingest_dump(&headerless);
        assert!(sampler.awaiting_header());
        assert_eq!(sampler.history(), &[100]);

        let with_header = LatencyDump {
            vsync_period: Some(16_666_667),
            timestamps: vec![200],
        };
        sampler.ingest_dump(&with_header);
        assert_eq!(sampler.vsync_period(), Some(16_666_667));
        assert_eq!(sampler.history(), &[100, 200]);
    }
}
