//! Dedicated poll thread driving a sampler at a fixed cadence.
//!
//! The thread owns the sampler for the whole run. Stopping joins the
//! thread and hands the sampler back by value, so aggregation can never
//! observe a history mid-mutation; there is no lock to take.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use framepulse::Sampler;

use crate::collector::{run_cycle, CollectorError};
use crate::config::{PollConfig, ScheduleMode};
use crate::source::TimestampSource;

/// Granularity of the stop-flag check while waiting out an interval.
const STOP_POLL_STEP: Duration = Duration::from_millis(20);

/// Handle to a running poll thread.
pub struct PollHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<Sampler>,
}

impl PollHandle {
    /// Signal the thread to stop, wait for any in-flight cycle to finish,
    /// and take the sampler back.
    pub fn stop(self) -> Result<Sampler, CollectorError> {
        self.stop.store(true, Ordering::SeqCst);
        self.thread
            .join()
            .map_err(|_| CollectorError::PollThreadPanicked)
    }

    /// Whether the poll thread is still running.
    pub fn is_running(&self) -> bool {
        !self.thread.is_finished()
    }
}

/// Spawn the poll thread.
///
/// The first cycle runs immediately; each tick fetches one latency dump
/// from `source` and feeds it to the sampler. Fixed-delay mode rests a
/// full interval after each cycle; fixed-rate mode holds a cadence
/// anchored at the start of the run and skips any ticks a slow cycle
/// overran.
pub fn start_polling(
    sampler: Sampler,
    mut source: Box<dyn TimestampSource>,
    config: PollConfig,
) -> PollHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();
    let interval = config.interval();
    let mode = config.mode;

    let thread = thread::spawn(move || {
        let mut sampler = sampler;
        log::info!(
            "poll thread started: source {}, every {:?}, {mode} schedule",
            source.name(),
            interval,
        );

        let mut tick = Instant::now();
        while !stop_flag.load(Ordering::SeqCst) {
            run_cycle(&mut sampler, source.as_mut());

            let next_tick = match mode {
                ScheduleMode::FixedDelay => Instant::now() + interval,
                ScheduleMode::FixedRate => {
                    let mut next = tick + interval;
                    let now = Instant::now();
                    if next <= now {
                        let mut skipped = 0u32;
                        while next <= now {
                            next += interval;
                            skipped += 1;
                        }
                        log::debug!("cycle overran the poll interval; skipping {skipped} tick(s)");
                    }
                    next
                }
            };

            wait_until(next_tick, &stop_flag);
            tick = next_tick;
        }

        log::info!(
            "poll thread stopped with {} samples recorded",
            sampler.history().len()
        );
        sampler
    });

    PollHandle { stop, thread }
}

/// Sleep until `deadline` in short steps so a stop request is honored
/// promptly.
fn wait_until(deadline: Instant, stop: &AtomicBool) {
    while !stop.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep((deadline - now).min(STOP_POLL_STEP));
    }
}
