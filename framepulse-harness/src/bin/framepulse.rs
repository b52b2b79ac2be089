//! Samples a layer's frame-presentation timestamps from an attached device
//! and reports per-segment frame statistics at the end of the run.
//!
//! Usage:
//! ```text
//! framepulse --layer "SurfaceView - com.example.game" --duration-secs 60
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use framepulse::metric::MetricEntry;
use framepulse::Sampler;
use framepulse_harness::{
    finalize_run, load_events, start_polling, AdbShellSource, PollConfig, ScheduleMode,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(
    name = "framepulse",
    about = "Polls frame-presentation timestamps for a display layer and reports per-segment frame statistics",
    long_about = None
)]
struct Args {
    /// Name of the layer to sample, as the display compositor reports it
    #[arg(long)]
    layer: String,

    /// adb device serial, when more than one device is attached
    #[arg(long)]
    serial: Option<String>,

    /// Poll interval in milliseconds
    #[arg(
        long,
        default_value_t = 1000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    interval_ms: u64,

    /// Timer discipline for the poll loop
    #[arg(long, value_enum, default_value_t = ScheduleMode::FixedDelay)]
    schedule: ScheduleMode,

    /// Stop sampling after this many seconds; omit to run until Ctrl-C
    #[arg(long)]
    duration_secs: Option<u64>,

    /// JSON file of run events marking segment boundaries
    #[arg(long)]
    events: Option<PathBuf>,

    /// Where to write the text report
    #[arg(long, default_value = "framepulse_report.txt")]
    report: PathBuf,

    /// Also write the recorded metrics as JSON to this path
    #[arg(long)]
    metrics_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let events = match &args.events {
        Some(path) => load_events(path)
            .with_context(|| format!("loading run events from {}", path.display()))?,
        None => Vec::new(),
    };

    let mut source = AdbShellSource::new(&args.layer);
    if let Some(serial) = &args.serial {
        source = source.with_serial(serial);
    }

    let config = PollConfig {
        interval_ms: args.interval_ms,
        mode: args.schedule,
    };

    println!(
        "Sampling layer {:?} every {} ms ({})",
        args.layer, args.interval_ms, args.schedule
    );
    let handle = start_polling(Sampler::new(), Box::new(source), config);

    match args.duration_secs {
        Some(secs) => {
            println!("Sampling for {secs} s...");
            thread::sleep(Duration::from_secs(secs));
        }
        None => {
            println!("Sampling until Ctrl-C...");
            let interrupted = Arc::new(AtomicBool::new(false));
            let flag = interrupted.clone();
            ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
                .context("installing Ctrl-C handler")?;
            while !interrupted.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(100));
            }
            println!();
        }
    }

    let sampler = handle.stop().context("stopping poll thread")?;
    println!(
        "Collected {} presentation timestamps",
        sampler.history().len()
    );

    let mut metrics: Vec<MetricEntry> = Vec::new();
    let summary =
        finalize_run(&sampler, &events, &args.report, &mut metrics).context("finalizing run")?;
    println!("Report written to {}", args.report.display());

    if let Some(path) = &args.metrics_json {
        let json = serde_json::to_string_pretty(&metrics).context("serializing metrics")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing metrics to {}", path.display()))?;
        println!("Metrics written to {}", path.display());
    }

    println!();
    for segment in &summary.segments {
        match &segment.stats {
            Some(stats) => println!(
                "run {}: {} frames, avg {:.2} fps (min {:.2}, max {:.2})",
                segment.index, stats.frame_count, stats.avg_fps, stats.min_fps, stats.max_fps
            ),
            None => println!("run {}: no samples (spurious boundary)", segment.index),
        }
    }

    Ok(())
}
