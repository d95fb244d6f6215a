use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use framewatch::{
    ChannelSource, FileSource, FrameSample, FrameSource, Overlay, OverlayConfig, TickReport,
    TracingSink,
};

#[derive(Parser, Debug)]
#[command(name = "framewatch")]
#[command(about = "Replay recorded frames through a telemetry overlay and its debug packets")]
struct Args {
    /// Recording of newline-delimited JSON frames
    #[arg(short, long, default_value = "frames.jsonl")]
    file: PathBuf,

    /// Overlay configuration (TOML); FRAMEWATCH__* environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pace frames by their recorded delta instead of replaying as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<usize>,

    /// Cycle to the next module preset every N frames
    #[arg(long)]
    cycle_every: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "framewatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = OverlayConfig::load(args.config.as_deref())
        .with_context(|| format!("Failed to load configuration {:?}", args.config))?;
    let mut overlay = Overlay::new(&config)?;
    let mut sink = TracingSink::default();

    let summary = if args.realtime {
        run_realtime(&args, &mut overlay, &mut sink)?
    } else {
        run_replay(&args, &mut overlay, &mut sink)?
    };

    tracing::info!(
        frames = summary.frames,
        fired = summary.fired,
        packets_left = overlay.debugger().len(),
        "Replay finished"
    );
    Ok(())
}

#[derive(Debug, Default)]
struct Summary {
    frames: usize,
    fired: usize,
}

impl Summary {
    fn record(&mut self, report: &TickReport) {
        self.frames += 1;
        self.fired += report.fired.len();
    }
}

/// Replay every frame of the recording back to back.
fn run_replay(args: &Args, overlay: &mut Overlay, sink: &mut TracingSink) -> Result<Summary> {
    let mut source = FileSource::new(&args.file);
    tracing::info!(source = source.description(), "Replaying");

    let mut summary = Summary::default();
    loop {
        if reached_limit(args, &summary) {
            break;
        }
        match source.poll() {
            Some(frame) => step(args, overlay, sink, &frame, &mut summary),
            None if source.is_finished() => break,
            None => match source.error() {
                Some(err) if err.starts_with("Read error") => {
                    anyhow::bail!("{}: {}", source.description(), err)
                }
                _ => continue,
            },
        }
    }
    Ok(summary)
}

/// Stream the recording through a channel, one frame per recorded delta.
fn run_realtime(args: &Args, overlay: &mut Overlay, sink: &mut TracingSink) -> Result<Summary> {
    let frames = FileSource::read_all(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let (tx, mut source) = ChannelSource::create(&describe(&args.file));
        let producer = tokio::spawn(async move {
            for frame in frames {
                let delta = framewatch::data::duration::delta_from_secs(frame.delta_secs());
                tokio::time::sleep(delta).await;
                if tx.send(frame).is_err() {
                    break;
                }
            }
        });

        let mut summary = Summary::default();
        let mut ticker = tokio::time::interval(Duration::from_millis(1));
        while !reached_limit(args, &summary) {
            ticker.tick().await;
            if let Some(frame) = source.poll() {
                step(args, overlay, sink, &frame, &mut summary);
            } else if source.error().is_some() {
                break;
            }
        }
        producer.abort();
        Ok(summary)
    })
}

fn step(
    args: &Args,
    overlay: &mut Overlay,
    sink: &mut TracingSink,
    frame: &FrameSample,
    summary: &mut Summary,
) {
    let report = overlay.tick(frame, sink);
    summary.record(&report);

    for file in sink.take_screenshots() {
        tracing::info!(file = %file, "Screenshot would be written");
    }
    if sink.take_break_request() {
        tracing::info!(frame = summary.frames, "Break requested");
    }
    if let Some(every) = args.cycle_every.filter(|n| *n > 0) {
        if summary.frames % every == 0 {
            overlay.toggle_modes();
        }
    }
}

fn reached_limit(args: &Args, summary: &Summary) -> bool {
    args.frames.is_some_and(|limit| summary.frames >= limit)
}

fn describe(path: &Path) -> String {
    format!("replay of {}", path.display())
}
