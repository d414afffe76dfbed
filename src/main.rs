use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::bounded;
use gesture_link::{
    GestureConfig, GestureSession,
    pipeline::{
        publish_event,
        sink::{GestureSink, SignalSink},
        start_session,
        tracker::{ReplayFrames, start_landmark_stream},
    },
};

// Small queue; the session always jumps to the newest queued frame.
const FRAME_QUEUE: usize = 2;

/// Reads hand-tracker landmarks as JSON lines and writes confirmed gestures
/// as signaling messages on stdout.
#[derive(Debug, Parser)]
#[command(name = "gesture-link", version)]
struct Cli {
    /// Tracker output to read instead of stdin.
    #[arg(long)]
    input: Option<PathBuf>,
    /// TOML file with gesture thresholds.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    confirm_frames: Option<u32>,
    #[arg(long)]
    cooldown_ms: Option<u64>,
    /// Process every recorded frame in order instead of live.
    #[arg(long)]
    replay: bool,
    /// Frame spacing for replay records without `timestamp_ms`.
    #[arg(long, default_value_t = 33)]
    frame_interval_ms: u64,
}

impl Cli {
    fn gesture_config(&self) -> Result<GestureConfig> {
        let mut config = match &self.config {
            Some(path) => GestureConfig::load(path)?,
            None => GestureConfig::default(),
        };
        if let Some(frames) = self.confirm_frames {
            config.confirm_frames = frames;
        }
        if let Some(ms) = self.cooldown_ms {
            config.cooldown_ms = ms;
        }
        config.validate()?;
        Ok(config)
    }

    fn open_input(&self) -> Result<Box<dyn BufRead + Send>> {
        Ok(match &self.input {
            Some(path) => Box::new(BufReader::new(
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
            )),
            None => Box::new(BufReader::new(io::stdin())),
        })
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.gesture_config()?;
    let input = cli.open_input()?;
    let sink = SignalSink::new(io::stdout());

    if cli.replay {
        run_replay(config, input, Duration::from_millis(cli.frame_interval_ms), sink)
    } else {
        run_live(config, input, sink)
    }
}

fn run_live(config: GestureConfig, input: Box<dyn BufRead + Send>, sink: impl GestureSink) -> Result<()> {
    let (frame_tx, frame_rx) = bounded(FRAME_QUEUE);
    let session = start_session(config, frame_rx, sink)?;
    let stream = start_landmark_stream(input, frame_tx);

    if stream.join().is_err() {
        log::error!("landmark stream panicked");
    }
    session.join();
    Ok(())
}

fn run_replay(
    config: GestureConfig,
    input: Box<dyn BufRead + Send>,
    frame_interval: Duration,
    mut sink: impl GestureSink,
) -> Result<()> {
    let mut session = GestureSession::new(config)?;
    let mut confirmed = 0usize;
    for frame in ReplayFrames::new(input, frame_interval) {
        if let Some(event) = session.process(&frame?) {
            publish_event(&mut sink, &event);
            confirmed += 1;
        }
    }
    log::info!("replay finished, {confirmed} gestures confirmed");
    Ok(())
}
