//! Frame replay - runs a JSON-lines frame stream through the engine

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use engine::{init_logging, Calibration, EngineConfig, FrameInput, SafetyEngine, SessionId};
use tracing::info;

/// Replay recorded perception frames and print tracks and alerts per frame
#[derive(Parser, Debug)]
#[command(name = "frame-replay")]
#[command(about = "Replay a JSON-lines frame stream through the fusion & risk engine", long_about = None)]
struct Args {
    /// Frame records, one JSON object per line (stdin when omitted)
    input: Option<PathBuf>,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Session identifier
    #[arg(short, long, default_value = "replay")]
    session: String,

    /// Frame rate of the recording
    #[arg(long, default_value = "30")]
    fps: f64,

    /// Camera focal length (pixels)
    #[arg(long, default_value = "700")]
    focal_length: f64,

    /// Camera mount height (meters)
    #[arg(long, default_value = "1.2")]
    mount_height: f64,

    /// Frame width (pixels)
    #[arg(long, default_value = "1280")]
    frame_width: f64,

    /// Frame height (pixels)
    #[arg(long, default_value = "720")]
    frame_height: f64,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs)?;

    let config = EngineConfig::load(args.config.as_deref()).context("loading configuration")?;
    let mut engine = SafetyEngine::new(config)?;

    let session = SessionId::new(args.session.clone());
    let calibration = Calibration {
        fps: args.fps,
        focal_length_px: args.focal_length,
        mount_height_m: args.mount_height,
        frame_width: args.frame_width,
        frame_height: args.frame_height,
    };
    engine.start_session(session.clone(), calibration)?;

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let mut out = BufWriter::new(io::stdout().lock());

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("reading frame stream")?;
        if line.trim().is_empty() {
            continue;
        }
        let input: FrameInput = serde_json::from_str(&line)
            .with_context(|| format!("parsing frame record on line {}", index + 1))?;
        let output = engine.process_frame(&session, &input)?;
        serde_json::to_writer(&mut out, &output)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    let report = engine.end_session(&session)?;
    info!(
        frames = report.frames_processed,
        alerts = report.alerts_emitted,
        unacknowledged = report.alerts_unacknowledged,
        "Replay finished"
    );
    Ok(())
}
