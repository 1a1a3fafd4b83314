use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use anyhow::Context as _;
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use wavereel::{
    ExportOptions, ExportOutcome, ExportRequest, ExportSession, Exporter, FfmpegBackend,
    FrameRenderer, OctavesHigher, VolumeModifier, WaveformRenderer, WaveformStyle,
};

/// Pitch of the demo tone once sped up, in Hz (middle C).
const DEMO_TONE_HZ: f64 = 261.63;

#[derive(Parser, Debug)]
#[command(name = "wavereel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a demo signal as an MP4 movie (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
    /// Render a single waveform frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Args, Debug)]
struct SignalArgs {
    /// Minutes of recorded signal to synthesize.
    #[arg(long, default_value_t = 30.0)]
    minutes: f64,

    /// Recorded samples per second.
    #[arg(long, default_value_t = 40)]
    sps: u32,

    /// Octaves to pitch the signal up (7..=14).
    #[arg(long, default_value_t = 8)]
    octaves: u32,

    /// Volume normalization.
    #[arg(long, value_enum, default_value_t = VolumeArg::Fixed)]
    volume: VolumeArg,

    /// Frame width in pixels (even).
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Frame height in pixels (even).
    #[arg(long, default_value_t = 360)]
    height: u32,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Export options JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    signal: SignalArgs,
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Playback time of the frame, in seconds.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    #[command(flatten)]
    signal: SignalArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VolumeArg {
    Fixed,
    AutoAdjusted,
}

impl From<VolumeArg> for VolumeModifier {
    fn from(v: VolumeArg) -> Self {
        match v {
            VolumeArg::Fixed => Self::Fixed,
            VolumeArg::AutoAdjusted => Self::AutoAdjusted,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wavereel=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

/// Sine tone that lands on middle C once played `multiplier` times faster.
fn demo_samples(args: &SignalArgs, octaves: OctavesHigher) -> Vec<f32> {
    let sps = f64::from(args.sps);
    let count = (args.minutes.max(0.0) * 60.0 * sps).round() as usize;
    let freq = DEMO_TONE_HZ / f64::from(octaves.multiplier());
    (0..count)
        .map(|i| {
            let t = i as f64 / sps;
            (2.0 * std::f64::consts::PI * freq * t).sin() as f32
        })
        .collect()
}

fn build_request(args: &SignalArgs) -> anyhow::Result<ExportRequest> {
    let octaves = OctavesHigher::from_octaves(args.octaves).with_context(|| {
        let valid: Vec<String> = OctavesHigher::ALL
            .iter()
            .map(|o| o.octaves().to_string())
            .collect();
        format!(
            "unsupported --octaves {}; expected one of {}",
            args.octaves,
            valid.join(", ")
        )
    })?;
    anyhow::ensure!(args.sps > 0, "--sps must be positive");
    anyhow::ensure!(
        args.minutes.is_finite() && args.minutes > 0.0,
        "--minutes must be positive"
    );

    let samples = demo_samples(args, octaves);
    let duration = Duration::try_from_secs_f64(args.minutes * 60.0)?;
    let start = Utc::now() - chrono::Duration::from_std(duration)?;
    let req = ExportRequest::from_samples(
        args.width,
        args.height,
        start,
        duration,
        args.sps,
        octaves,
        args.volume.into(),
        samples,
    );
    req.validate()?;
    Ok(req)
}

fn waveform(req: &ExportRequest) -> WaveformRenderer {
    WaveformRenderer::new(
        req.width,
        req.height,
        req.samples.clone(),
        req.playback_secs,
        WaveformStyle::default(),
    )
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let opts = match &args.config {
        Some(path) => ExportOptions::from_json_path(path)?,
        None => ExportOptions::default(),
    };
    let backend = FfmpegBackend::new(&opts);
    anyhow::ensure!(
        backend.is_available(),
        "'{}' and '{}' must be runnable to export",
        opts.ffmpeg_path.display(),
        opts.ffprobe_path.display()
    );

    let req = build_request(&args.signal)?;
    eprintln!(
        "exporting {:.1}s movie ({} Hz playback, {})",
        req.playback_secs,
        req.nominal_sample_rate(),
        req.octaves_higher
    );
    let renderer: Arc<dyn FrameRenderer> = Arc::new(waveform(&req));

    let session = ExportSession::new(Exporter::new(Arc::new(backend), opts));
    let (tx, rx) = mpsc::channel();
    session.start_with_outcome(req, renderer, move |outcome| {
        let _ = tx.send(outcome);
    })?;

    let outcome = loop {
        match rx.recv_timeout(Duration::from_millis(250)) {
            Ok(outcome) => break outcome,
            Err(RecvTimeoutError::Timeout) => {
                if let Some(p) = session.progress() {
                    eprint!("\rrendering {:5.1}%", p * 100.0);
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                anyhow::bail!("export ended without reporting an outcome")
            }
        }
    };
    eprintln!();
    session.wait();

    match outcome {
        ExportOutcome::Exported(movie) => {
            deliver(&movie, &args.out)?;
            eprintln!("wrote {}", args.out.display());
            Ok(())
        }
        ExportOutcome::Failed(e) => Err(e.into()),
        ExportOutcome::Cancelled => anyhow::bail!("export was cancelled"),
    }
}

/// Copy the exported movie to `out` and remove the workspace folder it was handed off in.
fn deliver(movie: &Path, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::copy(movie, out)
        .with_context(|| format!("copy '{}' to '{}'", movie.display(), out.display()))?;
    if let Some(dir) = movie.parent() {
        std::fs::remove_dir_all(dir)
            .with_context(|| format!("remove export folder '{}'", dir.display()))?;
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let req = build_request(&args.signal)?;
    let frame = waveform(&req).render(args.at)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({} at {})",
        args.out.display(),
        req.octaves_higher,
        req.wall_clock_at(args.at).format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}
