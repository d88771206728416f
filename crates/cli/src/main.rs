use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::Sender;

use facelock_core::detection::domain::presence_detector::PresenceDetector;
use facelock_core::detection::infrastructure::model_resolver::{self, ModelSource};
use facelock_core::detection::infrastructure::onnx_yolo_detector::OnnxYoloDetector;
use facelock_core::detection::infrastructure::skip_frame_detector::SkipFrameDetector;
use facelock_core::display::domain::frame_display::{FrameDisplay, MultiDisplay, NullDisplay};
use facelock_core::display::infrastructure::console_display::ConsoleDisplay;
use facelock_core::display::infrastructure::snapshot_display::SnapshotDisplay;
use facelock_core::lock::infrastructure::lock_registry::{current_platform, LockRegistry};
use facelock_core::monitor::clock::SystemClock;
use facelock_core::monitor::monitor_config::{lock_delay_from_secs, MonitorConfig};
use facelock_core::monitor::monitor_logger::StatsMonitorLogger;
use facelock_core::monitor::presence_monitor_use_case::PresenceMonitorUseCase;
use facelock_core::monitor::quit_signal::{ChannelQuitSignal, NeverQuit, QuitSignal};
use facelock_core::shared::constants::{
    default_camera_device, DEFAULT_CONFIDENCE, DEFAULT_LOCK_DELAY_SECS, DEFAULT_POLL_INTERVAL_MS,
    YOLO_MODEL_NAME, YOLO_MODEL_URL,
};
use facelock_core::video::domain::frame_source::{CameraConfig, FrameSource};
use facelock_core::video::infrastructure::ffmpeg_camera_source::FfmpegCameraSource;

/// Lock the screen when nobody is in front of the webcam.
#[derive(Parser)]
#[command(name = "facelock")]
struct Cli {
    /// Seconds without a detected face before locking.
    #[arg(long, default_value_t = DEFAULT_LOCK_DELAY_SECS)]
    lock_delay: f64,

    /// Camera device (e.g. /dev/video0, 0, "video=Integrated Camera").
    #[arg(long)]
    camera: Option<String>,

    /// Requested capture width.
    #[arg(long)]
    width: Option<u32>,

    /// Requested capture height.
    #[arg(long)]
    height: Option<u32>,

    /// Requested capture frame rate.
    #[arg(long)]
    framerate: Option<u32>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Run detection every Nth frame (1 = every frame).
    #[arg(long, default_value = "1")]
    detect_every: usize,

    /// Wait between frames, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    poll_interval_ms: u64,

    /// Face model file. Skips the cache lookup and download.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Command to run instead of the platform's lock command. Takes the
    /// rest of the command line, so pass it last.
    #[arg(long, num_args = 1.., allow_hyphen_values = true)]
    lock_command: Option<Vec<String>>,

    /// Platform whose lock command to use (defaults to the host OS).
    #[arg(long)]
    platform: Option<String>,

    /// Keep writing the annotated camera image to this file.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Write the snapshot every Nth frame.
    #[arg(long, default_value = "15")]
    snapshot_every: usize,

    /// Don't log presence changes and countdowns.
    #[arg(long)]
    quiet: bool,
}

fn main() {
    env_logger::init();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Returns whether the session ended successfully.
fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = to_config(&cli)?;

    let detector = build_detector(&cli, &config)?;
    let registry = LockRegistry::with_defaults();
    if let Some(hint) = unsupported_platform_hint(&registry, &config) {
        log::warn!("{hint}");
    }
    let lock = registry.resolve_with(&config.platform, config.lock_command.as_deref());

    let mut source: Box<dyn FrameSource> = Box::new(FfmpegCameraSource::new());
    let info = source.open(&config.camera)?;
    log::info!("Camera {} ready ({}x{})", info.device, info.width, info.height);

    let display = build_display(&cli);
    let quit = build_quit_signal();

    let mut use_case = PresenceMonitorUseCase::new(
        source,
        detector,
        display,
        lock,
        Box::new(SystemClock),
        quit,
        &config,
    )
    .with_logger(Box::new(StatsMonitorLogger::new()));

    let outcome = use_case.execute()?;
    Ok(outcome.is_success())
}

fn to_config(cli: &Cli) -> Result<MonitorConfig, Box<dyn std::error::Error>> {
    let config = MonitorConfig {
        lock_delay: lock_delay_from_secs(cli.lock_delay)?,
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
        confidence: cli.confidence,
        detect_every: cli.detect_every,
        camera: CameraConfig {
            device: cli
                .camera
                .clone()
                .unwrap_or_else(|| default_camera_device().to_string()),
            width: cli.width,
            height: cli.height,
            framerate: cli.framerate,
        },
        platform: cli
            .platform
            .clone()
            .unwrap_or_else(|| current_platform().to_string()),
        lock_command: cli.lock_command.clone(),
    };
    config.validate()?;
    if cli.snapshot_every == 0 {
        return Err("--snapshot-every must be at least 1".into());
    }
    Ok(config)
}

/// Startup notice for a platform with no known lock command, unless the user
/// supplied their own.
fn unsupported_platform_hint(registry: &LockRegistry, config: &MonitorConfig) -> Option<String> {
    if config.lock_command.is_some() || registry.is_supported(&config.platform) {
        return None;
    }
    Some(format!(
        "No lock command known for platform '{}'. Pass --lock-command to choose one.",
        config.platform
    ))
}

fn build_detector(
    cli: &Cli,
    config: &MonitorConfig,
) -> Result<Box<dyn PresenceDetector>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {YOLO_MODEL_NAME}");
    let bundled = model_resolver::bundled_model_dir();
    let model_path = model_resolver::resolve(
        &ModelSource {
            name: YOLO_MODEL_NAME,
            url: YOLO_MODEL_URL,
            explicit: cli.model.as_deref(),
            bundled_dir: bundled.as_deref(),
        },
        Some(Box::new(download_progress)),
    )?;

    let base: Box<dyn PresenceDetector> =
        Box::new(OnnxYoloDetector::new(&model_path, config.confidence)?);

    if config.detect_every > 1 {
        Ok(Box::new(SkipFrameDetector::new(base, config.detect_every)?))
    } else {
        Ok(base)
    }
}

fn build_display(cli: &Cli) -> Box<dyn FrameDisplay> {
    let console: Box<dyn FrameDisplay> = if cli.quiet {
        Box::new(NullDisplay)
    } else {
        Box::new(ConsoleDisplay::new())
    };
    match &cli.snapshot {
        Some(path) => {
            log::info!("Writing snapshots to {}", path.display());
            Box::new(MultiDisplay::new(vec![
                console,
                Box::new(SnapshotDisplay::new(path, cli.snapshot_every)),
            ]))
        }
        None => console,
    }
}

/// Quit on `q` + Enter when attached to a terminal. Without one (e.g. under
/// a service manager) the monitor runs until it locks or the camera fails.
fn build_quit_signal() -> Box<dyn QuitSignal> {
    if !std::io::stdin().is_terminal() {
        return Box::new(NeverQuit);
    }
    log::info!("Type q and press Enter to stop.");
    let (quit_tx, quit_rx) = crossbeam_channel::bounded(1);
    spawn_stdin_listener(quit_tx);
    Box::new(ChannelQuitSignal::new(quit_rx))
}

fn spawn_stdin_listener(quit_tx: Sender<()>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if matches!(line.trim(), "q" | "quit") {
                let _ = quit_tx.try_send(());
                return;
            }
        }
        // stdin closed; holding the sender keeps the monitor running
        loop {
            std::thread::park();
        }
    });
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
