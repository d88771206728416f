use std::thread;

use crossbeam_channel::{Receiver, Sender};

use facelock_core::detection::domain::presence_detector::PresenceDetector;
use facelock_core::detection::infrastructure::model_resolver::{self, ModelSource};
use facelock_core::detection::infrastructure::onnx_yolo_detector::OnnxYoloDetector;
use facelock_core::detection::infrastructure::skip_frame_detector::SkipFrameDetector;
use facelock_core::display::domain::frame_display::FrameDisplay;
use facelock_core::display::domain::overlay::Overlay;
use facelock_core::lock::infrastructure::lock_registry::LockRegistry;
use facelock_core::monitor::clock::SystemClock;
use facelock_core::monitor::monitor_config::MonitorConfig;
use facelock_core::monitor::presence_monitor_use_case::{MonitorOutcome, PresenceMonitorUseCase};
use facelock_core::monitor::quit_signal::ChannelQuitSignal;
use facelock_core::shared::constants::{YOLO_MODEL_NAME, YOLO_MODEL_URL};
use facelock_core::shared::frame::Frame;
use facelock_core::video::domain::frame_source::FrameSource;
use facelock_core::video::infrastructure::ffmpeg_camera_source::FfmpegCameraSource;

/// Frames allowed to queue up before the display starts dropping them.
const MAX_PENDING_FRAMES: usize = 2;

/// One annotated camera image, ready for the UI.
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub overlay: Overlay,
}

/// Messages sent from the worker thread to the UI.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    DownloadProgress(u64, u64),
    CameraReady { device: String, width: u32, height: u32 },
    Frame(PreviewFrame),
    Finished(MonitorOutcome),
    Error(String),
}

/// Forwards presented frames to the UI thread.
///
/// Drops frames while the UI is behind instead of queueing them.
pub struct ChannelDisplay {
    tx: Sender<WorkerMessage>,
}

impl ChannelDisplay {
    pub fn new(tx: Sender<WorkerMessage>) -> Self {
        Self { tx }
    }
}

impl FrameDisplay for ChannelDisplay {
    fn present(&mut self, frame: &Frame, overlay: &Overlay) -> Result<(), Box<dyn std::error::Error>> {
        if self.tx.len() >= MAX_PENDING_FRAMES {
            return Ok(());
        }
        self.tx.send(WorkerMessage::Frame(PreviewFrame {
            width: frame.width(),
            height: frame.height(),
            rgba: frame.to_rgba(),
            overlay: overlay.clone(),
        }))?;
        Ok(())
    }
}

/// Spawn a background monitor. Returns the message receiver and a sender
/// that stops the monitor when signalled or dropped.
pub fn spawn(config: MonitorConfig) -> (Receiver<WorkerMessage>, Sender<()>) {
    let (tx, rx) = crossbeam_channel::unbounded::<WorkerMessage>();
    let (quit_tx, quit_rx) = crossbeam_channel::bounded::<()>(1);

    thread::spawn(move || match run_monitor(&tx, quit_rx, &config) {
        Ok(outcome) => {
            let _ = tx.send(WorkerMessage::Finished(outcome));
        }
        Err(e) => {
            log::error!("Monitor failed: {e}");
            let _ = tx.send(WorkerMessage::Error(e.to_string()));
        }
    });

    (rx, quit_tx)
}

fn run_monitor(
    tx: &Sender<WorkerMessage>,
    quit_rx: Receiver<()>,
    config: &MonitorConfig,
) -> Result<MonitorOutcome, Box<dyn std::error::Error>> {
    config.validate()?;

    let tx_dl = tx.clone();
    let bundled = model_resolver::bundled_model_dir();
    let model_path = model_resolver::resolve(
        &ModelSource {
            name: YOLO_MODEL_NAME,
            url: YOLO_MODEL_URL,
            explicit: None,
            bundled_dir: bundled.as_deref(),
        },
        Some(Box::new(move |downloaded, total| {
            let _ = tx_dl.send(WorkerMessage::DownloadProgress(downloaded, total));
        })),
    )?;

    let mut detector: Box<dyn PresenceDetector> =
        Box::new(OnnxYoloDetector::new(&model_path, config.confidence)?);
    if config.detect_every > 1 {
        detector = Box::new(SkipFrameDetector::new(detector, config.detect_every)?);
    }

    let lock = LockRegistry::with_defaults()
        .resolve_with(&config.platform, config.lock_command.as_deref());

    let mut source: Box<dyn FrameSource> = Box::new(FfmpegCameraSource::new());
    let info = source.open(&config.camera)?;
    let _ = tx.send(WorkerMessage::CameraReady {
        device: info.device,
        width: info.width,
        height: info.height,
    });

    let mut use_case = PresenceMonitorUseCase::new(
        source,
        detector,
        Box::new(ChannelDisplay::new(tx.clone())),
        lock,
        Box::new(SystemClock),
        Box::new(ChannelQuitSignal::new(quit_rx)),
        config,
    );
    Ok(use_case.execute()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use facelock_core::display::domain::overlay::Annotator;

    #[test]
    fn test_channel_display_sends_rgba_frame() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut display = ChannelDisplay::new(tx);
        let overlay = Annotator::default().countdown(4);

        display.present(&Frame::blank(3, 2, 0), &overlay).unwrap();

        match rx.try_recv().unwrap() {
            WorkerMessage::Frame(preview) => {
                assert_eq!((preview.width, preview.height), (3, 2));
                assert_eq!(preview.rgba.len(), 3 * 2 * 4);
                assert_eq!(preview.overlay, overlay);
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn test_channel_display_drops_frames_when_ui_lags() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut display = ChannelDisplay::new(tx);
        let overlay = Annotator::default().countdown(1);

        for index in 0..5 {
            display.present(&Frame::blank(2, 2, index), &overlay).unwrap();
        }

        assert_eq!(rx.len(), MAX_PENDING_FRAMES);
    }

    #[test]
    fn test_channel_display_errors_when_ui_is_gone() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        let mut display = ChannelDisplay::new(tx);
        assert!(display
            .present(&Frame::blank(2, 2, 0), &Annotator::default().countdown(1))
            .is_err());
    }
}
