use std::time::{Duration, Instant};

use thiserror::Error;

use crate::detection::domain::presence_detector::PresenceDetector;
use crate::display::domain::frame_display::FrameDisplay;
use crate::display::domain::overlay::{Annotator, Overlay};
use crate::lock::domain::lock_mechanism::{LockError, LockMechanism};
use crate::presence::domain::presence_timer::{PresenceState, PresenceTimer};
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::{CaptureError, FrameSource};

use super::clock::Clock;
use super::monitor_config::MonitorConfig;
use super::monitor_logger::{MonitorLogger, NullMonitorLogger};
use super::quit_signal::QuitSignal;

/// How a monitoring session ended without a runtime error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MonitorOutcome {
    Locked { platform: String },
    UnsupportedPlatform { platform: String },
    LockFailed { platform: String, reason: String },
    UserQuit,
}

impl MonitorOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MonitorOutcome::Locked { .. } | MonitorOutcome::UserQuit)
    }
}

impl std::fmt::Display for MonitorOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorOutcome::Locked { platform } => write!(f, "screen locked ({platform})"),
            MonitorOutcome::UnsupportedPlatform { platform } => {
                write!(f, "unsupported operating system: {platform}")
            }
            MonitorOutcome::LockFailed { platform, reason } => {
                write!(f, "failed to lock screen on {platform}: {reason}")
            }
            MonitorOutcome::UserQuit => write!(f, "stopped by user"),
        }
    }
}

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("monitor already executed")]
    AlreadyExecuted,
}

/// Result of classifying one frame.
enum CycleStep {
    Show { frame: Frame, overlay: Overlay },
    Lock,
}

/// Watches a camera and locks the session once no face has been seen for
/// longer than the lock delay.
///
/// Single-use: `execute` takes the owned components, a second call fails
/// with `MonitorError::AlreadyExecuted`. The frame source must already be
/// open; it is closed, along with the display, on every exit path.
pub struct PresenceMonitorUseCase {
    source: Option<Box<dyn FrameSource>>,
    detector: Option<Box<dyn PresenceDetector>>,
    display: Option<Box<dyn FrameDisplay>>,
    lock: Option<Box<dyn LockMechanism>>,
    clock: Box<dyn Clock>,
    quit: Box<dyn QuitSignal>,
    logger: Box<dyn MonitorLogger>,
    annotator: Annotator,
    lock_delay: Duration,
    poll_interval: Duration,
    platform: String,
}

impl PresenceMonitorUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn PresenceDetector>,
        display: Box<dyn FrameDisplay>,
        lock: Box<dyn LockMechanism>,
        clock: Box<dyn Clock>,
        quit: Box<dyn QuitSignal>,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            source: Some(source),
            detector: Some(detector),
            display: Some(display),
            lock: Some(lock),
            clock,
            quit,
            logger: Box::new(NullMonitorLogger),
            annotator: Annotator::default(),
            lock_delay: config.lock_delay,
            poll_interval: config.poll_interval,
            platform: config.platform.clone(),
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn MonitorLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn execute(&mut self) -> Result<MonitorOutcome, MonitorError> {
        let (Some(mut source), Some(mut detector), Some(mut display), Some(mut lock)) = (
            self.source.take(),
            self.detector.take(),
            self.display.take(),
            self.lock.take(),
        ) else {
            return Err(MonitorError::AlreadyExecuted);
        };

        log::info!(
            "Monitoring presence, locking after {:.1}s without a face ({})",
            self.lock_delay.as_secs_f64(),
            lock.describe()
        );

        let mut timer = PresenceTimer::new(self.clock.now());
        let result = self.run(
            source.as_mut(),
            detector.as_mut(),
            display.as_mut(),
            lock.as_mut(),
            &mut timer,
        );

        source.close();
        display.close();
        self.logger.summary();

        match &result {
            Ok(outcome) if outcome.is_success() => log::info!("Monitor finished: {outcome}"),
            Ok(outcome) => log::error!("Monitor finished: {outcome}"),
            Err(e) => log::error!("Monitor stopped: {e}"),
        }
        result
    }

    fn run(
        &mut self,
        source: &mut dyn FrameSource,
        detector: &mut dyn PresenceDetector,
        display: &mut dyn FrameDisplay,
        lock: &mut dyn LockMechanism,
        timer: &mut PresenceTimer,
    ) -> Result<MonitorOutcome, MonitorError> {
        loop {
            let frame = source.next_frame()?;

            match self.process_cycle(frame, detector, timer) {
                CycleStep::Lock => return Ok(self.lock_session(lock)),
                CycleStep::Show { frame, overlay } => {
                    let started = Instant::now();
                    if let Err(e) = display.present(&frame, &overlay) {
                        log::warn!("Failed to display frame {}: {e}", frame.index());
                    }
                    self.logger.timing("display", elapsed_ms(started));
                }
            }

            if self.quit.wait(self.poll_interval) {
                return Ok(MonitorOutcome::UserQuit);
            }
        }
    }

    /// Detects faces in one frame and decides what happens next.
    fn process_cycle(
        &mut self,
        mut frame: Frame,
        detector: &mut dyn PresenceDetector,
        timer: &mut PresenceTimer,
    ) -> CycleStep {
        let started = Instant::now();
        let regions = match detector.detect(&frame) {
            Ok(regions) => regions,
            Err(e) => {
                log::warn!(
                    "Face detection failed on frame {}, treating it as empty: {e}",
                    frame.index()
                );
                self.logger.detector_failure();
                Vec::new()
            }
        };
        self.logger.timing("detect", elapsed_ms(started));

        let now = self.clock.now();
        if !regions.is_empty() {
            timer.record_detection(now);
            self.logger.cycle(PresenceState::Present);
            let overlay = self.annotator.faces(&mut frame, regions);
            return CycleStep::Show { frame, overlay };
        }

        if timer.should_lock(now, self.lock_delay) {
            self.logger.cycle(PresenceState::Locked);
            return CycleStep::Lock;
        }

        self.logger.cycle(PresenceState::Absent);
        let overlay = self
            .annotator
            .countdown(timer.countdown_seconds(now, self.lock_delay));
        CycleStep::Show { frame, overlay }
    }

    fn lock_session(&self, lock: &mut dyn LockMechanism) -> MonitorOutcome {
        log::info!(
            "No face for more than {:.1}s, locking screen",
            self.lock_delay.as_secs_f64()
        );
        match lock.lock() {
            Ok(()) => MonitorOutcome::Locked {
                platform: self.platform.clone(),
            },
            Err(LockError::Unsupported { platform }) => {
                MonitorOutcome::UnsupportedPlatform { platform }
            }
            Err(e) => MonitorOutcome::LockFailed {
                platform: self.platform.clone(),
                reason: e.to_string(),
            },
        }
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
