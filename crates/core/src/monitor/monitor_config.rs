use std::time::Duration;

use thiserror::Error;

use crate::lock::infrastructure::lock_registry::current_platform;
use crate::shared::constants::{
    default_camera_device, DEFAULT_CONFIDENCE, DEFAULT_LOCK_DELAY_SECS, DEFAULT_POLL_INTERVAL_MS,
};
use crate::video::domain::frame_source::CameraConfig;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("lock delay must be a positive number of seconds, got {0}")]
    LockDelay(f64),
    #[error("poll interval must be greater than zero")]
    PollInterval,
    #[error("confidence must be between 0.0 and 1.0, got {0}")]
    Confidence(f64),
    #[error("detect-every must be at least 1")]
    DetectEvery,
    #[error("camera device must not be empty")]
    EmptyCamera,
    #[error("camera {field} must be greater than zero")]
    CameraHint { field: &'static str },
    #[error("platform identifier must not be empty")]
    EmptyPlatform,
    #[error("lock command must name a program")]
    EmptyLockCommand,
}

/// Validated runtime settings for one monitoring session.
#[derive(Clone, Debug, PartialEq)]
pub struct MonitorConfig {
    pub lock_delay: Duration,
    pub poll_interval: Duration,
    pub confidence: f64,
    pub detect_every: usize,
    pub camera: CameraConfig,
    /// Selects the lock mechanism, e.g. `linux` or `macos`.
    pub platform: String,
    /// Replaces the platform's lock commands when set.
    pub lock_command: Option<Vec<String>>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            lock_delay: Duration::from_secs_f64(DEFAULT_LOCK_DELAY_SECS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            confidence: DEFAULT_CONFIDENCE,
            detect_every: 1,
            camera: CameraConfig {
                device: default_camera_device().to_string(),
                width: None,
                height: None,
                framerate: None,
            },
            platform: current_platform().to_string(),
            lock_command: None,
        }
    }
}

/// Converts a user-supplied delay in seconds, rejecting zero, negatives and NaN.
pub fn lock_delay_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    if !(secs.is_finite() && secs > 0.0) {
        return Err(ConfigError::LockDelay(secs));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::LockDelay(secs))
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock_delay.is_zero() {
            return Err(ConfigError::LockDelay(0.0));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::PollInterval);
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ConfigError::Confidence(self.confidence));
        }
        if self.detect_every == 0 {
            return Err(ConfigError::DetectEvery);
        }
        if self.camera.device.trim().is_empty() {
            return Err(ConfigError::EmptyCamera);
        }
        for (field, value) in [
            ("width", self.camera.width),
            ("height", self.camera.height),
            ("framerate", self.camera.framerate),
        ] {
            if value == Some(0) {
                return Err(ConfigError::CameraHint { field });
            }
        }
        if self.platform.trim().is_empty() {
            return Err(ConfigError::EmptyPlatform);
        }
        if let Some(argv) = &self.lock_command {
            if argv.first().map_or(true, |p| p.trim().is_empty()) {
                return Err(ConfigError::EmptyLockCommand);
            }
        }
        Ok(())
    }
}
