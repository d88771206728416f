use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use facelock_core::monitor::monitor_config::MonitorConfig;
use facelock_core::shared::constants::{
    default_camera_device, DEFAULT_CONFIDENCE, DEFAULT_LOCK_DELAY_SECS,
};
use facelock_core::video::domain::frame_source::CameraConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    Dark,
    Light,
}

impl Appearance {
    pub const ALL: &[Appearance] = &[Appearance::Dark, Appearance::Light];
}

impl std::fmt::Display for Appearance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Appearance::Dark => write!(f, "Dark"),
            Appearance::Light => write!(f, "Light"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub lock_delay_secs: u32,
    /// Percent, 0-100.
    pub confidence: u32,
    pub detect_every: u32,
    pub camera: String,
    pub appearance: Appearance,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lock_delay_secs: DEFAULT_LOCK_DELAY_SECS as u32,
            confidence: (DEFAULT_CONFIDENCE * 100.0) as u32,
            detect_every: 1,
            camera: default_camera_device().to_string(),
            appearance: Appearance::Dark,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceLock").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Err(e) = self.save_to(&path) {
                log::warn!("Failed to save settings to {}: {e}", path.display());
            }
        }
    }

    fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Monitor settings for the host platform, with the user's choices applied.
    pub fn to_monitor_config(&self) -> MonitorConfig {
        let defaults = MonitorConfig::default();
        MonitorConfig {
            lock_delay: Duration::from_secs(self.lock_delay_secs.max(1) as u64),
            confidence: self.confidence.min(100) as f64 / 100.0,
            detect_every: self.detect_every.max(1) as usize,
            camera: CameraConfig {
                device: self.camera.trim().to_string(),
                ..defaults.camera
            },
            ..defaults
        }
    }
}
