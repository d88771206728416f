use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("could not open camera {device}: {reason}")]
    Open { device: String, reason: String },
    #[error("no camera capture backend available on this platform")]
    UnsupportedHost,
    #[error("camera stream ended")]
    EndOfStream,
    #[error("could not read frame from camera: {0}")]
    Decode(String),
    #[error("frame source used before it was opened")]
    NotOpened,
}

/// Capture parameters for a live camera.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    /// Backend-specific device name, e.g. `/dev/video0` or `0`.
    pub device: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub framerate: Option<u32>,
}

/// What the device actually negotiated.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraInfo {
    pub device: String,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

/// Produces frames on demand from a camera or other live source.
///
/// `next_frame` blocks until a frame is available. An error is terminal
/// for the stream; callers are not expected to retry.
pub trait FrameSource: Send {
    fn open(&mut self, config: &CameraConfig) -> Result<CameraInfo, CaptureError>;

    fn next_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Releases the device. Safe to call more than once.
    fn close(&mut self);
}
