pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// Seconds without a face before the session is locked.
pub const DEFAULT_LOCK_DELAY_SECS: f64 = 10.0;

/// Bounded wait between cycles (~30 fps).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 33;

pub const DEFAULT_CONFIDENCE: f64 = 0.5;

pub const FACE_LABEL: &str = "Face Detected";

pub const BOX_COLOR: [u8; 3] = [0, 255, 0];
pub const BOX_THICKNESS: i32 = 2;

/// Camera device opened when none is configured.
pub fn default_camera_device() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "0"
    }
    #[cfg(target_os = "windows")]
    {
        "video=Integrated Camera"
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        "/dev/video0"
    }
}
