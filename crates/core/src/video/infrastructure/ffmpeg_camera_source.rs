use std::thread;
use std::time::Duration;

use crate::shared::frame::Frame;
use crate::video::domain::frame_source::{CameraConfig, CameraInfo, CaptureError, FrameSource};

/// Consecutive `EAGAIN` reads tolerated before the device counts as stalled.
const MAX_READ_RETRIES: u32 = 400;
const READ_RETRY_PAUSE: Duration = Duration::from_millis(5);

/// Consecutive packets the decoder may reject before capture fails.
const MAX_REJECTED_PACKETS: u32 = 30;

/// Captures webcam frames through libavdevice (via ffmpeg-next).
///
/// The platform's native capture backend is used: `v4l2` on Linux,
/// `avfoundation` on macOS and `dshow` on Windows. Every decoded frame is
/// converted to RGB24 before it leaves this type.
pub struct FfmpegCameraSource {
    camera: Option<OpenCamera>,
    frame_index: usize,
}

struct OpenCamera {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
}

// Safety: the capture context is owned by the monitor thread and never
// shared; it only moves once, from the spawning thread to the worker.
unsafe impl Send for FfmpegCameraSource {}

impl FfmpegCameraSource {
    pub fn new() -> Self {
        Self {
            camera: None,
            frame_index: 0,
        }
    }
}

impl Default for FfmpegCameraSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FfmpegCameraSource {
    fn drop(&mut self) {
        self.close();
    }
}

impl FrameSource for FfmpegCameraSource {
    fn open(&mut self, config: &CameraConfig) -> Result<CameraInfo, CaptureError> {
        let open_err = |reason: String| CaptureError::Open {
            device: config.device.clone(),
            reason,
        };

        ffmpeg_next::init().map_err(|e| open_err(e.to_string()))?;

        let backend = capture_backend().ok_or(CaptureError::UnsupportedHost)?;
        let format = ffmpeg_next::device::input::video()
            .find(|f| f.name() == backend)
            .ok_or(CaptureError::UnsupportedHost)?;

        let mut options = ffmpeg_next::Dictionary::new();
        for (key, value) in capture_options(config) {
            options.set(key, &value);
        }

        let ictx = ffmpeg_next::format::open_with(
            config.device.as_str(),
            &ffmpeg_next::format::Format::Input(format),
            options,
        )
        .map_err(|e| open_err(e.to_string()))?
        .input();

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| open_err("device exposes no video stream".to_string()))?;
        let stream_index = stream.index();
        let rate = stream.avg_frame_rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .and_then(|ctx| ctx.decoder().video())
            .map_err(|e| open_err(e.to_string()))?;
        let width = decoder.width();
        let height = decoder.height();

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| open_err(e.to_string()))?;

        log::info!(
            "Opened camera {} via {backend}: {width}x{height} @ {fps:.1} fps",
            config.device
        );

        self.camera = Some(OpenCamera {
            ictx,
            decoder,
            scaler,
            stream_index,
            width,
            height,
        });
        self.frame_index = 0;

        Ok(CameraInfo {
            device: config.device.clone(),
            width,
            height,
            fps,
        })
    }

    fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        let cam = self.camera.as_mut().ok_or(CaptureError::NotOpened)?;
        let mut read_attempts = 0;
        let mut rejected = 0;

        loop {
            let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
            if cam.decoder.receive_frame(&mut decoded).is_ok() {
                let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
                cam.scaler
                    .run(&decoded, &mut rgb)
                    .map_err(|e| CaptureError::Decode(e.to_string()))?;
                let pixels = extract_rgb_pixels(&rgb, cam.width, cam.height);
                let frame = Frame::new(pixels, cam.width, cam.height, self.frame_index);
                self.frame_index += 1;
                return Ok(frame);
            }

            let mut packet = ffmpeg_next::Packet::empty();
            if let Err(e) = packet.read(&mut cam.ictx) {
                read_attempts += 1;
                if let Some(err) = read_failure(e, read_attempts) {
                    return Err(err);
                }
                thread::sleep(READ_RETRY_PAUSE);
                continue;
            }
            read_attempts = 0;

            if packet.stream() != cam.stream_index {
                continue;
            }
            match cam.decoder.send_packet(&packet) {
                Ok(()) => rejected = 0,
                Err(e) => {
                    rejected += 1;
                    log::debug!("Dropped camera packet: {e}");
                    if let Some(err) = rejected_packets_failure(rejected, e) {
                        return Err(err);
                    }
                }
            }
        }
    }

    fn close(&mut self) {
        if self.camera.take().is_some() {
            log::debug!("Camera released after {} frames", self.frame_index);
        }
    }
}

/// Maps a failed packet read to a capture error. `None` means the device
/// had nothing ready yet and the read should be retried.
fn read_failure(error: ffmpeg_next::Error, attempts: u32) -> Option<CaptureError> {
    match error {
        ffmpeg_next::Error::Eof => Some(CaptureError::EndOfStream),
        ffmpeg_next::Error::Other { errno }
            if errno == ffmpeg_next::error::EAGAIN && attempts < MAX_READ_RETRIES =>
        {
            None
        }
        e => Some(CaptureError::Decode(e.to_string())),
    }
}

fn rejected_packets_failure(rejected: u32, error: ffmpeg_next::Error) -> Option<CaptureError> {
    (rejected >= MAX_REJECTED_PACKETS).then(|| {
        CaptureError::Decode(format!(
            "decoder rejected {rejected} packets in a row: {error}"
        ))
    })
}

fn capture_backend() -> Option<&'static str> {
    if cfg!(target_os = "linux") {
        Some("v4l2")
    } else if cfg!(target_os = "macos") {
        Some("avfoundation")
    } else if cfg!(target_os = "windows") {
        Some("dshow")
    } else {
        None
    }
}

/// Demuxer options for the capture device.
///
/// avfoundation refuses to open without an explicit frame rate, so one is
/// always supplied there.
fn capture_options(config: &CameraConfig) -> Vec<(&'static str, String)> {
    let mut options = Vec::new();
    let framerate = config
        .framerate
        .or(if cfg!(target_os = "macos") { Some(30) } else { None });
    if let Some(fps) = framerate {
        options.push(("framerate", fps.to_string()));
    }
    if let (Some(w), Some(h)) = (config.width, config.height) {
        options.push(("video_size", format!("{w}x{h}")));
    }
    options
}

/// Copies an RGB24 ffmpeg frame into a tightly packed buffer, dropping the
/// per-row stride padding.
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let row_bytes = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}
