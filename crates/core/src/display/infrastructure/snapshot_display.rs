use std::path::{Path, PathBuf};

use crate::display::domain::frame_display::FrameDisplay;
use crate::display::domain::overlay::Overlay;
use crate::shared::frame::Frame;

/// Writes the annotated frame to a single image file every `every` frames.
///
/// The overlay text (face labels or the countdown) goes to a sidecar file
/// next to the image, named after it with `.txt` appended. Both files are
/// replaced atomically (write to a sibling, then rename), so a viewer
/// watching the path never sees a half-written image.
pub struct SnapshotDisplay {
    path: PathBuf,
    every: usize,
    presented: usize,
}

impl SnapshotDisplay {
    pub fn new(path: impl Into<PathBuf>, every: usize) -> Self {
        Self {
            path: path.into(),
            every: every.max(1),
            presented: 0,
        }
    }
}

impl FrameDisplay for SnapshotDisplay {
    fn present(&mut self, frame: &Frame, overlay: &Overlay) -> Result<(), Box<dyn std::error::Error>> {
        let due = self.presented % self.every == 0;
        self.presented += 1;
        if !due {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("Failed to create image from frame data")?;
        let format = image::ImageFormat::from_path(&self.path)?;

        replace_atomically(&self.path, |temp| Ok(img.save_with_format(temp, format)?))?;
        replace_atomically(&caption_path(&self.path), |temp| {
            Ok(std::fs::write(temp, caption(overlay))?)
        })?;
        Ok(())
    }
}

/// Sidecar path holding the overlay text, e.g. `live.png.txt`.
fn caption_path(image_path: &Path) -> PathBuf {
    let mut name = image_path.file_name().unwrap_or_default().to_os_string();
    name.push(".txt");
    image_path.with_file_name(name)
}

fn caption(overlay: &Overlay) -> String {
    match overlay {
        Overlay::Faces(boxes) => boxes.iter().map(|b| format!("{}\n", b.label)).collect(),
        Overlay::Countdown { message, .. } => format!("{message}\n"),
    }
}

fn replace_atomically(
    path: &Path,
    write: impl FnOnce(&Path) -> Result<(), Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file_name = path
        .file_name()
        .ok_or("snapshot path has no file name")?
        .to_string_lossy();
    let temp_path = path.with_file_name(format!(".{file_name}.part"));
    write(&temp_path)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}
