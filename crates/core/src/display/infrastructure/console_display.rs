use crate::display::domain::frame_display::FrameDisplay;
use crate::display::domain::overlay::Overlay;
use crate::presence::domain::presence_timer::PresenceState;
use crate::shared::frame::Frame;

/// Reports presence through the `log` crate instead of a window.
///
/// Only changes are logged: a switch between present and absent, and each
/// new countdown value, so a steady scene does not flood the terminal.
pub struct ConsoleDisplay {
    last_state: Option<PresenceState>,
    last_countdown: Option<u64>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self {
            last_state: None,
            last_countdown: None,
        }
    }

    /// The line to log for this overlay, if anything changed.
    fn line_for(&mut self, overlay: &Overlay) -> Option<String> {
        let state = overlay.state();
        let changed = self.last_state != Some(state);
        self.last_state = Some(state);

        match overlay {
            Overlay::Faces(boxes) => {
                self.last_countdown = None;
                changed.then(|| format!("Face detected ({} in view)", boxes.len()))
            }
            Overlay::Countdown {
                seconds_left,
                message,
            } => {
                let fresh = self.last_countdown != Some(*seconds_left);
                self.last_countdown = Some(*seconds_left);
                (changed || fresh).then(|| message.clone())
            }
        }
    }
}

impl Default for ConsoleDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDisplay for ConsoleDisplay {
    fn present(&mut self, _frame: &Frame, overlay: &Overlay) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(line) = self.line_for(overlay) {
            log::info!("{line}");
        }
        Ok(())
    }
}
