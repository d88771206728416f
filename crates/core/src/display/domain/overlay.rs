use crate::presence::domain::presence_timer::PresenceState;
use crate::shared::constants::{BOX_COLOR, BOX_THICKNESS, FACE_LABEL};
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// A bounding box plus the label drawn above it.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxAnnotation {
    pub region: Region,
    pub label: String,
}

/// What a display should show on top of one frame.
///
/// A frame either carries face boxes or a single countdown message, never
/// both.
#[derive(Clone, Debug, PartialEq)]
pub enum Overlay {
    Faces(Vec<BoxAnnotation>),
    Countdown { seconds_left: u64, message: String },
}

impl Overlay {
    pub fn state(&self) -> PresenceState {
        match self {
            Overlay::Faces(_) => PresenceState::Present,
            Overlay::Countdown { .. } => PresenceState::Absent,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Overlay::Faces(_) => None,
            Overlay::Countdown { message, .. } => Some(message),
        }
    }
}

pub fn countdown_message(seconds_left: u64) -> String {
    format!("No face detected. Locking in {seconds_left}s")
}

/// Builds overlays and burns face boxes into frame pixels.
#[derive(Clone, Debug)]
pub struct Annotator {
    color: [u8; 3],
    thickness: i32,
}

impl Annotator {
    pub fn new(color: [u8; 3], thickness: i32) -> Self {
        Self {
            color,
            thickness: thickness.max(1),
        }
    }

    pub fn faces(&self, frame: &mut Frame, regions: Vec<Region>) -> Overlay {
        for region in &regions {
            self.draw_box(frame, region);
        }
        Overlay::Faces(
            regions
                .into_iter()
                .map(|region| BoxAnnotation {
                    region,
                    label: FACE_LABEL.to_string(),
                })
                .collect(),
        )
    }

    pub fn countdown(&self, seconds_left: u64) -> Overlay {
        Overlay::Countdown {
            seconds_left,
            message: countdown_message(seconds_left),
        }
    }

    /// Draws a hollow rectangle, clipped to the frame.
    fn draw_box(&self, frame: &mut Frame, region: &Region) {
        let fw = frame.width() as i32;
        let fh = frame.height() as i32;
        let x0 = region.x.max(0);
        let y0 = region.y.max(0);
        let x1 = (region.x + region.width).min(fw);
        let y1 = (region.y + region.height).min(fh);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let t = self.thickness;
        let mut pixels = frame.as_ndarray_mut();
        for y in y0..y1 {
            for x in x0..x1 {
                let on_edge = x < x0 + t || x >= x1 - t || y < y0 + t || y >= y1 - t;
                if on_edge {
                    for (c, &v) in self.color.iter().enumerate() {
                        pixels[[y as usize, x as usize, c]] = v;
                    }
                }
            }
        }
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(BOX_COLOR, BOX_THICKNESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(x: i32, y: i32, w: i32, h: i32) -> Region {
        Region {
            x,
            y,
            width: w,
            height: h,
            confidence: 0.9,
        }
    }

    fn pixel(frame: &Frame, x: usize, y: usize) -> [u8; 3] {
        let arr = frame.as_ndarray();
        [arr[[y, x, 0]], arr[[y, x, 1]], arr[[y, x, 2]]]
    }

    #[test]
    fn test_faces_overlay_labels_each_region() {
        let mut frame = Frame::blank(20, 20, 0);
        let overlay = Annotator::default().faces(&mut frame, vec![region(1, 1, 5, 5), region(10, 10, 5, 5)]);

        match &overlay {
            Overlay::Faces(boxes) => {
                assert_eq!(boxes.len(), 2);
                assert!(boxes.iter().all(|b| b.label == "Face Detected"));
            }
            other => panic!("expected faces, got {other:?}"),
        }
        assert_eq!(overlay.state(), PresenceState::Present);
        assert!(overlay.message().is_none());
    }

    #[test]
    fn test_box_edges_are_drawn_and_interior_untouched() {
        let mut frame = Frame::blank(20, 20, 0);
        Annotator::new([0, 255, 0], 1).faces(&mut frame, vec![region(2, 2, 10, 10)]);

        assert_eq!(pixel(&frame, 2, 2), [0, 255, 0]);
        assert_eq!(pixel(&frame, 11, 6), [0, 255, 0]);
        assert_eq!(pixel(&frame, 6, 11), [0, 255, 0]);
        assert_eq!(pixel(&frame, 6, 6), [0, 0, 0]);
        assert_eq!(pixel(&frame, 12, 12), [0, 0, 0]);
    }

    #[test]
    fn test_box_outside_frame_is_clipped() {
        let mut frame = Frame::blank(10, 10, 0);
        Annotator::new([255, 0, 0], 1).faces(&mut frame, vec![region(-5, -5, 8, 8)]);
        // right and bottom edges of the clipped box land at x=2 / y=2
        assert_eq!(pixel(&frame, 2, 0), [255, 0, 0]);
        assert_eq!(pixel(&frame, 0, 2), [255, 0, 0]);
        assert_eq!(pixel(&frame, 5, 5), [0, 0, 0]);
    }

    #[test]
    fn test_empty_region_draws_nothing() {
        let mut frame = Frame::blank(10, 10, 0);
        Annotator::default().faces(&mut frame, vec![region(4, 4, 0, 0)]);
        assert!(frame.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_countdown_overlay_has_single_message() {
        let overlay = Annotator::default().countdown(7);
        assert_eq!(overlay.state(), PresenceState::Absent);
        assert_eq!(overlay.message(), Some("No face detected. Locking in 7s"));
    }
}
