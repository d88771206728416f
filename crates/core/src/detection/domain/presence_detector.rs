use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for face detection.
///
/// Returns every face found in the frame; an empty vector means nobody is
/// in view. Implementations may keep state across frames, hence `&mut self`.
pub trait PresenceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
