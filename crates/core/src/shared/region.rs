/// A detected face bounding box, in frame pixel coordinates.
///
/// Regions only live for the cycle that produced them.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub confidence: f64,
}

impl Region {
    /// Builds a region from corner coordinates, clamped to the frame.
    pub fn from_corners(
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        confidence: f64,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        let fw = frame_width as f64;
        let fh = frame_height as f64;
        let left = x1.clamp(0.0, fw);
        let top = y1.clamp(0.0, fh);
        let right = x2.clamp(0.0, fw);
        let bottom = y2.clamp(0.0, fh);
        Self {
            x: left.round() as i32,
            y: top.round() as i32,
            width: (right - left).max(0.0).round() as i32,
            height: (bottom - top).max(0.0).round() as i32,
            confidence,
        }
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn region(x: i32, y: i32, w: i32, h: i32) -> Region {
        Region {
            x,
            y,
            width: w,
            height: h,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_from_corners_inside_frame() {
        let r = Region::from_corners(10.0, 20.0, 110.0, 170.0, 0.8, 640, 480);
        assert_eq!((r.x, r.y, r.width, r.height), (10, 20, 100, 150));
        assert_relative_eq!(r.confidence, 0.8);
    }

    #[test]
    fn test_from_corners_clamps_to_frame() {
        let r = Region::from_corners(-30.0, -5.0, 700.0, 500.0, 0.5, 640, 480);
        assert_eq!((r.x, r.y, r.width, r.height), (0, 0, 640, 480));
    }

    #[test]
    fn test_from_corners_inverted_box_is_empty() {
        let r = Region::from_corners(100.0, 100.0, 50.0, 50.0, 0.5, 640, 480);
        assert!(r.is_empty());
    }

    #[rstest]
    #[case::square(region(0, 0, 10, 10), 100)]
    #[case::offset(region(5, 7, 3, 4), 12)]
    #[case::zero_width(region(0, 0, 0, 100), 0)]
    #[case::negative_height(region(0, 0, 20, -5), 0)]
    fn test_area(#[case] r: Region, #[case] expected: i64) {
        assert_eq!(r.area(), expected);
        assert_eq!(r.is_empty(), expected == 0);
    }
}
