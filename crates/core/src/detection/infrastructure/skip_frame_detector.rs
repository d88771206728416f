use crate::detection::domain::presence_detector::PresenceDetector;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Decorator that runs the inner detector on every Nth frame only.
///
/// Frames in between reuse the last result. Presence is coarse (seconds,
/// not frames), so stale boxes for a couple of frames do not change the
/// lock decision while cutting inference cost by `1/N`.
///
/// An inner failure is returned as-is and clears the cached result, so the
/// following skipped frames report nobody rather than a stale face.
pub struct SkipFrameDetector {
    inner: Box<dyn PresenceDetector>,
    detect_every: usize,
    frame_count: usize,
    last_regions: Vec<Region>,
}

impl SkipFrameDetector {
    pub fn new(inner: Box<dyn PresenceDetector>, detect_every: usize) -> Result<Self, &'static str> {
        if detect_every < 1 {
            return Err("detect_every must be >= 1");
        }
        Ok(Self {
            inner,
            detect_every,
            frame_count: 0,
            last_regions: Vec::new(),
        })
    }
}

impl PresenceDetector for SkipFrameDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let due = self.frame_count % self.detect_every == 0;
        self.frame_count += 1;

        if due {
            match self.inner.detect(frame) {
                Ok(regions) => self.last_regions = regions,
                Err(e) => {
                    self.last_regions.clear();
                    return Err(e);
                }
            }
        }
        Ok(self.last_regions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeDetector {
        results: Vec<Result<Vec<Region>, String>>,
        call_count: usize,
    }

    impl FakeDetector {
        fn new(results: Vec<Result<Vec<Region>, String>>) -> Self {
            Self {
                results,
                call_count: 0,
            }
        }
    }

    impl PresenceDetector for FakeDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            let result = self.results[self.call_count % self.results.len()].clone();
            self.call_count += 1;
            result.map_err(|e| e.into())
        }
    }

    fn frame(index: usize) -> Frame {
        Frame::blank(16, 16, index)
    }

    fn face(x: i32) -> Region {
        Region {
            x,
            y: 0,
            width: 8,
            height: 8,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_every_frame_delegates_each_time() {
        let inner = FakeDetector::new(vec![Ok(vec![face(1)]), Ok(vec![])]);
        let mut detector = SkipFrameDetector::new(Box::new(inner), 1).unwrap();

        assert_eq!(detector.detect(&frame(0)).unwrap().len(), 1);
        assert!(detector.detect(&frame(1)).unwrap().is_empty());
        assert_eq!(detector.detect(&frame(2)).unwrap().len(), 1);
    }

    #[test]
    fn test_skipped_frames_reuse_last_result() {
        let inner = FakeDetector::new(vec![Ok(vec![face(1)]), Ok(vec![])]);
        let mut detector = SkipFrameDetector::new(Box::new(inner), 3).unwrap();

        assert_eq!(detector.detect(&frame(0)).unwrap(), vec![face(1)]);
        assert_eq!(detector.detect(&frame(1)).unwrap(), vec![face(1)]);
        assert_eq!(detector.detect(&frame(2)).unwrap(), vec![face(1)]);
        // frame 3 runs the inner detector again, which now sees nobody
        assert!(detector.detect(&frame(3)).unwrap().is_empty());
    }

    #[test]
    fn test_inner_error_clears_cached_regions() {
        let inner = FakeDetector::new(vec![
            Ok(vec![face(1)]),
            Err("bad frame".to_string()),
        ]);
        let mut detector = SkipFrameDetector::new(Box::new(inner), 2).unwrap();

        detector.detect(&frame(0)).unwrap();
        detector.detect(&frame(1)).unwrap();
        assert!(detector.detect(&frame(2)).is_err());
        assert!(detector.detect(&frame(3)).unwrap().is_empty());
    }

    #[test]
    fn test_zero_interval_errors() {
        let inner = FakeDetector::new(vec![Ok(vec![])]);
        assert!(SkipFrameDetector::new(Box::new(inner), 0).is_err());
    }
}
