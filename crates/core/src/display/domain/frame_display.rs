use crate::display::domain::overlay::Overlay;
use crate::shared::frame::Frame;

/// Sink for annotated frames (a window, the console, a file...).
///
/// `present` failures are reported but never stop the monitor.
pub trait FrameDisplay: Send {
    fn present(&mut self, frame: &Frame, overlay: &Overlay) -> Result<(), Box<dyn std::error::Error>>;

    /// Releases the window or file handle. Default: no-op.
    fn close(&mut self) {}
}

/// Discards everything. Used for headless runs.
pub struct NullDisplay;

impl FrameDisplay for NullDisplay {
    fn present(&mut self, _frame: &Frame, _overlay: &Overlay) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

/// Fans one frame out to several displays.
///
/// Every display is attempted; the first error is returned afterwards.
pub struct MultiDisplay {
    displays: Vec<Box<dyn FrameDisplay>>,
}

impl MultiDisplay {
    pub fn new(displays: Vec<Box<dyn FrameDisplay>>) -> Self {
        Self { displays }
    }
}

impl FrameDisplay for MultiDisplay {
    fn present(&mut self, frame: &Frame, overlay: &Overlay) -> Result<(), Box<dyn std::error::Error>> {
        let mut first_err = None;
        for display in &mut self.displays {
            if let Err(e) = display.present(frame, overlay) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn close(&mut self) {
        for display in &mut self.displays {
            display.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingDisplay {
        presented: Arc<AtomicUsize>,
        closed: Arc<AtomicUsize>,
        fail: bool,
    }

    impl FrameDisplay for CountingDisplay {
        fn present(&mut self, _frame: &Frame, _overlay: &Overlay) -> Result<(), Box<dyn std::error::Error>> {
            self.presented.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err("window gone".into())
            } else {
                Ok(())
            }
        }

        fn close(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_multi_display_presents_to_all_even_after_error() {
        let presented = Arc::new(AtomicUsize::new(0));
        let closed = Arc::new(AtomicUsize::new(0));
        let make = |fail| -> Box<dyn FrameDisplay> {
            Box::new(CountingDisplay {
                presented: presented.clone(),
                closed: closed.clone(),
                fail,
            })
        };
        let mut multi = MultiDisplay::new(vec![make(true), make(false)]);
        let overlay = Overlay::Faces(vec![]);

        assert!(multi.present(&Frame::blank(2, 2, 0), &overlay).is_err());
        assert_eq!(presented.load(Ordering::SeqCst), 2);

        multi.close();
        assert_eq!(closed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_null_display_accepts_frames() {
        let overlay = Overlay::Faces(vec![]);
        assert!(NullDisplay.present(&Frame::blank(2, 2, 0), &overlay).is_ok());
    }
}
