use ndarray::{ArrayView3, ArrayViewMut3};

/// One captured camera frame: tightly packed RGB24 pixels, row-major.
///
/// Capture backends convert to RGB before constructing a `Frame`, so the
/// detector, annotator and displays never deal with native pixel formats.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

pub const CHANNELS: usize = 3;

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    /// A black frame, handy for fakes and placeholder previews.
    pub fn blank(width: u32, height: u32, index: usize) -> Self {
        let len = (width as usize) * (height as usize) * CHANNELS;
        Self::new(vec![0u8; len], width, height, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sequence number assigned by the frame source, starting at 0.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        let shape = self.shape();
        ArrayViewMut3::from_shape(shape, &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Expands to RGBA with opaque alpha, the layout GUI image handles expect.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() / CHANNELS * 4);
        for px in self.data.chunks_exact(CHANNELS) {
            out.extend_from_slice(px);
            out.push(u8::MAX);
        }
        out
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, CHANNELS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_frame_is_black() {
        let frame = Frame::blank(4, 2, 7);
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.index(), 7);
        assert_eq!(frame.data().len(), 4 * 2 * 3);
        assert!(frame.data().iter().all(|&b| b == 0));
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 0);
    }

    #[test]
    fn test_ndarray_is_height_width_channels() {
        let frame = Frame::blank(4, 2, 0);
        assert_eq!(frame.as_ndarray().shape(), &[2, 4, 3]);
    }

    #[test]
    fn test_ndarray_mut_writes_through() {
        let mut frame = Frame::blank(2, 2, 0);
        frame.as_ndarray_mut()[[1, 0, 1]] = 200;
        // row 1, col 0, green channel
        assert_eq!(frame.data()[6 + 1], 200);
    }

    #[test]
    fn test_to_rgba_appends_opaque_alpha() {
        let frame = Frame::new(vec![10, 20, 30, 40, 50, 60], 2, 1, 0);
        assert_eq!(frame.to_rgba(), vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }
}
