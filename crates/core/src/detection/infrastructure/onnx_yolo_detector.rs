/// YOLO face detector using ONNX Runtime via `ort`.
///
/// Letterboxes the frame to the model resolution, runs inference, and
/// reduces the raw candidates with NMS. Presence only needs boxes, so the
/// landmark columns of the pose model are ignored.
use std::path::Path;

use crate::detection::domain::presence_detector::PresenceDetector;
use crate::detection::infrastructure::execution_provider::load_session;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Fallback input resolution when the model input shape is dynamic.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.45;

/// Columns before the optional keypoints: cx, cy, w, h, conf.
const BOX_COLUMNS: usize = 5;

pub struct OnnxYoloDetector {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxYoloDetector {
    /// Load a YOLO ONNX model.
    ///
    /// The input resolution comes from the model's NCHW input shape.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = load_session(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| match input.dtype() {
                ort::value::ValueType::Tensor { ref shape, .. }
                    if shape.len() >= 4 && shape[2] > 0 =>
                {
                    Some(shape[2] as u32)
                }
                _ => None,
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        log::debug!(
            "Loaded face model {} (input {input_size}x{input_size})",
            model_path.display()
        );

        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }
}

impl PresenceDetector for OnnxYoloDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err("cannot run detection on an empty frame".into());
        }

        let (input_tensor, letterbox) = letterbox(frame, self.input_size);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("YOLO model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;

        let candidates = parse_candidates(data, &shape, self.confidence, &letterbox)?;
        let kept = nms(candidates, NMS_IOU_THRESH);

        Ok(kept
            .into_iter()
            .map(|d| {
                Region::from_corners(
                    d.x1,
                    d.y1,
                    d.x2,
                    d.y2,
                    d.confidence,
                    frame.width(),
                    frame.height(),
                )
            })
            .filter(|r| !r.is_empty())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq)]
struct Letterbox {
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

impl Letterbox {
    fn to_frame(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.pad_x as f64) / self.scale,
            (y - self.pad_y as f64) / self.scale,
        )
    }
}

/// Letterbox-resize a frame into a `target_size` square NCHW tensor.
fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<f32>, Letterbox) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    // 114 gray padding, YOLO convention
    let gray = 114.0f32 / 255.0;
    let side = target_size as usize;
    let mut tensor = ndarray::Array4::<f32>::from_elem((1, 3, side, side), gray);

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (
        tensor,
        Letterbox {
            scale,
            pad_x,
            pad_y,
        },
    )
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct RawDetection {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    confidence: f64,
}

/// Decodes the `[1, features, detections]` or `[1, detections, features]`
/// output into frame-space candidates above `min_confidence`.
fn parse_candidates(
    data: &[f32],
    shape: &[usize],
    min_confidence: f64,
    letterbox: &Letterbox,
) -> Result<Vec<RawDetection>, Box<dyn std::error::Error>> {
    if shape.len() != 3 {
        return Err(format!("Unexpected YOLO output shape: {shape:?}").into());
    }
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < BOX_COLUMNS || data.len() < num_dets * num_feats {
        return Err(format!("YOLO output too small for shape {shape:?}").into());
    }

    let at = |det: usize, feat: usize| -> f64 {
        if transposed {
            data[feat * num_dets + det] as f64
        } else {
            data[det * num_feats + feat] as f64
        }
    };

    let mut out = Vec::new();
    for i in 0..num_dets {
        let confidence = at(i, 4);
        if confidence < min_confidence {
            continue;
        }
        let (cx, cy, w, h) = (at(i, 0), at(i, 1), at(i, 2), at(i, 3));
        let (x1, y1) = letterbox.to_frame(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.to_frame(cx + w / 2.0, cy + h / 2.0);
        out.push(RawDetection {
            x1,
            y1,
            x2,
            y2,
            confidence,
        });
    }
    Ok(out)
}

/// Greedy NMS: highest confidence first, drop anything overlapping a keeper.
fn nms(mut dets: Vec<RawDetection>, iou_thresh: f64) -> Vec<RawDetection> {
    dets.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<RawDetection> = Vec::new();
    for det in dets {
        if keep.iter().all(|k| bbox_iou(k, &det) <= iou_thresh) {
            keep.push(det);
        }
    }
    keep
}

fn bbox_iou(a: &RawDetection, b: &RawDetection) -> f64 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    inter / (area_a + area_b - inter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const IDENTITY: Letterbox = Letterbox {
        scale: 1.0,
        pad_x: 0,
        pad_y: 0,
    };

    fn det(x1: f64, y1: f64, x2: f64, y2: f64, confidence: f64) -> RawDetection {
        RawDetection {
            x1,
            y1,
            x2,
            y2,
            confidence,
        }
    }

    #[test]
    fn test_letterbox_wide_frame_pads_vertically() {
        // scale = min(640/200, 640/100) = 3.2 -> 640x320, pad_y = 160
        let frame = Frame::new(vec![128u8; 200 * 100 * 3], 200, 100, 0);
        let (tensor, lb) = letterbox(&frame, 640);

        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
        assert_relative_eq!(lb.scale, 3.2, epsilon = 1e-9);
        assert_eq!((lb.pad_x, lb.pad_y), (0, 160));
    }

    #[test]
    fn test_letterbox_normalizes_and_fills_padding() {
        let frame = Frame::new(vec![255u8; 100 * 50 * 3], 100, 50, 0);
        let (tensor, lb) = letterbox(&frame, 640);

        let y = lb.pad_y as usize + 1;
        assert!((tensor[[0, 0, y, 1]] - 1.0).abs() < 0.01);
        assert!((tensor[[0, 0, 0, 0]] - 114.0 / 255.0).abs() < 0.01);
    }

    #[test]
    fn test_letterbox_maps_back_to_frame() {
        let lb = Letterbox {
            scale: 2.0,
            pad_x: 0,
            pad_y: 80,
        };
        assert_eq!(lb.to_frame(200.0, 280.0), (100.0, 100.0));
    }

    #[test]
    fn test_parse_row_major_output() {
        // six candidates x 5 features: [cx, cy, w, h, conf]
        let mut data = vec![0.0f32; 6 * 5];
        data[..5].copy_from_slice(&[50.0, 50.0, 20.0, 20.0, 0.9]);
        data[5..10].copy_from_slice(&[10.0, 10.0, 4.0, 4.0, 0.1]);
        let dets = parse_candidates(&data, &[1, 6, 5], 0.5, &IDENTITY).unwrap();
        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].x1, 40.0);
        assert_relative_eq!(dets[0].y2, 60.0);
    }

    #[test]
    fn test_parse_transposed_output() {
        // 5 features x 6 candidates, one column per candidate
        #[rustfmt::skip]
        let data = [
            50.0, 10.0, 90.0, 0.0, 0.0, 0.0,
            50.0, 10.0, 90.0, 0.0, 0.0, 0.0,
            20.0,  4.0, 10.0, 0.0, 0.0, 0.0,
            20.0,  4.0, 10.0, 0.0, 0.0, 0.0,
             0.9,  0.2,  0.7, 0.0, 0.0, 0.0,
        ];
        let dets = parse_candidates(&data, &[1, 5, 6], 0.5, &IDENTITY).unwrap();
        assert_eq!(dets.len(), 2);
        assert_relative_eq!(dets[1].x1, 85.0);
    }

    #[test]
    fn test_parse_rejects_unexpected_rank() {
        assert!(parse_candidates(&[0.0; 5], &[5], 0.5, &IDENTITY).is_err());
    }

    #[test]
    fn test_nms_suppresses_overlapping() {
        let kept = nms(
            vec![
                det(2.0, 2.0, 102.0, 102.0, 0.5),
                det(0.0, 0.0, 100.0, 100.0, 0.9),
            ],
            0.3,
        );
        assert_eq!(kept.len(), 1);
        assert_relative_eq!(kept[0].confidence, 0.9);
    }

    #[test]
    fn test_nms_keeps_separate_faces() {
        let kept = nms(
            vec![
                det(0.0, 0.0, 50.0, 50.0, 0.9),
                det(200.0, 200.0, 250.0, 250.0, 0.8),
            ],
            0.3,
        );
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_nms_empty_input() {
        assert!(nms(Vec::new(), 0.3).is_empty());
    }
}
