//! Card scanning: find the card in a frame, straighten it, read its text.
//!
//! The pipeline degrades stage by stage. No detectable boundary means the
//! raw frame is used; a boundary the rectifier rejects falls back the same
//! way; OCR that finds nothing yields an empty candidate the user can fill
//! in by hand.

mod detect;
mod ocr;
mod recognize;
mod rectify;

pub use detect::detect_card_quad;
pub use ocr::{OcrEngine, TesseractOcr};
pub use recognize::{recognize_text, GameGuess, Recognition};
pub use rectify::{order_corners, rectify, RectifyError};

use card_capture::{capture_frame, CaptureError, VideoSource};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A point in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub(crate) fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Four corners of a detected card boundary, in no particular order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub corners: [Point; 4],
}

/// What a scan produced: the image to show (warped card or raw frame),
/// and how it got there.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub image: RgbaImage,
    /// True when the image is the rectified card rather than the raw frame.
    pub used_warp: bool,
    /// The detected boundary, if any, even when rectification failed.
    pub quad: Option<Quad>,
}

/// Grab a frame and straighten the card in it, falling back to the raw
/// frame when no usable boundary is found. `NotReady` is the only error
/// that escapes; everything downstream degrades instead.
pub fn capture_and_warp(source: &mut dyn VideoSource) -> Result<ScanOutcome, CaptureError> {
    let frame = capture_frame(source)?;

    let Some(quad) = detect_card_quad(&frame) else {
        debug!("No card boundary found. Using raw frame.");
        return Ok(ScanOutcome {
            image: frame,
            used_warp: false,
            quad: None,
        });
    };

    match rectify(&frame, &quad) {
        Ok(warped) => Ok(ScanOutcome {
            image: warped,
            used_warp: true,
            quad: Some(quad),
        }),
        Err(e) => {
            warn!("Rectification rejected detected quad: {}. Using raw frame.", e);
            Ok(ScanOutcome {
                image: frame,
                used_warp: false,
                quad: Some(quad),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_capture::StillSource;
    use image::Rgba;

    #[test]
    fn test_not_ready_source_propagates() {
        let mut source = StillSource::empty();
        assert!(matches!(
            capture_and_warp(&mut source),
            Err(CaptureError::NotReady)
        ));
    }

    #[test]
    fn test_featureless_frame_falls_back_to_raw() {
        let frame = RgbaImage::from_pixel(120, 90, Rgba([10, 10, 10, 255]));
        let mut source = StillSource::from_image(frame);
        let outcome = capture_and_warp(&mut source).unwrap();
        assert!(!outcome.used_warp);
        assert!(outcome.quad.is_none());
        assert_eq!((outcome.image.width(), outcome.image.height()), (120, 90));
    }

    #[test]
    fn test_clean_rectangle_is_warped() {
        let mut frame = RgbaImage::from_pixel(200, 200, Rgba([8, 8, 8, 255]));
        for y in 60..140 {
            for x in 40..160 {
                frame.put_pixel(x, y, Rgba([230, 230, 230, 255]));
            }
        }
        let mut source = StillSource::from_image(frame);
        let outcome = capture_and_warp(&mut source).unwrap();
        assert!(outcome.used_warp);
        assert!(outcome.quad.is_some());
        // Output is card-sized, not frame-sized
        assert!(outcome.image.width() < 200);
        assert!(outcome.image.width() > outcome.image.height());
    }
}
