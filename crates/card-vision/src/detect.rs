use crate::{Point, Quad};
use image::{imageops, RgbaImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use tracing::debug;

/// Canny hysteresis thresholds tuned for a card against a contrasting mat.
const CANNY_LOW: f32 = 60.0;
const CANNY_HIGH: f32 = 160.0;

/// Blur sigma applied before edge detection to suppress print texture.
const BLUR_SIGMA: f32 = 1.4;

/// Polygon simplification tolerance as a fraction of contour perimeter.
const APPROX_EPSILON: f64 = 0.02;

/// Frames smaller than this cannot hold a usable card boundary.
const MIN_FRAME_DIM: u32 = 20;

/// Find the largest 4-sided outline in the frame, the presumed card edge.
///
/// Grayscale, blur, Canny, then walk the outermost contours: each is
/// simplified against its own perimeter, and only simplifications with
/// exactly four vertices stay in the running. The largest such quad by
/// enclosed area wins. Returns `None` when nothing card-like is present.
pub fn detect_card_quad(frame: &RgbaImage) -> Option<Quad> {
    if frame.width() < MIN_FRAME_DIM || frame.height() < MIN_FRAME_DIM {
        return None;
    }

    let gray = imageops::grayscale(frame);
    let blurred = gaussian_blur_f32(&gray, BLUR_SIGMA);
    let edges = canny(&blurred, CANNY_LOW, CANNY_HIGH);

    let contours: Vec<Contour<i32>> = find_contours(&edges);
    debug!("Found {} contours", contours.len());

    let mut best: Option<(Quad, f32)> = None;
    for contour in &contours {
        // Outermost borders only; holes and nested outlines are card art
        if !matches!(contour.border_type, BorderType::Outer) || contour.parent.is_some() {
            continue;
        }
        if contour.points.len() < 4 {
            continue;
        }

        let perimeter = arc_length(&contour.points, true);
        let simplified = approximate_polygon_dp(&contour.points, APPROX_EPSILON * perimeter, true);
        if simplified.len() != 4 {
            continue;
        }

        let corners = [
            Point::new(simplified[0].x as f32, simplified[0].y as f32),
            Point::new(simplified[1].x as f32, simplified[1].y as f32),
            Point::new(simplified[2].x as f32, simplified[2].y as f32),
            Point::new(simplified[3].x as f32, simplified[3].y as f32),
        ];
        let quad = Quad { corners };
        let area = quad_area(&quad);
        if best.as_ref().map_or(true, |(_, largest)| area > *largest) {
            best = Some((quad, area));
        }
    }

    match &best {
        Some((_, area)) => debug!("Selected card boundary with area {:.0}", area),
        None => debug!("No 4-sided contour found"),
    }
    best.map(|(quad, _)| quad)
}

/// Shoelace area of a quad, independent of winding direction.
fn quad_area(quad: &Quad) -> f32 {
    let c = &quad.corners;
    let mut doubled = 0.0f32;
    for i in 0..4 {
        let j = (i + 1) % 4;
        doubled += c[i].x * c[j].y - c[j].x * c[i].y;
    }
    (doubled / 2.0).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn dark_frame(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([8, 8, 8, 255]))
    }

    #[test]
    fn test_detects_bright_rectangle() {
        let mut frame = dark_frame(200, 200);
        for y in 60..140 {
            for x in 40..160 {
                frame.put_pixel(x, y, Rgba([230, 230, 230, 255]));
            }
        }

        let quad = detect_card_quad(&frame).unwrap();
        // Every detected corner sits near one of the true rectangle corners
        let truth = [
            (40.0, 60.0),
            (160.0, 60.0),
            (160.0, 140.0),
            (40.0, 140.0),
        ];
        for corner in quad.corners {
            let close = truth
                .iter()
                .any(|&(tx, ty)| (corner.x - tx).abs() <= 6.0 && (corner.y - ty).abs() <= 6.0);
            assert!(close, "corner {:?} not near any true corner", corner);
        }
    }

    #[test]
    fn test_blank_frame_has_no_quad() {
        assert!(detect_card_quad(&dark_frame(200, 200)).is_none());
    }

    #[test]
    fn test_triangle_is_rejected() {
        let mut frame = dark_frame(200, 200);
        // Filled right triangle: three straight sides, no fourth
        for y in 40u32..160 {
            let span = y - 40;
            for x in 40..(40 + span).min(199) {
                frame.put_pixel(x, y, Rgba([230, 230, 230, 255]));
            }
        }
        assert!(detect_card_quad(&frame).is_none());
    }

    #[test]
    fn test_largest_quad_wins() {
        let mut frame = dark_frame(300, 200);
        // Small square
        for y in 20..50 {
            for x in 20..50 {
                frame.put_pixel(x, y, Rgba([230, 230, 230, 255]));
            }
        }
        // Larger rectangle
        for y in 30..170 {
            for x in 120..280 {
                frame.put_pixel(x, y, Rgba([230, 230, 230, 255]));
            }
        }

        let quad = detect_card_quad(&frame).unwrap();
        let min_x = quad
            .corners
            .iter()
            .map(|c| c.x)
            .fold(f32::INFINITY, f32::min);
        assert!(min_x > 100.0, "expected the larger rectangle, got {:?}", quad);
    }

    #[test]
    fn test_tiny_frame_is_skipped() {
        assert!(detect_card_quad(&dark_frame(10, 10)).is_none());
    }
}
