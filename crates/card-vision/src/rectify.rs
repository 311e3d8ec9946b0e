use crate::{Point, Quad};
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::Projection;
use thiserror::Error;
use tracing::debug;

/// Corner triples spanning less than this area (px^2) are collinear.
const MIN_CORNER_TRIANGLE_AREA: f32 = 1.0;

#[derive(Debug, Error)]
pub enum RectifyError {
    #[error("quadrilateral is degenerate and cannot be rectified")]
    DegenerateQuad,
}

/// Order a quad's corners as [top-left, top-right, bottom-right,
/// bottom-left]. Top-left has the smallest x+y sum, bottom-right the
/// largest; the other two split on y-x difference.
pub fn order_corners(quad: &Quad) -> [Point; 4] {
    let c = quad.corners;
    let mut tl = c[0];
    let mut br = c[0];
    let mut tr = c[0];
    let mut bl = c[0];
    for p in &c[1..] {
        if p.x + p.y < tl.x + tl.y {
            tl = *p;
        }
        if p.x + p.y > br.x + br.y {
            br = *p;
        }
        if p.y - p.x < tr.y - tr.x {
            tr = *p;
        }
        if p.y - p.x > bl.y - bl.x {
            bl = *p;
        }
    }
    [tl, tr, br, bl]
}

/// Warp the region inside `quad` to an upright rectangle sized by the
/// quad's longest opposite edges. Pixels are sampled bilinearly with
/// coordinates clamped to the frame, so samples past the border repeat
/// the edge instead of bleeding a fill color into the card.
pub fn rectify(frame: &RgbaImage, quad: &Quad) -> Result<RgbaImage, RectifyError> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(RectifyError::DegenerateQuad);
    }

    let [tl, tr, br, bl] = order_corners(quad);

    // Any near-collinear corner triple makes the homography unsolvable
    let triples = [[tl, tr, br], [tl, tr, bl], [tl, br, bl], [tr, br, bl]];
    if triples
        .iter()
        .any(|t| triangle_area(&t[0], &t[1], &t[2]) < MIN_CORNER_TRIANGLE_AREA)
    {
        return Err(RectifyError::DegenerateQuad);
    }

    let width = br.distance(&bl).max(tr.distance(&tl)).round() as u32;
    let height = tr.distance(&br).max(tl.distance(&bl)).round() as u32;
    if width == 0 || height == 0 {
        return Err(RectifyError::DegenerateQuad);
    }

    let dst = [
        (0.0, 0.0),
        (width as f32 - 1.0, 0.0),
        (width as f32 - 1.0, height as f32 - 1.0),
        (0.0, height as f32 - 1.0),
    ];
    let src = [(tl.x, tl.y), (tr.x, tr.y), (br.x, br.y), (bl.x, bl.y)];

    // Control points run output -> source, so each output pixel maps
    // straight to its sampling coordinate with no inversion step.
    let back =
        Projection::from_control_points(dst, src).ok_or(RectifyError::DegenerateQuad)?;

    let mut out = RgbaImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let (sx, sy) = back * (x as f32, y as f32);
            out.put_pixel(x, y, sample_bilinear_clamped(frame, sx, sy));
        }
    }
    debug!("Rectified quad to {}x{}", width, height);
    Ok(out)
}

fn triangle_area(a: &Point, b: &Point, c: &Point) -> f32 {
    ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs() / 2.0
}

/// Bilinear sample with edge replication: coordinates are clamped into
/// the frame before the 2x2 neighborhood is read.
fn sample_bilinear_clamped(frame: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let max_x = (frame.width() - 1) as f32;
    let max_y = (frame.height() - 1) as f32;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(frame.width() - 1);
    let y1 = (y0 + 1).min(frame.height() - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = frame.get_pixel(x0, y0);
    let p10 = frame.get_pixel(x1, y0);
    let p01 = frame.get_pixel(x0, y1);
    let p11 = frame.get_pixel(x1, y1);

    let mut out = [0u8; 4];
    for ch in 0..4 {
        let top = f32::from(p00.0[ch]) * (1.0 - fx) + f32::from(p10.0[ch]) * fx;
        let bottom = f32::from(p01.0[ch]) * (1.0 - fx) + f32::from(p11.0[ch]) * fx;
        out[ch] = (top * (1.0 - fy) + bottom * fy).round() as u8;
    }
    Rgba(out)
}
