//! Rotated drawing into the safe-area surface.
//!
//! Drawing uses inverse mapping: for each destination pixel centre we undo
//! the rotation about the pivot, undo the draw offset, and sample the
//! source there. For a clockwise rotation by θ about pivot `p`:
//!
//! ```text
//! d     = dst_centre - p
//! src_x = ( d.x * cos(θ) + d.y * sin(θ)) + p - offset_x
//! src_y = (-d.x * sin(θ) + d.y * cos(θ)) + p - offset_y
//! ```
//!
//! Samples that fall outside the source are transparent.
//!
//! At multiples of 90 degrees the mapping only translates and swaps axes,
//! so those angles are sampled with nearest neighbour whatever filter was
//! requested. Source pixels are copied, never blended.

use serde::{Deserialize, Serialize};

use crate::geometry::RotationAngle;
use crate::surface::{PixelSurface, BYTES_PER_PIXEL};

/// Interpolation filter used when drawing the source into the safe area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationFilter {
    /// Nearest neighbour.
    Nearest,
    /// Bilinear with premultiplied alpha, like canvas image smoothing.
    /// Only used for angles that are not a multiple of 90 degrees.
    #[default]
    Bilinear,
}

/// Placement of the source inside the destination.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Placement {
    /// Rotation pivot (same on both axes; the safe area is square).
    pub pivot: f64,
    /// Top-left of the unrotated source in destination coordinates.
    pub offset_x: f64,
    pub offset_y: f64,
    pub angle: RotationAngle,
}

/// Draw `src` into `dst` rotated about the placement pivot.
///
/// Destination pixels that map outside the source are left untouched.
pub(crate) fn draw_rotated(
    dst: &mut PixelSurface,
    src: &PixelSurface,
    placement: &Placement,
    filter: InterpolationFilter,
) {
    let (sin, cos) = placement.angle.sin_cos();
    let pivot = placement.pivot;

    let filter = match placement.angle.quarter_turns() {
        Some(_) => InterpolationFilter::Nearest,
        None => filter,
    };

    let src_w = src.width as f64;
    let src_h = src.height as f64;

    for dst_y in 0..dst.height {
        let dy = dst_y as f64 + 0.5 - pivot;

        for dst_x in 0..dst.width {
            let dx = dst_x as f64 + 0.5 - pivot;

            let u = dx * cos + dy * sin + pivot - placement.offset_x;
            let v = -dx * sin + dy * cos + pivot - placement.offset_y;

            // Anything more than a pixel away cannot contribute
            if u < -1.0 || v < -1.0 || u > src_w + 1.0 || v > src_h + 1.0 {
                continue;
            }

            let sample = match filter {
                InterpolationFilter::Nearest => sample_nearest(src, u, v),
                InterpolationFilter::Bilinear => sample_bilinear(src, u, v),
            };

            if let Some(rgba) = sample {
                dst.set_pixel(dst_x, dst_y, rgba);
            }
        }
    }
}

/// Read a source pixel by signed coordinates; outside is transparent.
#[inline]
fn texel(src: &PixelSurface, x: i64, y: i64) -> [f64; 4] {
    if x < 0 || y < 0 || x >= src.width as i64 || y >= src.height as i64 {
        return [0.0; 4];
    }
    let idx = (y as usize * src.width as usize + x as usize) * BYTES_PER_PIXEL;
    [
        src.pixels[idx] as f64,
        src.pixels[idx + 1] as f64,
        src.pixels[idx + 2] as f64,
        src.pixels[idx + 3] as f64,
    ]
}

/// Nearest-neighbour sample at continuous coordinates (u, v).
fn sample_nearest(src: &PixelSurface, u: f64, v: f64) -> Option<[u8; 4]> {
    let x = u.floor();
    let y = v.floor();
    if x < 0.0 || y < 0.0 || x >= src.width as f64 || y >= src.height as f64 {
        return None;
    }
    src.pixel(x as u32, y as u32)
}

/// Bilinear sample at continuous coordinates (u, v).
///
/// Pixel centres sit at half-integers. Colour is interpolated with
/// premultiplied alpha so transparent neighbours do not darken edges.
fn sample_bilinear(src: &PixelSurface, u: f64, v: f64) -> Option<[u8; 4]> {
    let fx = u - 0.5;
    let fy = v - 0.5;

    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let taps = [
        (texel(src, x0, y0), (1.0 - tx) * (1.0 - ty)),
        (texel(src, x0 + 1, y0), tx * (1.0 - ty)),
        (texel(src, x0, y0 + 1), (1.0 - tx) * ty),
        (texel(src, x0 + 1, y0 + 1), tx * ty),
    ];

    let mut alpha = 0.0;
    let mut color = [0.0f64; 3];
    for (p, w) in taps.iter() {
        let aw = p[3] * w;
        alpha += aw;
        color[0] += p[0] * aw;
        color[1] += p[1] * aw;
        color[2] += p[2] * aw;
    }

    if alpha <= f64::EPSILON {
        return None;
    }

    Some([
        (color[0] / alpha).clamp(0.0, 255.0).round() as u8,
        (color[1] / alpha).clamp(0.0, 255.0).round() as u8,
        (color[2] / alpha).clamp(0.0, 255.0).round() as u8,
        alpha.clamp(0.0, 255.0).round() as u8,
    ])
}
