//! The crop/rotate render engine.
//!
//! Rendering is a two-stage pipeline that keeps rotation and cropping
//! decoupled:
//!
//! 1. The source is drawn, rotated about its centre, into a square
//!    intermediate surface whose side is the rotation-safe area. The square
//!    contains the rotated source for every angle, so nothing is clipped.
//! 2. The intermediate surface is pasted into an output surface of exactly
//!    the crop size, shifted by an integer offset. No further resampling
//!    happens in this step.
//!
//! # Paste Offset
//!
//! ```text
//! dx = round(-safe_area/2 + width*0.5  - crop.x)
//! dy = round(-safe_area/2 + height*0.5 - crop.y)
//! ```
//!
//! Halves round towards +infinity. Output pixels that no intermediate pixel
//! covers stay transparent, so a crop reaching past the source is not an
//! error.
//!
//! The pipeline always runs in full, including for a rotation of 0.

mod rotation;

pub use rotation::InterpolationFilter;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{round_half_up, safe_area, safe_area_side, CropRect, RotationAngle};
use crate::surface::{PixelSurface, SurfaceError, BYTES_PER_PIXEL};
use rotation::{draw_rotated, Placement};

/// Errors that can occur while rendering a crop.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// The source surface has zero area
    #[error("Source surface has zero area ({width}x{height})")]
    EmptySource { width: u32, height: u32 },

    /// Source pixel data length doesn't match its dimensions
    #[error("Invalid source pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// The crop rectangle has zero area
    #[error("Crop rectangle has zero area ({width}x{height})")]
    EmptyCrop { width: u32, height: u32 },

    /// A drawing surface could not be allocated
    #[error("Failed to acquire a {width}x{height} drawing surface: {reason}")]
    ContextAcquisition {
        width: u64,
        height: u64,
        reason: String,
    },
}

/// Size ceilings for drawing surfaces.
///
/// The defaults match the limits common to browser canvas implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceLimits {
    /// Maximum width or height in pixels.
    pub max_side: u64,
    /// Maximum width * height in pixels.
    pub max_area: u64,
}

impl Default for SurfaceLimits {
    fn default() -> Self {
        Self {
            max_side: 32_767,
            max_area: 268_435_456,
        }
    }
}

impl SurfaceLimits {
    /// Allocate a blank surface if `width` x `height` is within the limits.
    fn acquire(&self, width: u64, height: u64) -> Result<PixelSurface, RenderError> {
        let refuse = |reason: String| RenderError::ContextAcquisition {
            width,
            height,
            reason,
        };

        if width > self.max_side || height > self.max_side {
            return Err(refuse(format!("side exceeds {} px", self.max_side)));
        }
        if width.saturating_mul(height) > self.max_area {
            return Err(refuse(format!("area exceeds {} px", self.max_area)));
        }

        // Both sides fit max_side, which callers keep within u32
        let w = u32::try_from(width).map_err(|e| refuse(e.to_string()))?;
        let h = u32::try_from(height).map_err(|e| refuse(e.to_string()))?;
        PixelSurface::blank(w, h).map_err(|e: SurfaceError| refuse(e.to_string()))
    }
}

/// Options for [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Interpolation used when drawing the rotated source.
    pub filter: InterpolationFilter,
    /// Surface size ceilings.
    pub limits: SurfaceLimits,
}

/// Render the `crop` region of `source`, rotated by `rotation`.
///
/// The output is always exactly `crop.width` x `crop.height`.
///
/// # Errors
///
/// - [`RenderError::EmptySource`] if the source has zero area
/// - [`RenderError::InvalidPixelData`] if the source buffer is malformed
/// - [`RenderError::EmptyCrop`] if the crop has zero area
/// - [`RenderError::ContextAcquisition`] if the intermediate or output
///   surface exceeds the limits or cannot be allocated
pub fn render(
    source: &PixelSurface,
    crop: &CropRect,
    rotation: RotationAngle,
    options: &RenderOptions,
) -> Result<PixelSurface, RenderError> {
    if source.width == 0 || source.height == 0 {
        return Err(RenderError::EmptySource {
            width: source.width,
            height: source.height,
        });
    }

    let expected = source.width as usize * source.height as usize * BYTES_PER_PIXEL;
    if source.pixels.len() != expected {
        return Err(RenderError::InvalidPixelData {
            expected,
            actual: source.pixels.len(),
        });
    }

    if crop.is_empty() {
        return Err(RenderError::EmptyCrop {
            width: crop.width,
            height: crop.height,
        });
    }

    let src_w = source.width as f64;
    let src_h = source.height as f64;

    // Steps 1-3: square intermediate large enough for any rotation
    let area = safe_area(source.width, source.height);
    let side = safe_area_side(source.width, source.height);
    let mut intermediate = options.limits.acquire(side, side)?;

    // Step 4: rotate about the centre and draw the source centred
    let placement = Placement {
        pivot: area / 2.0,
        offset_x: area / 2.0 - src_w * 0.5,
        offset_y: area / 2.0 - src_h * 0.5,
        angle: rotation,
    };
    draw_rotated(&mut intermediate, source, &placement, options.filter);

    // Steps 6-7: paste into an output of exactly the crop size
    let mut output = options
        .limits
        .acquire(crop.width as u64, crop.height as u64)?;

    let dx = round_half_up(-area / 2.0 + src_w * 0.5 - crop.x as f64) as i64;
    let dy = round_half_up(-area / 2.0 + src_h * 0.5 - crop.y as f64) as i64;

    log::debug!(
        "Render {}x{} source: rotation={}deg safe_area={:.2} ({}px) crop={:?} paste=({}, {})",
        source.width,
        source.height,
        rotation.degrees(),
        area,
        side,
        crop,
        dx,
        dy
    );

    output.put_surface(&intermediate, dx, dy);

    Ok(output)
}

/// Crop without rotation using default options.
pub fn render_crop(source: &PixelSurface, crop: &CropRect) -> Result<PixelSurface, RenderError> {
    render(source, crop, RotationAngle::ZERO, &RenderOptions::default())
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=40, 1u32..=40)
    }

    fn crop_strategy() -> impl Strategy<Value = CropRect> {
        (-20i32..=40, -20i32..=40, 1u32..=50, 1u32..=50)
            .prop_map(|(x, y, w, h)| CropRect::new(x, y, w, h))
    }

    /// Create a test surface with unique pixel values based on position.
    fn create_test_surface(width: u32, height: u32) -> PixelSurface {
        let mut surface = PixelSurface::blank(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                surface.set_pixel(x, y, [x as u8, y as u8, 7, 255]);
            }
        }
        surface
    }

    proptest! {
        /// Property: output size always equals the crop size.
        #[test]
        fn prop_output_matches_crop_size(
            (width, height) in dimensions_strategy(),
            crop in crop_strategy(),
            degrees in -720.0f64..=720.0,
        ) {
            let source = create_test_surface(width, height);
            let output = render(&source, &crop, RotationAngle::from_degrees(degrees), &RenderOptions::default()).unwrap();

            prop_assert_eq!(output.width, crop.width);
            prop_assert_eq!(output.height, crop.height);
            prop_assert_eq!(output.pixels.len(), (crop.width * crop.height * 4) as usize);
        }

        /// Property: zero rotation is a pure crop with either filter.
        #[test]
        fn prop_identity_rotation_is_crop(
            (width, height) in dimensions_strategy(),
            crop in crop_strategy(),
            filter in prop_oneof![Just(InterpolationFilter::Nearest), Just(InterpolationFilter::Bilinear)],
        ) {
            let source = create_test_surface(width, height);
            let options = RenderOptions { filter, ..Default::default() };
            let output = render(&source, &crop, RotationAngle::ZERO, &options).unwrap();

            for y in 0..crop.height {
                for x in 0..crop.width {
                    let sx = crop.x as i64 + x as i64;
                    let sy = crop.y as i64 + y as i64;
                    let expected = if sx >= 0 && sy >= 0 {
                        source.pixel(sx as u32, sy as u32).unwrap_or([0, 0, 0, 0])
                    } else {
                        [0, 0, 0, 0]
                    };
                    prop_assert_eq!(output.pixel(x, y), Some(expected), "at ({}, {})", x, y);
                }
            }
        }

        /// Property: rotation never loses coverage of the source.
        #[test]
        fn prop_rotation_preserves_coverage(
            size in 8u32..=32,
            degrees in 0.0f64..360.0,
        ) {
            let source = PixelSurface::solid(size, size, [255, 255, 255, 255]);
            let side = safe_area_side(size, size) as u32;
            let area = safe_area(size, size);
            // Crop the whole safe area, expressed in source coordinates
            let origin = round_half_up(size as f64 * 0.5 - area / 2.0) as i32;
            let crop = CropRect::new(origin, origin, side, side);

            let output = render(&source, &crop, RotationAngle::from_degrees(degrees), &RenderOptions::default()).unwrap();

            let coverage: f64 = output.pixels.chunks(4).map(|p| p[3] as f64 / 255.0).sum();
            let expected = (size * size) as f64;
            prop_assert!(
                (coverage - expected).abs() <= expected * 0.05 + 2.0,
                "coverage {} vs {}",
                coverage,
                expected
            );
        }
    }
}
