//! Crop geometry: rotation math, zoom bounds and crop rectangles.
//!
//! # Coordinate Systems
//!
//! - **Display space**: CSS pixels of the crop container. The crop frame,
//!   the pan offset and the viewport live here.
//! - **Source space**: pixels of the decoded image. [`CropRect`] lives here.
//!
//! Zoom is the number of display pixels per source pixel, so a frame of
//! `w` display pixels covers `w / zoom` source pixels.
//!
//! Rotation angles are in degrees, positive = clockwise on a y-down
//! surface. A rotated image keeps its centre at `(width/2, height/2)` in
//! source space, which is why a crop on a rotated image may start at a
//! negative origin.

mod crop;
mod rotation;
mod zoom;

pub use crop::{crop_area_pixels, restrict_pan, CropFrame, CropRect, Pan};
pub use rotation::{rotated_bounds, safe_area, safe_area_side, RotationAngle};
pub use zoom::{derive_initial_geometry, InitialGeometry, MediaDescriptor, Viewport, ZoomBounds};

/// Round to the nearest integer with halves rounded towards +infinity.
///
/// This matches how browser hosts round pixel offsets (`Math.round`),
/// unlike `f64::round` which rounds halves away from zero.
#[inline]
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up_positive() {
        assert_eq!(round_half_up(2.4), 2.0);
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.6), 3.0);
    }

    #[test]
    fn test_round_half_up_negative() {
        // -45.5 rounds to -45, not -46
        assert_eq!(round_half_up(-45.5), -45.0);
        assert_eq!(round_half_up(-45.71), -46.0);
        assert_eq!(round_half_up(-0.2), 0.0);
    }
}
