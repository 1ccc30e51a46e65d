//! Crop rectangles and the display-to-source mapping.
//!
//! The crop frame is fixed in the middle of the container; the user pans
//! and zooms the image underneath it. Mapping the frame back to source
//! pixels follows the usual crop-widget rules: sizes are rounded to whole
//! pixels, snapped to the target aspect ratio along the constraining axis,
//! and the origin is clamped so the frame stays on the image.

use serde::{Deserialize, Serialize};

use super::rotation::{rotated_bounds, RotationAngle};
use super::round_half_up;
use super::zoom::MediaDescriptor;

/// Axis-aligned crop region in source pixels.
///
/// The origin is signed: on a rotated image the bounding box extends past
/// the unrotated source, so a valid crop may start left of or above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Check if the rectangle has zero area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check `0 <= x`, `0 <= y`, `x + width <= w`, `y + height <= h`.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x >= 0 && self.y >= 0 && self.right() <= width as i64 && self.bottom() <= height as i64
    }

    /// Shrink and move the rectangle so it stays inside the bounding box of
    /// `media` rotated by `rotation`, which is centred on the source centre.
    ///
    /// The size is clamped first (minimum 1x1), then the origin. Without
    /// rotation this is the source itself.
    pub fn clamp_to_rotated(&self, media: MediaDescriptor, rotation: RotationAngle) -> CropRect {
        fit_to_rotated(
            media,
            rotation,
            self.x as f64,
            self.y as f64,
            self.width as f64,
            self.height as f64,
        )
    }
}

/// The crop frame in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropFrame {
    pub width: f64,
    pub height: f64,
}

impl CropFrame {
    /// Frame `crop_size` wide with the given width/height ratio.
    pub fn from_crop_size(crop_size: f64, aspect: f64) -> Self {
        Self {
            width: crop_size,
            height: crop_size / aspect,
        }
    }
}

/// Display-space translation of the image relative to the frame centre.
///
/// Positive `x` moves the image right, which moves the crop left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pan {
    pub x: f64,
    pub y: f64,
}

impl Pan {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Clamp `value` into `[-limit, limit]`, sending NaN to 0.
fn clamp_symmetric(value: f64, limit: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.max(-limit).min(limit)
}

/// Restrict panning so the frame never leaves the (rotated) image.
pub fn restrict_pan(
    pan: Pan,
    media: MediaDescriptor,
    frame: CropFrame,
    zoom: f64,
    rotation: RotationAngle,
) -> Pan {
    let (bbox_w, bbox_h) = rotated_bounds(media.width, media.height, rotation);

    let max_x = ((bbox_w * zoom - frame.width) / 2.0).max(0.0);
    let max_y = ((bbox_h * zoom - frame.height) / 2.0).max(0.0);

    Pan {
        x: clamp_symmetric(pan.x, max_x),
        y: clamp_symmetric(pan.y, max_y),
    }
}

/// Clamp a rounded origin to `[min, max]`, centring when the span is too
/// small to hold the crop.
fn clamp_origin(origin: f64, min: f64, max: f64, centred: f64) -> i32 {
    if max < min {
        return centred as i32;
    }
    origin.max(min).min(max) as i32
}

/// Clamp a whole-pixel rectangle into the rotated bounding box of `media`.
fn fit_to_rotated(
    media: MediaDescriptor,
    rotation: RotationAngle,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> CropRect {
    let (bbox_w, bbox_h) = rotated_bounds(media.width, media.height, rotation);
    let width = width.clamp(1.0, round_half_up(bbox_w).max(1.0));
    let height = height.clamp(1.0, round_half_up(bbox_h).max(1.0));

    let media_w = media.width as f64;
    let media_h = media.height as f64;

    let min_x = round_half_up((media_w - bbox_w) / 2.0);
    let min_y = round_half_up((media_h - bbox_h) / 2.0);
    let max_x = round_half_up((media_w + bbox_w) / 2.0) - width;
    let max_y = round_half_up((media_h + bbox_h) / 2.0) - height;

    CropRect {
        x: clamp_origin(x, min_x, max_x, round_half_up((media_w - width) / 2.0)),
        y: clamp_origin(y, min_y, max_y, round_half_up((media_h - height) / 2.0)),
        width: width as u32,
        height: height as u32,
    }
}

/// Map the display-space crop frame to a rectangle in source pixels.
///
/// Returns `None` for empty media, a non-positive zoom or aspect, or a
/// degenerate frame.
pub fn crop_area_pixels(
    media: MediaDescriptor,
    frame: CropFrame,
    pan: Pan,
    zoom: f64,
    rotation: RotationAngle,
    aspect: f64,
) -> Option<CropRect> {
    if media.is_empty()
        || !(zoom.is_finite() && zoom > 0.0)
        || !(aspect.is_finite() && aspect > 0.0)
        || !(frame.width > 0.0 && frame.height > 0.0)
    {
        return None;
    }

    let (bbox_w, bbox_h) = rotated_bounds(media.width, media.height, rotation);

    // Frame size in source pixels, limited to the image
    let width = round_half_up((frame.width / zoom).min(bbox_w));
    let height = round_half_up((frame.height / zoom).min(bbox_h));

    // Snap to the target aspect along the constraining axis
    let (width, height) = if bbox_w >= bbox_h * aspect {
        (round_half_up(height * aspect), height)
    } else {
        (width, round_half_up(width / aspect))
    };

    // Frame centre in source space; the rotated image is centred on the source centre
    let centre_x = media.width as f64 / 2.0 - pan.x / zoom;
    let centre_y = media.height as f64 / 2.0 - pan.y / zoom;

    let x = round_half_up(centre_x - width / 2.0);
    let y = round_half_up(centre_y - height / 2.0);

    let rect = fit_to_rotated(media, rotation, x, y, width, height);

    log::debug!(
        "Crop frame {}x{} at zoom {:.4} pan ({:.1}, {:.1}) -> {:?}",
        frame.width,
        frame.height,
        zoom,
        pan.x,
        pan.y,
        rect
    );

    Some(rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(width: u32, height: u32) -> MediaDescriptor {
        MediaDescriptor::new(width, height)
    }

    #[test]
    fn test_fits_within() {
        assert!(CropRect::new(0, 0, 100, 100).fits_within(100, 100));
        assert!(CropRect::new(25, 25, 50, 50).fits_within(100, 100));
        assert!(!CropRect::new(60, 0, 50, 50).fits_within(100, 100));
        assert!(!CropRect::new(-1, 0, 50, 50).fits_within(100, 100));
    }

    #[test]
    fn test_clamp_to_rotated_moves_origin() {
        let rect = CropRect::new(80, -5, 50, 50).clamp_to_rotated(media(100, 100), RotationAngle::ZERO);
        assert_eq!(rect, CropRect::new(50, 0, 50, 50));
        assert!(rect.fits_within(100, 100));
    }

    #[test]
    fn test_clamp_to_rotated_shrinks_oversized() {
        let rect = CropRect::new(0, 0, 500, 0).clamp_to_rotated(media(100, 80), RotationAngle::ZERO);
        assert_eq!(rect.width, 100);
        assert_eq!(rect.height, 1);
        assert!(rect.fits_within(100, 80));
    }

    #[test]
    fn test_clamp_to_rotated_keeps_rotated_corner() {
        // At 45 degrees the bounding box spans -21..121 around a 100px source
        let rotation = RotationAngle::from_degrees(45.0);
        let rect = CropRect::new(21, 21, 100, 100);
        assert_eq!(rect.clamp_to_rotated(media(100, 100), rotation), rect);

        let past = CropRect::new(-40, 30, 100, 100).clamp_to_rotated(media(100, 100), rotation);
        assert_eq!(past, CropRect::new(-21, 21, 100, 100));
    }

    #[test]
    fn test_clamp_to_rotated_quarter_turn_swaps_axes() {
        let rotation = RotationAngle::from_degrees(90.0);
        // 200x100 source turned upright: bbox is 100 wide, 200 tall, centred on (100, 50)
        let rect = CropRect::new(0, -80, 100, 100).clamp_to_rotated(media(200, 100), rotation);
        assert_eq!(rect, CropRect::new(50, -50, 100, 100));
    }

    #[test]
    fn test_initial_frame_is_centred() {
        // 800x600 at zoom 400/600: the 400px frame covers 600 source pixels
        let zoom = 400.0 / 600.0;
        let rect = crop_area_pixels(
            media(800, 600),
            CropFrame::from_crop_size(400.0, 1.0),
            Pan::default(),
            zoom,
            RotationAngle::ZERO,
            1.0,
        )
        .unwrap();

        assert_eq!(rect, CropRect::new(100, 0, 600, 600));
    }

    #[test]
    fn test_zoomed_frame_is_smaller() {
        let rect = crop_area_pixels(
            media(800, 600),
            CropFrame::from_crop_size(400.0, 1.0),
            Pan::default(),
            2.0,
            RotationAngle::ZERO,
            1.0,
        )
        .unwrap();

        assert_eq!(rect, CropRect::new(300, 200, 200, 200));
    }

    #[test]
    fn test_pan_moves_crop_opposite() {
        // Moving the image right by 100 display px at zoom 2 shifts the crop 50 px left
        let rect = crop_area_pixels(
            media(800, 600),
            CropFrame::from_crop_size(400.0, 1.0),
            Pan::new(100.0, 0.0),
            2.0,
            RotationAngle::ZERO,
            1.0,
        )
        .unwrap();

        assert_eq!(rect.x, 250);
        assert_eq!(rect.y, 200);
    }

    #[test]
    fn test_excessive_pan_is_clamped() {
        let rect = crop_area_pixels(
            media(800, 600),
            CropFrame::from_crop_size(400.0, 1.0),
            Pan::new(10_000.0, -10_000.0),
            2.0,
            RotationAngle::ZERO,
            1.0,
        )
        .unwrap();

        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 400);
        assert!(rect.fits_within(800, 600));
    }

    #[test]
    fn test_aspect_snapping() {
        // 16:9 frame on a landscape image is height constrained
        let rect = crop_area_pixels(
            media(1920, 1080),
            CropFrame::from_crop_size(400.0, 16.0 / 9.0),
            Pan::default(),
            400.0 / 1920.0,
            RotationAngle::ZERO,
            16.0 / 9.0,
        )
        .unwrap();

        assert_eq!(rect.height, 1080);
        assert_eq!(rect.width, 1920);
        assert!(rect.fits_within(1920, 1080));
    }

    #[test]
    fn test_rotated_crop_may_start_negative() {
        // A 45 degree square has a bounding box of ~141px around a 100px source
        let rect = crop_area_pixels(
            media(100, 100),
            CropFrame::from_crop_size(141.0, 1.0),
            Pan::new(-1000.0, -1000.0),
            1.0,
            RotationAngle::from_degrees(45.0),
            1.0,
        )
        .unwrap();

        assert!(rect.x <= 0, "x was {}", rect.x);
        assert!(rect.right() <= 121);
    }

    #[test]
    fn test_invalid_inputs_yield_none() {
        let frame = CropFrame::from_crop_size(400.0, 1.0);
        assert!(crop_area_pixels(media(0, 10), frame, Pan::default(), 1.0, RotationAngle::ZERO, 1.0).is_none());
        assert!(crop_area_pixels(media(10, 10), frame, Pan::default(), 0.0, RotationAngle::ZERO, 1.0).is_none());
        assert!(crop_area_pixels(media(10, 10), frame, Pan::default(), 1.0, RotationAngle::ZERO, -1.0).is_none());
    }

    #[test]
    fn test_restrict_pan_limits() {
        // Image 800 wide at zoom 1 under a 400 frame can move 200 either way
        let pan = restrict_pan(
            Pan::new(500.0, 500.0),
            media(800, 400),
            CropFrame::from_crop_size(400.0, 1.0),
            1.0,
            RotationAngle::ZERO,
        );
        assert_eq!(pan, Pan::new(200.0, 0.0));
    }

    #[test]
    fn test_restrict_pan_nan() {
        let pan = restrict_pan(
            Pan::new(f64::NAN, 10.0),
            media(800, 800),
            CropFrame::from_crop_size(400.0, 1.0),
            1.0,
            RotationAngle::ZERO,
        );
        assert_eq!(pan, Pan::new(0.0, 10.0));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: without rotation the mapped crop always satisfies the bounds invariant.
        #[test]
        fn prop_unrotated_crop_fits_media(
            (mw, mh) in (1u32..=4000, 1u32..=4000),
            crop_size in 10.0f64..=1000.0,
            aspect in 0.25f64..=4.0,
            zoom_factor in 1.0f64..=5.0,
            (px, py) in (-5000.0f64..=5000.0, -5000.0f64..=5000.0),
        ) {
            let frame = CropFrame::from_crop_size(crop_size, aspect);
            let min_zoom = (crop_size / mw as f64).max(frame.height / mh as f64);
            let zoom = min_zoom * zoom_factor;

            let rect = crop_area_pixels(
                MediaDescriptor::new(mw, mh),
                frame,
                Pan::new(px, py),
                zoom,
                RotationAngle::ZERO,
                aspect,
            )
            .unwrap();

            prop_assert!(rect.width >= 1 && rect.height >= 1);
            prop_assert!(rect.fits_within(mw, mh), "{:?} outside {}x{}", rect, mw, mh);
        }

        /// Property: restricted pan is idempotent.
        #[test]
        fn prop_restrict_pan_idempotent(
            (px, py) in (-5000.0f64..=5000.0, -5000.0f64..=5000.0),
            zoom in 0.1f64..=10.0,
            degrees in 0.0f64..360.0,
        ) {
            let media = MediaDescriptor::new(640, 480);
            let frame = CropFrame::from_crop_size(300.0, 1.5);
            let rotation = RotationAngle::from_degrees(degrees);

            let once = restrict_pan(Pan::new(px, py), media, frame, zoom, rotation);
            let twice = restrict_pan(once, media, frame, zoom, rotation);
            prop_assert_eq!(once, twice);
        }
    }
}
