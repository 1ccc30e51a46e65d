//! Zoom bounds and the initial crop geometry for a freshly loaded image.
//!
//! Given the container size and the media size, the crop frame is sized to
//! the smaller container dimension and the minimum zoom is the one at which
//! the frame exactly fits inside the image along its constraining axis:
//!
//! ```text
//! crop_size = min(container_w, container_h)
//! scale_x   = crop_size / media_w
//! scale_y   = crop_size / aspect / media_h
//! min_zoom  = max(scale_x, scale_y)
//! max_zoom  = min_zoom * scale_factor
//! ```

use serde::{Deserialize, Serialize};

/// Natural size of the loaded source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub width: u32,
    pub height: u32,
}

impl MediaDescriptor {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check if the media has zero area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Size of the display container hosting the crop frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Check if the viewport can host a crop frame.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Inclusive range of allowed zoom values. `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self { min: 1.0, max: 3.0 }
    }
}

impl ZoomBounds {
    /// Bounds starting at `min` and allowing `scale_factor` times more zoom.
    ///
    /// A `scale_factor` below 1 is treated as 1 so the range never inverts.
    pub fn from_min(min: f64, scale_factor: f64) -> Self {
        Self {
            min,
            max: min * scale_factor.max(1.0),
        }
    }

    /// Clamp a zoom value into the bounds. NaN clamps to `min`.
    pub fn clamp(&self, zoom: f64) -> f64 {
        // f64::max ignores NaN, which sends NaN to min
        zoom.max(self.min).min(self.max)
    }

    /// Check if a zoom value is inside the bounds.
    pub fn contains(&self, zoom: f64) -> bool {
        zoom >= self.min && zoom <= self.max
    }

    /// Increase `current` by `step`, stopping at `max`.
    pub fn step_up(&self, current: f64, step: f64) -> f64 {
        let next = current + step;
        if next >= self.max {
            return self.max;
        }
        self.clamp(next)
    }

    /// Decrease `current` by `step`, stopping at `min`.
    pub fn step_down(&self, current: f64, step: f64) -> f64 {
        let next = current - step;
        if next <= self.min {
            return self.min;
        }
        self.clamp(next)
    }
}

/// Zoom state derived when an image or the configuration changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialGeometry {
    /// Starting zoom; equal to `bounds.min`.
    pub zoom: f64,
    /// Allowed zoom range.
    pub bounds: ZoomBounds,
    /// Width of the crop frame in display pixels.
    pub crop_size: f64,
}

/// Derive the initial zoom, zoom bounds and crop frame size.
///
/// Returns `None` when the inputs cannot produce a usable frame: empty
/// media, an unusable viewport or a non-positive aspect ratio.
pub fn derive_initial_geometry(
    media: MediaDescriptor,
    viewport: Viewport,
    aspect: f64,
    scale_factor: f64,
) -> Option<InitialGeometry> {
    if media.is_empty() || !viewport.is_usable() || !(aspect.is_finite() && aspect > 0.0) {
        return None;
    }

    let crop_size = viewport.width.min(viewport.height);

    let scale_x = crop_size / media.width as f64;
    let scale_y = crop_size / aspect / media.height as f64;

    let zoom = if scale_x >= scale_y { scale_x } else { scale_y };
    let bounds = ZoomBounds::from_min(zoom, scale_factor);

    log::debug!(
        "Initial geometry for {}x{} media in {}x{} viewport: zoom={:.4} bounds=[{:.4}, {:.4}] crop_size={}",
        media.width,
        media.height,
        viewport.width,
        viewport.height,
        zoom,
        bounds.min,
        bounds.max,
        crop_size
    );

    Some(InitialGeometry {
        zoom,
        bounds,
        crop_size,
    })
}
