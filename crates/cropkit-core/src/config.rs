//! Session configuration.
//!
//! Field names are camelCase so a JS options object deserializes directly.
//! Every field has a default, so `{}` is a valid configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::OutputType;
use crate::render::{InterpolationFilter, RenderOptions, SurfaceLimits};

/// Errors raised by [`CropConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Aspect ratio must be a positive finite number
    #[error("Invalid aspect ratio: {0} (must be finite and > 0)")]
    InvalidAspect(f64),

    /// Scale factor must be at least 1
    #[error("Invalid scale factor: {0} (must be finite and >= 1)")]
    InvalidScaleFactor(f64),

    /// Zoom step must be a positive finite number
    #[error("Invalid zoom step: {0} (must be finite and > 0)")]
    InvalidZoomStep(f64),

    /// Slider step must be a positive finite number
    #[error("Invalid slider step: {0} (must be finite and > 0)")]
    InvalidSliderStep(f64),
}

/// Options for a crop session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropConfig {
    /// Crop width / height.
    pub aspect: f64,
    /// Maximum zoom as a multiple of the minimum zoom.
    pub scale_factor: f64,
    /// Delta applied by zoom in / zoom out.
    pub zoom_step: f64,
    /// Granularity reported for slider widgets.
    pub slider_step: f64,
    /// Which output collaborator a commit uses.
    pub output_type: OutputType,
    /// Initial rotation in degrees.
    pub rotation: f64,
    /// Interpolation used by the render engine.
    pub filter: InterpolationFilter,
    /// Drawing surface ceilings.
    pub limits: SurfaceLimits,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            aspect: 1.0,
            scale_factor: 5.0,
            zoom_step: 0.5,
            slider_step: 0.1,
            output_type: OutputType::File,
            rotation: 0.0,
            filter: InterpolationFilter::Bilinear,
            limits: SurfaceLimits::default(),
        }
    }
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

impl CropConfig {
    /// Check that every numeric field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !positive(self.aspect) {
            return Err(ConfigError::InvalidAspect(self.aspect));
        }
        if !(self.scale_factor.is_finite() && self.scale_factor >= 1.0) {
            return Err(ConfigError::InvalidScaleFactor(self.scale_factor));
        }
        if !positive(self.zoom_step) {
            return Err(ConfigError::InvalidZoomStep(self.zoom_step));
        }
        if !positive(self.slider_step) {
            return Err(ConfigError::InvalidSliderStep(self.slider_step));
        }
        Ok(())
    }

    /// Render options derived from this configuration.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            filter: self.filter,
            limits: self.limits,
        }
    }
}
