//! Rotation angles and the rotation-safe area.
//!
//! The render engine draws the source into a square "safe area" before
//! cropping. The side of that square is the diagonal of the square bounding
//! the source, so the image fits for every angle:
//!
//! ```text
//! safe_area = 2 * (max(w, h) / 2 * sqrt(2))
//! ```

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2};

/// A rotation in degrees. Any finite value is accepted, including
/// negative angles and angles beyond 360.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RotationAngle(f64);

impl RotationAngle {
    /// No rotation.
    pub const ZERO: RotationAngle = RotationAngle(0.0);

    /// Create an angle from degrees. Non-finite input is treated as 0.
    pub fn from_degrees(degrees: f64) -> Self {
        if degrees.is_finite() {
            Self(degrees)
        } else {
            Self::ZERO
        }
    }

    /// The angle in degrees, as given.
    pub fn degrees(self) -> f64 {
        self.0
    }

    /// The angle in radians (`degrees * PI / 180`).
    pub fn radians(self) -> f64 {
        (self.0 * PI) / 180.0
    }

    /// The angle mapped into `[0, 360)`.
    pub fn normalized_degrees(self) -> f64 {
        let n = self.0.rem_euclid(360.0);
        // rem_euclid can return 360.0 for tiny negative inputs
        if n >= 360.0 {
            0.0
        } else {
            n
        }
    }

    /// Number of clockwise quarter turns if the angle is a multiple of 90.
    pub fn quarter_turns(self) -> Option<u32> {
        let n = self.normalized_degrees();
        if n % 90.0 == 0.0 {
            Some((n / 90.0) as u32)
        } else {
            None
        }
    }

    /// Sine and cosine of the angle, exact at multiples of 90 degrees.
    pub fn sin_cos(self) -> (f64, f64) {
        match self.quarter_turns() {
            Some(0) => (0.0, 1.0),
            Some(1) => (1.0, 0.0),
            Some(2) => (0.0, -1.0),
            Some(_) => (-1.0, 0.0),
            None => self.radians().sin_cos(),
        }
    }
}

impl From<f64> for RotationAngle {
    fn from(degrees: f64) -> Self {
        Self::from_degrees(degrees)
    }
}

/// Side length of the square that contains the source at any rotation.
pub fn safe_area(width: u32, height: u32) -> f64 {
    let max_size = width.max(height) as f64;
    2.0 * ((max_size / 2.0) * SQRT_2)
}

/// Integer side of the intermediate surface, rounded up so the safe area
/// is never truncated.
///
/// A 100x100 source yields 142 (safe area ~141.42).
pub fn safe_area_side(width: u32, height: u32) -> u64 {
    safe_area(width, height).ceil() as u64
}

/// Exact bounding box of a `width` x `height` rectangle rotated by `angle`.
///
/// ```text
/// new_w = |w*cos| + |h*sin|
/// new_h = |w*sin| + |h*cos|
/// ```
pub fn rotated_bounds(width: u32, height: u32, angle: RotationAngle) -> (f64, f64) {
    let (sin, cos) = angle.sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());

    let w = width as f64;
    let h = height as f64;

    (w * cos + h * sin, w * sin + h * cos)
}
