//! WASM bindings for the crop/rotate render engine.

use crate::types::JsPixelSurface;
use cropkit_core::{render, CropRect, InterpolationFilter, RenderError, RenderOptions, RotationAngle};
use wasm_bindgen::prelude::*;

/// Render a crop of `surface`, rotated by `rotation` degrees.
///
/// The output is always exactly `width` x `height`. Regions of the crop
/// that the rotated source does not cover are transparent.
///
/// # Arguments
///
/// * `surface` - Source surface
/// * `x`, `y` - Crop origin in source pixels (may be negative)
/// * `width`, `height` - Crop size in source pixels
/// * `rotation` - Clockwise rotation in degrees
/// * `use_bilinear` - Bilinear interpolation, otherwise nearest neighbour
///
/// # Example (TypeScript)
///
/// ```typescript
/// const cropped = render_crop(source, 25, 25, 50, 50, 0, true);
/// ctx.putImageData(new ImageData(new Uint8ClampedArray(cropped.pixels()), 50, 50), 0, 0);
/// ```
#[wasm_bindgen]
pub fn render_crop(
    surface: &JsPixelSurface,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    rotation: f64,
    use_bilinear: bool,
) -> Result<JsPixelSurface, JsValue> {
    render_surface(surface, CropRect::new(x, y, width, height), rotation, use_bilinear)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn render_surface(
    surface: &JsPixelSurface,
    crop: CropRect,
    rotation: f64,
    use_bilinear: bool,
) -> Result<JsPixelSurface, RenderError> {
    let options = RenderOptions {
        filter: if use_bilinear {
            InterpolationFilter::Bilinear
        } else {
            InterpolationFilter::Nearest
        },
        ..RenderOptions::default()
    };

    let source = surface.to_surface();
    render(&source, &crop, RotationAngle::from_degrees(rotation), &options).map(JsPixelSurface::from_surface)
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_render_crop_binding() {
        let src = JsPixelSurface::new(4, 4, vec![255u8; 64]);
        let out = render_crop(&src, 1, 1, 2, 2, 0.0, true).unwrap();
        assert_eq!(out.width(), 2);
    }

    #[wasm_bindgen_test]
    fn test_render_crop_binding_error() {
        let src = JsPixelSurface::new(4, 4, vec![0u8; 10]);
        assert!(render_crop(&src, 0, 0, 2, 2, 0.0, true).is_err());
    }
}
