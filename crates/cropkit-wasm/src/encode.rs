//! Image encoding WASM bindings.
//!
//! - [`encode_png`] - Encode a surface to PNG bytes
//! - [`encode_base64`] - Encode a surface to a `data:image/png;base64,` URL

use crate::types::JsPixelSurface;
use cropkit_core::encode::{self, CropOutput, OutputType};
use wasm_bindgen::prelude::*;

/// Encode a surface to PNG bytes.
///
/// # Errors
///
/// Returns an error if the surface has zero area or a malformed buffer.
#[wasm_bindgen]
pub fn encode_png(surface: &JsPixelSurface) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(&surface.to_surface()).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode a surface to a base64 PNG data URL.
#[wasm_bindgen]
pub fn encode_base64(surface: &JsPixelSurface) -> Result<String, JsValue> {
    match encode::encode_output(&surface.to_surface(), OutputType::Base64) {
        Ok(CropOutput::Base64(url)) => Ok(url),
        Ok(CropOutput::File(_)) => Err(JsValue::from_str("Expected base64 output")),
        Err(e) => Err(JsValue::from_str(&e.to_string())),
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_encode_png_basic() {
        let surface = JsPixelSurface::new(10, 10, vec![128u8; 400]);
        let png = encode_png(&surface).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[wasm_bindgen_test]
    fn test_encode_png_invalid() {
        let surface = JsPixelSurface::new(10, 10, vec![128u8; 10]);
        assert!(encode_png(&surface).is_err());
    }

    #[wasm_bindgen_test]
    fn test_encode_base64_prefix() {
        let surface = JsPixelSurface::new(1, 1, vec![0, 0, 0, 255]);
        let url = encode_base64(&surface).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }
}
