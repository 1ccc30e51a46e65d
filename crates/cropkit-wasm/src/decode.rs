//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode PNG or JPEG bytes, applying EXIF orientation
//! - [`decode_data_url`] - Decode a `data:` URL as produced by `FileReader`
//!
//! # Example
//!
//! ```typescript
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const surface = decode_image(bytes);
//! console.log(`Decoded ${surface.width}x${surface.height}`);
//! ```

use crate::types::JsPixelSurface;
use cropkit_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an image from bytes into an RGBA surface.
///
/// # Errors
///
/// Returns an error if the format is not recognized or the data is corrupt.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsPixelSurface, JsValue> {
    decode::decode_image(bytes)
        .map(JsPixelSurface::from_surface)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Decode a base64 `data:` URL into an RGBA surface.
#[wasm_bindgen]
pub fn decode_data_url(url: &str) -> Result<JsPixelSurface, JsValue> {
    decode::decode_data_url(url)
        .map(JsPixelSurface::from_surface)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// EXIF orientation tag (1-8) of JPEG bytes; 1 when absent.
#[wasm_bindgen]
pub fn image_orientation(bytes: &[u8]) -> u8 {
    decode::get_orientation(bytes) as u8
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_decode_invalid_bytes() {
        assert!(decode_image(&[1, 2, 3]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_decode_data_url_roundtrip() {
        let surface = JsPixelSurface::new(2, 2, vec![200u8; 16]);
        let url = crate::encode::encode_base64(&surface).unwrap();
        let back = decode_data_url(&url).unwrap();
        assert_eq!(back.width(), 2);
        assert_eq!(back.pixels(), vec![200u8; 16]);
    }

    #[wasm_bindgen_test]
    fn test_decode_data_url_rejects_plain_text() {
        assert!(decode_data_url("data:text/plain,hello").is_err());
    }
}
