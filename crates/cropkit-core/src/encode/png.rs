//! PNG encoding for crop output.
//!
//! PNG keeps the transparent pixels a rotated or out-of-bounds crop
//! produces, which is why it is the only output container.

use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use thiserror::Error;

use crate::surface::{PixelSurface, BYTES_PER_PIXEL};

/// Errors that can occur during encoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode an RGBA surface to PNG bytes.
///
/// # Errors
///
/// Returns an error if the surface has zero area, its buffer does not
/// match its dimensions, or the encoder fails.
pub fn encode_png(surface: &PixelSurface) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (surface.width, surface.height);

    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * BYTES_PER_PIXEL;
    if surface.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: surface.pixels.len(),
        });
    }

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(&surface.pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: any well-formed surface encodes to a PNG of the same size.
        #[test]
        fn prop_valid_surface_encodes(
            (width, height) in (1u32..=32, 1u32..=32),
            seed in any::<u8>(),
        ) {
            let pixels: Vec<u8> = (0..(width * height * 4) as usize)
                .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
                .collect();
            let surface = PixelSurface::new(width, height, pixels);

            let png = encode_png(&surface).unwrap();
            let decoded = image::load_from_memory(&png).unwrap();
            prop_assert_eq!(decoded.width(), width);
            prop_assert_eq!(decoded.height(), height);
        }

        /// Property: mismatched buffers are always rejected.
        #[test]
        fn prop_mismatched_buffer_rejected(
            (width, height) in (1u32..=16, 1u32..=16),
            delta in 1usize..=8,
        ) {
            let len = (width * height * 4) as usize + delta;
            let surface = PixelSurface { width, height, pixels: vec![0; len] };
            let is_invalid = matches!(encode_png(&surface), Err(EncodeError::InvalidPixelData { .. }));
            prop_assert!(is_invalid);
        }
    }
}
