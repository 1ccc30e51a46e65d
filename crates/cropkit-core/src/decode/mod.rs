//! Image loading and decoding.
//!
//! Decoding is the collaborator that turns an [`ImageReference`] into a
//! [`PixelSurface`]. Bytes and `data:` URLs are decoded in-process; remote
//! URLs must be fetched by the host (in anonymous CORS mode, so pixels can
//! be read back) and handed over as bytes.

mod data_url;
mod decoder;
mod types;

pub use data_url::{decode_data_url, parse_data_url, DataUrl};
pub use decoder::{decode_image, get_orientation};
pub use types::{DecodeError, ImageReference, Orientation};

use crate::surface::PixelSurface;

/// Decode a reference that does not need the network.
///
/// # Errors
///
/// Returns `DecodeError::RemoteSource` for URLs other than `data:` URLs,
/// plus any error from decoding itself.
pub fn load_reference(reference: &ImageReference) -> Result<PixelSurface, DecodeError> {
    match reference {
        ImageReference::Bytes(bytes) => decode_image(bytes),
        ImageReference::Url(url) if reference.is_data_url() => decode_data_url(url),
        ImageReference::Url(_) => Err(DecodeError::RemoteSource(reference.describe())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_reference_is_rejected() {
        let reference = ImageReference::from("https://example.com/photo.jpg?sig=1");
        assert_eq!(
            load_reference(&reference),
            Err(DecodeError::RemoteSource("https://example.com/photo.jpg".to_string()))
        );
    }

    #[test]
    fn test_bytes_reference_decodes() {
        let reference = ImageReference::from(vec![0u8, 1, 2]);
        assert_eq!(load_reference(&reference), Err(DecodeError::InvalidFormat));
    }
}
