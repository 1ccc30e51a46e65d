//! `data:` URL parsing.
//!
//! File inputs reach the session as `data:<mime>;base64,<payload>` strings,
//! the same form produced for base64 output.

use base64::{engine::general_purpose, Engine as _};

use super::decoder::decode_image;
use super::types::has_data_scheme;
use super::DecodeError;
use crate::surface::PixelSurface;

/// A parsed `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Media type, e.g. `image/png`. Empty when the URL omits it.
    pub mime_type: String,
    /// Decoded payload.
    pub bytes: Vec<u8>,
}

/// Parse a base64 `data:` URL.
///
/// # Errors
///
/// Returns `DecodeError::InvalidDataUrl` when the scheme, the `;base64`
/// marker or the payload is malformed.
pub fn parse_data_url(url: &str) -> Result<DataUrl, DecodeError> {
    if !has_data_scheme(url) {
        return Err(DecodeError::InvalidDataUrl("missing data: scheme".to_string()));
    }

    let (header, payload) = url[5..]
        .split_once(',')
        .ok_or_else(|| DecodeError::InvalidDataUrl("missing ',' separator".to_string()))?;

    let mut params = header.split(';');
    let mime_type = params.next().unwrap_or_default().trim().to_ascii_lowercase();

    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(DecodeError::InvalidDataUrl(
            "only base64 payloads are supported".to_string(),
        ));
    }

    // Tolerate line breaks some encoders insert
    let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| DecodeError::InvalidDataUrl(e.to_string()))?;

    Ok(DataUrl { mime_type, bytes })
}

/// Parse a `data:` URL and decode its image payload.
pub fn decode_data_url(url: &str) -> Result<PixelSurface, DecodeError> {
    let data = parse_data_url(url)?;
    decode_image(&data.bytes)
}
