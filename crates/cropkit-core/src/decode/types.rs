//! Core types for image loading and decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image loading and decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The bytes are not in a recognized or supported image format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// A `data:` URL could not be parsed.
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// The reference points at a remote resource the host must fetch.
    #[error("Remote image must be fetched by the host: {0}")]
    RemoteSource(String),

    /// A cross-origin image refused pixel readback.
    #[error("Cross-origin image cannot be read back: {0}")]
    CrossOriginDenied(String),

    /// The decoded image has zero area.
    #[error("Decoded image is empty")]
    EmptyImage,
}

/// Where the source image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// A URL: remote (`http(s)://`), same-origin path or `data:` URL.
    Url(String),
    /// Raw file bytes.
    Bytes(Vec<u8>),
}

impl ImageReference {
    /// Check if this is a `data:` URL.
    pub fn is_data_url(&self) -> bool {
        match self {
            ImageReference::Url(url) => has_data_scheme(url),
            ImageReference::Bytes(_) => false,
        }
    }

    /// Check if decoding requires the host to fetch the image first.
    pub fn is_remote(&self) -> bool {
        matches!(self, ImageReference::Url(url) if !has_data_scheme(url))
    }

    /// Short description for log messages. Never includes payload data.
    pub fn describe(&self) -> String {
        match self {
            ImageReference::Url(url) if has_data_scheme(url) => {
                let header = url.split(',').next().unwrap_or("data:");
                format!("{} ({} chars)", header, url.len())
            }
            ImageReference::Url(url) => url.split('?').next().unwrap_or(url).to_string(),
            ImageReference::Bytes(bytes) => format!("{} bytes", bytes.len()),
        }
    }
}

impl From<String> for ImageReference {
    fn from(url: String) -> Self {
        ImageReference::Url(url)
    }
}

impl From<&str> for ImageReference {
    fn from(url: &str) -> Self {
        ImageReference::Url(url.to_string())
    }
}

impl From<Vec<u8>> for ImageReference {
    fn from(bytes: Vec<u8>) -> Self {
        ImageReference::Bytes(bytes)
    }
}

pub(crate) fn has_data_scheme(url: &str) -> bool {
    url.get(..5)
        .map(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .unwrap_or(false)
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}
