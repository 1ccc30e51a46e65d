//! Encoding of rendered crops.
//!
//! This module provides:
//! - PNG encoding of RGBA surfaces
//! - The two output collaborators: a named file or a base64 data URL
//!
//! The two output paths are mutually exclusive: a request for one type
//! never produces the other.

mod output;
mod png;

pub use output::{
    encode_output, to_data_url, CropOutput, CroppedFile, OutputType, OUTPUT_FILE_NAME,
    OUTPUT_MIME_TYPE,
};
pub use png::{encode_png, EncodeError};
