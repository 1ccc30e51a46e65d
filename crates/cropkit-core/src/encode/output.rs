//! Output collaborators: a PNG file or a base64 data URL.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use super::png::{encode_png, EncodeError};
use crate::surface::PixelSurface;

/// File name given to cropped output.
pub const OUTPUT_FILE_NAME: &str = "image_cropped.png";

/// Mime type of cropped output.
pub const OUTPUT_MIME_TYPE: &str = "image/png";

/// Which output collaborator produces the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    /// A named PNG file.
    #[default]
    File,
    /// A `data:image/png;base64,...` string.
    Base64,
}

/// A named in-memory file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CroppedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// The encoded result of a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CropOutput {
    File(CroppedFile),
    Base64(String),
}

impl CropOutput {
    pub fn output_type(&self) -> OutputType {
        match self {
            CropOutput::File(_) => OutputType::File,
            CropOutput::Base64(_) => OutputType::Base64,
        }
    }
}

/// Encode `surface` with the collaborator selected by `output_type`.
///
/// Exactly one encoding is produced.
pub fn encode_output(surface: &PixelSurface, output_type: OutputType) -> Result<CropOutput, EncodeError> {
    let png = encode_png(surface)?;

    let output = match output_type {
        OutputType::Base64 => CropOutput::Base64(to_data_url(OUTPUT_MIME_TYPE, &png)),
        OutputType::File => CropOutput::File(CroppedFile {
            name: OUTPUT_FILE_NAME.to_string(),
            mime_type: OUTPUT_MIME_TYPE.to_string(),
            bytes: png,
        }),
    };

    Ok(output)
}

/// Build a base64 `data:` URL.
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, general_purpose::STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{decode_data_url, parse_data_url};

    #[test]
    fn test_file_output() {
        let surface = PixelSurface::solid(3, 3, [1, 2, 3, 255]);
        let output = encode_output(&surface, OutputType::File).unwrap();

        match output {
            CropOutput::File(file) => {
                assert_eq!(file.name, "image_cropped.png");
                assert_eq!(file.mime_type, "image/png");
                assert_eq!(&file.bytes[1..4], b"PNG");
            }
            other => panic!("Expected file output, got {:?}", other),
        }
    }

    #[test]
    fn test_base64_output_is_png_data_url() {
        let surface = PixelSurface::solid(3, 2, [1, 2, 3, 255]);
        let output = encode_output(&surface, OutputType::Base64).unwrap();
        assert_eq!(output.output_type(), OutputType::Base64);

        let CropOutput::Base64(url) = output else {
            panic!("Expected base64 output");
        };
        assert!(url.starts_with("data:image/png;base64,"));

        let parsed = parse_data_url(&url).unwrap();
        assert_eq!(parsed.mime_type, "image/png");

        let back = decode_data_url(&url).unwrap();
        assert_eq!(back, surface);
    }

    #[test]
    fn test_encode_output_propagates_error() {
        let surface = PixelSurface::new(0, 0, vec![]);
        assert!(matches!(
            encode_output(&surface, OutputType::Base64),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_output_type_deserializes_lowercase() {
        use serde::de::value::{Error, StrDeserializer};
        use serde::de::IntoDeserializer;

        let de: StrDeserializer<'_, Error> = "base64".into_deserializer();
        assert_eq!(OutputType::deserialize(de).unwrap(), OutputType::Base64);

        let de: StrDeserializer<'_, Error> = "file".into_deserializer();
        assert_eq!(OutputType::deserialize(de).unwrap(), OutputType::File);

        assert_eq!(OutputType::default(), OutputType::File);
    }
}
