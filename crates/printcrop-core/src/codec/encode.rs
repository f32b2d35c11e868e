//! Encoding exported crops.
//!
//! PNG is the default: exports are meant for printing, so no lossy step is
//! added after the filter pipeline. JPEG is offered for smaller files.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::export::CropExport;

/// Errors that can occur while encoding an export.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

fn validate(export: &CropExport) -> Result<(), EncodeError> {
    let (width, height) = (export.width, export.height);
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    let expected = width as usize * height as usize * 3;
    if export.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: export.pixels.len(),
        });
    }
    Ok(())
}

/// Lossless PNG bytes.
pub fn encode_png(export: &CropExport) -> Result<Vec<u8>, EncodeError> {
    validate(export)?;
    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(
            &export.pixels,
            export.width,
            export.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// JPEG bytes; `quality` is clamped to 1-100.
pub fn encode_jpeg(export: &CropExport, quality: u8) -> Result<Vec<u8>, EncodeError> {
    validate(export)?;
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .write_image(
            &export.pixels,
            export.width,
            export.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32) -> CropExport {
        CropExport {
            width,
            height,
            pixels: vec![128u8; (width * height * 3) as usize],
        }
    }

    #[test]
    fn test_png_signature() {
        let png = encode_png(&gray(10, 10)).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_jpeg_markers() {
        let jpeg = encode_jpeg(&gray(10, 10), 90).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_invalid_dimensions() {
        let err = encode_png(&gray(0, 10)).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidDimensions { width: 0, height: 10 }));
    }

    #[test]
    fn test_invalid_pixel_data() {
        let mut export = gray(4, 4);
        export.pixels.truncate(10);
        match encode_jpeg(&export, 80) {
            Err(EncodeError::InvalidPixelData { expected, actual }) => {
                assert_eq!(expected, 48);
                assert_eq!(actual, 10);
            }
            other => panic!("Expected InvalidPixelData, got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn test_quality_zero_is_clamped() {
        assert!(encode_jpeg(&gray(8, 8), 0).is_ok());
    }
}
