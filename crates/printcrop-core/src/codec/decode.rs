//! Image decoding to RGBA with EXIF orientation correction.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::GeometryError;
use crate::raster::ImageSource;

/// Why an uploaded, pasted or dropped file could not be loaded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not a recognized image format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The format was recognized but the data is broken.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The image decoded to a zero-sized raster.
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The decoder produced fewer or more bytes than its dimensions imply.
    #[error("Decoded buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferMismatch { expected: usize, actual: usize },
}

impl DecodeError {
    fn from_geometry(err: GeometryError, width: u32, height: u32) -> Self {
        match err {
            GeometryError::BufferMismatch { expected, actual } => {
                DecodeError::BufferMismatch { expected, actual }
            }
            _ => DecodeError::InvalidDimensions { width, height },
        }
    }
}

/// EXIF orientation tag values (1-8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Transpose,
    Rotate90CW,
    Transverse,
    Rotate270CW,
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

impl Orientation {
    fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Orientation::Normal => img,
            Orientation::FlipHorizontal => img.fliph(),
            Orientation::Rotate180 => img.rotate180(),
            Orientation::FlipVertical => img.flipv(),
            Orientation::Transpose => img.rotate90().fliph(),
            Orientation::Rotate90CW => img.rotate90(),
            Orientation::Transverse => img.rotate270().fliph(),
            Orientation::Rotate270CW => img.rotate270(),
        }
    }
}

/// Read the EXIF orientation, defaulting to `Normal` when absent.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    Reader::new()
        .read_from_container(&mut cursor)
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .map(Orientation::from)
        .unwrap_or_default()
}

/// Decode JPEG or PNG bytes into an upright RGBA image.
pub fn decode_image(bytes: &[u8]) -> Result<ImageSource, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    if reader.format().is_none() {
        debug!(len = bytes.len(), "unrecognized image format");
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let orientation = read_orientation(bytes);
    let rgba = orientation.apply(img).into_rgba8();
    let (width, height) = rgba.dimensions();

    let source = ImageSource::from_rgba(width, height, rgba.into_raw())
        .map_err(|err| DecodeError::from_geometry(err, width, height))?;
    info!(width, height, ?orientation, "decoded image");
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_jpeg, encode_png};
    use crate::export::CropExport;

    fn export(width: u32, height: u32) -> CropExport {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for i in 0..width * height {
            pixels.extend_from_slice(&[(i * 40 % 256) as u8, 100, 200]);
        }
        CropExport {
            width,
            height,
            pixels,
        }
    }

    #[test]
    fn test_decode_png() {
        let png = encode_png(&export(3, 2)).unwrap();
        let img = decode_image(&png).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(img.raster().pixel(1, 0), [40, 100, 200, 255]);
    }

    #[test]
    fn test_decode_jpeg() {
        let jpeg = encode_jpeg(&export(8, 4), 90).unwrap();
        let img = decode_image(&jpeg).unwrap();
        assert_eq!((img.width(), img.height()), (8, 4));
        assert!(img.raster().pixels.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn test_decode_garbage() {
        match decode_image(&[0x00, 0x01, 0x02, 0x03]) {
            Err(DecodeError::InvalidFormat) => {}
            other => panic!("Expected InvalidFormat, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode_image(&[]).is_err());
    }

    #[test]
    fn test_decode_truncated() {
        let png = encode_png(&export(16, 16)).unwrap();
        let result = decode_image(&png[..png.len() / 2]);
        assert!(matches!(result, Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_geometry_error_mapping() {
        let err = DecodeError::from_geometry(
            GeometryError::BufferMismatch {
                expected: 16,
                actual: 12,
            },
            2,
            2,
        );
        assert!(matches!(err, DecodeError::BufferMismatch { expected: 16, actual: 12 }));

        let err = DecodeError::from_geometry(
            GeometryError::DegenerateGeometry {
                width: 0,
                height: 3,
            },
            0,
            3,
        );
        assert_eq!(err.to_string(), "Invalid image dimensions: 0x3");
    }

    #[test]
    fn test_orientation_without_exif() {
        let png = encode_png(&export(2, 2)).unwrap();
        assert_eq!(read_orientation(&png), Orientation::Normal);
        assert_eq!(read_orientation(&[1, 2, 3]), Orientation::Normal);
    }

    #[test]
    fn test_orientation_from_tag() {
        assert_eq!(Orientation::from(6), Orientation::Rotate90CW);
        assert_eq!(Orientation::from(0), Orientation::Normal);
        assert_eq!(Orientation::from(42), Orientation::Normal);
    }

    #[test]
    fn test_orientation_apply() {
        let img = image::RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
        let img = DynamicImage::ImageRgb8(img);

        let rotated = Orientation::Rotate90CW.apply(img.clone()).into_rgb8();
        assert_eq!(rotated.dimensions(), (1, 2));

        let flipped = Orientation::FlipHorizontal.apply(img).into_rgb8();
        assert_eq!(flipped.get_pixel(0, 0).0, [0, 255, 0]);
    }
}
