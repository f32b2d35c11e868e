//! RGBA pixel buffers.
//!
//! [`Raster`] is the working buffer every render and filter pass reads and
//! writes. [`ImageSource`] wraps a raster that must never change after load:
//! filters are applied to rendered copies so the source stays pristine.

use crate::error::GeometryError;

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// An RGBA pixel buffer with a top-left origin, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA data, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl Raster {
    /// Create a raster from existing RGBA data.
    ///
    /// Returns an error if the buffer length does not match the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, GeometryError> {
        let expected = byte_len(width, height);
        if pixels.len() != expected {
            return Err(GeometryError::BufferMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a raster where every pixel has the same RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Expand packed RGB data to an opaque RGBA raster.
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Result<Self, GeometryError> {
        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected {
            return Err(GeometryError::BufferMismatch {
                expected,
                actual: rgb.len(),
            });
        }
        let mut pixels = Vec::with_capacity(byte_len(width, height));
        for px in rgb.chunks_exact(3) {
            pixels.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Drop the alpha channel, producing packed RGB.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.pixel_count() * 3);
        for px in self.pixels.chunks_exact(CHANNELS) {
            rgb.extend_from_slice(&px[..3]);
        }
        rgb
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Byte offset of the pixel at `(x, y)`.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Read the pixel at `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Overwrite the pixel at `(x, y)`.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.index(x, y);
        self.pixels[i..i + CHANNELS].copy_from_slice(&rgba);
    }
}

#[inline]
fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}

/// A decoded image as supplied by the ingestion collaborator.
///
/// Immutable once created; a new load replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    raster: Raster,
}

impl ImageSource {
    /// Wrap RGBA data. Zero-sized images are rejected.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::DegenerateGeometry { width, height });
        }
        Ok(Self {
            raster: Raster::new(width, height, pixels)?,
        })
    }

    /// Wrap an existing raster. Zero-sized rasters are rejected.
    pub fn from_raster(raster: Raster) -> Result<Self, GeometryError> {
        if raster.is_empty() {
            return Err(GeometryError::DegenerateGeometry {
                width: raster.width,
                height: raster.height,
            });
        }
        Ok(Self { raster })
    }

    pub fn width(&self) -> u32 {
        self.raster.width
    }

    pub fn height(&self) -> u32 {
        self.raster.height
    }

    /// Read-only view of the pixels.
    pub fn raster(&self) -> &Raster {
        &self.raster
    }
}
