//! WASM-compatible wrapper types for pixel data.
//!
//! These own their buffers in WASM memory. Reading `pixels()` copies the data
//! into a JavaScript `Uint8Array`.

use printcrop_core::{CropExport, Raster};
use wasm_bindgen::prelude::*;

/// An RGBA raster for JavaScript, ready for `new ImageData(...)`.
#[wasm_bindgen]
pub struct JsRaster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsRaster {
    /// Width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// RGBA pixel data as a Uint8Array (copied).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl From<Raster> for JsRaster {
    fn from(raster: Raster) -> Self {
        Self {
            width: raster.width,
            height: raster.height,
            pixels: raster.pixels,
        }
    }
}

/// A finished crop, opaque RGB.
#[wasm_bindgen]
pub struct JsCropExport {
    inner: CropExport,
}

#[wasm_bindgen]
impl JsCropExport {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Number of bytes in the pixel buffer (width * height * 3)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.pixels.len()
    }

    /// RGB pixel data as a Uint8Array (copied).
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels.clone()
    }

    /// File name suggestion, e.g. `crop_413x531_px.png`.
    pub fn suggested_filename(&self, extension: &str) -> String {
        self.inner.suggested_filename(extension)
    }
}

impl JsCropExport {
    pub(crate) fn inner(&self) -> &CropExport {
        &self.inner
    }
}

impl From<CropExport> for JsCropExport {
    fn from(inner: CropExport) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_raster_from_raster() {
        let js = JsRaster::from(Raster::filled(4, 2, [1, 2, 3, 4]));
        assert_eq!(js.width(), 4);
        assert_eq!(js.height(), 2);
        assert_eq!(js.byte_length(), 32);
        assert_eq!(&js.pixels()[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_js_crop_export() {
        let js = JsCropExport::from(CropExport {
            width: 3,
            height: 2,
            pixels: vec![7u8; 18],
        });
        assert_eq!(js.byte_length(), 18);
        assert_eq!(js.suggested_filename("png"), "crop_3x2_px.png");
        assert_eq!(js.inner().width, 3);
    }
}
