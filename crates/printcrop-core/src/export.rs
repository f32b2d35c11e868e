//! Exported crops and the records handed to the gallery collaborator.

use serde::{Deserialize, Serialize};

use crate::raster::Raster;

/// A finished crop: opaque packed RGB, ready for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropExport {
    pub width: u32,
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl CropExport {
    /// Flatten a rendered crop to RGB. The raster is expected to be opaque.
    pub fn from_raster(raster: &Raster) -> Self {
        Self {
            width: raster.width,
            height: raster.height,
            pixels: raster.to_rgb(),
        }
    }

    /// File name suggestion, e.g. `crop_413x531_px.png`.
    pub fn suggested_filename(&self, extension: &str) -> String {
        suggested_filename(self.width, self.height, extension)
    }
}

/// `crop_{width}x{height}_px.{ext}`
pub fn suggested_filename(width: u32, height: u32, extension: &str) -> String {
    let ext = extension.trim_start_matches('.');
    format!("crop_{width}x{height}_px.{ext}")
}

/// Opaque record consumed by gallery and print-layout collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryRecord {
    pub id: String,
    /// RGB pixel data, 3 bytes per pixel.
    pub pixel_data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Milliseconds since the Unix epoch, supplied by the host.
    pub timestamp: u64,
}

impl GalleryRecord {
    /// Build a record; the id is derived from the timestamp and size.
    pub fn from_export(export: CropExport, timestamp: u64) -> Self {
        Self {
            id: format!("crop-{timestamp}-{}x{}", export.width, export.height),
            width: export.width,
            height: export.height,
            pixel_data: export.pixels,
            timestamp,
        }
    }
}
