//! Paper and canvas sizing.
//!
//! The on-screen canvas represents a physical sheet of paper. Its pixel size
//! is `inches * dpi * display_scale_factor`, where the display scale factor
//! shrinks (or grows) the sheet so that a reference paper height of 6 inches
//! fills the available screen height.
//!
//! # Coordinate System
//!
//! Canvas pixels have a top-left origin. All other geometry (viewport
//! transform, crop rectangle) is expressed in canvas pixels.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Paper height, in inches, that is scaled to fill the screen.
pub const REFERENCE_PAPER_HEIGHT_IN: f64 = 6.0;

/// Largest canvas or crop raster, in pixels, a session will allocate.
///
/// 50 megapixels is 200 MB of RGBA.
pub const MAX_RASTER_PIXELS: u64 = 50_000_000;

/// Compute the display scale factor for a screen height and DPI.
///
/// Falls back to `1.0` when either input is not a positive finite number,
/// so a missing screen measurement never collapses the canvas.
pub fn display_scale_factor(available_height_px: f64, dpi: f64) -> f64 {
    let reference_px = REFERENCE_PAPER_HEIGHT_IN * dpi;
    if !is_positive(available_height_px) || !is_positive(reference_px) {
        return 1.0;
    }
    available_height_px / reference_px
}

/// A sheet of paper mapped onto a pixel canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaperCanvas {
    /// Paper width in inches.
    pub width_in: f64,
    /// Paper height in inches.
    pub height_in: f64,
    /// Print resolution.
    pub dpi: f64,
    /// Screen height as reported by the host, before validation.
    pub screen_height_px: f64,
    /// Screen fit factor, see [`display_scale_factor`].
    pub display_scale_factor: f64,
}

impl Default for PaperCanvas {
    /// A 4x6 inch sheet at 300 DPI fitted to a 900 px screen.
    fn default() -> Self {
        Self {
            width_in: 4.0,
            height_in: 6.0,
            dpi: 300.0,
            screen_height_px: 900.0,
            display_scale_factor: 0.5,
        }
    }
}

impl PaperCanvas {
    /// Create a canvas, validating the physical size, DPI and pixel area.
    pub fn new(
        width_in: f64,
        height_in: f64,
        dpi: f64,
        available_height_px: f64,
    ) -> Result<Self, GeometryError> {
        validate_length(width_in)?;
        validate_length(height_in)?;
        if !is_positive(dpi) {
            return Err(GeometryError::InvalidDimension(format!("dpi {dpi}")));
        }
        Self {
            width_in,
            height_in,
            dpi,
            screen_height_px: available_height_px,
            display_scale_factor: display_scale_factor(available_height_px, dpi),
        }
        .within_limit()
    }

    fn within_limit(self) -> Result<Self, GeometryError> {
        let (width, height) = self.canvas_size();
        validate_area(width, height)?;
        Ok(self)
    }

    /// Pixels per inch on the canvas.
    pub fn px_per_inch(&self) -> f64 {
        self.dpi * self.display_scale_factor
    }

    /// Canvas size in pixels, rounded once after all scaling.
    pub fn canvas_size(&self) -> (u32, u32) {
        let ppi = self.px_per_inch();
        (
            round_px(self.width_in * ppi),
            round_px(self.height_in * ppi),
        )
    }

    /// Same DPI and screen fit, different sheet.
    pub fn with_size(&self, width_in: f64, height_in: f64) -> Result<Self, GeometryError> {
        validate_length(width_in)?;
        validate_length(height_in)?;
        Self {
            width_in,
            height_in,
            ..*self
        }
        .within_limit()
    }

    /// Change DPI; the display scale factor is recomputed for the same screen.
    pub fn with_dpi(&self, dpi: f64) -> Result<Self, GeometryError> {
        Self::new(self.width_in, self.height_in, dpi, self.screen_height_px)
    }

    /// Recompute the display scale factor for a new screen height.
    pub fn with_screen_height(&self, available_height_px: f64) -> Result<Self, GeometryError> {
        Self::new(self.width_in, self.height_in, self.dpi, available_height_px)
    }
}

/// Round a pixel length half away from zero and saturate into `u32`.
#[inline]
pub(crate) fn round_px(value: f64) -> u32 {
    // `f64::round` rounds half away from zero; the cast saturates.
    value.round().max(0.0) as u32
}

#[inline]
pub(crate) fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

pub(crate) fn validate_length(value: f64) -> Result<(), GeometryError> {
    if is_positive(value) {
        Ok(())
    } else {
        Err(GeometryError::InvalidDimension(format!("{value}in")))
    }
}

/// Reject rasters larger than [`MAX_RASTER_PIXELS`].
pub(crate) fn validate_area(width: u32, height: u32) -> Result<(), GeometryError> {
    if width as u64 * height as u64 > MAX_RASTER_PIXELS {
        return Err(GeometryError::InvalidDimension(format!(
            "{width}x{height}px exceeds {MAX_RASTER_PIXELS} pixels"
        )));
    }
    Ok(())
}
