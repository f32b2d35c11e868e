//! Editor configuration.
//!
//! Every field has a default, so a partial file (or an empty object from a
//! host) is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::compositor::OverlayStyle;
use crate::crop::CropRegion;
use crate::error::GeometryError;
use crate::paper::PaperCanvas;
use crate::viewport::{FitMode, DEFAULT_NUDGE_STEP};

/// Physical paper size in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaperSize {
    pub width_in: f64,
    pub height_in: f64,
}

impl Default for PaperSize {
    fn default() -> Self {
        Self {
            width_in: 4.0,
            height_in: 6.0,
        }
    }
}

/// Start-up settings for an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Print resolution.
    pub dpi: f64,
    pub fit_mode: FitMode,
    /// Offset change per keyboard nudge, in canvas pixels.
    pub nudge_step_px: f64,
    /// Opacity of the mask outside the crop (0.0 to 1.0).
    pub mask_opacity: f64,
    /// Screen height the paper's reference height is fitted to.
    pub available_screen_height_px: f64,
    pub paper: PaperSize,
    pub crop: CropRegion,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            dpi: 300.0,
            fit_mode: FitMode::Fit,
            nudge_step_px: DEFAULT_NUDGE_STEP,
            mask_opacity: 0.5,
            available_screen_height_px: 900.0,
            paper: PaperSize::default(),
            crop: CropRegion::default(),
        }
    }
}

impl EditorConfig {
    /// Build the paper canvas described by this configuration.
    pub fn paper_canvas(&self) -> Result<PaperCanvas, GeometryError> {
        PaperCanvas::new(
            self.paper.width_in,
            self.paper.height_in,
            self.dpi,
            self.available_screen_height_px,
        )
    }

    /// The configured crop, validated.
    pub fn crop_region(&self) -> Result<CropRegion, GeometryError> {
        CropRegion::new(self.crop.width_in, self.crop.height_in)
    }

    /// Overlay colors with the configured opacity. A non-finite opacity
    /// falls back to the default.
    pub fn overlay_style(&self) -> OverlayStyle {
        let defaults = OverlayStyle::default();
        let mask_opacity = if self.mask_opacity.is_finite() {
            self.mask_opacity.clamp(0.0, 1.0)
        } else {
            defaults.mask_opacity
        };
        OverlayStyle {
            mask_opacity,
            ..defaults
        }
    }
}
