//! Pixel filter pipeline.
//!
//! `filter(raster, clarity, brightness, contrast)` is a pure function of its
//! inputs. Stages always run in this order:
//!
//! 1. Clarity convolution (skipped when clarity is exactly 0)
//! 2. Contrast remap (skipped when contrast is 0)
//! 3. Brightness offset (skipped when brightness is 0)
//!
//! With all three at zero the output is byte-for-byte the input.
//!
//! Parameters are clamped to [-100, 100] before use, so the pipeline has no
//! error path.

pub mod clarity;
pub mod tone;
#[cfg(feature = "parallel")]
pub mod worker;

use serde::{Deserialize, Serialize};

use crate::raster::Raster;

pub use clarity::{apply_clarity, ClarityKernel};
pub use tone::{apply_brightness, apply_contrast, contrast_factor};
#[cfg(feature = "parallel")]
pub use worker::{FilterResult, FilterWorker};

/// Lower bound of every filter parameter.
pub const PARAM_MIN: f64 = -100.0;
/// Upper bound of every filter parameter.
pub const PARAM_MAX: f64 = 100.0;

/// Clamp a parameter into range; non-finite input becomes 0.
#[inline]
pub fn clamp_param(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(PARAM_MIN, PARAM_MAX)
    } else {
        0.0
    }
}

/// Values for one filter pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterParameters {
    /// Sharpen (positive) / soften (negative), -100 to 100
    pub clarity: f64,
    /// Brightness offset, -100 to 100
    pub brightness: f64,
    /// Contrast, -100 to 100
    pub contrast: f64,
}

impl FilterParameters {
    pub fn new(clarity: f64, brightness: f64, contrast: f64) -> Self {
        Self {
            clarity,
            brightness,
            contrast,
        }
    }

    /// Copy with every value clamped into range.
    pub fn clamped(&self) -> Self {
        Self {
            clarity: clamp_param(self.clarity),
            brightness: clamp_param(self.brightness),
            contrast: clamp_param(self.contrast),
        }
    }

    /// Whether the pipeline would leave pixels unchanged.
    pub fn is_identity(&self) -> bool {
        let p = self.clamped();
        p.clarity == 0.0 && p.brightness == 0.0 && p.contrast == 0.0
    }
}

/// Run the full pipeline, returning a new raster.
pub fn filter(raster: &Raster, params: &FilterParameters) -> Raster {
    let p = params.clamped();

    let mut out = if p.clarity != 0.0 {
        apply_clarity(raster, p.clarity)
    } else {
        raster.clone()
    };

    apply_contrast(&mut out.pixels, p.contrast);
    apply_brightness(&mut out.pixels, p.brightness);
    out
}


// ============================================================================
// Property-Based Tests
// ============================================================================
