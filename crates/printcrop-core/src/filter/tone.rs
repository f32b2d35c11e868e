//! Contrast and brightness remapping.
//!
//! Both operate on RGB channels in place and leave alpha alone. Every write
//! is clamped to [0, 255] and rounded, so contrast followed by brightness
//! sees already-quantized values.

use crate::raster::CHANNELS;

/// Mid-gray pivot for the contrast curve.
const PIVOT: f64 = 128.0;

/// Contrast scale factor for a contrast value in [-100, 100].
///
/// Formula: `259 * (c + 255) / (255 * (259 - c))`
#[inline]
pub fn contrast_factor(contrast: f64) -> f64 {
    259.0 * (contrast + 255.0) / (255.0 * (259.0 - contrast))
}

/// Stretch or compress channels around mid-gray.
pub fn apply_contrast(pixels: &mut [u8], contrast: f64) {
    if contrast == 0.0 {
        return;
    }
    let factor = contrast_factor(contrast);
    for px in pixels.chunks_exact_mut(CHANNELS) {
        for c in &mut px[..3] {
            *c = to_channel(factor * (*c as f64 - PIVOT) + PIVOT);
        }
    }
}

/// Add a constant offset to every channel.
pub fn apply_brightness(pixels: &mut [u8], brightness: f64) {
    if brightness == 0.0 {
        return;
    }
    for px in pixels.chunks_exact_mut(CHANNELS) {
        for c in &mut px[..3] {
            *c = to_channel(*c as f64 + brightness);
        }
    }
}

#[inline]
fn to_channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}
