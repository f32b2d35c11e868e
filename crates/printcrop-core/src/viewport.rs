//! Viewport transform: image space to canvas space.
//!
//! A point in the image maps to the canvas as
//! `canvas = image * scale + offset`. The scale is kept inside
//! [`MIN_SCALE`, `MAX_SCALE`] after every mutation; offsets are unconstrained,
//! so the image may be dragged partly or entirely off the canvas.
//!
//! All operations return a new transform and leave `self` untouched.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Smallest allowed scale.
pub const MIN_SCALE: f64 = 0.05;
/// Largest allowed scale.
pub const MAX_SCALE: f64 = 5.0;
/// Default keyboard nudge distance in canvas pixels.
pub const DEFAULT_NUDGE_STEP: f64 = 2.0;

/// How the image is sized when the transform is (re)initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Whole image visible, margins allowed.
    #[default]
    Fit,
    /// Canvas fully covered, image edges may be cut.
    Fill,
}

impl FitMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            FitMode::Fit => FitMode::Fill,
            FitMode::Fill => FitMode::Fit,
        }
    }
}

/// Keyboard nudge direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit offset for this direction in canvas pixels.
    fn unit(self) -> (f64, f64) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }
}

/// Uniform scale plus translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Clamp a scale into the allowed range.
#[inline]
pub fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

impl ViewportTransform {
    /// Size and center an image on the canvas.
    ///
    /// Returns `None` when either size has a zero side, since no finite
    /// scale exists for that geometry.
    pub fn initialize(canvas: (u32, u32), image: (u32, u32), mode: FitMode) -> Option<Self> {
        let (cw, ch) = (canvas.0 as f64, canvas.1 as f64);
        let (iw, ih) = (image.0 as f64, image.1 as f64);
        if cw <= 0.0 || ch <= 0.0 || iw <= 0.0 || ih <= 0.0 {
            debug!(?canvas, ?image, "degenerate geometry, transform not initialized");
            return None;
        }

        let sx = cw / iw;
        let sy = ch / ih;
        let scale = clamp_scale(match mode {
            FitMode::Fit => sx.min(sy),
            FitMode::Fill => sx.max(sy),
        });

        Some(Self {
            scale,
            offset_x: (cw - iw * scale) / 2.0,
            offset_y: (ch - ih * scale) / 2.0,
        })
    }

    /// Shift by a canvas-space delta.
    #[must_use]
    pub fn pan_by(&self, dx: f64, dy: f64) -> Self {
        if !dx.is_finite() || !dy.is_finite() {
            return *self;
        }
        Self {
            offset_x: self.offset_x + dx,
            offset_y: self.offset_y + dy,
            ..*self
        }
    }

    /// Multiply the scale by `factor`, keeping the image point under
    /// `anchor` (canvas coordinates) fixed on screen.
    #[must_use]
    pub fn zoom_at(&self, anchor: (f64, f64), factor: f64) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            debug!(factor, "ignoring invalid zoom factor");
            return *self;
        }
        self.rescale_about(anchor, self.scale * factor)
    }

    /// Set an absolute scale, anchored on the canvas center.
    #[must_use]
    pub fn set_scale(&self, canvas: (u32, u32), scale: f64) -> Self {
        if !scale.is_finite() || scale <= 0.0 {
            debug!(scale, "ignoring invalid absolute scale");
            return *self;
        }
        let center = (canvas.0 as f64 / 2.0, canvas.1 as f64 / 2.0);
        self.rescale_about(center, scale)
    }

    /// Move by `step` canvas pixels without any anchor math.
    #[must_use]
    pub fn nudge(&self, direction: Direction, step: f64) -> Self {
        let (ux, uy) = direction.unit();
        self.pan_by(ux * step, uy * step)
    }

    /// Shift the origin so that canvas point `(x, y)` becomes `(0, 0)`.
    #[must_use]
    pub fn translated_to(&self, x: f64, y: f64) -> Self {
        self.pan_by(-x, -y)
    }

    /// Map a canvas point back into image space.
    pub fn canvas_to_image(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.offset_x) / self.scale, (y - self.offset_y) / self.scale)
    }

    /// Map an image point onto the canvas.
    pub fn image_to_canvas(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale + self.offset_x, y * self.scale + self.offset_y)
    }

    fn rescale_about(&self, anchor: (f64, f64), new_scale: f64) -> Self {
        let (bx, by) = self.canvas_to_image(anchor.0, anchor.1);
        let scale = clamp_scale(new_scale);
        Self {
            scale,
            offset_x: anchor.0 - bx * scale,
            offset_y: anchor.1 - by * scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_scenario() {
        let t = ViewportTransform::initialize((600, 900), (1000, 1000), FitMode::Fit).unwrap();
        assert_relative_eq!(t.scale, 0.6);
        assert_relative_eq!(t.offset_x, 0.0);
        assert_relative_eq!(t.offset_y, 150.0);
    }

    #[test]
    fn test_fill_scenario() {
        let t = ViewportTransform::initialize((600, 900), (1000, 1000), FitMode::Fill).unwrap();
        assert_relative_eq!(t.scale, 0.9);
        assert_relative_eq!(t.offset_x, -150.0);
        assert_relative_eq!(t.offset_y, 0.0);
    }

    #[test]
    fn test_initialize_clamps_scale() {
        // 1x1 image on a large canvas would need scale 600
        let t = ViewportTransform::initialize((600, 600), (1, 1), FitMode::Fit).unwrap();
        assert_eq!(t.scale, MAX_SCALE);
        assert_relative_eq!(t.offset_x, (600.0 - MAX_SCALE) / 2.0);
    }

    #[test]
    fn test_initialize_degenerate() {
        assert!(ViewportTransform::initialize((0, 600), (10, 10), FitMode::Fit).is_none());
        assert!(ViewportTransform::initialize((600, 600), (10, 0), FitMode::Fill).is_none());
    }

    #[test]
    fn test_pan_unconstrained() {
        let t = ViewportTransform::default().pan_by(-5000.0, 250.0);
        assert_eq!(t.offset_x, -5000.0);
        assert_eq!(t.offset_y, 250.0);
        assert_eq!(t.scale, 1.0);
    }

    #[test]
    fn test_zoom_at_keeps_anchor() {
        let t = ViewportTransform {
            scale: 0.6,
            offset_x: 10.0,
            offset_y: 150.0,
        };
        let anchor = (200.0, 300.0);
        let before = t.canvas_to_image(anchor.0, anchor.1);
        let zoomed = t.zoom_at(anchor, 1.5);
        let after = zoomed.canvas_to_image(anchor.0, anchor.1);

        assert_relative_eq!(zoomed.scale, 0.9, epsilon = 1e-12);
        assert_relative_eq!(before.0, after.0, epsilon = 1e-9);
        assert_relative_eq!(before.1, after.1, epsilon = 1e-9);
    }

    #[test]
    fn test_zoom_clamped_at_bounds() {
        let t = ViewportTransform::default();
        assert_eq!(t.zoom_at((0.0, 0.0), 100.0).scale, MAX_SCALE);
        assert_eq!(t.zoom_at((0.0, 0.0), 0.0001).scale, MIN_SCALE);
    }

    #[test]
    fn test_zoom_rejects_invalid_factor() {
        let t = ViewportTransform::default();
        assert_eq!(t.zoom_at((1.0, 1.0), 0.0), t);
        assert_eq!(t.zoom_at((1.0, 1.0), -2.0), t);
        assert_eq!(t.zoom_at((1.0, 1.0), f64::NAN), t);
    }

    #[test]
    fn test_set_scale_anchors_canvas_center() {
        let t = ViewportTransform::initialize((600, 900), (1000, 1000), FitMode::Fit).unwrap();
        let center_before = t.canvas_to_image(300.0, 450.0);
        let scaled = t.set_scale((600, 900), 2.0);
        let center_after = scaled.canvas_to_image(300.0, 450.0);

        assert_eq!(scaled.scale, 2.0);
        assert_relative_eq!(center_before.0, center_after.0, epsilon = 1e-9);
        assert_relative_eq!(center_before.1, center_after.1, epsilon = 1e-9);
    }

    #[test]
    fn test_nudge() {
        let t = ViewportTransform::default();
        let t = t.nudge(Direction::Right, DEFAULT_NUDGE_STEP);
        let t = t.nudge(Direction::Up, DEFAULT_NUDGE_STEP);
        assert_eq!((t.offset_x, t.offset_y), (2.0, -2.0));
        assert_eq!(t.scale, 1.0);
    }

    #[test]
    fn test_round_trip_mapping() {
        let t = ViewportTransform {
            scale: 2.5,
            offset_x: -30.0,
            offset_y: 12.0,
        };
        let (cx, cy) = t.image_to_canvas(7.0, 9.0);
        let (ix, iy) = t.canvas_to_image(cx, cy);
        assert_relative_eq!(ix, 7.0);
        assert_relative_eq!(iy, 9.0);
    }

    #[test]
    fn test_fit_mode_toggle() {
        assert_eq!(FitMode::Fit.toggled(), FitMode::Fill);
        assert_eq!(FitMode::Fill.toggled(), FitMode::Fit);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
