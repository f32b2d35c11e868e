//! Crop region geometry.
//!
//! The crop region has a fixed physical size and is always centered on the
//! canvas. Its pixel size is rounded exactly once, after all unit
//! conversion, so preview and export agree on the same pixel dimensions.
//!
//! # Units
//!
//! Sizes are stored in inches. User input may carry an `mm` or `in` suffix;
//! bare numbers are inches. Parsed lengths are rounded to two decimals.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GeometryError;
use crate::paper::{is_positive, round_px, validate_area, validate_length};

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Convert millimetres to inches.
#[inline]
pub fn mm_to_in(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// Physical crop size in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub width_in: f64,
    pub height_in: f64,
}

impl Default for CropRegion {
    fn default() -> Self {
        Self {
            width_in: 2.0,
            height_in: 2.0,
        }
    }
}

/// A crop rectangle in canvas pixels.
///
/// The origin may be fractional: centering an odd-sized crop in an
/// even-sized canvas lands on a half pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Whether the canvas pixel `(px, py)` has its center inside the rect.
    pub fn contains_pixel(&self, px: u32, py: u32) -> bool {
        let cx = px as f64 + 0.5;
        let cy = py as f64 + 0.5;
        cx >= self.x
            && cx < self.x + self.width as f64
            && cy >= self.y
            && cy < self.y + self.height as f64
    }
}

impl CropRegion {
    /// Create a crop region; both sides must be positive.
    pub fn new(width_in: f64, height_in: f64) -> Result<Self, GeometryError> {
        validate_length(width_in)?;
        validate_length(height_in)?;
        Ok(Self {
            width_in,
            height_in,
        })
    }

    /// Pixel rectangle for this crop, centered on a canvas.
    pub fn to_pixels(&self, canvas: (u32, u32), px_per_inch: f64) -> PixelRect {
        let width = round_px(self.width_in * px_per_inch);
        let height = round_px(self.height_in * px_per_inch);
        PixelRect {
            x: (canvas.0 as f64 - width as f64) / 2.0,
            y: (canvas.1 as f64 - height as f64) / 2.0,
            width,
            height,
        }
    }

    /// [`CropRegion::to_pixels`], rejecting rectangles larger than
    /// [`MAX_RASTER_PIXELS`](crate::paper::MAX_RASTER_PIXELS).
    pub fn checked_pixels(
        &self,
        canvas: (u32, u32),
        px_per_inch: f64,
    ) -> Result<PixelRect, GeometryError> {
        let rect = self.to_pixels(canvas, px_per_inch);
        validate_area(rect.width, rect.height)?;
        Ok(rect)
    }

    /// Parse user input such as `"35mm x 45mm"` or `"2x2in"`.
    ///
    /// Returns `None` on anything unparsable; callers keep their previous
    /// crop size in that case.
    pub fn parse(input: &str) -> Option<Self> {
        match parse_size(input) {
            Ok((w, h)) => Some(Self {
                width_in: w,
                height_in: h,
            }),
            Err(err) => {
                debug!(%err, input, "rejected crop size");
                None
            }
        }
    }

    /// Look up a named preset, falling back to [`CropRegion::parse`].
    pub fn from_preset(name: &str) -> Option<Self> {
        let key = name.trim().to_ascii_lowercase();
        PRESETS
            .iter()
            .find(|(preset, _)| *preset == key)
            .and_then(|(_, size)| Self::parse(size))
            .or_else(|| Self::parse(name))
    }
}

/// Named crop presets and their sizes.
pub const PRESETS: &[(&str, &str)] = &[
    ("passport", "35mm x 45mm"),
    ("us-passport", "2in x 2in"),
    ("wallet", "2.5in x 3.5in"),
    ("4x6", "4in x 6in"),
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Unit {
    Millimetre,
    Inch,
}

/// Split a trailing unit suffix off a length token.
fn split_unit(token: &str) -> (String, Option<Unit>) {
    let lower = token.trim().to_ascii_lowercase();
    if let Some(num) = lower.strip_suffix("mm") {
        return (num.trim_end().to_string(), Some(Unit::Millimetre));
    }
    if let Some(num) = lower.strip_suffix("in") {
        return (num.trim_end().to_string(), Some(Unit::Inch));
    }
    (lower, None)
}

fn to_inches(value: f64, unit: Unit) -> f64 {
    let inches = match unit {
        Unit::Millimetre => mm_to_in(value),
        Unit::Inch => value,
    };
    round_2(inches)
}

#[inline]
fn round_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn parse_number(raw: &str, original: &str) -> Result<f64, GeometryError> {
    let value: f64 = raw
        .parse()
        .map_err(|_| GeometryError::InvalidDimension(original.to_string()))?;
    if !is_positive(value) {
        return Err(GeometryError::InvalidDimension(original.to_string()));
    }
    Ok(value)
}

/// Parse a single length (`"35mm"`, `"1.5in"`, `"2"`) to inches.
pub fn parse_length(input: &str) -> Result<f64, GeometryError> {
    let (num, unit) = split_unit(input);
    let value = parse_number(&num, input)?;
    let inches = to_inches(value, unit.unwrap_or(Unit::Inch));
    validate_length(inches).map_err(|_| GeometryError::InvalidDimension(input.to_string()))?;
    Ok(inches)
}

/// Parse a `W x H` size to inches.
///
/// A unit written only on the last component applies to both, so
/// `"35 x 45mm"` is millimetres throughout.
pub fn parse_size(input: &str) -> Result<(f64, f64), GeometryError> {
    let invalid = || GeometryError::InvalidDimension(input.to_string());
    let mut parts = input.split(['x', 'X', '×']);
    let (first, second) = match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => (a, b),
        _ => return Err(invalid()),
    };

    let (w_raw, w_unit) = split_unit(first);
    let (h_raw, h_unit) = split_unit(second);
    let h_unit = h_unit.unwrap_or(Unit::Inch);
    let w_unit = w_unit.unwrap_or(h_unit);

    let w = to_inches(parse_number(&w_raw, input)?, w_unit);
    let h = to_inches(parse_number(&h_raw, input)?, h_unit);
    if !is_positive(w) || !is_positive(h) {
        return Err(invalid());
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mm_to_in() {
        assert_eq!(mm_to_in(25.4), 1.0);
    }

    #[test]
    fn test_parse_length_units() {
        assert_eq!(parse_length("35mm").unwrap(), 1.38);
        assert_eq!(parse_length("1.5in").unwrap(), 1.5);
        assert_eq!(parse_length("2").unwrap(), 2.0);
        assert_eq!(parse_length(" 45 MM ").unwrap(), 1.77);
    }

    #[test]
    fn test_parse_length_rejects() {
        assert!(parse_length("").is_err());
        assert!(parse_length("abc").is_err());
        assert!(parse_length("-2in").is_err());
        assert!(parse_length("0mm").is_err());
        assert!(parse_length("3cm").is_err());
        // Rounds to zero inches
        assert!(parse_length("0.1mm").is_err());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("35mm x 45mm").unwrap(), (1.38, 1.77));
        assert_eq!(parse_size("2x2in").unwrap(), (2.0, 2.0));
        assert_eq!(parse_size("4 X 6").unwrap(), (4.0, 6.0));
        assert_eq!(parse_size("35 x 45mm").unwrap(), (1.38, 1.77));
        assert_eq!(parse_size("2in x 50.8mm").unwrap(), (2.0, 2.0));
    }

    #[test]
    fn test_parse_size_rejects() {
        assert!(parse_size("4").is_err());
        assert!(parse_size("4x6x8").is_err());
        assert!(parse_size("x6").is_err());
        assert!(parse_size("4x-6").is_err());
    }

    #[test]
    fn test_presets() {
        let passport = CropRegion::from_preset("Passport").unwrap();
        assert_eq!(passport, CropRegion::new(1.38, 1.77).unwrap());

        let wallet = CropRegion::from_preset("wallet").unwrap();
        assert_eq!((wallet.width_in, wallet.height_in), (2.5, 3.5));

        // Unknown names are parsed as sizes
        let custom = CropRegion::from_preset("3x5").unwrap();
        assert_eq!((custom.width_in, custom.height_in), (3.0, 5.0));

        assert!(CropRegion::from_preset("poster").is_none());
    }

    #[test]
    fn test_crop_region_rejects_invalid() {
        assert!(CropRegion::new(0.0, 1.0).is_err());
        assert!(CropRegion::new(1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_to_pixels_centered() {
        let crop = CropRegion::new(2.0, 2.0).unwrap();
        let rect = crop.to_pixels((600, 900), 150.0);
        assert_eq!((rect.width, rect.height), (300, 300));
        assert_relative_eq!(rect.x, 150.0);
        assert_relative_eq!(rect.y, 300.0);
    }

    #[test]
    fn test_to_pixels_odd_difference() {
        let crop = CropRegion::new(1.0, 1.0).unwrap();
        let rect = crop.to_pixels((10, 10), 3.0);
        assert_eq!(rect.width, 3);
        assert_relative_eq!(rect.x, 3.5);
        assert_eq!(10.0 - 2.0 * rect.x, rect.width as f64);
    }

    #[test]
    fn test_checked_pixels_rejects_oversized_crop() {
        let crop = CropRegion::parse("2000x2000").unwrap();
        assert!(matches!(
            crop.checked_pixels((600, 900), 150.0),
            Err(GeometryError::InvalidDimension(_))
        ));

        let crop = CropRegion::new(2.0, 2.0).unwrap();
        assert_eq!(
            crop.checked_pixels((600, 900), 150.0).unwrap(),
            crop.to_pixels((600, 900), 150.0)
        );
    }

    #[test]
    fn test_contains_pixel() {
        let rect = PixelRect {
            x: 2.0,
            y: 2.0,
            width: 3,
            height: 3,
        };
        assert!(rect.contains_pixel(2, 2));
        assert!(rect.contains_pixel(4, 4));
        assert!(!rect.contains_pixel(5, 4));
        assert!(!rect.contains_pixel(1, 3));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
