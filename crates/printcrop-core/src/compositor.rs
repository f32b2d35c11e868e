//! Preview and export rendering.
//!
//! Every pass draws through a [`Renderer`]. The `*_with` functions take the
//! host's surface; the plain versions use a [`SoftwareRenderer`].
//!
//! # Preview
//!
//! 1. Fill the canvas white
//! 2. Draw the image through the viewport transform
//! 3. Filter the *whole* canvas (only when a parameter is non-zero): the
//!    surface is read back, filtered on the CPU and written again
//! 4. Dim everything outside the crop, stroke its border, draw a crosshair
//!
//! # Export
//!
//! A crop-sized surface is filled white, the transform is shifted so the
//! crop's top-left lands on `(0, 0)`, the image is drawn and the same
//! filter pipeline runs over that surface alone. Because the convolution
//! then sees different neighbours along the crop boundary, the outermost
//! ring of exported pixels can differ from what the preview shows there.

use serde::{Deserialize, Serialize};

use crate::crop::PixelRect;
use crate::filter::{filter, FilterParameters};
use crate::raster::{ImageSource, Raster, CHANNELS};
use crate::render::{PixelBounds, Renderer, SoftwareRenderer};
use crate::viewport::ViewportTransform;

/// Canvas background.
pub const BACKGROUND: [u8; 4] = [255, 255, 255, 255];

/// Colors of the crop overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    /// RGB of the dimming mask outside the crop.
    pub mask_rgb: [u8; 3],
    /// Mask opacity, 0.0 to 1.0.
    pub mask_opacity: f64,
    /// Border and crosshair color.
    pub stroke_rgb: [u8; 3],
    /// Half length of each crosshair arm in pixels.
    pub crosshair_half_len: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            mask_rgb: [0, 0, 0],
            mask_opacity: 0.5,
            stroke_rgb: [255, 0, 0],
            crosshair_half_len: 10,
        }
    }
}

fn whole<R: Renderer>(renderer: &R) -> PixelBounds {
    let (width, height) = renderer.size();
    PixelBounds::new(0, 0, width, height)
}

/// Resize the surface, fill it white and draw the image.
pub fn draw_canvas<R: Renderer>(
    renderer: &mut R,
    image: Option<&ImageSource>,
    transform: &ViewportTransform,
    size: (u32, u32),
) {
    renderer.resize(size.0, size.1);
    renderer.fill(BACKGROUND);
    if let Some(image) = image {
        renderer.draw_image(image, transform);
    }
}

/// Run the filter pipeline over the whole surface in place.
pub fn filter_surface<R: Renderer>(renderer: &mut R, params: &FilterParameters) {
    if params.is_identity() {
        return;
    }
    let raster = renderer.get_pixels(whole(renderer));
    renderer.put_pixels(0, 0, &filter(&raster, params));
}

/// Draw an image onto a white surface of the given size.
pub fn render_canvas(
    image: Option<&ImageSource>,
    transform: &ViewportTransform,
    size: (u32, u32),
) -> Raster {
    let mut renderer = SoftwareRenderer::new(size.0, size.1);
    draw_canvas(&mut renderer, image, transform, size);
    renderer.into_raster()
}

/// Full preview on the host's surface: canvas, filters and crop overlay.
///
/// The surface is left showing the preview; the returned raster is a copy.
pub fn render_preview_with<R: Renderer>(
    renderer: &mut R,
    image: Option<&ImageSource>,
    transform: &ViewportTransform,
    canvas: (u32, u32),
    crop: &PixelRect,
    params: &FilterParameters,
    style: &OverlayStyle,
) -> Raster {
    draw_canvas(renderer, image, transform, canvas);
    filter_surface(renderer, params);
    let mut raster = renderer.get_pixels(whole(renderer));
    draw_crop_overlay(&mut raster, crop, style);
    renderer.put_pixels(0, 0, &raster);
    raster
}

/// Full preview on a software surface.
pub fn render_preview(
    image: Option<&ImageSource>,
    transform: &ViewportTransform,
    canvas: (u32, u32),
    crop: &PixelRect,
    params: &FilterParameters,
    style: &OverlayStyle,
) -> Raster {
    let mut renderer = SoftwareRenderer::new(canvas.0, canvas.1);
    render_preview_with(&mut renderer, image, transform, canvas, crop, params, style)
}

/// The exported crop as RGBA, drawn on the host's surface.
pub fn render_crop_with<R: Renderer>(
    renderer: &mut R,
    image: &ImageSource,
    transform: &ViewportTransform,
    crop: &PixelRect,
    params: &FilterParameters,
) -> Raster {
    let shifted = transform.translated_to(crop.x, crop.y);
    draw_canvas(renderer, Some(image), &shifted, (crop.width, crop.height));
    filter_surface(renderer, params);
    renderer.get_pixels(whole(renderer))
}

/// Integer pixel span `[start, end)` whose centers fall inside `[origin, origin + len)`.
fn pixel_span(origin: f64, len: u32, limit: u32) -> (u32, u32) {
    let start = (origin - 0.5).ceil().clamp(0.0, limit as f64) as u32;
    let end = (origin + len as f64 - 0.5).ceil().clamp(0.0, limit as f64) as u32;
    (start, end.max(start))
}

/// Dim outside the crop, stroke a 1px border and a center crosshair.
pub fn draw_crop_overlay(raster: &mut Raster, crop: &PixelRect, style: &OverlayStyle) {
    let (x0, x1) = pixel_span(crop.x, crop.width, raster.width);
    let (y0, y1) = pixel_span(crop.y, crop.height, raster.height);
    let opacity = style.mask_opacity.clamp(0.0, 1.0);

    for y in 0..raster.height {
        for x in 0..raster.width {
            if x >= x0 && x < x1 && y >= y0 && y < y1 {
                continue;
            }
            let i = raster.index(x, y);
            tint(&mut raster.pixels[i..i + CHANNELS], style.mask_rgb, opacity);
        }
    }

    if x0 >= x1 || y0 >= y1 {
        return;
    }
    let stroke = [style.stroke_rgb[0], style.stroke_rgb[1], style.stroke_rgb[2], 255];

    for x in x0..x1 {
        raster.set_pixel(x, y0, stroke);
        raster.set_pixel(x, y1 - 1, stroke);
    }
    for y in y0..y1 {
        raster.set_pixel(x0, y, stroke);
        raster.set_pixel(x1 - 1, y, stroke);
    }

    let cx = x0 + (x1 - x0) / 2;
    let cy = y0 + (y1 - y0) / 2;
    let arm = style.crosshair_half_len;
    for x in cx.saturating_sub(arm).max(x0)..(cx + arm + 1).min(x1) {
        raster.set_pixel(x, cy, stroke);
    }
    for y in cy.saturating_sub(arm).max(y0)..(cy + arm + 1).min(y1) {
        raster.set_pixel(cx, y, stroke);
    }
}

#[inline]
fn tint(px: &mut [u8], rgb: [u8; 3], opacity: f64) {
    for c in 0..3 {
        let v = px[c] as f64 * (1.0 - opacity) + rgb[c] as f64 * opacity;
        px[c] = v.round() as u8;
    }
}
