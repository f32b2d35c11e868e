//! Drawing surfaces.
//!
//! [`Renderer`] is the capability the compositor draws through. The core
//! ships [`SoftwareRenderer`], a plain RGBA buffer; other hosts can back the
//! same trait with a GPU canvas without touching the compositor.
//!
//! # Sampling
//!
//! `draw_image` uses inverse mapping: each destination pixel center is
//! mapped back into image space through the viewport transform and sampled
//! bilinearly. Destination pixels whose center falls outside the image
//! footprint are left untouched.

use crate::raster::{ImageSource, Raster, CHANNELS};
use crate::viewport::ViewportTransform;

/// An integer pixel rectangle on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelBounds {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A surface the compositor can draw on and read back from.
pub trait Renderer {
    /// Surface size in pixels.
    fn size(&self) -> (u32, u32);

    /// Change the surface size. Contents afterwards are unspecified until
    /// the next `fill`.
    fn resize(&mut self, width: u32, height: u32);

    /// Overwrite every pixel with one color.
    fn fill(&mut self, rgba: [u8; 4]);

    /// Composite an image through a transform, source-over.
    fn draw_image(&mut self, image: &ImageSource, transform: &ViewportTransform);

    /// Copy out a region. Parts outside the surface read as transparent black.
    fn get_pixels(&self, bounds: PixelBounds) -> Raster;

    /// Copy a raster in at `(x, y)`, clipped to the surface.
    fn put_pixels(&mut self, x: u32, y: u32, raster: &Raster);
}

/// CPU renderer over an RGBA [`Raster`].
#[derive(Debug, Clone)]
pub struct SoftwareRenderer {
    surface: Raster,
}

impl SoftwareRenderer {
    /// A transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: Raster::filled(width, height, [0, 0, 0, 0]),
        }
    }

    pub fn raster(&self) -> &Raster {
        &self.surface
    }

    pub fn into_raster(self) -> Raster {
        self.surface
    }
}

impl Renderer for SoftwareRenderer {
    fn size(&self) -> (u32, u32) {
        (self.surface.width, self.surface.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.size() != (width, height) {
            self.surface = Raster::filled(width, height, [0, 0, 0, 0]);
        }
    }

    fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.surface.pixels.chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&rgba);
        }
    }

    fn draw_image(&mut self, image: &ImageSource, transform: &ViewportTransform) {
        let src = image.raster();
        let (iw, ih) = (src.width as f64, src.height as f64);
        if self.surface.is_empty() || transform.scale <= 0.0 {
            return;
        }

        // Destination footprint of the image, clipped to the surface
        let (left, top) = transform.image_to_canvas(0.0, 0.0);
        let (right, bottom) = transform.image_to_canvas(iw, ih);
        let x0 = clip(left.floor(), self.surface.width);
        let y0 = clip(top.floor(), self.surface.height);
        let x1 = clip(right.ceil(), self.surface.width);
        let y1 = clip(bottom.ceil(), self.surface.height);

        for dy in y0..y1 {
            for dx in x0..x1 {
                let (u, v) = transform.canvas_to_image(dx as f64 + 0.5, dy as f64 + 0.5);
                if u < 0.0 || u >= iw || v < 0.0 || v >= ih {
                    continue;
                }
                let sample = sample_bilinear(src, u - 0.5, v - 0.5);
                let i = self.surface.index(dx, dy);
                blend_over(&mut self.surface.pixels[i..i + CHANNELS], sample);
            }
        }
    }

    fn get_pixels(&self, bounds: PixelBounds) -> Raster {
        let mut out = Raster::filled(bounds.width, bounds.height, [0, 0, 0, 0]);
        for y in 0..bounds.height {
            let sy = bounds.y as u64 + y as u64;
            if sy >= self.surface.height as u64 {
                break;
            }
            for x in 0..bounds.width {
                let sx = bounds.x as u64 + x as u64;
                if sx >= self.surface.width as u64 {
                    break;
                }
                out.set_pixel(x, y, self.surface.pixel(sx as u32, sy as u32));
            }
        }
        out
    }

    fn put_pixels(&mut self, x: u32, y: u32, raster: &Raster) {
        for ry in 0..raster.height {
            let dy = y as u64 + ry as u64;
            if dy >= self.surface.height as u64 {
                break;
            }
            for rx in 0..raster.width {
                let dx = x as u64 + rx as u64;
                if dx >= self.surface.width as u64 {
                    break;
                }
                self.surface
                    .set_pixel(dx as u32, dy as u32, raster.pixel(rx, ry));
            }
        }
    }
}

/// Clamp a floating coordinate into `0..=limit`.
#[inline]
fn clip(value: f64, limit: u32) -> u32 {
    value.clamp(0.0, limit as f64) as u32
}

/// Bilinear sample with edge clamping.
fn sample_bilinear(image: &Raster, x: f64, y: f64) -> [f64; 4] {
    let max_x = (image.width - 1) as f64;
    let max_y = (image.height - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(image.width - 1);
    let y1 = (y0 + 1).min(image.height - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = image.pixel(x0, y0);
    let p10 = image.pixel(x1, y0);
    let p01 = image.pixel(x0, y1);
    let p11 = image.pixel(x1, y1);

    let mut out = [0.0f64; 4];
    for (i, o) in out.iter_mut().enumerate() {
        *o = p00[i] as f64 * (1.0 - fx) * (1.0 - fy)
            + p10[i] as f64 * fx * (1.0 - fy)
            + p01[i] as f64 * (1.0 - fx) * fy
            + p11[i] as f64 * fx * fy;
    }
    out
}

/// Source-over compositing of a straight-alpha sample onto a pixel.
#[inline]
fn blend_over(dst: &mut [u8], src: [f64; 4]) {
    let sa = src[3] / 255.0;
    if sa >= 1.0 {
        for c in 0..3 {
            dst[c] = src[c].clamp(0.0, 255.0).round() as u8;
        }
        dst[3] = 255;
        return;
    }
    let da = dst[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    for c in 0..3 {
        let v = (src[c] * sa + dst[c] as f64 * da * (1.0 - sa)) / out_a;
        dst[c] = v.clamp(0.0, 255.0).round() as u8;
    }
    dst[3] = (out_a * 255.0).clamp(0.0, 255.0).round() as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::FitMode;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> ImageSource {
        ImageSource::from_raster(Raster::filled(width, height, rgba)).unwrap()
    }

    #[test]
    fn test_fill() {
        let mut r = SoftwareRenderer::new(3, 2);
        r.fill([255, 255, 255, 255]);
        assert!(r.raster().pixels.iter().all(|&v| v == 255));
    }

    #[test]
    fn test_draw_identity() {
        let mut img = Raster::filled(2, 2, [0, 0, 0, 255]);
        img.set_pixel(1, 0, [200, 100, 50, 255]);
        let img = ImageSource::from_raster(img).unwrap();

        let mut r = SoftwareRenderer::new(2, 2);
        r.draw_image(&img, &ViewportTransform::default());
        assert_eq!(r.raster().pixel(1, 0), [200, 100, 50, 255]);
        assert_eq!(r.raster().pixel(0, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn test_draw_fit_leaves_margins() {
        let img = solid(10, 10, [255, 0, 0, 255]);
        let t = ViewportTransform::initialize((10, 20), (10, 10), FitMode::Fit).unwrap();

        let mut r = SoftwareRenderer::new(10, 20);
        r.fill([255, 255, 255, 255]);
        r.draw_image(&img, &t);

        assert_eq!(r.raster().pixel(5, 2), [255, 255, 255, 255]);
        assert_eq!(r.raster().pixel(5, 10), [255, 0, 0, 255]);
        assert_eq!(r.raster().pixel(5, 17), [255, 255, 255, 255]);
    }

    #[test]
    fn test_draw_upscaled_is_smooth() {
        let mut img = Raster::filled(2, 1, [0, 0, 0, 255]);
        img.set_pixel(1, 0, [200, 200, 200, 255]);
        let img = ImageSource::from_raster(img).unwrap();
        let t = ViewportTransform {
            scale: 4.0,
            offset_x: 0.0,
            offset_y: 0.0,
        };

        let mut r = SoftwareRenderer::new(8, 4);
        r.draw_image(&img, &t);
        let row: Vec<u8> = (0..8).map(|x| r.raster().pixel(x, 0)[0]).collect();
        assert_eq!(row[0], 0);
        assert_eq!(row[7], 200);
        assert!(row.windows(2).all(|w| w[0] <= w[1]), "not monotonic: {row:?}");
    }

    #[test]
    fn test_draw_off_canvas_is_noop() {
        let img = solid(4, 4, [9, 9, 9, 255]);
        let t = ViewportTransform {
            scale: 1.0,
            offset_x: 100.0,
            offset_y: -100.0,
        };
        let mut r = SoftwareRenderer::new(4, 4);
        r.fill([1, 2, 3, 255]);
        r.draw_image(&img, &t);
        assert!(r.raster().pixels.chunks_exact(4).all(|p| p == [1, 2, 3, 255]));
    }

    #[test]
    fn test_transparent_source_over_white() {
        let img = solid(2, 2, [0, 0, 0, 0]);
        let mut r = SoftwareRenderer::new(2, 2);
        r.fill([255, 255, 255, 255]);
        r.draw_image(&img, &ViewportTransform::default());
        assert_eq!(r.raster().pixel(0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_half_alpha_blends() {
        let img = solid(1, 1, [0, 0, 0, 128]);
        let mut r = SoftwareRenderer::new(1, 1);
        r.fill([255, 255, 255, 255]);
        r.draw_image(&img, &ViewportTransform::default());
        assert_eq!(r.raster().pixel(0, 0), [127, 127, 127, 255]);
    }

    #[test]
    fn test_resize() {
        let mut r = SoftwareRenderer::new(2, 2);
        r.resize(5, 3);
        assert_eq!(r.size(), (5, 3));
        assert_eq!(r.raster().pixels.len(), 5 * 3 * 4);
    }

    #[test]
    fn test_get_and_put_pixels() {
        let mut r = SoftwareRenderer::new(4, 4);
        let patch = Raster::filled(2, 2, [5, 6, 7, 8]);
        r.put_pixels(3, 3, &patch);
        assert_eq!(r.raster().pixel(3, 3), [5, 6, 7, 8]);

        let read = r.get_pixels(PixelBounds::new(2, 2, 3, 3));
        assert_eq!(read.width, 3);
        assert_eq!(read.pixel(1, 1), [5, 6, 7, 8]);
        assert_eq!(read.pixel(0, 0), [0, 0, 0, 0]);
        // Outside the surface
        assert_eq!(read.pixel(2, 2), [0, 0, 0, 0]);
    }
}
