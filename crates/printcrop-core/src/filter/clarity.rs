//! Clarity: 3x3 sharpen/soften convolution.
//!
//! Positive clarity sharpens, negative clarity softens:
//!
//! ```text
//! sharpen (s = c/100)      soften (t = -c/100)
//!  0   -s   0               0   t   0
//! -s  1+4s -s               t   1   t
//!  0   -s   0               0   t   0
//! ```
//!
//! At full strength these are the classic `5, -1` sharpen and the
//! `1, 1` cross blur. Both grow continuously from the identity at 0.
//! Each weighted sum is divided by the full kernel sum (1 for sharpen,
//! `1 + 4t` for soften), so flat regions stay flat. Taps that fall outside
//! the raster are skipped rather than clamped to the edge; the divisor does
//! not shrink with them, which darkens (or, for sharpen, brightens) the
//! outermost ring of pixels.
//!
//! The output is always opaque: alpha is forced to 255.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::raster::{Raster, CHANNELS};

/// Minimum pixel count to justify row-level parallelism.
#[cfg(feature = "parallel")]
const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// A 3x3 clarity kernel with its precomputed weight sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClarityKernel {
    /// Row-major weights, index 4 is the center tap.
    pub weights: [f64; 9],
    /// Sum of all nine weights.
    pub sum: f64,
}

impl ClarityKernel {
    /// Kernel for a clarity value in [-100, 100].
    pub fn for_clarity(clarity: f64) -> Self {
        let strength = clarity.abs().min(100.0) / 100.0;
        let weights = if clarity >= 0.0 {
            let n = -strength;
            [0.0, n, 0.0, n, 1.0 + 4.0 * strength, n, 0.0, n, 0.0]
        } else {
            let n = strength;
            [0.0, n, 0.0, n, 1.0, n, 0.0, n, 0.0]
        };
        Self {
            weights,
            sum: weights.iter().sum(),
        }
    }
}

/// Convolve a raster with the clarity kernel.
///
/// Callers skip this entirely when clarity is exactly zero.
pub fn apply_clarity(src: &Raster, clarity: f64) -> Raster {
    if src.is_empty() {
        return src.clone();
    }

    let kernel = ClarityKernel::for_clarity(clarity);
    let row_bytes = src.width as usize * CHANNELS;
    let mut pixels = vec![0u8; src.pixels.len()];

    #[cfg(feature = "parallel")]
    if src.pixel_count() >= PARALLEL_PIXEL_THRESHOLD {
        pixels
            .par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(y, row)| convolve_row(src, &kernel, y, row));
        return Raster {
            width: src.width,
            height: src.height,
            pixels,
        };
    }

    pixels
        .chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| convolve_row(src, &kernel, y, row));

    Raster {
        width: src.width,
        height: src.height,
        pixels,
    }
}

fn convolve_row(src: &Raster, kernel: &ClarityKernel, y: usize, out: &mut [u8]) {
    let (w, h) = (src.width as i64, src.height as i64);
    let y = y as i64;

    for x in 0..w {
        let mut acc = [0.0f64; 3];

        for ky in -1..=1i64 {
            let ny = y + ky;
            if ny < 0 || ny >= h {
                continue;
            }
            for kx in -1..=1i64 {
                let nx = x + kx;
                if nx < 0 || nx >= w {
                    continue;
                }
                let weight = kernel.weights[((ky + 1) * 3 + (kx + 1)) as usize];
                if weight == 0.0 {
                    continue;
                }
                let idx = (ny as usize * w as usize + nx as usize) * CHANNELS;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += weight * src.pixels[idx + c] as f64;
                }
            }
        }

        let o = x as usize * CHANNELS;
        for (c, a) in acc.iter().enumerate() {
            out[o + c] = (a / kernel.sum).clamp(0.0, 255.0).round() as u8;
        }
        out[o + 3] = 255;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gray(width: u32, height: u32, value: u8) -> Raster {
        Raster::filled(width, height, [value, value, value, 255])
    }

    #[test]
    fn test_sharpen_kernel() {
        let k = ClarityKernel::for_clarity(40.0);
        assert_relative_eq!(k.weights[4], 2.6);
        assert_relative_eq!(k.weights[1], -0.4);
        assert_relative_eq!(k.sum, 1.0);
    }

    #[test]
    fn test_full_sharpen_kernel() {
        let k = ClarityKernel::for_clarity(100.0);
        assert_eq!(k.weights, [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0]);
        assert_eq!(k.sum, 1.0);
    }

    #[test]
    fn test_soften_kernel() {
        let k = ClarityKernel::for_clarity(-50.0);
        assert_eq!(k.weights[4], 1.0);
        assert_eq!(k.weights[1], 0.5);
        assert_eq!(k.sum, 3.0);
    }

    #[test]
    fn test_kernel_continuous_at_zero() {
        for clarity in [0.01, -0.01] {
            let k = ClarityKernel::for_clarity(clarity);
            assert_relative_eq!(k.weights[4] / k.sum, 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_uniform_gray_interior_unchanged() {
        let src = gray(8, 8, 100);
        for clarity in [40.0, 100.0, -30.0, -100.0] {
            let out = apply_clarity(&src, clarity);
            for y in 1..7 {
                for x in 1..7 {
                    assert_eq!(
                        out.pixel(x, y),
                        [100, 100, 100, 255],
                        "clarity {clarity} changed interior pixel ({x}, {y})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_soften_darkens_edges() {
        let src = gray(5, 5, 100);
        let out = apply_clarity(&src, -50.0);
        // Corner misses two taps of weight 0.5: (100 * 2) / 3
        assert_eq!(out.pixel(0, 0)[0], 67);
        // Edge misses one tap: (100 * 2.5) / 3
        assert_eq!(out.pixel(2, 0)[0], 83);
    }

    #[test]
    fn test_sharpen_brightens_edges() {
        let src = gray(5, 5, 100);
        let out = apply_clarity(&src, 40.0);
        // Corner: (2.6 - 2 * 0.4) * 100
        assert_eq!(out.pixel(0, 0)[0], 180);
    }

    #[test]
    fn test_sharpen_increases_local_contrast() {
        let mut src = gray(3, 3, 100);
        src.set_pixel(1, 1, [150, 150, 150, 255]);
        let out = apply_clarity(&src, 20.0);
        // Center: 1.8 * 150 - 4 * 0.2 * 100 = 190
        assert_eq!(out.pixel(1, 1)[0], 190);
    }

    #[test]
    fn test_edge_overshoot_grows_with_clarity() {
        let mut src = gray(8, 3, 100);
        for y in 0..3 {
            for x in 4..8 {
                src.set_pixel(x, y, [150, 150, 150, 255]);
            }
        }

        let mut previous: Option<(u8, u8)> = None;
        for clarity in [1.0, 10.0, 40.0, 100.0] {
            let out = apply_clarity(&src, clarity);
            let bright = out.pixel(4, 1)[0];
            let dark = out.pixel(3, 1)[0];
            assert!(bright >= 150 && dark <= 100);
            if let Some((prev_bright, prev_dark)) = previous {
                assert!(
                    bright >= prev_bright,
                    "clarity {clarity} bright side {bright} < {prev_bright}"
                );
                assert!(
                    dark <= prev_dark,
                    "clarity {clarity} dark side {dark} > {prev_dark}"
                );
            }
            previous = Some((bright, dark));
        }
        // Full strength: 5 * 150 - (150 + 150 + 150 + 100) = 200
        assert_eq!(previous, Some((200, 50)));
    }

    #[test]
    fn test_softening_grows_with_strength() {
        let mut src = gray(3, 3, 100);
        src.set_pixel(1, 1, [200, 200, 200, 255]);
        let mild = apply_clarity(&src, -10.0).pixel(1, 1)[0];
        let strong = apply_clarity(&src, -100.0).pixel(1, 1)[0];
        assert!(strong < mild && mild < 200);
        // (200 + 4 * 100) / 5
        assert_eq!(strong, 120);
    }

    #[test]
    fn test_output_clamped() {
        let mut src = gray(3, 3, 0);
        src.set_pixel(1, 1, [255, 255, 255, 255]);
        let out = apply_clarity(&src, 100.0);
        assert_eq!(out.pixel(1, 1)[0], 255);
        // Neighbors pick up -255 and clamp at black
        assert_eq!(out.pixel(1, 0)[0], 0);
    }

    #[test]
    fn test_alpha_forced_opaque() {
        let src = Raster::filled(4, 4, [10, 20, 30, 0]);
        let out = apply_clarity(&src, -10.0);
        assert!(out.pixels.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn test_single_pixel() {
        let src = gray(1, 1, 90);
        let out = apply_clarity(&src, -100.0);
        // Only the center tap: 90 * 1 / 5 at full soften
        assert_eq!(out.pixel(0, 0), [18, 18, 18, 255]);
    }

    #[test]
    fn test_empty_raster() {
        let src = Raster::filled(0, 0, [0, 0, 0, 0]);
        let out = apply_clarity(&src, 50.0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_large_raster_matches_rows() {
        // Exercises the parallel path when the feature is enabled
        let mut src = gray(300, 300, 80);
        src.set_pixel(150, 150, [200, 200, 200, 255]);
        let out = apply_clarity(&src, 60.0);
        assert_eq!(out.pixel(10, 10), [80, 80, 80, 255]);
        assert!(out.pixel(150, 150)[0] > 200 || out.pixel(150, 150)[0] == 255);
        assert!(out.pixel(151, 150)[0] < 80);
    }
}
