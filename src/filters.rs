//! Intensity filters shared by the straighten and enhance pipelines
//!
//! Contains the tiled adaptive histogram equalization (CLAHE) used to lift
//! faint pen strokes before edge detection, plus small point operations the
//! enhancement modes build on. Convolution-style filters (Gaussian blur,
//! sharpening, median denoise) come from `imageproc`; only the operations
//! it lacks are implemented here.

use image::{GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;

/// Number of histogram bins for 8-bit intensity data
const HISTOGRAM_BINS: usize = 256;

/// Gaussian sigma used to estimate the page background for illumination
/// flattening (matches a 51x51 smoothing window)
const BACKGROUND_SIGMA: f32 = 8.0;

/// Contrast-limited adaptive histogram equalization.
///
/// The image is divided into a `grid_x` x `grid_y` tile grid. Each tile gets
/// its own clipped histogram mapping; per-pixel output bilinearly blends the
/// mappings of the four surrounding tile centers, which avoids visible tile
/// seams. `clip_limit` is the multiple of the uniform bin height at which
/// histogram bins are clipped, with the excess redistributed evenly.
pub fn clahe(gray: &GrayImage, clip_limit: f32, grid_x: u32, grid_y: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    let grid_x = grid_x.max(1).min(width);
    let grid_y = grid_y.max(1).min(height);
    let tile_w = width.div_ceil(grid_x);
    let tile_h = height.div_ceil(grid_y);

    // One clipped-CDF lookup table per tile.
    let mut luts = vec![[0u8; HISTOGRAM_BINS]; (grid_x * grid_y) as usize];
    for ty in 0..grid_y {
        for tx in 0..grid_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);

            let mut histogram = [0u32; HISTOGRAM_BINS];
            for y in y0..y1 {
                for x in x0..x1 {
                    histogram[gray.get_pixel(x, y).0[0] as usize] += 1;
                }
            }

            let tile_pixels = ((x1 - x0) * (y1 - y0)) as f32;
            let limit = ((clip_limit * tile_pixels / HISTOGRAM_BINS as f32).max(1.0)) as u32;
            clip_histogram(&mut histogram, limit);

            let lut = &mut luts[(ty * grid_x + tx) as usize];
            let mut cumulative = 0u32;
            for (bin, entry) in lut.iter_mut().enumerate() {
                cumulative += histogram[bin];
                *entry = ((cumulative as f32 / tile_pixels) * 255.0).round().min(255.0) as u8;
            }
        }
    }

    let mut output = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let value = gray.get_pixel(x, y).0[0] as usize;

            // Position relative to tile centers, clamped at the borders.
            let fx = (x as f32 - tile_w as f32 / 2.0) / tile_w as f32;
            let fy = (y as f32 - tile_h as f32 / 2.0) / tile_h as f32;
            let tx0 = fx.floor().max(0.0) as u32;
            let ty0 = fy.floor().max(0.0) as u32;
            let tx0 = tx0.min(grid_x - 1);
            let ty0 = ty0.min(grid_y - 1);
            let tx1 = (tx0 + 1).min(grid_x - 1);
            let ty1 = (ty0 + 1).min(grid_y - 1);
            let wx = (fx - fx.floor()).clamp(0.0, 1.0);
            let wy = (fy - fy.floor()).clamp(0.0, 1.0);

            let v00 = luts[(ty0 * grid_x + tx0) as usize][value] as f32;
            let v10 = luts[(ty0 * grid_x + tx1) as usize][value] as f32;
            let v01 = luts[(ty1 * grid_x + tx0) as usize][value] as f32;
            let v11 = luts[(ty1 * grid_x + tx1) as usize][value] as f32;

            let blended = v00 * (1.0 - wx) * (1.0 - wy)
                + v10 * wx * (1.0 - wy)
                + v01 * (1.0 - wx) * wy
                + v11 * wx * wy;

            output.put_pixel(x, y, Luma([blended.round().clamp(0.0, 255.0) as u8]));
        }
    }

    output
}

/// Clip histogram bins at `limit` and redistribute the excess evenly.
fn clip_histogram(histogram: &mut [u32; HISTOGRAM_BINS], limit: u32) {
    let mut excess = 0u32;
    for bin in histogram.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }

    let share = excess / HISTOGRAM_BINS as u32;
    let mut remainder = (excess % HISTOGRAM_BINS as u32) as usize;
    for bin in histogram.iter_mut() {
        *bin += share;
        if remainder > 0 {
            *bin += 1;
            remainder -= 1;
        }
    }
}

/// Linear contrast/brightness adjustment: `out = alpha * in + beta`,
/// saturated to the 8-bit range.
pub fn adjust_contrast(gray: &GrayImage, alpha: f32, beta: f32) -> GrayImage {
    let mut output = gray.clone();
    for pixel in output.pixels_mut() {
        let value = alpha * pixel.0[0] as f32 + beta;
        pixel.0[0] = value.round().clamp(0.0, 255.0) as u8;
    }
    output
}

/// Flatten uneven illumination by dividing each pixel by a heavily blurred
/// copy of the page, rescaled back to the 8-bit range. Shadows and lighting
/// gradients cancel out while local contrast (ink vs paper) survives.
pub fn flatten_illumination(gray: &GrayImage) -> GrayImage {
    let background = gaussian_blur_f32(gray, BACKGROUND_SIGMA);
    let mut output = gray.clone();
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let bg = background.get_pixel(x, y).0[0] as f32;
        let value = if bg > 0.0 {
            pixel.0[0] as f32 / bg * 255.0
        } else {
            255.0
        };
        pixel.0[0] = value.round().clamp(0.0, 255.0) as u8;
    }
    output
}
