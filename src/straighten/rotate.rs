//! Rotation engine
//!
//! Applies the corrective rotation about the image center. Sampling
//! coordinates are clamped to the source bounds, which replicates edge
//! pixels into the uncovered corners instead of introducing dark borders.
//! Output dimensions always equal the input's.

use image::{DynamicImage, Rgb, RgbImage};

use super::types::ROTATION_THRESHOLD_DEGREES;

/// Bicubic kernel sharpness; -0.75 is the common choice for image
/// resampling.
const CUBIC_COEFFICIENT: f64 = -0.75;

/// Rotate the image counter-clockwise by `angle_degrees` about its center.
///
/// Angles below [`ROTATION_THRESHOLD_DEGREES`] in magnitude are treated as
/// noise: the input is returned unchanged, skipping the resampling pass
/// entirely.
pub fn rotate(image: &DynamicImage, angle_degrees: f64) -> DynamicImage {
    if angle_degrees.abs() < ROTATION_THRESHOLD_DEGREES {
        return image.clone();
    }

    let source = image.to_rgb8();
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    let theta = angle_degrees.to_radians();
    let (sin, cos) = theta.sin_cos();

    let mut output = RgbImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            // Inverse mapping: where in the source does this output pixel
            // come from?
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let sx = dx * cos - dy * sin + cx;
            let sy = dx * sin + dy * cos + cy;
            output.put_pixel(x, y, sample_bicubic(&source, sx, sy));
        }
    }

    DynamicImage::ImageRgb8(output)
}

/// Bicubic interpolation over a 4x4 neighborhood, with coordinates clamped
/// to the image bounds.
fn sample_bicubic(image: &RgbImage, x: f64, y: f64) -> Rgb<u8> {
    let (width, height) = image.dimensions();
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let wx = cubic_weights(fx);
    let wy = cubic_weights(fy);

    let mut accum = [0.0f64; 3];
    for (j, weight_y) in wy.iter().enumerate() {
        let sy = clamp_coord(y0 as i64 + j as i64 - 1, height);
        for (i, weight_x) in wx.iter().enumerate() {
            let sx = clamp_coord(x0 as i64 + i as i64 - 1, width);
            let pixel = image.get_pixel(sx, sy);
            let w = weight_x * weight_y;
            for c in 0..3 {
                accum[c] += w * pixel.0[c] as f64;
            }
        }
    }

    Rgb([
        accum[0].round().clamp(0.0, 255.0) as u8,
        accum[1].round().clamp(0.0, 255.0) as u8,
        accum[2].round().clamp(0.0, 255.0) as u8,
    ])
}

/// Catmull-Rom style weights for the four taps around fractional offset `t`.
fn cubic_weights(t: f64) -> [f64; 4] {
    let a = CUBIC_COEFFICIENT;
    let w = |d: f64| -> f64 {
        let d = d.abs();
        if d <= 1.0 {
            (a + 2.0) * d * d * d - (a + 3.0) * d * d + 1.0
        } else if d < 2.0 {
            a * d * d * d - 5.0 * a * d * d + 8.0 * a * d - 4.0 * a
        } else {
            0.0
        }
    };
    [w(1.0 + t), w(t), w(1.0 - t), w(2.0 - t)]
}

/// Clamp a sample coordinate into `[0, size)`; out-of-range taps replicate
/// the nearest edge pixel.
fn clamp_coord(coord: i64, size: u32) -> u32 {
    coord.clamp(0, size as i64 - 1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Luma};

    fn gradient_image(width: u32, height: u32) -> DynamicImage {
        let mut img = image::GrayImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Luma([((x * 3 + y * 5) % 256) as u8]);
        }
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn test_sub_threshold_angle_is_noop() {
        let img = gradient_image(80, 60);
        let rotated = rotate(&img, 0.05);

        assert_eq!(rotated.as_bytes(), img.as_bytes());
    }

    #[test]
    fn test_dimensions_preserved() {
        let img = gradient_image(123, 77);
        let rotated = rotate(&img, 9.5);

        assert_eq!(rotated.dimensions(), (123, 77));
    }

    #[test]
    fn test_rotation_moves_content() {
        let img = gradient_image(100, 100);
        let rotated = rotate(&img, 15.0);

        assert_ne!(rotated.to_rgb8().as_raw(), img.to_rgb8().as_raw());
    }

    #[test]
    fn test_rotation_roundtrip_recovers_image() {
        let img = gradient_image(120, 120);
        let there = rotate(&img, 10.0);
        let back = rotate(&there, -10.0);

        // Compare the central region; corners lose information to edge
        // replication. Interpolation noise stays small.
        let original = img.to_rgb8();
        let recovered = back.to_rgb8();
        let mut total_diff = 0u64;
        let mut count = 0u64;
        for y in 30..90 {
            for x in 30..90 {
                let a = original.get_pixel(x, y).0[0] as i64;
                let b = recovered.get_pixel(x, y).0[0] as i64;
                total_diff += (a - b).unsigned_abs();
                count += 1;
            }
        }
        let mean_diff = total_diff as f64 / count as f64;
        assert!(mean_diff < 20.0, "mean abs diff {}", mean_diff);
    }

    #[test]
    fn test_borders_replicate_not_black() {
        let white = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(
            100,
            100,
            Luma([255u8]),
        ));
        let rotated = rotate(&white, 20.0).to_rgb8();

        // A uniform white page stays white everywhere, corners included.
        for corner in [(0u32, 0u32), (99, 0), (0, 99), (99, 99)] {
            let pixel = rotated.get_pixel(corner.0, corner.1);
            assert!(
                pixel.0.iter().all(|&c| c > 250),
                "corner {:?} darkened: {:?}",
                corner,
                pixel
            );
        }
    }

    #[test]
    fn test_quarter_turn_direction() {
        // A dark column right of center should land above center after a
        // 90 degree counter-clockwise turn.
        let mut img = image::GrayImage::from_pixel(101, 101, Luma([255u8]));
        for y in 0..101 {
            img.put_pixel(80, y, Luma([0u8]));
        }
        let rotated = rotate(&DynamicImage::ImageLuma8(img), 90.0).to_rgb8();

        let above_center = rotated.get_pixel(50, 21).0[0];
        assert!(above_center < 50, "expected dark pixel, got {}", above_center);
    }
}
