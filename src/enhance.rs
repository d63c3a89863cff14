//! Enhancement filters
//!
//! Cleans up photographed or scanned exam pages for readability. Four
//! modes cover the common capture situations; each is a fixed sequence of
//! grayscale, contrast, and binarization filters with no branching. The
//! enhance pipeline is deliberately independent from the straighten
//! pipeline; the two are invoked separately.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, RgbImage};
use imageproc::contrast::{adaptive_threshold, otsu_level, threshold, ThresholdType};
use imageproc::filter::{gaussian_blur_f32, median_filter, sharpen3x3};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::filters::{adjust_contrast, clahe, flatten_illumination};

// ============================================================
// Constants
// ============================================================

/// CLAHE grid used by all modes
const CLAHE_GRID: u32 = 8;

/// Adaptive threshold radius for standard and scan modes (11x11 window)
const ADAPTIVE_RADIUS_FINE: u32 = 5;

/// Adaptive threshold radius for handwriting mode (15x15 window)
const ADAPTIVE_RADIUS_COARSE: u32 = 7;

/// Scale factor for the side-by-side comparison image
const COMPARISON_SCALE: u32 = 2;

// ============================================================
// Mode and Options
// ============================================================

/// Enhancement modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EnhanceMode {
    /// Balanced cleanup for most copies
    #[default]
    Standard,
    /// Pen and pencil writing; preserves faint strokes
    Handwriting,
    /// Printed text and diagrams; crisp global binarization
    Document,
    /// Photographed pages with uneven lighting
    Scan,
}

impl EnhanceMode {
    /// Short name used in output file names and logs
    pub fn name(self) -> &'static str {
        match self {
            EnhanceMode::Standard => "standard",
            EnhanceMode::Handwriting => "handwriting",
            EnhanceMode::Document => "document",
            EnhanceMode::Scan => "scan",
        }
    }
}

impl fmt::Display for EnhanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Enhancement options
#[derive(Debug, Clone)]
pub struct EnhanceOptions {
    /// Processing mode
    pub mode: EnhanceMode,
    /// Also produce a half-scale original-vs-processed comparison image
    pub comparison: bool,
}

impl Default for EnhanceOptions {
    fn default() -> Self {
        Self {
            mode: EnhanceMode::Standard,
            comparison: true,
        }
    }
}

// ============================================================
// Filters
// ============================================================

/// Apply the selected enhancement mode to an image.
pub fn enhance(image: &DynamicImage, mode: EnhanceMode) -> GrayImage {
    let gray = image.to_luma8();
    match mode {
        EnhanceMode::Standard => enhance_standard(&gray),
        EnhanceMode::Handwriting => enhance_handwriting(&gray),
        EnhanceMode::Document => enhance_document(&gray),
        EnhanceMode::Scan => enhance_scan(&gray),
    }
}

/// Balanced cleanup: denoise, lift contrast, separate text from paper
/// with a local threshold, then sharpen the strokes.
fn enhance_standard(gray: &GrayImage) -> GrayImage {
    let blurred = gaussian_blur_f32(gray, 1.1);
    let equalized = clahe(&blurred, 2.0, CLAHE_GRID, CLAHE_GRID);
    let binary = adaptive_threshold(&equalized, ADAPTIVE_RADIUS_FINE);
    sharpen3x3(&binary)
}

/// Handwriting: boost contrast and brightness before equalization so light
/// pencil survives the local threshold.
fn enhance_handwriting(gray: &GrayImage) -> GrayImage {
    let adjusted = adjust_contrast(gray, 1.5, 10.0);
    let denoised = median_filter(&adjusted, 1, 1);
    let equalized = clahe(&denoised, 3.0, CLAHE_GRID, CLAHE_GRID);
    adaptive_threshold(&equalized, ADAPTIVE_RADIUS_COARSE)
}

/// Printed documents: mild smoothing and a global Otsu cut give the
/// cleanest result on uniform print.
fn enhance_document(gray: &GrayImage) -> GrayImage {
    let denoised = gaussian_blur_f32(gray, 0.8);
    let equalized = clahe(&denoised, 1.5, CLAHE_GRID, CLAHE_GRID);
    let sharpened = sharpen3x3(&equalized);
    let level = otsu_level(&sharpened);
    threshold(&sharpened, level, ThresholdType::Binary)
}

/// Photographed pages: cancel lighting gradients first, then proceed as
/// for standard copies.
fn enhance_scan(gray: &GrayImage) -> GrayImage {
    let flattened = flatten_illumination(gray);
    let denoised = median_filter(&flattened, 1, 1);
    let equalized = clahe(&denoised, 2.5, CLAHE_GRID, CLAHE_GRID);
    adaptive_threshold(&equalized, ADAPTIVE_RADIUS_FINE)
}

/// Build a half-scale side-by-side comparison of the original page and
/// its processed rendition.
pub fn comparison_image(original: &DynamicImage, processed: &GrayImage) -> RgbImage {
    let left = original.to_rgb8();
    let right = DynamicImage::ImageLuma8(processed.clone()).to_rgb8();

    let half_w = (left.width() / COMPARISON_SCALE).max(1);
    let half_h = (left.height() / COMPARISON_SCALE).max(1);
    let left_small = image::imageops::resize(&left, half_w, half_h, FilterType::Triangle);
    let right_small = image::imageops::resize(&right, half_w, half_h, FilterType::Triangle);

    let mut canvas = RgbImage::new(half_w * 2, half_h);
    image::imageops::replace(&mut canvas, &left_small, 0, 0);
    image::imageops::replace(&mut canvas, &right_small, half_w as i64, 0);
    canvas
}
