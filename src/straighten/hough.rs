//! Line-based skew detection
//!
//! Boosts faint edges with tiled histogram equalization, extracts an edge
//! map, and runs a Hough transform. The deviation of the detected lines
//! from the nearest image axis gives the page skew; horizontal baselines
//! are the preferred cue because ruled paper and text rows produce many
//! of them.

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::hough::{detect_lines, LineDetectionOptions, PolarLine};

use crate::filters::clahe;
use crate::geometry::{filter_outliers, mean, normalize_line_angle, OUTLIER_MIN_SAMPLES};

use super::types::{
    AngleEstimate, Evidence, LineCandidate, Result, CANNY_HIGH_THRESHOLD, CANNY_LOW_THRESHOLD,
    CLAHE_CLIP_LIMIT, CLAHE_GRID_SIZE, EDGE_BLUR_SIGMA, HOUGH_SUPPRESSION_RADIUS,
    HOUGH_VOTE_THRESHOLD,
};

/// Detect the skew angle from straight lines in the image.
pub fn detect(gray: &GrayImage) -> Result<AngleEstimate> {
    let equalized = clahe(gray, CLAHE_CLIP_LIMIT, CLAHE_GRID_SIZE, CLAHE_GRID_SIZE);
    let blurred = gaussian_blur_f32(&equalized, EDGE_BLUR_SIGMA);
    let edges = canny(&blurred, CANNY_LOW_THRESHOLD, CANNY_HIGH_THRESHOLD);

    let lines = detect_lines(
        &edges,
        LineDetectionOptions {
            vote_threshold: HOUGH_VOTE_THRESHOLD,
            suppression_radius: HOUGH_SUPPRESSION_RADIUS,
        },
    );

    if lines.is_empty() {
        return Ok(AngleEstimate::none());
    }

    // Split by nearest axis; the set nearer the horizontal normal wins
    // when non-empty, the perpendicular set is the fallback.
    let (axis_major, axis_minor): (Vec<PolarLine>, Vec<PolarLine>) = lines
        .into_iter()
        .partition(|line| line.angle_in_degrees < 45 || line.angle_in_degrees > 135);

    let selected = if !axis_major.is_empty() {
        axis_major
    } else {
        axis_minor
    };

    let candidates: Vec<LineCandidate> = selected
        .iter()
        .map(|line| LineCandidate {
            rho: line.r,
            theta: (line.angle_in_degrees as f32).to_radians(),
        })
        .collect();

    let mut deviations: Vec<f64> = candidates
        .iter()
        .map(|candidate| normalize_line_angle(candidate.theta as f64))
        .collect();

    if deviations.len() >= OUTLIER_MIN_SAMPLES {
        deviations = filter_outliers(&deviations);
    }

    let angle = match mean(&deviations) {
        Ok(angle) => angle,
        Err(_) => return Ok(AngleEstimate::none()),
    };

    Ok(AngleEstimate {
        angle_degrees: angle,
        evidence: Some(Evidence::Lines(candidates)),
    })
}
