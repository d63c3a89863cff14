//! Shape-based skew detection
//!
//! Binarizes the page so ink becomes foreground, traces the outer outline
//! of each content region, and reads the skew off the minimum-area rotated
//! rectangle around every region large enough to matter.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::geometry::min_area_rect;
use imageproc::point::Point;

use crate::geometry::mean;

use super::types::{AngleEstimate, Evidence, OrientedBox, Result, MIN_REGION_AREA_FRACTION};

/// Detect the skew angle from the dominant content regions.
pub fn detect(gray: &GrayImage) -> Result<AngleEstimate> {
    let level = otsu_level(gray);
    // Inverted polarity: ink is darker than paper, so content becomes
    // the nonzero foreground the contour tracer follows.
    let binary = threshold(gray, level, ThresholdType::BinaryInverted);

    let contours: Vec<Contour<i32>> = find_contours(&binary);
    let min_area = gray.width() as f64 * gray.height() as f64 * MIN_REGION_AREA_FRACTION;

    let mut angles = Vec::new();
    let mut boxes = Vec::new();
    for contour in &contours {
        if contour.border_type != BorderType::Outer || contour.parent.is_some() {
            continue;
        }
        if polygon_area(&contour.points) <= min_area {
            continue;
        }

        let corners = min_area_rect(&contour.points);
        let oriented = OrientedBox::from_corners(corners);
        angles.push(oriented.angle);
        boxes.push(oriented);
    }

    if angles.is_empty() {
        return Ok(AngleEstimate::none());
    }

    let angle = match mean(&angles) {
        Ok(angle) => angle,
        Err(_) => return Ok(AngleEstimate::none()),
    };

    Ok(AngleEstimate {
        angle_degrees: angle,
        evidence: Some(Evidence::Boxes(boxes)),
    })
}

impl OrientedBox {
    /// Build an oriented box from min-area-rect corners, deriving the
    /// signed deviation from axis alignment.
    ///
    /// The rectangle's "width" edge is the one whose direction falls in
    /// `[-90°, 0°)`; its angle is the raw orientation. When the width is
    /// the shorter side the region is taller than wide and the raw value
    /// measures against the wrong axis, so 90° is added. The result is
    /// finally folded into `(-45°, 45°]`, which maps axis-aligned regions
    /// to zero regardless of which edge the rectangle fit emitted first.
    pub fn from_corners(corners: [Point<i32>; 4]) -> Self {
        let pts: Vec<(f32, f32)> = corners
            .iter()
            .map(|p| (p.x as f32, p.y as f32))
            .collect();

        let edge_a = (pts[1].0 - pts[0].0, pts[1].1 - pts[0].1);
        let edge_b = (pts[2].0 - pts[1].0, pts[2].1 - pts[1].1);
        let len_a = (edge_a.0 * edge_a.0 + edge_a.1 * edge_a.1).sqrt() as f64;
        let len_b = (edge_b.0 * edge_b.0 + edge_b.1 * edge_b.1).sqrt() as f64;

        let angle_a = fold_half_turn((edge_a.1 as f64).atan2(edge_a.0 as f64).to_degrees());

        // Exactly one of the two perpendicular edges has its direction in
        // [-90, 0); that edge is the width edge.
        let (raw, width, height) = if (-90.0..0.0).contains(&angle_a) {
            (angle_a, len_a, len_b)
        } else {
            let angle_b = angle_a - 90.0;
            (angle_b, len_b, len_a)
        };

        let angle = if width < height { 90.0 + raw } else { raw };

        Self {
            corners: [pts[0], pts[1], pts[2], pts[3]],
            angle: fold_quarter_turn(angle),
        }
    }
}

/// Normalize a direction angle into `[-90°, 90°)`, treating opposite
/// directions as the same line.
fn fold_half_turn(mut degrees: f64) -> f64 {
    while degrees >= 90.0 {
        degrees -= 180.0;
    }
    while degrees < -90.0 {
        degrees += 180.0;
    }
    degrees
}

/// Fold a rectangle orientation into `(-45°, 45°]`. A rectangle is
/// indistinguishable from itself rotated a quarter turn, so deviations are
/// measured against the nearest axis.
fn fold_quarter_turn(mut degrees: f64) -> f64 {
    while degrees > 45.0 {
        degrees -= 90.0;
    }
    while degrees <= -45.0 {
        degrees += 90.0;
    }
    degrees
}

/// Shoelace area of a closed pixel polygon.
fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut doubled = 0i64;
    for i in 0..points.len() {
        let j = (i + 1) % points.len();
        doubled += points[i].x as i64 * points[j].y as i64;
        doubled -= points[j].x as i64 * points[i].y as i64;
    }
    (doubled.abs() as f64) / 2.0
}
