//! Text-region skew detection
//!
//! Extracts glyph-sized blobs as maximally stable dark regions: the image
//! is thresholded at a ladder of intensity levels and a region counts as
//! stable once its bounding box persists with little area change across
//! consecutive levels. Stable boxes are clustered into text lines by
//! vertical proximity and each line's baseline slope votes for the page
//! skew.

use image::GrayImage;
use std::collections::VecDeque;

use crate::geometry::{linear_fit, mean};

use super::types::{
    AngleEstimate, Evidence, GlyphBox, Result, TextLineCluster, LINE_GROUP_FACTOR,
    MAX_GLYPH_DIVISOR, MIN_CLUSTER_SIZE, MIN_GLYPH_SIDE,
};

/// Intensity step between consecutive threshold levels
const LEVEL_DELTA: u8 = 10;

/// Relative area change below which a region counts as stable
const MAX_AREA_VARIATION: f64 = 0.25;

/// Consecutive stable levels required before a region is emitted
const MIN_STABLE_LEVELS: u32 = 2;

/// Bounding-box overlap required to match regions across levels
const MATCH_MIN_IOU: f64 = 0.55;

/// Components covering more than this fraction of the image are page
/// background bleed, not glyphs
const MAX_COMPONENT_FRACTION: f64 = 0.25;

/// Detect the skew angle from clustered text-line slopes.
pub fn detect(gray: &GrayImage) -> Result<AngleEstimate> {
    let (width, height) = gray.dimensions();

    let mut boxes: Vec<GlyphBox> = stable_region_boxes(gray)
        .into_iter()
        .filter(|b| {
            b.width > MIN_GLYPH_SIDE
                && b.height > MIN_GLYPH_SIDE
                && b.width < width / MAX_GLYPH_DIVISOR
                && b.height < height / MAX_GLYPH_DIVISOR
        })
        .collect();

    if boxes.is_empty() {
        return Ok(AngleEstimate::none());
    }

    boxes.sort_by_key(|b| b.y);

    let mut heights: Vec<f64> = boxes.iter().map(|b| b.height as f64).collect();
    heights.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let line_height = heights[heights.len() / 2];

    let clusters = cluster_lines(&boxes, line_height);
    if clusters.is_empty() {
        return Ok(AngleEstimate::none());
    }

    let mut angles = Vec::new();
    let mut fitted = Vec::new();
    for members in clusters {
        let (xs, ys): (Vec<f64>, Vec<f64>) = members.iter().map(|b| b.center()).unzip();
        // A degenerate fit (stacked boxes with identical x) carries no
        // baseline information; skip the cluster.
        let Ok((slope, intercept)) = linear_fit(&xs, &ys) else {
            continue;
        };
        angles.push(slope.atan().to_degrees());
        fitted.push(TextLineCluster {
            boxes: members,
            slope,
            intercept,
        });
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
        evidence: Some(Evidence::TextLines(fitted)),
    })
}

/// Greedily group vertically adjacent boxes into text lines.
///
/// Boxes must already be sorted by `y`. Consecutive boxes whose vertical
/// positions differ by less than `LINE_GROUP_FACTOR` times the median
/// glyph height share a line; lines with fewer than [`MIN_CLUSTER_SIZE`]
/// members are dropped.
fn cluster_lines(boxes: &[GlyphBox], line_height: f64) -> Vec<Vec<GlyphBox>> {
    let mut clusters = Vec::new();
    let mut current = vec![boxes[0]];

    for pair in boxes.windows(2) {
        let gap = (pair[1].y as f64 - pair[0].y as f64).abs();
        if gap < line_height * LINE_GROUP_FACTOR {
            current.push(pair[1]);
        } else {
            if current.len() >= MIN_CLUSTER_SIZE {
                clusters.push(current);
            }
            current = vec![pair[1]];
        }
    }
    if current.len() >= MIN_CLUSTER_SIZE {
        clusters.push(current);
    }

    clusters
}

// ============================================================
// Stable region extraction
// ============================================================

#[derive(Debug, Clone, Copy)]
struct Region {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    area: u32,
    stable_for: u32,
    emitted: bool,
}

impl Region {
    fn to_box(self) -> GlyphBox {
        GlyphBox {
            x: self.min_x,
            y: self.min_y,
            width: self.max_x - self.min_x + 1,
            height: self.max_y - self.min_y + 1,
        }
    }

    fn iou(&self, other: &Region) -> f64 {
        let ix0 = self.min_x.max(other.min_x);
        let iy0 = self.min_y.max(other.min_y);
        let ix1 = self.max_x.min(other.max_x);
        let iy1 = self.max_y.min(other.max_y);
        if ix1 < ix0 || iy1 < iy0 {
            return 0.0;
        }
        let inter = ((ix1 - ix0 + 1) as f64) * ((iy1 - iy0 + 1) as f64);
        let area_a = ((self.max_x - self.min_x + 1) as f64) * ((self.max_y - self.min_y + 1) as f64);
        let area_b =
            ((other.max_x - other.min_x + 1) as f64) * ((other.max_y - other.min_y + 1) as f64);
        inter / (area_a + area_b - inter)
    }
}

/// Sweep the threshold ladder and collect bounding boxes of dark regions
/// that stay stable across consecutive levels.
fn stable_region_boxes(gray: &GrayImage) -> Vec<GlyphBox> {
    let (width, height) = gray.dimensions();
    let max_component = (width as f64 * height as f64 * MAX_COMPONENT_FRACTION) as u32;

    let mut stable = Vec::new();
    let mut previous: Vec<Region> = Vec::new();

    let mut level = LEVEL_DELTA;
    while level < u8::MAX {
        let mut current = dark_components(gray, level, max_component);

        for region in current.iter_mut() {
            let matched = previous.iter().find(|prev| {
                let variation =
                    (region.area as f64 - prev.area as f64).abs() / prev.area.max(1) as f64;
                variation < MAX_AREA_VARIATION && prev.iou(region) > MATCH_MIN_IOU
            });

            if let Some(prev) = matched {
                region.stable_for = prev.stable_for + 1;
                region.emitted = prev.emitted;
                if region.stable_for >= MIN_STABLE_LEVELS && !region.emitted {
                    stable.push(region.to_box());
                    region.emitted = true;
                }
            }
        }

        previous = current;
        level = level.saturating_add(LEVEL_DELTA);
    }

    stable
}

/// Connected components of pixels darker than `level`, 8-connected.
///
/// Components larger than `max_area` pixels are discarded outright.
fn dark_components(gray: &GrayImage, level: u8, max_area: u32) -> Vec<Region> {
    let (width, height) = gray.dimensions();
    let mut visited = vec![false; (width * height) as usize];
    let mut regions = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize;
            if visited[idx] || gray.get_pixel(x, y).0[0] >= level {
                continue;
            }

            let region = flood_fill(gray, level, x, y, &mut visited);
            if region.area <= max_area {
                regions.push(region);
            }
        }
    }

    regions
}

fn flood_fill(
    gray: &GrayImage,
    level: u8,
    start_x: u32,
    start_y: u32,
    visited: &mut [bool],
) -> Region {
    let (width, height) = gray.dimensions();
    let mut region = Region {
        min_x: start_x,
        min_y: start_y,
        max_x: start_x,
        max_y: start_y,
        area: 0,
        stable_for: 0,
        emitted: false,
    };

    let mut queue = VecDeque::new();
    queue.push_back((start_x, start_y));
    visited[(start_y * width + start_x) as usize] = true;

    while let Some((x, y)) = queue.pop_front() {
        region.area += 1;
        region.min_x = region.min_x.min(x);
        region.min_y = region.min_y.min(y);
        region.max_x = region.max_x.max(x);
        region.max_y = region.max_y.max(y);

        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                    continue;
                }
                let (nx, ny) = (nx as u32, ny as u32);
                let idx = (ny * width + nx) as usize;
                if !visited[idx] && gray.get_pixel(nx, ny).0[0] < level {
                    visited[idx] = true;
                    queue.push_back((nx, ny));
                }
            }
        }
    }

    region
}
