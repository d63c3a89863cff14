//! Straighten module core types
//!
//! Data structures for skew detection and correction: options, detection
//! methods, and the evidence each detector produces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================
// Constants
// ============================================================

/// Default maximum correction angle in degrees
pub const DEFAULT_MAX_ANGLE: f64 = 30.0;

/// Angles below this magnitude are treated as noise and not corrected
pub const ROTATION_THRESHOLD_DEGREES: f64 = 0.1;

/// CLAHE clip limit applied before edge detection
pub const CLAHE_CLIP_LIMIT: f32 = 2.0;

/// CLAHE tile grid size (NxN)
pub const CLAHE_GRID_SIZE: u32 = 8;

/// Gaussian sigma equivalent to a 5x5 smoothing kernel
pub const EDGE_BLUR_SIGMA: f32 = 1.1;

/// Canny hysteresis thresholds
pub const CANNY_LOW_THRESHOLD: f32 = 50.0;
pub const CANNY_HIGH_THRESHOLD: f32 = 150.0;

/// Minimum accumulator votes for a Hough line
pub const HOUGH_VOTE_THRESHOLD: u32 = 200;

/// Suppression radius for near-duplicate Hough lines
pub const HOUGH_SUPPRESSION_RADIUS: u32 = 8;

/// Regions smaller than this fraction of the image area are noise
pub const MIN_REGION_AREA_FRACTION: f64 = 0.001;

/// Glyph boxes need at least this many pixels on each side
pub const MIN_GLYPH_SIDE: u32 = 5;

/// Glyph boxes larger than dimension / MAX_GLYPH_DIVISOR are rejected
pub const MAX_GLYPH_DIVISOR: u32 = 3;

/// Boxes within this multiple of the median glyph height join a text line
pub const LINE_GROUP_FACTOR: f64 = 0.7;

/// A text line cluster needs at least this many glyph boxes for a fit
pub const MIN_CLUSTER_SIZE: usize = 3;

// ============================================================
// Error Types
// ============================================================

/// Straighten error types
#[derive(Debug, Error)]
pub enum StraightenError {
    #[error("Empty image: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("Detection failed: {0}")]
    DetectionFailed(String),
}

pub type Result<T> = std::result::Result<T, StraightenError>;

// ============================================================
// Detection Method
// ============================================================

/// Skew detection methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    /// Hough line transform over detected edges
    #[default]
    Hough,
    /// Minimum-area rectangles around binarized content regions
    Contour,
    /// Stable glyph regions clustered into text lines
    Mser,
}

impl DetectionMethod {
    /// Short name used in output file names and logs
    pub fn name(self) -> &'static str {
        match self {
            DetectionMethod::Hough => "hough",
            DetectionMethod::Contour => "contour",
            DetectionMethod::Mser => "mser",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================
// Options
// ============================================================

/// Straighten options
#[derive(Debug, Clone)]
pub struct StraightenOptions {
    /// Detection method
    pub method: DetectionMethod,
    /// Maximum correction angle in degrees; larger detections are clamped
    pub max_angle: f64,
    /// Write evidence overlay images alongside the straightened output
    pub show_lines: bool,
    /// Destination directory for all artifacts
    pub output_dir: PathBuf,
}

impl Default for StraightenOptions {
    fn default() -> Self {
        Self {
            method: DetectionMethod::Hough,
            max_angle: DEFAULT_MAX_ANGLE,
            show_lines: false,
            output_dir: PathBuf::from("processed"),
        }
    }
}

impl StraightenOptions {
    /// Create a new options builder
    pub fn builder() -> StraightenOptionsBuilder {
        StraightenOptionsBuilder::default()
    }
}

/// Builder for StraightenOptions
#[derive(Debug, Default)]
pub struct StraightenOptionsBuilder {
    options: StraightenOptions,
}

impl StraightenOptionsBuilder {
    /// Set the detection method
    pub fn method(mut self, method: DetectionMethod) -> Self {
        self.options.method = method;
        self
    }

    /// Set the maximum correction angle (sign is ignored)
    pub fn max_angle(mut self, angle: f64) -> Self {
        self.options.max_angle = angle.abs();
        self
    }

    /// Enable or disable evidence overlay output
    pub fn show_lines(mut self, show: bool) -> Self {
        self.options.show_lines = show;
        self
    }

    /// Set the output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.output_dir = dir.into();
        self
    }

    /// Build the options
    pub fn build(self) -> StraightenOptions {
        self.options
    }
}

// ============================================================
// Evidence
// ============================================================

/// An infinite line in normal form, as produced by the Hough transform.
///
/// The line satisfies `x·cos(theta) + y·sin(theta) = rho`, with `theta`
/// in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCandidate {
    /// Signed distance from the image origin
    pub rho: f32,
    /// Normal angle in radians, `[0, π)`
    pub theta: f32,
}

/// A rotated rectangle enclosing one content region.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientedBox {
    /// Corner points in order around the rectangle
    pub corners: [(f32, f32); 4],
    /// Signed deviation from axis alignment, degrees in `(-45°, 45°]`
    pub angle: f64,
}

/// Axis-aligned bounding box of a candidate text glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl GlyphBox {
    /// Center of the box
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }
}

/// A fitted text line: member glyph boxes plus the least-squares line
/// through their centers.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLineCluster {
    /// Member boxes ordered by vertical position
    pub boxes: Vec<GlyphBox>,
    /// Slope of the fitted baseline
    pub slope: f64,
    /// Intercept of the fitted baseline
    pub intercept: f64,
}

impl TextLineCluster {
    /// Endpoints of the fitted baseline spanning the cluster, for drawing.
    pub fn baseline(&self) -> ((f32, f32), (f32, f32)) {
        let left = self
            .boxes
            .iter()
            .map(|b| b.center().0)
            .fold(f64::INFINITY, f64::min);
        let right = self
            .boxes
            .iter()
            .map(|b| b.center().0)
            .fold(f64::NEG_INFINITY, f64::max);
        (
            (left as f32, (self.slope * left + self.intercept) as f32),
            (right as f32, (self.slope * right + self.intercept) as f32),
        )
    }
}

/// The geometric artifacts a detector derived its angle from, retained for
/// optional visualization.
#[derive(Debug, Clone)]
pub enum Evidence {
    /// Hough line candidates
    Lines(Vec<LineCandidate>),
    /// Min-area rectangles around content regions
    Boxes(Vec<OrientedBox>),
    /// Clustered text lines
    TextLines(Vec<TextLineCluster>),
}

impl Evidence {
    /// Number of underlying artifacts
    pub fn len(&self) -> usize {
        match self {
            Evidence::Lines(lines) => lines.len(),
            Evidence::Boxes(boxes) => boxes.len(),
            Evidence::TextLines(clusters) => clusters.len(),
        }
    }

    /// True when the evidence set is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A detector's output: the estimated skew angle plus the evidence it was
/// derived from. A zero angle with no evidence means "no skew detected".
#[derive(Debug, Clone)]
pub struct AngleEstimate {
    /// Estimated skew in degrees, always in `(-90°, 90°]`
    pub angle_degrees: f64,
    /// Supporting artifacts, absent when no signal was found
    pub evidence: Option<Evidence>,
}

impl AngleEstimate {
    /// The "no skew detected" estimate
    pub fn none() -> Self {
        Self {
            angle_degrees: 0.0,
            evidence: None,
        }
    }
}
