//! Geometry and statistics utilities
//!
//! Pure helpers shared by all skew detectors: angle normalization and
//! clamping, quartile-based outlier rejection, and least-squares fitting.

use thiserror::Error;

/// Minimum number of samples required before outlier filtering is attempted
pub const OUTLIER_MIN_SAMPLES: usize = 4;

/// Multiplier applied to the inter-quartile range when computing fences
pub const IQR_FENCE_FACTOR: f64 = 1.5;

/// Geometry error types
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Empty input sequence")]
    EmptyInput,

    #[error("Degenerate fit: {0}")]
    DegenerateFit(String),
}

pub type Result<T> = std::result::Result<T, GeometryError>;

/// Arithmetic mean of a sequence.
///
/// Fails on an empty sequence; callers must guard.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(GeometryError::EmptyInput);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Clamp an angle to `[-max_abs, max_abs]`, preserving its sign.
pub fn clamp_angle(angle: f64, max_abs: f64) -> f64 {
    if angle.abs() <= max_abs {
        angle
    } else if angle > 0.0 {
        max_abs
    } else {
        -max_abs
    }
}

/// Map a raw line angle from Hough space (radians, `[0, π)`) to a signed
/// degrees deviation from the nearest image axis.
///
/// Angles within 45° of the horizontal-normal direction (θ < π/4 or
/// θ > 3π/4) are measured against that axis; everything else is measured
/// against the perpendicular axis. The result lies in `(-45°, 45°]`.
pub fn normalize_line_angle(theta: f64) -> f64 {
    let quarter = std::f64::consts::FRAC_PI_4;
    if theta < quarter {
        theta.to_degrees()
    } else if theta > 3.0 * quarter {
        (theta - std::f64::consts::PI).to_degrees()
    } else {
        (theta - std::f64::consts::FRAC_PI_2).to_degrees()
    }
}

/// Drop values outside the Tukey fences `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]`.
///
/// Returns the input unchanged when fewer than [`OUTLIER_MIN_SAMPLES`]
/// values are supplied, or when filtering would empty the set.
pub fn filter_outliers(values: &[f64]) -> Vec<f64> {
    if values.len() < OUTLIER_MIN_SAMPLES {
        return values.to_vec();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q1 = percentile(&sorted, 25.0);
    let q3 = percentile(&sorted, 75.0);
    let iqr = q3 - q1;
    let lower = q1 - IQR_FENCE_FACTOR * iqr;
    let upper = q3 + IQR_FENCE_FACTOR * iqr;

    let filtered: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| *v >= lower && *v <= upper)
        .collect();

    if filtered.is_empty() {
        values.to_vec()
    } else {
        filtered
    }
}

/// Linearly interpolated percentile over pre-sorted values.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

/// Ordinary least-squares line fit.
///
/// Returns `(slope, intercept)` for `ys` over `xs`. Fails when fewer than
/// two points are supplied or the x-values carry no variance.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Result<(f64, f64)> {
    if xs.len() < 2 || xs.len() != ys.len() {
        return Err(GeometryError::DegenerateFit(format!(
            "need at least 2 paired points, got {}x/{}y",
            xs.len(),
            ys.len()
        )));
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
    }

    if sxx.abs() < f64::EPSILON {
        return Err(GeometryError::DegenerateFit(
            "x-values carry no variance".to_string(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    Ok((slope, intercept))
}
