//! Skew detection and correction
//!
//! Estimates a page's rotation angle from one of three independent visual
//! cues and applies a bounded corrective rotation:
//!
//! - **hough** — straight edges found by a Hough transform ([`hough`])
//! - **contour** — min-area rectangles around binarized content ([`contour`])
//! - **mser** — stable glyph regions clustered into text lines ([`mser`])
//!
//! Detectors never fail just because a page carries no usable signal; they
//! return a zero angle with no evidence and the page is left untouched.
//!
//! # Example
//!
//! ```rust,no_run
//! use image::GrayImage;
//! use scanprep::straighten::{detect_angle, DetectionMethod};
//!
//! let gray = image::open("page.png").unwrap().to_luma8();
//! let estimate = detect_angle(&gray, DetectionMethod::Hough).unwrap();
//! println!("skew: {:.2} degrees", estimate.angle_degrees);
//! ```

mod contour;
mod hough;
mod mser;
mod overlay;
mod rotate;
mod types;

pub use overlay::draw_evidence;
pub use rotate::rotate;
pub use types::{
    AngleEstimate, DetectionMethod, Evidence, GlyphBox, LineCandidate, OrientedBox, Result,
    StraightenError, StraightenOptions, StraightenOptionsBuilder, TextLineCluster,
    DEFAULT_MAX_ANGLE, ROTATION_THRESHOLD_DEGREES,
};

use image::GrayImage;

/// Run the selected detector over a single-channel intensity grid.
///
/// Fails only on malformed input (an empty image); "no signal found" is a
/// valid outcome carried in the estimate itself.
pub fn detect_angle(gray: &GrayImage, method: DetectionMethod) -> Result<AngleEstimate> {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return Err(StraightenError::EmptyImage { width, height });
    }

    let estimate = match method {
        DetectionMethod::Hough => hough::detect(gray)?,
        DetectionMethod::Contour => contour::detect(gray)?,
        DetectionMethod::Mser => mser::detect(gray)?,
    };

    debug_assert!(
        estimate.angle_degrees > -90.0 && estimate.angle_degrees <= 90.0,
        "detector produced out-of-range angle {}",
        estimate.angle_degrees
    );

    Ok(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_empty_image_rejected() {
        let gray = GrayImage::new(0, 0);
        let result = detect_angle(&gray, DetectionMethod::Hough);
        assert!(matches!(
            result,
            Err(StraightenError::EmptyImage { .. })
        ));
    }

    #[test]
    fn test_all_methods_handle_blank_canvas() {
        let gray = GrayImage::from_pixel(200, 200, Luma([255u8]));
        for method in [
            DetectionMethod::Hough,
            DetectionMethod::Contour,
            DetectionMethod::Mser,
        ] {
            let estimate = detect_angle(&gray, method).unwrap();
            assert_eq!(estimate.angle_degrees, 0.0, "method {}", method);
            assert!(estimate.evidence.is_none(), "method {}", method);
        }
    }
}
