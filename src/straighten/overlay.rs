//! Evidence visualization
//!
//! Draws the artifacts a detector based its estimate on over a copy of the
//! original page: Hough lines in red, region boxes in green, text-line
//! baselines in blue.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use super::types::Evidence;

const LINE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BOX_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
const BASELINE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Half-length of the segment drawn for an infinite Hough line
const LINE_EXTENT: f32 = 2000.0;

/// Draw the evidence set onto `canvas`.
pub fn draw_evidence(canvas: &mut RgbImage, evidence: &Evidence) {
    match evidence {
        Evidence::Lines(lines) => {
            for line in lines {
                let (sin, cos) = line.theta.sin_cos();
                let x0 = cos * line.rho;
                let y0 = sin * line.rho;
                draw_line_segment_mut(
                    canvas,
                    (x0 - LINE_EXTENT * sin, y0 + LINE_EXTENT * cos),
                    (x0 + LINE_EXTENT * sin, y0 - LINE_EXTENT * cos),
                    LINE_COLOR,
                );
            }
        }
        Evidence::Boxes(boxes) => {
            for oriented in boxes {
                let c = &oriented.corners;
                for i in 0..4 {
                    draw_line_segment_mut(canvas, c[i], c[(i + 1) % 4], BOX_COLOR);
                }
            }
        }
        Evidence::TextLines(clusters) => {
            for cluster in clusters {
                let (start, end) = cluster.baseline();
                draw_line_segment_mut(canvas, start, end, BASELINE_COLOR);
            }
        }
    }
}
