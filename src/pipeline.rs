//! Processing pipelines
//!
//! Wires the collaborators together: the straighten pipeline runs
//! load -> detect -> clamp -> rotate -> persist for one page, the enhance
//! pipeline runs load -> filter -> persist. Each invocation is synchronous
//! and owns its buffers; callers wanting parallelism run independent
//! invocations side by side.
//!
//! Observability is injected: both pipelines report through a
//! [`ProgressCallback`] supplied by the caller instead of a global logger.

use image::{DynamicImage, GenericImageView};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::enhance::{comparison_image, enhance, EnhanceOptions};
use crate::geometry::clamp_angle;
use crate::store::{ImageStore, StoreError};
use crate::straighten::{
    detect_angle, draw_evidence, rotate, StraightenError, StraightenOptions,
    ROTATION_THRESHOLD_DEGREES,
};

/// Pipeline error types
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Straighten(#[from] StraightenError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

// ============================================================
// Progress Callback
// ============================================================

/// Observer for pipeline progress, injected per invocation.
pub trait ProgressCallback: Sync {
    /// A pipeline stage is starting
    fn on_step_start(&self, step: &str) {
        let _ = step;
    }

    /// A pipeline stage finished with a human-readable summary
    fn on_step_complete(&self, step: &str, message: &str) {
        let _ = (step, message);
    }

    /// Diagnostic detail, only interesting at high verbosity
    fn on_debug(&self, message: &str) {
        let _ = message;
    }
}

/// Callback that swallows all progress reports.
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {}

// ============================================================
// Straighten Pipeline
// ============================================================

/// Result of one straighten invocation
#[derive(Debug)]
pub struct StraightenOutcome {
    /// Source image path
    pub input: PathBuf,
    /// Angle the detector estimated, degrees
    pub detected_angle: f64,
    /// Angle actually applied after clamping, degrees
    pub applied_angle: f64,
    /// Whether the clamp changed the detected angle
    pub clamped: bool,
    /// Whether a rotation was applied (false for sub-threshold skew)
    pub rotated: bool,
    /// Number of evidence artifacts behind the estimate
    pub evidence_count: usize,
    /// Straightened page
    pub output_path: PathBuf,
    /// Evidence overlay on the original page, when requested
    pub detection_path: Option<PathBuf>,
    /// Evidence overlay after rotation, when requested
    pub detection_rotated_path: Option<PathBuf>,
}

/// Skew detection and correction pipeline for one page at a time.
pub struct StraightenPipeline {
    options: StraightenOptions,
    store: ImageStore,
}

impl StraightenPipeline {
    /// Create a pipeline; the store's output directory is created eagerly
    /// so a misconfigured destination fails before any work happens.
    pub fn new(options: StraightenOptions) -> Result<Self> {
        let store = ImageStore::new(&options.output_dir)?;
        Ok(Self { options, store })
    }

    /// The effective options
    pub fn options(&self) -> &StraightenOptions {
        &self.options
    }

    /// Process a single page: detect its skew, apply the bounded
    /// correction, and persist the straightened page plus any requested
    /// evidence overlays.
    pub fn run(&self, input: &Path, progress: &dyn ProgressCallback) -> Result<StraightenOutcome> {
        progress.on_step_start("load");
        let image = self.store.load(input)?;
        progress.on_step_complete("load", &format!("{}x{}", image.width(), image.height()));

        progress.on_step_start("detect");
        let gray = image.to_luma8();
        let estimate = detect_angle(&gray, self.options.method)?;
        let evidence_count = estimate.evidence.as_ref().map_or(0, |e| e.len());
        progress.on_step_complete(
            "detect",
            &format!(
                "method={} angle={:.2} evidence={}",
                self.options.method, estimate.angle_degrees, evidence_count
            ),
        );

        let applied_angle = clamp_angle(estimate.angle_degrees, self.options.max_angle);
        let clamped = applied_angle != estimate.angle_degrees;
        if clamped {
            progress.on_debug(&format!(
                "angle {:.2} clamped to {:.2} (max_angle={})",
                estimate.angle_degrees, applied_angle, self.options.max_angle
            ));
        }

        progress.on_step_start("rotate");
        let rotated_image = rotate(&image, applied_angle);
        let rotated = applied_angle.abs() >= ROTATION_THRESHOLD_DEGREES;
        progress.on_step_complete(
            "rotate",
            if rotated { "corrected" } else { "no correction needed" },
        );

        progress.on_step_start("persist");
        let method = self.options.method.name();
        let output_path = self
            .store
            .save(input, &format!("straightened_{method}"), &rotated_image)?;

        let (detection_path, detection_rotated_path) = if self.options.show_lines {
            match &estimate.evidence {
                Some(evidence) => {
                    let mut overlay = image.to_rgb8();
                    draw_evidence(&mut overlay, evidence);
                    let overlay = DynamicImage::ImageRgb8(overlay);

                    let detection = self
                        .store
                        .save(input, &format!("detection_{method}"), &overlay)?;
                    let detection_rotated = self.store.save(
                        input,
                        &format!("detection_rotated_{method}"),
                        &rotate(&overlay, applied_angle),
                    )?;
                    (Some(detection), Some(detection_rotated))
                }
                None => {
                    progress.on_debug("no evidence to visualize");
                    (None, None)
                }
            }
        } else {
            (None, None)
        };
        progress.on_step_complete("persist", &output_path.display().to_string());

        Ok(StraightenOutcome {
            input: input.to_path_buf(),
            detected_angle: estimate.angle_degrees,
            applied_angle,
            clamped,
            rotated,
            evidence_count,
            output_path,
            detection_path,
            detection_rotated_path,
        })
    }
}

// ============================================================
// Enhance Pipeline
// ============================================================

/// Result of one enhance invocation
#[derive(Debug)]
pub struct EnhanceOutcome {
    /// Source image path
    pub input: PathBuf,
    /// Enhanced page
    pub output_path: PathBuf,
    /// Side-by-side comparison, when requested
    pub comparison_path: Option<PathBuf>,
}

/// Readability enhancement pipeline, independent from straightening.
pub struct EnhancePipeline {
    options: EnhanceOptions,
    store: ImageStore,
}

impl EnhancePipeline {
    /// Create a pipeline writing into `output_dir`.
    pub fn new(options: EnhanceOptions, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let store = ImageStore::new(output_dir)?;
        Ok(Self { options, store })
    }

    /// Process a single page with the configured enhancement mode.
    pub fn run(&self, input: &Path, progress: &dyn ProgressCallback) -> Result<EnhanceOutcome> {
        progress.on_step_start("load");
        let image = self.store.load(input)?;
        progress.on_step_complete("load", &format!("{}x{}", image.width(), image.height()));

        progress.on_step_start("enhance");
        let mode = self.options.mode;
        let processed = enhance(&image, mode);
        progress.on_step_complete("enhance", &format!("mode={mode}"));

        progress.on_step_start("persist");
        let output_path = self.store.save(
            input,
            mode.name(),
            &DynamicImage::ImageLuma8(processed.clone()),
        )?;

        let comparison_path = if self.options.comparison {
            let comparison = comparison_image(&image, &processed);
            Some(self.store.save(
                input,
                &format!("comparison_{}", mode.name()),
                &DynamicImage::ImageRgb8(comparison),
            )?)
        } else {
            None
        };
        progress.on_step_complete("persist", &output_path.display().to_string());

        Ok(EnhanceOutcome {
            input: input.to_path_buf(),
            output_path,
            comparison_path,
        })
    }
}
