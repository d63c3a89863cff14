//! scanprep - Cleanup and straightening for scanned exam pages
//!
//! A Rust implementation for turning photographed or scanned student copies
//! into clean, readable, geometrically straightened raster images.
//!
//! # Features
//!
//! - **Skew Detection** ([`straighten`]) - Estimate page rotation from lines,
//!   content shapes, or text regions
//! - **Rotation Correction** ([`straighten`]) - Bounded bicubic rotation with
//!   edge-replicated borders
//! - **Enhancement Filters** ([`enhance`]) - Readability cleanup for print,
//!   handwriting, and photographed pages
//! - **Intensity Filters** ([`filters`]) - CLAHE and point operations shared
//!   by both pipelines
//! - **Geometry Utilities** ([`geometry`]) - Angle math, outlier rejection,
//!   least-squares fitting
//! - **Image Store** ([`store`]) - Load sources, persist artifacts under
//!   collision-free names
//!
//! # Quick Start
//!
//! ## Straightening a page
//!
//! ```rust,no_run
//! use scanprep::{NoopProgress, StraightenOptions, StraightenPipeline};
//!
//! let pipeline = StraightenPipeline::new(StraightenOptions::default()).unwrap();
//! let outcome = pipeline
//!     .run(std::path::Path::new("copy_01.png"), &NoopProgress)
//!     .unwrap();
//! println!("applied {:.2} degrees", outcome.applied_angle);
//! ```
//!
//! ## Using Builder Patterns
//!
//! Option structs support fluent builder patterns:
//!
//! ```rust
//! use scanprep::{DetectionMethod, StraightenOptions};
//!
//! let opts = StraightenOptions::builder()
//!     .method(DetectionMethod::Mser)
//!     .max_angle(15.0)
//!     .show_lines(true)
//!     .build();
//! ```
//!
//! # Architecture
//!
//! The two pipelines are independent and separately invokable:
//!
//! ```text
//! straighten: Load -> Detect (hough|contour|mser) -> Clamp -> Rotate -> Persist
//! enhance:    Load -> Filter (standard|handwriting|document|scan) -> Persist
//! ```
//!
//! # License
//!
//! AGPL-3.0

pub mod cli;
pub mod config;
pub mod enhance;
pub mod filters;
pub mod geometry;
pub mod pipeline;
pub mod store;
pub mod straighten;

// Re-exports for convenience
pub use cli::{
    create_progress_bar, create_spinner, Cli, Commands, EnhanceArgs, ExitCode, StraightenArgs,
};
pub use config::{CliOverrides, Config, ConfigError};
pub use enhance::{comparison_image, enhance, EnhanceMode, EnhanceOptions};
pub use geometry::{
    clamp_angle, filter_outliers, linear_fit, mean, normalize_line_angle, GeometryError,
};
pub use pipeline::{
    EnhanceOutcome, EnhancePipeline, NoopProgress, PipelineError, ProgressCallback,
    StraightenOutcome, StraightenPipeline,
};
pub use store::{ImageStore, StoreError};
pub use straighten::{
    detect_angle, draw_evidence, rotate, AngleEstimate, DetectionMethod, Evidence, LineCandidate,
    OrientedBox, StraightenError, StraightenOptions, StraightenOptionsBuilder, TextLineCluster,
    DEFAULT_MAX_ANGLE, ROTATION_THRESHOLD_DEGREES,
};

/// Exit codes for CLI (deprecated: prefer using `ExitCode` enum)
///
/// These constants are provided for backward compatibility.
/// The `ExitCode` enum provides a more type-safe alternative.
pub mod exit_codes {
    use super::ExitCode;

    pub const SUCCESS: i32 = ExitCode::Success as i32;
    pub const GENERAL_ERROR: i32 = ExitCode::GeneralError as i32;
    pub const INVALID_ARGS: i32 = ExitCode::InvalidArgs as i32;
    pub const INPUT_NOT_FOUND: i32 = ExitCode::InputNotFound as i32;
    pub const OUTPUT_ERROR: i32 = ExitCode::OutputError as i32;
    pub const PROCESSING_ERROR: i32 = ExitCode::ProcessingError as i32;
}
