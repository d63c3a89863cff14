//! CLI interface module
//!
//! Provides command-line interface using clap derive macros.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::enhance::EnhanceMode;
use crate::straighten::DetectionMethod;

/// Exit codes for the CLI
///
/// These codes follow standard Unix conventions and provide
/// specific error categories for scripting and automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Normal completion
    Success = 0,
    /// General error
    GeneralError = 1,
    /// Argument error
    InvalidArgs = 2,
    /// Input file or directory not found
    InputNotFound = 3,
    /// Output error (write permission, disk full)
    OutputError = 4,
    /// Error during processing
    ProcessingError = 5,
}

impl ExitCode {
    /// Convert to process exit code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get human-readable description
    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::InvalidArgs => "Invalid arguments",
            ExitCode::InputNotFound => "Input file or directory not found",
            ExitCode::OutputError => "Output error (permission denied, disk full, etc.)",
            ExitCode::ProcessingError => "Processing error",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code() as u8)
    }
}

/// Cleanup and straightening for scanned exam pages
#[derive(Parser, Debug)]
#[command(name = "scanprep")]
#[command(author = "scanprep Contributors")]
#[command(version)]
#[command(about = "Cleanup and straightening for scanned exam pages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect page skew and apply a bounded corrective rotation
    Straighten(StraightenArgs),
    /// Apply readability enhancement filters
    Enhance(EnhanceArgs),
    /// Show system information
    Info,
}

/// Arguments for the straighten command
#[derive(clap::Args, Debug)]
pub struct StraightenArgs {
    /// Input image file or directory
    pub input: PathBuf,

    /// Skew detection method
    #[arg(short, long, value_enum)]
    pub method: Option<DetectionMethod>,

    /// Maximum correction angle in degrees
    #[arg(long)]
    pub max_angle: Option<f64>,

    /// Write evidence overlay images alongside the straightened page
    #[arg(long)]
    pub show_lines: bool,

    /// Output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of parallel jobs for directory input
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Show execution plan without processing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the enhance command
#[derive(clap::Args, Debug)]
pub struct EnhanceArgs {
    /// Input image file or directory
    pub input: PathBuf,

    /// Enhancement mode
    #[arg(short, long, value_enum)]
    pub mode: Option<EnhanceMode>,

    /// Skip the side-by-side comparison image
    #[arg(long)]
    pub no_comparison: bool,

    /// Output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of parallel jobs for directory input
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Show execution plan without processing
    #[arg(long)]
    pub dry_run: bool,
}

/// Create a styled progress bar for file processing
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    pb
}

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        // Verify CLI can be built
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_display() {
        let mut cmd = Cli::command();
        let help = cmd.render_help().to_string();
        assert!(help.contains("scanprep"));
        assert!(help.contains("straighten"));
        assert!(help.contains("enhance"));
    }

    #[test]
    fn test_version_display() {
        let cmd = Cli::command();
        let version = cmd.get_version().unwrap_or("unknown");
        assert!(!version.is_empty());
    }

    #[test]
    fn test_missing_input_error() {
        let result = Cli::try_parse_from(["scanprep", "straighten"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn test_straighten_option_parsing() {
        let cli = Cli::try_parse_from([
            "scanprep",
            "straighten",
            "copy.png",
            "--method",
            "mser",
            "--max-angle",
            "15",
            "--show-lines",
            "-vv",
        ])
        .unwrap();

        if let Commands::Straighten(args) = cli.command {
            assert_eq!(args.method, Some(DetectionMethod::Mser));
            assert_eq!(args.max_angle, Some(15.0));
            assert!(args.show_lines);
            assert_eq!(args.verbose, 2);
        } else {
            panic!("Expected Straighten command");
        }
    }

    #[test]
    fn test_straighten_default_values() {
        let cli = Cli::try_parse_from(["scanprep", "straighten", "copy.png"]).unwrap();

        if let Commands::Straighten(args) = cli.command {
            assert_eq!(args.method, None);
            assert_eq!(args.max_angle, None);
            assert!(!args.show_lines);
            assert_eq!(args.output_dir, None);
            assert_eq!(args.threads, None);
            assert_eq!(args.verbose, 0);
            assert!(!args.quiet);
            assert!(!args.dry_run);
        } else {
            panic!("Expected Straighten command");
        }
    }

    #[test]
    fn test_enhance_option_parsing() {
        let cli = Cli::try_parse_from([
            "scanprep",
            "enhance",
            "copy.png",
            "--mode",
            "handwriting",
            "--no-comparison",
            "-o",
            "/tmp/out",
        ])
        .unwrap();

        if let Commands::Enhance(args) = cli.command {
            assert_eq!(args.mode, Some(EnhanceMode::Handwriting));
            assert!(args.no_comparison);
            assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/out")));
        } else {
            panic!("Expected Enhance command");
        }
    }

    #[test]
    fn test_directory_input() {
        let cli =
            Cli::try_parse_from(["scanprep", "straighten", "/tmp/test_dir", "--dry-run"]).unwrap();

        if let Commands::Straighten(args) = cli.command {
            assert!(args.dry_run);
        } else {
            panic!("Expected Straighten command");
        }
    }

    #[test]
    fn test_info_command() {
        let cli = Cli::try_parse_from(["scanprep", "info"]).unwrap();

        assert!(matches!(cli.command, Commands::Info));
    }

    #[test]
    fn test_invalid_method_rejected() {
        let result = Cli::try_parse_from(["scanprep", "straighten", "copy.png", "-m", "sobel"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_progress_bar_display() {
        let pb = create_progress_bar(100);
        assert_eq!(pb.length(), Some(100));

        pb.set_position(50);
        assert_eq!(pb.position(), 50);

        pb.finish_with_message("done");
    }

    #[test]
    fn test_spinner_creation() {
        let spinner = create_spinner("Processing...");
        assert_eq!(spinner.message(), "Processing...");
        spinner.finish_with_message("Complete");
    }

    // Exit code tests
    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::GeneralError.code(), 1);
        assert_eq!(ExitCode::InvalidArgs.code(), 2);
        assert_eq!(ExitCode::InputNotFound.code(), 3);
        assert_eq!(ExitCode::OutputError.code(), 4);
        assert_eq!(ExitCode::ProcessingError.code(), 5);
    }

    #[test]
    fn test_exit_code_descriptions() {
        assert_eq!(ExitCode::Success.description(), "Success");
        assert!(!ExitCode::GeneralError.description().is_empty());
        assert!(!ExitCode::InvalidArgs.description().is_empty());
        assert!(!ExitCode::InputNotFound.description().is_empty());
        assert!(!ExitCode::OutputError.description().is_empty());
        assert!(!ExitCode::ProcessingError.description().is_empty());
    }

    #[test]
    fn test_exit_code_into_i32() {
        let code: i32 = ExitCode::Success.into();
        assert_eq!(code, 0);

        let code: i32 = ExitCode::ProcessingError.into();
        assert_eq!(code, 5);
    }

    #[test]
    fn test_exit_code_equality() {
        assert_eq!(ExitCode::Success, ExitCode::Success);
        assert_ne!(ExitCode::Success, ExitCode::GeneralError);
    }
}
