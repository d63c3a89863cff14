//! scanprep - Cleanup and straightening for scanned exam pages
//!
//! CLI entry point

use clap::Parser;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use scanprep::{
    create_progress_bar, Cli, CliOverrides, Commands, Config, EnhanceArgs, EnhancePipeline,
    ExitCode, NoopProgress, ProgressCallback, StraightenArgs, StraightenOptions,
    StraightenPipeline,
};

/// File extensions the pipelines accept as input
const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"];

fn main() {
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Straighten(args) => run_straighten(&args),
        Commands::Enhance(args) => run_enhance(&args),
        Commands::Info => run_info(),
    };

    std::process::exit(code.code());
}

// ============ Progress Callback Implementation ============

/// Verbose progress callback for CLI output
struct VerboseProgress {
    verbose_level: u8,
}

impl VerboseProgress {
    fn new(verbose_level: u8) -> Self {
        Self { verbose_level }
    }
}

impl ProgressCallback for VerboseProgress {
    fn on_step_start(&self, step: &str) {
        if self.verbose_level > 0 {
            println!("  {}", step);
        }
    }

    fn on_step_complete(&self, step: &str, message: &str) {
        if self.verbose_level > 0 {
            println!("    {}: {}", step, message);
        }
    }

    fn on_debug(&self, message: &str) {
        if self.verbose_level > 1 {
            println!("    [DEBUG] {}", message);
        }
    }
}

// ============ Straighten Command ============

fn run_straighten(args: &StraightenArgs) -> ExitCode {
    let start_time = Instant::now();

    if !args.input.exists() {
        eprintln!("Error: Input path does not exist: {}", args.input.display());
        return ExitCode::InputNotFound;
    }

    let files = match collect_image_files(&args.input) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::GeneralError;
        }
    };
    if files.is_empty() {
        eprintln!("Error: No image files found in input path");
        return ExitCode::InputNotFound;
    }

    let file_config = load_config(args.config.as_deref());
    let mut overrides = CliOverrides::new();
    overrides.method = args.method;
    overrides.max_angle = args.max_angle;
    if args.show_lines {
        overrides.show_lines = Some(true);
    }
    overrides.output_dir = args.output_dir.clone();
    overrides.threads = args.threads;

    let options = file_config.straighten_options(&overrides);
    let threads = file_config.thread_count(&overrides);

    if args.dry_run {
        print_straighten_plan(args, &files, &options, threads);
        return ExitCode::Success;
    }

    let pipeline = match StraightenPipeline::new(options) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::OutputError;
        }
    };

    // A single file reports per-step progress; a batch gets a bar and
    // per-file error isolation instead.
    if files.len() == 1 {
        let progress = VerboseProgress::new(args.verbose);
        match pipeline.run(&files[0], &progress) {
            Ok(outcome) => {
                if !args.quiet {
                    println!(
                        "{}: detected {:.2}, applied {:.2} -> {}",
                        outcome.input.display(),
                        outcome.detected_angle,
                        outcome.applied_angle,
                        outcome.output_path.display()
                    );
                }
                ExitCode::Success
            }
            Err(e) => {
                eprintln!("Error processing {}: {}", files[0].display(), e);
                ExitCode::ProcessingError
            }
        }
    } else {
        let error_count = run_batch(&files, threads, args.quiet, |path| {
            pipeline.run(path, &NoopProgress).map(|outcome| {
                format!(
                    "applied {:.2}{}",
                    outcome.applied_angle,
                    if outcome.clamped { " (clamped)" } else { "" }
                )
            })
        });

        if !args.quiet {
            print_summary(files.len(), error_count, start_time.elapsed());
        }

        if error_count > 0 {
            ExitCode::ProcessingError
        } else {
            ExitCode::Success
        }
    }
}

// ============ Enhance Command ============

fn run_enhance(args: &EnhanceArgs) -> ExitCode {
    let start_time = Instant::now();

    if !args.input.exists() {
        eprintln!("Error: Input path does not exist: {}", args.input.display());
        return ExitCode::InputNotFound;
    }

    let files = match collect_image_files(&args.input) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::GeneralError;
        }
    };
    if files.is_empty() {
        eprintln!("Error: No image files found in input path");
        return ExitCode::InputNotFound;
    }

    let file_config = load_config(args.config.as_deref());
    let mut overrides = CliOverrides::new();
    overrides.mode = args.mode;
    if args.no_comparison {
        overrides.comparison = Some(false);
    }
    overrides.output_dir = args.output_dir.clone();
    overrides.threads = args.threads;

    let options = file_config.enhance_options(&overrides);
    let output_dir = file_config.output_dir(&overrides);
    let threads = file_config.thread_count(&overrides);

    if args.dry_run {
        print_enhance_plan(args, &files, options.mode.name(), &output_dir, threads);
        return ExitCode::Success;
    }

    let pipeline = match EnhancePipeline::new(options, &output_dir) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::OutputError;
        }
    };

    if files.len() == 1 {
        let progress = VerboseProgress::new(args.verbose);
        match pipeline.run(&files[0], &progress) {
            Ok(outcome) => {
                if !args.quiet {
                    println!(
                        "{} -> {}",
                        outcome.input.display(),
                        outcome.output_path.display()
                    );
                }
                ExitCode::Success
            }
            Err(e) => {
                eprintln!("Error processing {}: {}", files[0].display(), e);
                ExitCode::ProcessingError
            }
        }
    } else {
        let error_count = run_batch(&files, threads, args.quiet, |path| {
            pipeline
                .run(path, &NoopProgress)
                .map(|outcome| outcome.output_path.display().to_string())
        });

        if !args.quiet {
            print_summary(files.len(), error_count, start_time.elapsed());
        }

        if error_count > 0 {
            ExitCode::ProcessingError
        } else {
            ExitCode::Success
        }
    }
}

// ============ Helper Functions ============

/// Load config file if specified, otherwise use the default search path
fn load_config(explicit: Option<&Path>) -> Config {
    match explicit {
        Some(config_path) => match Config::load_from_path(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Warning: Failed to load config file: {}", e);
                Config::default()
            }
        },
        None => Config::load().unwrap_or_default(),
    }
}

/// Collect image files from input path (file or directory, non-recursive)
fn collect_image_files(input: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files = Vec::new();

    if input.is_file() {
        if is_image_path(input) {
            files.push(input.to_path_buf());
        }
    } else if input.is_dir() {
        for entry in std::fs::read_dir(input)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_image_path(&path) {
                files.push(path);
            }
        }
        files.sort();
    }

    Ok(files)
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Process a batch of files in parallel with per-file error isolation.
/// Returns the number of failed files.
fn run_batch<F>(files: &[PathBuf], threads: usize, quiet: bool, process: F) -> usize
where
    F: Fn(&Path) -> Result<String, scanprep::PipelineError> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build();
    let pb = if quiet {
        None
    } else {
        Some(create_progress_bar(files.len() as u64))
    };

    let results: Vec<Option<String>> = match pool {
        Ok(pool) => pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    let result = match process(path) {
                        Ok(message) => {
                            if let Some(pb) = &pb {
                                pb.println(format!("  {}: {}", path.display(), message));
                            }
                            Some(message)
                        }
                        Err(e) => {
                            eprintln!("Error processing {}: {}", path.display(), e);
                            None
                        }
                    };
                    if let Some(pb) = &pb {
                        pb.inc(1);
                    }
                    result
                })
                .collect()
        }),
        Err(e) => {
            eprintln!("Warning: thread pool setup failed ({}), running serially", e);
            files
                .iter()
                .map(|path| match process(path) {
                    Ok(message) => Some(message),
                    Err(e) => {
                        eprintln!("Error processing {}: {}", path.display(), e);
                        None
                    }
                })
                .collect()
        }
    };

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    results.iter().filter(|r| r.is_none()).count()
}

fn print_summary(total: usize, error_count: usize, elapsed: std::time::Duration) {
    println!();
    println!("=== Summary ===");
    println!("Total files: {}", total);
    println!("Succeeded:   {}", total - error_count);
    println!("Failed:      {}", error_count);
    println!("Total time:  {:.2}s", elapsed.as_secs_f64());
}

/// Print execution plan for dry-run mode
fn print_straighten_plan(
    args: &StraightenArgs,
    files: &[PathBuf],
    options: &StraightenOptions,
    threads: usize,
) {
    println!("=== Dry Run - Execution Plan ===");
    println!();
    println!("Input: {}", args.input.display());
    println!("Output: {}", options.output_dir.display());
    println!("Files to process: {}", files.len());
    println!();
    println!("Pipeline Configuration:");
    println!("  1. Grayscale conversion");
    println!("  2. Skew detection: {}", options.method);
    println!("  3. Max correction angle: {} degrees", options.max_angle);
    println!(
        "  4. Evidence overlays: {}",
        if options.show_lines { "YES" } else { "NO" }
    );
    println!("  5. Rotation: bicubic, edge-replicated borders");
    println!();
    println!("Processing Options:");
    println!("  Threads: {}", threads);
    println!("  Verbose: {}", args.verbose);
    println!();
    println!("Files:");
    for (i, file) in files.iter().enumerate() {
        println!("  {}. {}", i + 1, file.display());
    }
}

fn print_enhance_plan(
    args: &EnhanceArgs,
    files: &[PathBuf],
    mode: &str,
    output_dir: &Path,
    threads: usize,
) {
    println!("=== Dry Run - Execution Plan ===");
    println!();
    println!("Input: {}", args.input.display());
    println!("Output: {}", output_dir.display());
    println!("Files to process: {}", files.len());
    println!();
    println!("Pipeline Configuration:");
    println!("  1. Enhancement mode: {}", mode);
    println!(
        "  2. Comparison image: {}",
        if args.no_comparison { "NO" } else { "YES" }
    );
    println!();
    println!("Processing Options:");
    println!("  Threads: {}", threads);
    println!("  Verbose: {}", args.verbose);
    println!();
    println!("Files:");
    for (i, file) in files.iter().enumerate() {
        println!("  {}. {}", i + 1, file.display());
    }
}

// ============ Info Command ============

fn run_info() -> ExitCode {
    println!("scanprep v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("System Information:");
    println!("  Platform: {}", std::env::consts::OS);
    println!("  Arch: {}", std::env::consts::ARCH);
    println!("  CPUs: {}", num_cpus::get());

    println!();
    println!("Detection Methods:");
    println!("  hough   - straight edges via Hough transform (default)");
    println!("  contour - min-area rectangles around binarized content");
    println!("  mser    - stable glyph regions clustered into text lines");

    println!();
    println!("Enhancement Modes:");
    println!("  standard    - balanced cleanup for most copies (default)");
    println!("  handwriting - preserves faint pen and pencil strokes");
    println!("  document    - crisp global binarization for print");
    println!("  scan        - flattens uneven lighting in photographs");

    println!();
    println!("Supported Input Formats:");
    println!("  {}", IMAGE_EXTENSIONS.join(", "));

    println!();
    println!("Config File Locations:");
    println!("  Local: ./scanprep.toml");
    if let Some(config_dir) = dirs::config_dir() {
        println!(
            "  User:  {}",
            config_dir.join("scanprep/config.toml").display()
        );
    }

    ExitCode::Success
}
