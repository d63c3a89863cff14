//! CLI Integration Tests
//!
//! Tests for the CLI interface using assert_cmd

use assert_cmd::Command;
use image::{GrayImage, Luma};
use imageproc::drawing::draw_line_segment_mut;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn scanprep_cmd() -> Command {
    // Use CARGO_BIN_EXE_<name> environment variable set by cargo test
    Command::new(env!("CARGO_BIN_EXE_scanprep"))
}

/// Write a synthetic ruled page with the given skew to `path`
fn write_ruled_page(path: &Path, skew_degrees: f64) {
    let mut img = GrayImage::from_pixel(600, 400, Luma([235u8]));
    let slope = skew_degrees.to_radians().tan() as f32;
    for row in (60..360).step_by(40) {
        for offset in [-1.0f32, 0.0, 1.0] {
            draw_line_segment_mut(
                &mut img,
                (20.0, row as f32 + offset),
                (580.0, row as f32 + offset + 560.0 * slope),
                Luma([20u8]),
            );
        }
    }
    img.save(path).unwrap();
}

fn output_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[test]
fn test_help_command() {
    scanprep_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scanprep"))
        .stdout(predicate::str::contains("straighten"))
        .stdout(predicate::str::contains("enhance"))
        .stdout(predicate::str::contains("info"));
}

#[test]
fn test_version_command() {
    scanprep_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_info_command() {
    scanprep_cmd()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("scanprep"))
        .stdout(predicate::str::contains("System Information"))
        .stdout(predicate::str::contains("Detection Methods"))
        .stdout(predicate::str::contains("Enhancement Modes"));
}

#[test]
fn test_straighten_no_input_argument() {
    scanprep_cmd()
        .args(["straighten"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_straighten_missing_input() {
    scanprep_cmd()
        .args(["straighten", "/nonexistent/page.png", "-o", "/tmp/out"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Input path does not exist"));
}

#[test]
fn test_straighten_dry_run_single_file() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("page.png");
    write_ruled_page(&input, 0.0);

    scanprep_cmd()
        .args(["straighten"])
        .arg(&input)
        .args(["-o", "/tmp/out", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry Run"))
        .stdout(predicate::str::contains("Execution Plan"))
        .stdout(predicate::str::contains("Files to process: 1"));
}

#[test]
fn test_straighten_dry_run_directory() {
    let temp = TempDir::new().unwrap();
    write_ruled_page(&temp.path().join("a.png"), 0.0);
    write_ruled_page(&temp.path().join("b.png"), 0.0);

    scanprep_cmd()
        .args(["straighten"])
        .arg(temp.path())
        .args(["-o", "/tmp/out", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Files to process: 2"));
}

#[test]
fn test_straighten_dry_run_with_options() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("page.png");
    write_ruled_page(&input, 0.0);

    scanprep_cmd()
        .args(["straighten"])
        .arg(&input)
        .args([
            "-o",
            "/tmp/out",
            "--dry-run",
            "--method",
            "contour",
            "--max-angle",
            "12",
            "--show-lines",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skew detection: contour"))
        .stdout(predicate::str::contains("Max correction angle: 12 degrees"))
        .stdout(predicate::str::contains("Evidence overlays: YES"));
}

#[test]
fn test_straighten_writes_output() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("skewed.png");
    write_ruled_page(&input, 5.0);
    let out = temp.path().join("out");

    scanprep_cmd()
        .args(["straighten"])
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("applied"));

    let names = output_files(&out);
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("skewed_straightened_hough_"));
}

#[test]
fn test_straighten_show_lines_writes_overlays() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("skewed.png");
    write_ruled_page(&input, 5.0);
    let out = temp.path().join("out");

    scanprep_cmd()
        .args(["straighten"])
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .arg("--show-lines")
        .assert()
        .success();

    let names = output_files(&out);
    assert_eq!(names.len(), 3);
    assert!(names.iter().any(|n| n.starts_with("skewed_detection_hough_")));
    assert!(names
        .iter()
        .any(|n| n.starts_with("skewed_detection_rotated_hough_")));
    assert!(names
        .iter()
        .any(|n| n.starts_with("skewed_straightened_hough_")));
}

#[test]
fn test_straighten_directory_batch() {
    let temp = TempDir::new().unwrap();
    let pages = temp.path().join("pages");
    std::fs::create_dir(&pages).unwrap();
    write_ruled_page(&pages.join("a.png"), 3.0);
    write_ruled_page(&pages.join("b.png"), -3.0);
    let out = temp.path().join("out");

    scanprep_cmd()
        .args(["straighten"])
        .arg(&pages)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Succeeded:   2"))
        .stdout(predicate::str::contains("Failed:      0"));

    assert_eq!(output_files(&out).len(), 2);
}

#[test]
fn test_straighten_batch_isolates_failures() {
    let temp = TempDir::new().unwrap();
    let pages = temp.path().join("pages");
    std::fs::create_dir(&pages).unwrap();
    write_ruled_page(&pages.join("good.png"), 2.0);
    std::fs::write(pages.join("broken.png"), b"not an image").unwrap();
    let out = temp.path().join("out");

    scanprep_cmd()
        .args(["straighten"])
        .arg(&pages)
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("broken.png"));

    // The decodable page still gets processed.
    assert_eq!(output_files(&out).len(), 1);
}

#[test]
fn test_straighten_undecodable_file() {
    let temp = TempDir::new().unwrap();
    let bogus = temp.path().join("bogus.png");
    std::fs::write(&bogus, b"plain text").unwrap();

    scanprep_cmd()
        .args(["straighten"])
        .arg(&bogus)
        .args(["-o", "/tmp/out"])
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("Failed to decode"));
}

#[test]
fn test_straighten_config_file() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("page.png");
    write_ruled_page(&input, 0.0);
    let config = temp.path().join("scanprep.toml");
    std::fs::write(&config, "[straighten]\nmethod = \"mser\"\n").unwrap();

    scanprep_cmd()
        .args(["straighten"])
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .args(["-o", "/tmp/out", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skew detection: mser"));
}

#[test]
fn test_straighten_cli_overrides_config_file() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("page.png");
    write_ruled_page(&input, 0.0);
    let config = temp.path().join("scanprep.toml");
    std::fs::write(&config, "[straighten]\nmethod = \"mser\"\n").unwrap();

    scanprep_cmd()
        .args(["straighten"])
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .args(["-o", "/tmp/out", "--dry-run", "--method", "contour"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skew detection: contour"));
}

#[test]
fn test_enhance_writes_output_and_comparison() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("page.png");
    write_ruled_page(&input, 0.0);
    let out = temp.path().join("out");

    scanprep_cmd()
        .args(["enhance"])
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let names = output_files(&out);
    assert_eq!(names.len(), 2);
    assert!(names.iter().any(|n| n.starts_with("page_standard_")));
    assert!(names
        .iter()
        .any(|n| n.starts_with("page_comparison_standard_")));
}

#[test]
fn test_enhance_no_comparison() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("page.png");
    write_ruled_page(&input, 0.0);
    let out = temp.path().join("out");

    scanprep_cmd()
        .args(["enhance"])
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .args(["--mode", "document", "--no-comparison"])
        .assert()
        .success();

    let names = output_files(&out);
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("page_document_"));
}

#[test]
fn test_enhance_missing_input() {
    scanprep_cmd()
        .args(["enhance", "/nonexistent/page.png", "-o", "/tmp/out"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Input path does not exist"));
}
