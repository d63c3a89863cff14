//! Image store
//!
//! Loads source pages and persists output artifacts under collision-free
//! names combining the source stem, the processing tag, and a timestamp.

use chrono::Local;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Image store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    #[error("Failed to decode image {path}: {reason}")]
    DecodeFailed { path: PathBuf, reason: String },

    #[error("Failed to write image {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Extension used when the source has none the encoder recognizes
const FALLBACK_EXTENSION: &str = "png";

/// Loads source images and persists artifacts into one output directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    output_dir: PathBuf,
}

impl ImageStore {
    /// Create a store rooted at `output_dir`, creating the directory when
    /// it does not exist yet.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// The directory all artifacts are written into
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Load a source image, failing when the path is missing or the
    /// content does not decode to a raster.
    pub fn load(&self, path: &Path) -> Result<DynamicImage> {
        if !path.exists() {
            return Err(StoreError::ImageNotFound(path.to_path_buf()));
        }
        image::open(path).map_err(|e| StoreError::DecodeFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Persist an image under a generated name and return the full path.
    ///
    /// The name combines the source stem, the given tag, and a
    /// second-resolution timestamp: `{stem}_{tag}_{timestamp}.{ext}`.
    pub fn save(&self, source: &Path, tag: &str, image: &DynamicImage) -> Result<PathBuf> {
        let path = self.artifact_path(source, tag);
        image.save(&path).map_err(|e| StoreError::WriteFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(path)
    }

    /// Compute the output path for an artifact without writing anything.
    pub fn artifact_path(&self, source: &Path, tag: &str) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let extension = source
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .filter(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tiff" | "tif" | "webp"))
            .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");

        self.output_dir
            .join(format!("{stem}_{tag}_{timestamp}.{extension}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use tempfile::tempdir;

    #[test]
    fn test_new_creates_output_dir() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("nested").join("out");

        let store = ImageStore::new(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.output_dir(), dir);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = tempdir().unwrap();
        let store = ImageStore::new(temp.path()).unwrap();

        let result = store.load(Path::new("/nonexistent/page.png"));
        assert!(matches!(result, Err(StoreError::ImageNotFound(_))));
    }

    #[test]
    fn test_load_undecodable_file() {
        let temp = tempdir().unwrap();
        let bogus = temp.path().join("not_an_image.png");
        std::fs::write(&bogus, b"plain text").unwrap();

        let store = ImageStore::new(temp.path()).unwrap();
        let result = store.load(&bogus);
        assert!(matches!(result, Err(StoreError::DecodeFailed { .. })));
    }

    #[test]
    fn test_save_round_trip() {
        let temp = tempdir().unwrap();
        let store = ImageStore::new(temp.path()).unwrap();
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([42u8])));

        let path = store
            .save(Path::new("copy_01.png"), "straightened_hough", &img)
            .unwrap();
        assert!(path.exists());

        let reloaded = store.load(&path).unwrap();
        assert_eq!(reloaded.to_luma8().get_pixel(3, 3).0[0], 42);
    }

    #[test]
    fn test_artifact_naming() {
        let temp = tempdir().unwrap();
        let store = ImageStore::new(temp.path()).unwrap();

        let path = store.artifact_path(Path::new("scans/copy_01.jpg"), "detection_mser");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();

        assert!(name.starts_with("copy_01_detection_mser_"));
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn test_artifact_naming_unknown_extension() {
        let temp = tempdir().unwrap();
        let store = ImageStore::new(temp.path()).unwrap();

        let path = store.artifact_path(Path::new("weird.xyz"), "straightened_hough");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with(".png"));
    }
}
