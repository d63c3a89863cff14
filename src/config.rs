//! Configuration file support for scanprep
//!
//! Supports TOML configuration files with the following search order:
//! 1. `--config <path>` - explicitly specified path
//! 2. `./scanprep.toml` - current directory
//! 3. `~/.config/scanprep/config.toml` - user config
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [general]
//! output_dir = "processed"
//! threads = 4
//!
//! [straighten]
//! method = "hough"
//! max_angle = 30.0
//! show_lines = false
//!
//! [enhance]
//! mode = "standard"
//! comparison = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::enhance::{EnhanceMode, EnhanceOptions};
use crate::straighten::{DetectionMethod, StraightenOptions};

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// File not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// General configuration options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Destination directory for all artifacts
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Number of threads for directory input
    #[serde(default)]
    pub threads: Option<usize>,

    /// Verbosity level (0-2)
    #[serde(default)]
    pub verbose: Option<u8>,
}

/// Straighten configuration options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StraightenConfig {
    /// Skew detection method
    #[serde(default)]
    pub method: Option<DetectionMethod>,

    /// Maximum correction angle in degrees
    #[serde(default)]
    pub max_angle: Option<f64>,

    /// Write evidence overlay images
    #[serde(default)]
    pub show_lines: Option<bool>,
}

/// Enhance configuration options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnhanceConfig {
    /// Enhancement mode
    #[serde(default)]
    pub mode: Option<EnhanceMode>,

    /// Produce a side-by-side comparison image
    #[serde(default)]
    pub comparison: Option<bool>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Straighten settings
    #[serde(default)]
    pub straighten: StraightenConfig,

    /// Enhance settings
    #[serde(default)]
    pub enhance: EnhanceConfig,
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the default search path
    ///
    /// Search order:
    /// 1. `./scanprep.toml`
    /// 2. `~/.config/scanprep/config.toml`
    /// 3. Default values (if no file found)
    pub fn load() -> Result<Self, ConfigError> {
        // Try current directory first
        let current_dir_config = PathBuf::from("scanprep.toml");
        if current_dir_config.exists() {
            return Self::load_from_path(&current_dir_config);
        }

        // Try user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("scanprep").join("config.toml");
            if user_config.exists() {
                return Self::load_from_path(&user_config);
            }
        }

        // Return default config if no file found
        Ok(Self::default())
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Resolve straighten options, merging config file values with CLI
    /// overrides (CLI takes precedence).
    pub fn straighten_options(&self, cli: &CliOverrides) -> StraightenOptions {
        let mut builder = StraightenOptions::builder();

        if let Some(method) = cli.method.or(self.straighten.method) {
            builder = builder.method(method);
        }
        if let Some(max_angle) = cli.max_angle.or(self.straighten.max_angle) {
            builder = builder.max_angle(max_angle);
        }
        if let Some(show_lines) = cli.show_lines.or(self.straighten.show_lines) {
            builder = builder.show_lines(show_lines);
        }
        builder = builder.output_dir(self.output_dir(cli));

        builder.build()
    }

    /// Resolve enhance options, merging config file values with CLI
    /// overrides (CLI takes precedence).
    pub fn enhance_options(&self, cli: &CliOverrides) -> EnhanceOptions {
        let mut options = EnhanceOptions::default();

        if let Some(mode) = cli.mode.or(self.enhance.mode) {
            options.mode = mode;
        }
        if let Some(comparison) = cli.comparison.or(self.enhance.comparison) {
            options.comparison = comparison;
        }

        options
    }

    /// Resolve the output directory (CLI takes precedence)
    pub fn output_dir(&self, cli: &CliOverrides) -> PathBuf {
        cli.output_dir
            .clone()
            .or_else(|| self.general.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("processed"))
    }

    /// Resolve the thread count for directory input (CLI takes precedence,
    /// defaults to the number of available CPUs)
    pub fn thread_count(&self, cli: &CliOverrides) -> usize {
        cli.threads
            .or(self.general.threads)
            .unwrap_or_else(num_cpus::get)
    }

    /// Get config file search paths
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("scanprep.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("scanprep").join("config.toml"));
        }

        paths
    }
}

/// CLI override values for merging with config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub method: Option<DetectionMethod>,
    pub max_angle: Option<f64>,
    pub show_lines: Option<bool>,
    pub mode: Option<EnhanceMode>,
    pub comparison: Option<bool>,
    pub output_dir: Option<PathBuf>,
    pub threads: Option<usize>,
}

impl CliOverrides {
    /// Create new empty overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Set detection method override
    pub fn with_method(mut self, method: DetectionMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Set maximum angle override
    pub fn with_max_angle(mut self, max_angle: f64) -> Self {
        self.max_angle = Some(max_angle);
        self
    }

    /// Set evidence overlay override
    pub fn with_show_lines(mut self, show_lines: bool) -> Self {
        self.show_lines = Some(show_lines);
        self
    }

    /// Set enhancement mode override
    pub fn with_mode(mut self, mode: EnhanceMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set comparison image override
    pub fn with_comparison(mut self, comparison: bool) -> Self {
        self.comparison = Some(comparison);
        self
    }

    /// Set output directory override
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}
