use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// Top-level collage configuration, parsed from kebab-case YAML.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CollageConfig {
    /// Directories scanned recursively for source photos.
    pub photo_paths: Vec<PathBuf>,
    /// Photo rendered into the centered main cell. Omit for flat mode.
    #[serde(default)]
    pub main_photo: Option<PathBuf>,
    /// Canvas edge in pixels.
    #[serde(default = "CollageConfig::default_size")]
    pub size: u32,
    /// Fraction of the canvas edge occupied by the main square.
    #[serde(default = "CollageConfig::default_main_ratio")]
    pub main_ratio: f64,
    /// Inter-cell gap in pixels.
    #[serde(default = "CollageConfig::default_gap")]
    pub gap: u32,
    /// Shuffle the ring images before placement.
    #[serde(default = "CollageConfig::default_shuffle")]
    pub shuffle_others: bool,
    /// Optional seed for the shuffle, for reproducible collages.
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
    /// Background RGB fill behind the cells.
    #[serde(default)]
    pub background: [u8; 3],
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Export container as a MIME type string.
    #[serde(default = "OutputConfig::default_format")]
    pub format: String,
    /// Encoder quality in `[0, 1]`; JPEG only.
    #[serde(default)]
    pub quality: Option<f32>,
    /// Output file path; extension is derived from `format` when omitted.
    #[serde(default = "OutputConfig::default_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: Self::default_format(),
            quality: None,
            path: Self::default_path(),
        }
    }
}

impl OutputConfig {
    fn default_format() -> String {
        "image/png".to_string()
    }

    fn default_path() -> PathBuf {
        PathBuf::from("collage.png")
    }
}

impl CollageConfig {
    fn default_size() -> u32 {
        2048
    }

    fn default_main_ratio() -> f64 {
        0.6
    }

    fn default_gap() -> u32 {
        16
    }

    fn default_shuffle() -> bool {
        true
    }

    /// Sanity-check values before any work starts. Layout code clamps its
    /// own inputs; this rejects configurations that are clearly mistakes.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.photo_paths.is_empty(),
            "at least one photo path is required"
        );
        ensure!(self.size >= 64, "size must be at least 64 pixels");
        ensure!(
            self.main_ratio.is_finite() && self.main_ratio > 0.0 && self.main_ratio < 1.0,
            "main-ratio must be between 0 and 1, got {}",
            self.main_ratio
        );
        if let Some(q) = self.output.quality {
            ensure!(
                (0.0..=1.0).contains(&q),
                "output quality must be in [0, 1], got {q}"
            );
        }
        ensure!(
            crate::export::extension_for(&self.output.format).is_some(),
            "unsupported output format: {}",
            self.output.format
        );
        Ok(())
    }
}

/// Load and parse a YAML configuration file.
pub fn from_yaml_file(path: &Path) -> Result<CollageConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
}
