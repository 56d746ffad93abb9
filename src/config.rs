//! Tunable parameters for extraction, export and history.
//!
//! Configuration can be loaded from JSON or built in code. Every field has a
//! default, so a file only needs to name what it changes:
//!
//! ```json
//! { "quantizer": { "seed": 7 }, "export": { "scales": [4, 16] } }
//! ```
//!
//! - [`SamplingConfig`]: analysis grid size
//! - [`QuantizerConfig`]: accepted color counts, iteration cap, seed
//! - [`ExportConfig`]: swatch strip scales
//! - [`HistoryConfig`]: history file location

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::export::DEFAULT_SCALES;
use crate::history::DEFAULT_HISTORY_FILE;
use crate::quantize::{DEFAULT_MAX_ITERATIONS, DEFAULT_SEED, KmeansOptions};
use crate::sampler::DEFAULT_ANALYSIS_SIZE;
use crate::{PaletteError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sampling: SamplingConfig,
    pub quantizer: QuantizerConfig,
    pub export: ExportConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub analysis_width: u32,
    pub analysis_height: u32,
}

/// Bounds and knobs for the k-means run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantizerConfig {
    /// Smallest accepted `k`
    pub min_colors: usize,
    /// Largest accepted `k`
    pub max_colors: usize,
    /// `k` used when the caller does not pick one
    pub default_colors: usize,
    pub max_iterations: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub scales: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            analysis_width: DEFAULT_ANALYSIS_SIZE.0,
            analysis_height: DEFAULT_ANALYSIS_SIZE.1,
        }
    }
}

impl Default for QuantizerConfig {
    fn default() -> Self {
        Self {
            min_colors: 2,
            max_colors: 24,
            default_colors: 16,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: DEFAULT_SEED,
        }
    }
}

impl QuantizerConfig {
    pub fn kmeans_options(&self) -> KmeansOptions {
        KmeansOptions {
            max_iterations: self.max_iterations,
            seed: self.seed,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scales: DEFAULT_SCALES.to_vec(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from(DEFAULT_HISTORY_FILE),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file and validate it
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let q = &self.quantizer;
        if self.sampling.analysis_width == 0 || self.sampling.analysis_height == 0 {
            return Err(PaletteError::Config("analysis size must be non-zero".into()));
        }
        if q.min_colors == 0 || q.min_colors > q.max_colors {
            return Err(PaletteError::Config(format!(
                "color range {}..={} is empty or starts at zero",
                q.min_colors, q.max_colors
            )));
        }
        let samples = (self.sampling.analysis_width as usize)
            .checked_mul(self.sampling.analysis_height as usize)
            .ok_or_else(|| PaletteError::Config("analysis size is too large".into()))?;
        if q.max_colors > samples {
            return Err(PaletteError::Config(format!(
                "max_colors {} exceeds the {samples} analysis samples",
                q.max_colors
            )));
        }
        if !(q.min_colors..=q.max_colors).contains(&q.default_colors) {
            return Err(PaletteError::Config(format!(
                "default_colors {} outside {}..={}",
                q.default_colors, q.min_colors, q.max_colors
            )));
        }
        if q.max_iterations == 0 {
            return Err(PaletteError::Config("max_iterations must be at least 1".into()));
        }
        if self.export.scales.contains(&0) {
            return Err(PaletteError::Config("swatch scales must be at least 1".into()));
        }
        Ok(())
    }
}
