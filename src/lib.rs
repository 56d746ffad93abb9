//! # lava_palette
//!
//! Deterministic palette extraction from raster images.
//!
//! An image is reduced to a fixed analysis grid, its pixels are clustered with
//! seeded k-means, and the resulting colors can be written as a GIMP `.gpl`
//! palette, PNG swatch strips, and an entry in a JSON history log.
//!
//! ```rust,no_run
//! use lava_palette::{extract_palette, export, sampler, DEFAULT_SCALES};
//! use std::path::Path;
//!
//! let image = sampler::open(Path::new("sunset.jpg"))?;
//! let palette = extract_palette(&image, 8)?;
//! for swatch in palette.swatches() {
//!     println!("{} ({})", swatch.hex, swatch.text);
//! }
//! export(&palette, Path::new("out/sunset"), &DEFAULT_SCALES)?;
//! # Ok::<(), lava_palette::PaletteError>(())
//! ```

use std::path::Path;

use image::DynamicImage;
use tracing::debug;

pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod history;
pub mod quantize;
pub mod sampler;
pub mod wasm;

pub use config::Config;
pub use error::{PaletteError, Result};
pub use export::{DEFAULT_SCALES, ExportedFiles, encode_gpl, encode_swatch_png, export, export_base, swatch_strip};
pub use format::{TextColor, contrast_text_color, parse_hex, to_hex};
pub use history::{HistoryLog, PaletteRecord};
pub use quantize::{KmeansOptions, quantize};

/// An 8-bit sRGB color.
pub type Color = palette::Srgb<u8>;

/// Ordered representative colors, in the order clustering produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(Vec<Color>);

/// A palette entry prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swatch {
    pub color: Color,
    pub hex: String,
    pub text: TextColor,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self(colors)
    }

    pub fn colors(&self) -> &[Color] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Color> {
        self.0.iter()
    }

    pub fn hex_strings(&self) -> Vec<String> {
        self.0.iter().map(to_hex).collect()
    }

    /// Hex label plus legible text color for each entry.
    pub fn swatches(&self) -> Vec<Swatch> {
        self.0
            .iter()
            .map(|c| Swatch {
                color: *c,
                hex: to_hex(c),
                text: contrast_text_color(c),
            })
            .collect()
    }

    /// Build a palette from `#rrggbb` strings.
    pub fn from_hex<S: AsRef<str>>(values: &[S]) -> Result<Self> {
        values
            .iter()
            .map(|v| parse_hex(v.as_ref()))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a Color;
    type IntoIter = std::slice::Iter<'a, Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Palette> for Vec<Color> {
    fn from(palette: Palette) -> Self {
        palette.0
    }
}

/// Sampler and quantizer wired to one [`Config`].
#[derive(Debug, Clone, Default)]
pub struct PaletteExtractor {
    config: Config,
}

impl PaletteExtractor {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract exactly `k` colors from `image`.
    ///
    /// `k` must lie in the configured color range.
    pub fn extract(&self, image: &DynamicImage, k: usize) -> Result<Palette> {
        let q = &self.config.quantizer;
        if !(q.min_colors..=q.max_colors).contains(&k) {
            return Err(PaletteError::InvalidK {
                k,
                min: q.min_colors,
                max: q.max_colors,
            });
        }

        let s = &self.config.sampling;
        let samples = sampler::sample(image, s.analysis_width, s.analysis_height)?;
        let palette = quantize(&samples, k, &q.kmeans_options())?;
        debug!(k, colors = ?palette.hex_strings(), "extracted palette");
        Ok(palette)
    }

    /// Decode `bytes` and extract `k` colors.
    pub fn extract_bytes(&self, bytes: &[u8], k: usize) -> Result<Palette> {
        self.extract(&sampler::decode(bytes)?, k)
    }
}

/// Extract `k` colors with the default configuration.
pub fn extract_palette(image: &DynamicImage, k: usize) -> Result<Palette> {
    PaletteExtractor::default().extract(image, k)
}

/// Append `{source, palette}` to the history log at `history_path`.
pub fn record_history(history_path: &Path, source: &Path, palette: &Palette) -> Result<()> {
    HistoryLog::new(history_path).record(source, palette)
}
