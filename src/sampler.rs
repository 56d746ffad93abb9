//! Image decoding and fixed-resolution sampling.
//!
//! Every image is reduced to the same analysis grid before clustering so that
//! the cost of a run does not depend on the source resolution. Resampling is
//! nearest-neighbour: the sample set only ever contains colors that exist in
//! the source image.

use std::path::Path;

use image::{DynamicImage, GenericImageView, imageops::FilterType};
use palette::Srgb;
use tracing::debug;

use crate::{Color, PaletteError, Result};

/// Analysis grid used when no configuration overrides it.
pub const DEFAULT_ANALYSIS_SIZE: (u32, u32) = (200, 200);

const FILTER: FilterType = FilterType::Nearest;

/// Decode an encoded image (PNG, JPEG, WEBP, ...) from memory.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| PaletteError::decode("unable to decode image", e))
}

/// Read and decode an image file.
pub fn open(path: &Path) -> Result<DynamicImage> {
    let bytes = std::fs::read(path)?;
    image::load_from_memory(&bytes)
        .map_err(|e| PaletteError::decode(format!("unable to decode {}", path.display()), e))
}

/// Resize `image` to `width`×`height` and return every pixel, row-major.
///
/// Grayscale and alpha images are converted to 8-bit RGB first; alpha is
/// discarded. The result always holds exactly `width * height` samples.
pub fn sample(image: &DynamicImage, width: u32, height: u32) -> Result<Vec<Color>> {
    let (in_w, in_h) = image.dimensions();
    if in_w == 0 || in_h == 0 {
        return Err(PaletteError::invalid_image(format!(
            "image has no pixels ({in_w}x{in_h})"
        )));
    }
    if width == 0 || height == 0 {
        return Err(PaletteError::invalid_image(format!(
            "analysis size must be non-zero, got {width}x{height}"
        )));
    }

    let rgb = image.to_rgb8();
    // Fast path – already at the analysis resolution.
    let grid = if (in_w, in_h) == (width, height) {
        rgb
    } else {
        image::imageops::resize(&rgb, width, height, FILTER)
    };

    debug!(from = ?(in_w, in_h), to = ?(width, height), "sampled image");

    Ok(grid
        .pixels()
        .map(|p| Srgb::new(p[0], p[1], p[2]))
        .collect())
}
