//! Error types for palette extraction and export

use thiserror::Error;

/// Result type alias for lava_palette operations
pub type Result<T> = std::result::Result<T, PaletteError>;

#[derive(Error, Debug)]
pub enum PaletteError {
    /// Image could not be decoded, or has no pixels to sample
    #[error("Invalid image: {message}")]
    InvalidImage {
        message: String,
        #[source]
        source: Option<image::ImageError>,
    },

    /// Requested color count is outside the accepted range
    #[error("Invalid color count {k}: expected {min}..={max}")]
    InvalidK { k: usize, min: usize, max: usize },

    /// An encoder was handed an empty palette
    #[error("Invalid palette: {0}")]
    InvalidPalette(String),

    #[error("Invalid swatch scale {0}: must be at least 1")]
    InvalidScale(u32),

    #[error("Invalid hex color: {0:?}")]
    InvalidColor(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PaletteError {
    pub fn invalid_image(message: impl Into<String>) -> Self {
        Self::InvalidImage {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a decoder error with context
    pub fn decode(message: impl Into<String>, source: image::ImageError) -> Self {
        Self::InvalidImage {
            message: message.into(),
            source: Some(source),
        }
    }

    /// One human-readable message per failure class, for front ends
    pub fn user_message(&self) -> String {
        match self {
            PaletteError::InvalidImage { .. } => {
                "Could not read the image. Please check the file format and try again.".to_string()
            }
            PaletteError::InvalidK { min, max, .. } => {
                format!("Please choose between {min} and {max} colors.")
            }
            PaletteError::InvalidPalette(_) => "There is no palette to export yet.".to_string(),
            PaletteError::InvalidScale(_) => "Swatch sizes must be at least 1 pixel.".to_string(),
            PaletteError::InvalidColor(value) => format!("{value:?} is not a #rrggbb color."),
            PaletteError::Config(_) => "The configuration file is not valid.".to_string(),
            PaletteError::Io(_) | PaletteError::Serialization(_) => {
                "Could not write the palette files. Please check the destination folder.".to_string()
            }
        }
    }
}
