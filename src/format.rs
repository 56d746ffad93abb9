//! Hex formatting and label contrast for palette colors.

use std::fmt;

use crate::{Color, PaletteError, Result};

/// Channel sum below which a swatch counts as dark.
const DARK_SUM_THRESHOLD: u32 = 400;

/// Foreground color that stays legible on top of a swatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColor {
    White,
    Black,
}

impl TextColor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextColor::White => "white",
            TextColor::Black => "black",
        }
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `#rrggbb`, lower-case and zero-padded.
pub fn to_hex(color: &Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

pub fn contrast_text_color(color: &Color) -> TextColor {
    let sum = color.red as u32 + color.green as u32 + color.blue as u32;
    if sum < DARK_SUM_THRESHOLD {
        TextColor::White
    } else {
        TextColor::Black
    }
}

/// Parse `#rrggbb` or `rrggbb` (either case).
pub fn parse_hex(value: &str) -> Result<Color> {
    let trimmed = value.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(PaletteError::InvalidColor(value.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| PaletteError::InvalidColor(value.to_string()))
    };
    Ok(Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
