//! GIMP palette and swatch strip encoders.
//!
//! Both encoders keep the palette's order: line `i` of the `.gpl` file and
//! tile `i` of every strip are palette color `i`.

use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};
use tracing::info;

use crate::format::to_hex;
use crate::{Palette, PaletteError, Result};

/// Swatch scales written when the caller does not ask for specific ones.
pub const DEFAULT_SCALES: [u32; 3] = [1, 8, 32];

const GPL_HEADER: &str = "GIMP Palette\nName: Exported Palette\nColumns: 0\n#\n";

/// Paths written by [`export`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub gpl: PathBuf,
    /// One strip per requested scale, in request order.
    pub swatches: Vec<(u32, PathBuf)>,
}

fn ensure_non_empty(palette: &Palette) -> Result<()> {
    if palette.is_empty() {
        return Err(PaletteError::InvalidPalette("palette has no colors".into()));
    }
    Ok(())
}

/// Encode `palette` as a GIMP `.gpl` text palette.
pub fn encode_gpl(palette: &Palette) -> Result<String> {
    ensure_non_empty(palette)?;
    let mut out = String::from(GPL_HEADER);
    for c in palette.iter() {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{} {} {}\t{}", c.red, c.green, c.blue, to_hex(c));
    }
    Ok(out)
}

/// Render a `len * scale` × `scale` strip with one square tile per color.
pub fn swatch_strip(palette: &Palette, scale: u32) -> Result<RgbImage> {
    ensure_non_empty(palette)?;
    if scale == 0 {
        return Err(PaletteError::InvalidScale(scale));
    }
    let width = u32::try_from(palette.len())
        .ok()
        .and_then(|n| n.checked_mul(scale))
        .ok_or(PaletteError::InvalidScale(scale))?;

    let colors = palette.colors();
    Ok(RgbImage::from_fn(width, scale, |x, _| {
        let c = colors[(x / scale) as usize];
        Rgb([c.red, c.green, c.blue])
    }))
}

/// PNG-encoded [`swatch_strip`].
pub fn encode_swatch_png(palette: &Palette, scale: u32) -> Result<Vec<u8>> {
    let strip = swatch_strip(palette, scale)?;
    let mut buf = Vec::new();
    {
        let mut cursor = std::io::Cursor::new(&mut buf);
        strip
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(std::io::Error::other)?;
    }
    Ok(buf)
}

/// Write `<base>.gpl` and one `<base>_x<scale>.png` per scale.
///
/// Every artifact is encoded in memory before anything touches the disk, so
/// a failed encode leaves no partial export behind.
pub fn export(palette: &Palette, base_path: &Path, scales: &[u32]) -> Result<ExportedFiles> {
    ensure_non_empty(palette)?;
    if let Some(&bad) = scales.iter().find(|&&s| s == 0) {
        return Err(PaletteError::InvalidScale(bad));
    }

    let gpl_text = encode_gpl(palette)?;
    let strips = scales
        .iter()
        .map(|&scale| -> Result<(u32, Vec<u8>)> { Ok((scale, encode_swatch_png(palette, scale)?)) })
        .collect::<Result<Vec<_>>>()?;

    if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let gpl = with_suffix(base_path, ".gpl");
    std::fs::write(&gpl, gpl_text)?;
    info!(path = %gpl.display(), colors = palette.len(), "wrote palette");

    let mut swatches = Vec::with_capacity(strips.len());
    for (scale, png) in strips {
        let path = with_suffix(base_path, &format!("_x{scale}.png"));
        std::fs::write(&path, png)?;
        info!(path = %path.display(), scale, "wrote swatch strip");
        swatches.push((scale, path));
    }

    Ok(ExportedFiles { gpl, swatches })
}

/// Export base for `source`: `dir/<file stem>`.
pub fn export_base(dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("palette"));
    dir.join(stem)
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
