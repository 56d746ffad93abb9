//! File-backed log of past palette exports.
//!
//! The log is a single JSON array rewritten on every append. Appends read
//! the file first, so records written earlier in the same process are never
//! lost. Nothing guards against two processes appending at once.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Palette, Result};

pub const DEFAULT_HISTORY_FILE: &str = "palette_history.json";

/// One export: the source image and the colors it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteRecord {
    pub file: String,
    pub colors: Vec<String>,
}

impl PaletteRecord {
    pub fn new(source: &Path, palette: &Palette) -> Self {
        Self {
            file: source.display().to_string(),
            colors: palette.hex_strings(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current records. A missing or unreadable file is an empty history.
    pub fn load(&self) -> Vec<PaletteRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "history unreadable, starting fresh");
                return Vec::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "history corrupt, starting fresh");
                Vec::new()
            }
        }
    }

    /// Read, append, and rewrite the whole log.
    pub fn append(&self, record: PaletteRecord) -> Result<()> {
        let mut records = self.load();
        records.push(record);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&records)?;
        std::fs::write(&self.path, json)?;

        info!(path = %self.path.display(), records = records.len(), "recorded palette history");
        Ok(())
    }

    pub fn record(&self, source: &Path, palette: &Palette) -> Result<()> {
        self.append(PaletteRecord::new(source, palette))
    }
}
