//! Load configuration and the settings files it is read from.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cursor::CursorConfig;
use crate::loader::{DataLayout, DataLoadError};

/// Language used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "english";

// ===========================================================================
// Config files
// ===========================================================================

/// Deserialize a `.toml`, `.ron` or `.json` settings file.
///
/// The extension is checked before the file is opened, so a missing file with
/// an unknown extension still reports [`DataLoadError::UnsupportedFormat`].
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let extension = path.extension().and_then(|e| e.to_str());
    if !matches!(extension, Some("toml" | "ron" | "json")) {
        return Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        file: path.to_path_buf(),
        source,
    })?;
    let parsed: Result<T, String> = match extension {
        Some("toml") => toml::from_str(&content).map_err(|e| e.to_string()),
        Some("ron") => ron::from_str(&content).map_err(|e| e.to_string()),
        _ => serde_json::from_str(&content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|detail| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    })
}

// ===========================================================================
// LoadConfig
// ===========================================================================

/// Everything a full data load needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Directory holding the extracted `data1.rda` and `{lang}0.rda` trees.
    pub base_dir: PathBuf,
    pub language: String,
    pub cursor: CursorConfig,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            language: DEFAULT_LANGUAGE.to_string(),
            cursor: CursorConfig::default(),
        }
    }
}

impl LoadConfig {
    pub fn new(base_dir: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            language: language.into(),
            cursor: CursorConfig::default(),
        }
    }

    /// Read a config from a `.toml`, `.ron` or `.json` file.
    pub fn from_file(path: &Path) -> Result<Self, DataLoadError> {
        deserialize_file(path)
    }

    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.base_dir, &self.language)
    }
}
