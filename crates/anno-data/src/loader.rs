//! Root loader: reads the three balance files and assembles [`Data`].
//!
//! Stages run strictly in order. Properties come first because asset
//! decoding consumes their defaults; localizations are independent. The
//! first failure aborts the load and no partial [`Data`] is returned.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anno_core::Product;

use crate::config::LoadConfig;
use crate::cursor::{CursorConfig, DecodeError, DocumentCursor};
use crate::localization::{LocalizationError, Localizations};
use crate::schema::{AssetId, Assets, Properties};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A file could not be opened or read.
    #[error("cannot read {file}: {source}")]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An XML document failed to decode.
    #[error("cannot decode {file}: {source}")]
    Decode {
        file: PathBuf,
        #[source]
        source: DecodeError,
    },

    /// The localization table failed to parse.
    #[error("cannot read localizations from {file}: {source}")]
    Localization {
        file: PathBuf,
        #[source]
        source: LocalizationError,
    },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A config file failed to deserialize.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },
}

// ===========================================================================
// Layout
// ===========================================================================

/// Paths of the three input files, as laid out by the archive extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataLayout {
    pub properties: PathBuf,
    pub assets: PathBuf,
    pub localizations: PathBuf,
}

impl DataLayout {
    pub fn new(base_dir: impl AsRef<Path>, language: &str) -> Self {
        let base_dir = base_dir.as_ref();
        let game = base_dir.join("data1.rda/data/config/game");
        Self {
            properties: game.join("properties.xml"),
            assets: game.join("assets.xml"),
            localizations: base_dir.join(format!("{language}0.rda/data/loca/{language}/txt/guids.txt")),
        }
    }
}

// ===========================================================================
// Stages
// ===========================================================================

fn open(path: &Path) -> Result<BufReader<File>, DataLoadError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| DataLoadError::Io {
            file: path.to_path_buf(),
            source,
        })
}

fn decode_error(path: &Path) -> impl FnOnce(DecodeError) -> DataLoadError + '_ {
    move |source| DataLoadError::Decode {
        file: path.to_path_buf(),
        source,
    }
}

/// Decode `properties.xml`.
pub fn load_properties(path: &Path, config: CursorConfig) -> Result<Properties, DataLoadError> {
    tracing::debug!(path = %path.display(), "loading properties");
    let mut cursor = DocumentCursor::new(open(path)?, config);
    let properties = Properties::decode_document(&mut cursor).map_err(decode_error(path))?;
    tracing::info!(
        product_icons = properties.product_icon_guid.len(),
        "loaded properties"
    );
    Ok(properties)
}

/// Decode `assets.xml` against the defaults in `properties`.
pub fn load_assets(
    path: &Path,
    properties: &Properties,
    config: CursorConfig,
) -> Result<Assets, DataLoadError> {
    tracing::debug!(path = %path.display(), "loading assets");
    let mut cursor = DocumentCursor::new(open(path)?, config);
    let assets = Assets::decode_document(&mut cursor, properties).map_err(decode_error(path))?;
    tracing::info!(
        farm_buildings = assets.farm_buildings.len(),
        factory_buildings = assets.factory_buildings.len(),
        "loaded assets"
    );
    Ok(assets)
}

/// Read a UTF-16 `guids.txt` table.
pub fn load_localizations(path: &Path) -> Result<Localizations, DataLoadError> {
    tracing::debug!(path = %path.display(), "loading localizations");
    let bytes = std::fs::read(path).map_err(|source| DataLoadError::Io {
        file: path.to_path_buf(),
        source,
    })?;
    let localizations =
        Localizations::from_utf16_bytes(&bytes).map_err(|source| DataLoadError::Localization {
            file: path.to_path_buf(),
            source,
        })?;
    tracing::info!(entries = localizations.len(), "loaded localizations");
    Ok(localizations)
}

// ===========================================================================
// Data
// ===========================================================================

/// Everything decoded from one game installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    pub properties: Properties,
    pub assets: Assets,
    pub localizations: Localizations,
}

impl Data {
    /// Load from `base_dir` using the default cursor settings.
    pub fn load(base_dir: impl Into<PathBuf>, language: &str) -> Result<Self, DataLoadError> {
        Self::load_with(&LoadConfig::new(base_dir, language))
    }

    pub fn load_with(config: &LoadConfig) -> Result<Self, DataLoadError> {
        Self::load_layout(&config.layout(), config.cursor)
    }

    /// Load from explicit file paths.
    pub fn load_layout(layout: &DataLayout, config: CursorConfig) -> Result<Self, DataLoadError> {
        let properties = load_properties(&layout.properties, config)?;
        let assets = load_assets(&layout.assets, &properties, config)?;
        let localizations = load_localizations(&layout.localizations)?;
        Ok(Self {
            properties,
            assets,
            localizations,
        })
    }

    /// Localized text for an asset, looked up by its GUID.
    pub fn localized_name(&self, id: &AssetId) -> Option<&str> {
        self.localizations.get(&id.guid)
    }

    pub fn product_icon_guid(&self, product: &Product) -> Option<&str> {
        self.properties.product_icon_guid.get(product)
    }
}
