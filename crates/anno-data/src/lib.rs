pub mod config;
pub mod cursor;
pub mod loader;
pub mod localization;
pub mod schema;

pub use config::LoadConfig;
pub use cursor::{CursorConfig, DecodeError, DocumentCursor, DoctypePolicy};
pub use loader::{Data, DataLayout, DataLoadError};
pub use localization::{LocalizationError, Localizations};
pub use schema::{
    AssetId, Assets, Building, Factory, FactoryBuilding, FarmBuilding, ProductIconGuid,
    Properties, WareProduction,
};
