//! Typed balance entities and the decoders that build them from XML.
//!
//! Every decoder follows the same policy:
//!
//! - the cursor must be on the entity's start tag;
//! - recognized children are collected into an accumulator of optional
//!   fields, a repeated child overwriting the earlier value;
//! - unrecognized children are skipped whole;
//! - once the end tag is reached the accumulator is resolved field by field:
//!   value from this element, else the matching field of the default record,
//!   else [`DecodeError::MissingField`].
//!
//! No entity is ever handed out partially built.

use anno_core::{Amount, ArithmeticError, Fraction, Product, Time};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::BufRead;

use crate::cursor::{DecodeError, DocumentCursor};

// ===========================================================================
// Tag names
// ===========================================================================

const PROPERTIES: &str = "Properties";
const DEFAULT_VALUES: &str = "DefaultValues";
const GUI_BALANCING: &str = "GUIBalancing";
const PRODUCT_ICON_GUID: &str = "ProductIconGUID";

const FACTORY: &str = "Factory";
const RAW_MATERIAL_1: &str = "RawMaterial1";
const RAW_CAPACITY_1: &str = "RawCapacity1";
const RAW_NEEDED_1: &str = "RawNeeded1";
const RAW_MATERIAL_2: &str = "RawMaterial2";

const WARE_PRODUCTION: &str = "WareProduction";
const PRODUCTION_TIME: &str = "ProductionTime";
const PRODUCT: &str = "Product";
const PRODUCTION_CAPACITY: &str = "ProductionCapacity";
const PRODUCTION_COUNT: &str = "ProductionCount";

const ASSET_LIST: &str = "AssetList";
const TEMPLATE: &str = "Template";
const VALUES: &str = "Values";
const STANDARD: &str = "Standard";
const NAME: &str = "Name";
const GUID: &str = "GUID";

const FARM_BUILDING: &str = "FarmBuilding";
const FACTORY_BUILDING: &str = "FactoryBuilding";

// ===========================================================================
// Field helpers
// ===========================================================================

/// Value found in the element, else the default record's value, else an error.
fn resolve<T: Clone>(
    found: Option<T>,
    fallback: Option<&T>,
    field: &'static str,
) -> Result<T, DecodeError> {
    found
        .or_else(|| fallback.cloned())
        .ok_or(DecodeError::MissingField { field })
}

fn read_product<R: BufRead>(cursor: &mut DocumentCursor<R>) -> Result<Product, DecodeError> {
    cursor.current_text().map(Product)
}

fn read_amount<R: BufRead>(
    cursor: &mut DocumentCursor<R>,
    field: &str,
) -> Result<Amount, DecodeError> {
    cursor.read_integer(field).map(Amount)
}

fn read_time<R: BufRead>(
    cursor: &mut DocumentCursor<R>,
    field: &str,
) -> Result<Time, DecodeError> {
    cursor.read_integer(field).map(Time)
}

// ===========================================================================
// Factory
// ===========================================================================

/// Raw-material consumption profile of a production building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factory {
    pub raw_material1: Product,
    pub raw_capacity1: Amount,
    /// Amount of `raw_material1` consumed per production cycle.
    pub raw_needed1: Amount,
    pub raw_material2: Product,
}

#[derive(Default)]
struct FactoryFields {
    raw_material1: Option<Product>,
    raw_capacity1: Option<Amount>,
    raw_needed1: Option<Amount>,
    raw_material2: Option<Product>,
}

impl FactoryFields {
    fn accept<R: BufRead>(
        &mut self,
        cursor: &mut DocumentCursor<R>,
        tag: &str,
    ) -> Result<bool, DecodeError> {
        match tag {
            RAW_MATERIAL_1 => self.raw_material1 = Some(read_product(cursor)?),
            RAW_CAPACITY_1 => self.raw_capacity1 = Some(read_amount(cursor, tag)?),
            RAW_NEEDED_1 => self.raw_needed1 = Some(read_amount(cursor, tag)?),
            RAW_MATERIAL_2 => self.raw_material2 = Some(read_product(cursor)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self, default: Option<&Factory>) -> Result<Factory, DecodeError> {
        Ok(Factory {
            raw_material1: resolve(
                self.raw_material1,
                default.map(|d| &d.raw_material1),
                RAW_MATERIAL_1,
            )?,
            raw_capacity1: resolve(
                self.raw_capacity1,
                default.map(|d| &d.raw_capacity1),
                RAW_CAPACITY_1,
            )?,
            raw_needed1: resolve(
                self.raw_needed1,
                default.map(|d| &d.raw_needed1),
                RAW_NEEDED_1,
            )?,
            raw_material2: resolve(
                self.raw_material2,
                default.map(|d| &d.raw_material2),
                RAW_MATERIAL_2,
            )?,
        })
    }
}

impl Factory {
    pub const TAG: &'static str = FACTORY;

    /// Decode a `<Factory>` element, filling absent fields from `default`.
    pub fn decode<R: BufRead>(
        cursor: &mut DocumentCursor<R>,
        default: Option<&Factory>,
    ) -> Result<Self, DecodeError> {
        cursor.require_current_is_start(Self::TAG)?;
        let mut fields = FactoryFields::default();
        cursor.for_each_child(|cursor, tag| fields.accept(cursor, tag))?;
        fields.finish(default)
    }
}

// ===========================================================================
// WareProduction
// ===========================================================================

/// Output profile of a production building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WareProduction {
    /// Duration of one production cycle.
    pub production_time: Time,
    pub product: Product,
    pub production_capacity: Amount,
    /// Output of one production cycle.
    pub production_count: Amount,
}

#[derive(Default)]
struct WareProductionFields {
    production_time: Option<Time>,
    product: Option<Product>,
    production_capacity: Option<Amount>,
    production_count: Option<Amount>,
}

impl WareProductionFields {
    fn accept<R: BufRead>(
        &mut self,
        cursor: &mut DocumentCursor<R>,
        tag: &str,
    ) -> Result<bool, DecodeError> {
        match tag {
            PRODUCTION_TIME => self.production_time = Some(read_time(cursor, tag)?),
            PRODUCT => self.product = Some(read_product(cursor)?),
            PRODUCTION_CAPACITY => self.production_capacity = Some(read_amount(cursor, tag)?),
            PRODUCTION_COUNT => self.production_count = Some(read_amount(cursor, tag)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self, default: Option<&WareProduction>) -> Result<WareProduction, DecodeError> {
        Ok(WareProduction {
            production_time: resolve(
                self.production_time,
                default.map(|d| &d.production_time),
                PRODUCTION_TIME,
            )?,
            product: resolve(self.product, default.map(|d| &d.product), PRODUCT)?,
            production_capacity: resolve(
                self.production_capacity,
                default.map(|d| &d.production_capacity),
                PRODUCTION_CAPACITY,
            )?,
            production_count: resolve(
                self.production_count,
                default.map(|d| &d.production_count),
                PRODUCTION_COUNT,
            )?,
        })
    }
}

impl WareProduction {
    pub const TAG: &'static str = WARE_PRODUCTION;

    /// Decode a `<WareProduction>` element, filling absent fields from
    /// `default`.
    pub fn decode<R: BufRead>(
        cursor: &mut DocumentCursor<R>,
        default: Option<&WareProduction>,
    ) -> Result<Self, DecodeError> {
        cursor.require_current_is_start(Self::TAG)?;
        let mut fields = WareProductionFields::default();
        cursor.for_each_child(|cursor, tag| fields.accept(cursor, tag))?;
        fields.finish(default)
    }

    /// Output rate in tons per minute.
    pub fn tons_per_minute(&self) -> Result<Fraction, ArithmeticError> {
        self.production_count
            .tons()
            .checked_div(self.production_time.minutes())
    }

    /// Time needed to produce one ton, in seconds.
    pub fn seconds_per_ton(&self) -> Result<Fraction, ArithmeticError> {
        self.production_time
            .seconds()
            .checked_div(self.production_count.tons())
    }
}

// ===========================================================================
// AssetId
// ===========================================================================

/// Identity of a game asset, decoded from its `<Standard>` block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId {
    pub name: String,
    pub guid: String,
}

impl AssetId {
    pub const TAG: &'static str = STANDARD;

    pub fn decode<R: BufRead>(cursor: &mut DocumentCursor<R>) -> Result<Self, DecodeError> {
        cursor.require_current_is_start(Self::TAG)?;
        let mut name = None;
        let mut guid = None;
        cursor.for_each_child(|cursor, tag| {
            match tag {
                NAME => name = Some(cursor.current_text()?),
                GUID => guid = Some(cursor.current_text()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(AssetId {
            name: resolve(name, None, NAME)?,
            guid: resolve(guid, None, GUID)?,
        })
    }
}

// ===========================================================================
// ProductIconGuid
// ===========================================================================

/// Icon GUID of every ware, keyed by product name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductIconGuid(pub BTreeMap<String, String>);

impl ProductIconGuid {
    /// The enclosing element; the table itself is its `<ProductIconGUID>`
    /// descendant.
    pub const TAG: &'static str = GUI_BALANCING;

    /// Decode the `<ProductIconGUID>` table inside a `<GUIBalancing>` element.
    ///
    /// Each child of the table is a `<ProductName>guid</ProductName>` pair.
    /// The rest of `<GUIBalancing>` is skipped.
    pub fn decode<R: BufRead>(cursor: &mut DocumentCursor<R>) -> Result<Self, DecodeError> {
        cursor.require_current_is_start(Self::TAG)?;
        let scope = cursor.open_scope()?;
        if !cursor.find_within(scope, PRODUCT_ICON_GUID)? {
            return Err(DecodeError::MissingField {
                field: PRODUCT_ICON_GUID,
            });
        }
        let mut guids = BTreeMap::new();
        cursor.for_each_child(|cursor, product| {
            let guid = cursor.current_text()?;
            guids.insert(product.to_string(), guid);
            Ok(true)
        })?;
        cursor.close_scope(scope)?;
        Ok(Self(guids))
    }

    pub fn get(&self, product: &Product) -> Option<&str> {
        self.0.get(product.name()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ===========================================================================
// Properties
// ===========================================================================

/// Document-wide fallback values from `properties.xml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    pub default_factory: Factory,
    pub default_ware_production: WareProduction,
    pub product_icon_guid: ProductIconGuid,
}

#[derive(Default)]
struct PropertiesFields {
    default_factory: Option<Factory>,
    default_ware_production: Option<WareProduction>,
    product_icon_guid: Option<ProductIconGuid>,
}

impl PropertiesFields {
    fn accept<R: BufRead>(
        &mut self,
        cursor: &mut DocumentCursor<R>,
        tag: &str,
    ) -> Result<bool, DecodeError> {
        match tag {
            FACTORY => self.default_factory = Some(Factory::decode(cursor, None)?),
            WARE_PRODUCTION => {
                self.default_ware_production = Some(WareProduction::decode(cursor, None)?)
            }
            GUI_BALANCING => self.product_icon_guid = Some(ProductIconGuid::decode(cursor)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self) -> Result<Properties, DecodeError> {
        Ok(Properties {
            default_factory: resolve(self.default_factory, None, FACTORY)?,
            default_ware_production: resolve(
                self.default_ware_production,
                None,
                WARE_PRODUCTION,
            )?,
            product_icon_guid: resolve(self.product_icon_guid, None, GUI_BALANCING)?,
        })
    }
}

impl Properties {
    pub const TAG: &'static str = PROPERTIES;

    /// Decode a `<Properties>` element.
    ///
    /// Every `<DefaultValues>` section below it contributes; at least one
    /// must exist.
    pub fn decode<R: BufRead>(cursor: &mut DocumentCursor<R>) -> Result<Self, DecodeError> {
        cursor.require_current_is_start(Self::TAG)?;
        let scope = cursor.open_scope()?;
        let mut fields = PropertiesFields::default();
        let mut sections = 0usize;
        while cursor.find_within(scope, DEFAULT_VALUES)? {
            sections += 1;
            cursor.for_each_child(|cursor, tag| fields.accept(cursor, tag))?;
        }
        if sections == 0 {
            return Err(DecodeError::ElementNotFound {
                name: DEFAULT_VALUES.to_string(),
            });
        }
        fields.finish()
    }

    /// Decode a whole `properties.xml` document from a fresh cursor.
    pub fn decode_document<R: BufRead>(
        cursor: &mut DocumentCursor<R>,
    ) -> Result<Self, DecodeError> {
        cursor.advance_to_next_tag()?;
        Self::decode(cursor)
    }
}

// ===========================================================================
// Buildings
// ===========================================================================

/// A building that produces a ware from nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmBuilding {
    pub id: AssetId,
    pub ware_production: WareProduction,
}

/// A building that turns raw materials into a ware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryBuilding {
    pub id: AssetId,
    pub ware_production: WareProduction,
    pub factory: Factory,
}

#[derive(Default)]
struct BuildingFields {
    id: Option<AssetId>,
    ware_production: Option<WareProduction>,
    factory: Option<Factory>,
}

impl BuildingFields {
    fn accept<R: BufRead>(
        &mut self,
        cursor: &mut DocumentCursor<R>,
        tag: &str,
        properties: &Properties,
    ) -> Result<bool, DecodeError> {
        match tag {
            STANDARD => self.id = Some(AssetId::decode(cursor)?),
            WARE_PRODUCTION => {
                self.ware_production = Some(WareProduction::decode(
                    cursor,
                    Some(&properties.default_ware_production),
                )?)
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl FarmBuilding {
    /// Value of `<Template>` naming this kind of asset.
    pub const TEMPLATE: &'static str = FARM_BUILDING;

    /// Decode the `<Values>` block of a farm building asset.
    pub fn decode<R: BufRead>(
        cursor: &mut DocumentCursor<R>,
        properties: &Properties,
    ) -> Result<Self, DecodeError> {
        cursor.require_current_is_start(VALUES)?;
        let mut fields = BuildingFields::default();
        cursor.for_each_child(|cursor, tag| fields.accept(cursor, tag, properties))?;
        Ok(FarmBuilding {
            id: resolve(fields.id, None, STANDARD)?,
            ware_production: resolve(fields.ware_production, None, WARE_PRODUCTION)?,
        })
    }
}

impl FactoryBuilding {
    /// Value of `<Template>` naming this kind of asset.
    pub const TEMPLATE: &'static str = FACTORY_BUILDING;

    /// Decode the `<Values>` block of a factory building asset.
    pub fn decode<R: BufRead>(
        cursor: &mut DocumentCursor<R>,
        properties: &Properties,
    ) -> Result<Self, DecodeError> {
        cursor.require_current_is_start(VALUES)?;
        let mut fields = BuildingFields::default();
        cursor.for_each_child(|cursor, tag| match tag {
            FACTORY => {
                fields.factory = Some(Factory::decode(cursor, Some(&properties.default_factory))?);
                Ok(true)
            }
            _ => fields.accept(cursor, tag, properties),
        })?;
        Ok(FactoryBuilding {
            id: resolve(fields.id, None, STANDARD)?,
            ware_production: resolve(fields.ware_production, None, WARE_PRODUCTION)?,
            factory: resolve(fields.factory, None, FACTORY)?,
        })
    }
}

/// A building of either kind, borrowed from [`Assets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Building<'a> {
    Farm(&'a FarmBuilding),
    Factory(&'a FactoryBuilding),
}

impl<'a> Building<'a> {
    pub fn id(&self) -> &'a AssetId {
        match self {
            Building::Farm(farm) => &farm.id,
            Building::Factory(factory) => &factory.id,
        }
    }

    pub fn ware_production(&self) -> &'a WareProduction {
        match self {
            Building::Farm(farm) => &farm.ware_production,
            Building::Factory(factory) => &factory.ware_production,
        }
    }

    /// Raw-material profile; farms have none.
    pub fn factory(&self) -> Option<&'a Factory> {
        match self {
            Building::Farm(_) => None,
            Building::Factory(factory) => Some(&factory.factory),
        }
    }
}

// ===========================================================================
// Assets
// ===========================================================================

/// Asset kinds the asset-list decoder understands, keyed by `<Template>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetTemplate {
    FarmBuilding,
    FactoryBuilding,
}

impl AssetTemplate {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            FARM_BUILDING => Some(AssetTemplate::FarmBuilding),
            FACTORY_BUILDING => Some(AssetTemplate::FactoryBuilding),
            _ => None,
        }
    }
}

/// The buildings of `assets.xml`, each list in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assets {
    pub farm_buildings: Vec<FarmBuilding>,
    pub factory_buildings: Vec<FactoryBuilding>,
}

impl Assets {
    pub const TAG: &'static str = ASSET_LIST;

    /// Decode an `<AssetList>` element.
    ///
    /// Every `<Template>` below it must be followed by a `<Values>` sibling.
    /// Assets whose template is not a known building kind are skipped.
    pub fn decode<R: BufRead>(
        cursor: &mut DocumentCursor<R>,
        properties: &Properties,
    ) -> Result<Self, DecodeError> {
        cursor.require_current_is_start(Self::TAG)?;
        let scope = cursor.open_scope()?;
        let mut assets = Assets::default();
        while cursor.find_within(scope, TEMPLATE)? {
            let template = cursor.current_text()?;
            cursor.advance_to_next_tag()?;
            cursor.require_current_is_start(VALUES)?;
            match AssetTemplate::from_name(&template) {
                Some(AssetTemplate::FarmBuilding) => assets
                    .farm_buildings
                    .push(FarmBuilding::decode(cursor, properties)?),
                Some(AssetTemplate::FactoryBuilding) => assets
                    .factory_buildings
                    .push(FactoryBuilding::decode(cursor, properties)?),
                None => cursor.skip_subtree()?,
            }
        }
        Ok(assets)
    }

    /// Decode a whole `assets.xml` document from a fresh cursor.
    pub fn decode_document<R: BufRead>(
        cursor: &mut DocumentCursor<R>,
        properties: &Properties,
    ) -> Result<Self, DecodeError> {
        cursor.advance_to_next_tag()?;
        Self::decode(cursor, properties)
    }

    /// Total number of buildings.
    pub fn len(&self) -> usize {
        self.farm_buildings.len() + self.factory_buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All buildings: farms first, then factories, each in document order.
    pub fn buildings(&self) -> impl Iterator<Item = Building<'_>> {
        self.farm_buildings
            .iter()
            .map(Building::Farm)
            .chain(self.factory_buildings.iter().map(Building::Factory))
    }

    pub fn find_by_guid(&self, guid: &str) -> Option<Building<'_>> {
        self.buildings().find(|b| b.id().guid == guid)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
