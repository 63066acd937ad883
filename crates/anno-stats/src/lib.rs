//! Production throughput analysis over decoded Anno balance data.
//!
//! Computes, for every building of an [`Assets`] list, how fast it produces
//! its ware and how fast it consumes its primary raw material. All rates are
//! exact [`Fraction`]s, so production-chain ratios such as "three sheep farms
//! per weaver" come out exactly.
//!
//! # Usage
//!
//! ```ignore
//! let data = Data::load(base_dir, "english")?;
//! let report = ThroughputReport::from_assets(&data.assets)?;
//! let farms_per_weaver = report.supply_ratio(weaver_guid);
//! ```

use anno_core::{ArithmeticError, Fraction, Product};
use anno_data::{AssetId, Assets, Building};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// BuildingThroughput
// ---------------------------------------------------------------------------

/// Consumption of a factory's primary raw material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDemand {
    pub material: Product,
    /// `RawNeeded1` tons per production cycle, divided by cycle minutes.
    pub tons_per_minute: Fraction,
}

/// Production rates of one building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingThroughput {
    pub id: AssetId,
    pub product: Product,
    pub tons_per_minute: Fraction,
    pub seconds_per_ton: Fraction,
    /// `None` for farm buildings.
    pub raw_demand: Option<RawDemand>,
}

impl BuildingThroughput {
    pub fn from_building(building: Building<'_>) -> Result<Self, ArithmeticError> {
        let ware = building.ware_production();
        let raw_demand = match building.factory() {
            Some(factory) => Some(RawDemand {
                material: factory.raw_material1.clone(),
                tons_per_minute: factory
                    .raw_needed1
                    .tons()
                    .checked_div(ware.production_time.minutes())?,
            }),
            None => None,
        };
        Ok(Self {
            id: building.id().clone(),
            product: ware.product.clone(),
            tons_per_minute: ware.tons_per_minute()?,
            seconds_per_ton: ware.seconds_per_ton()?,
            raw_demand,
        })
    }
}

// ---------------------------------------------------------------------------
// ThroughputReport
// ---------------------------------------------------------------------------

/// Throughput of every building, farms first, each kind in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThroughputReport {
    pub buildings: Vec<BuildingThroughput>,
}

impl ThroughputReport {
    /// Fails on the first building with a zero production time or count.
    pub fn from_assets(assets: &Assets) -> Result<Self, ArithmeticError> {
        let buildings = assets
            .buildings()
            .map(BuildingThroughput::from_building)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { buildings })
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn get(&self, guid: &str) -> Option<&BuildingThroughput> {
        self.buildings.iter().find(|b| b.id.guid == guid)
    }

    /// Buildings whose output is `product`.
    pub fn producers_of<'a>(
        &'a self,
        product: &'a Product,
    ) -> impl Iterator<Item = &'a BuildingThroughput> + 'a {
        self.buildings.iter().filter(move |b| &b.product == product)
    }

    /// Producers of the consumer's raw material needed to keep it running.
    ///
    /// Compares the consumer's raw demand with the output of the first
    /// building producing that material. `None` if the consumer is unknown,
    /// has no raw demand, or nothing produces its material.
    pub fn supply_ratio(&self, consumer_guid: &str) -> Option<Fraction> {
        let demand = self.get(consumer_guid)?.raw_demand.as_ref()?;
        let producer = self.producers_of(&demand.material).next()?;
        demand
            .tons_per_minute
            .checked_div(producer.tons_per_minute)
            .ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
