//! Rendering of decoded data as text, JSON or RON.

use anno_core::Fraction;
use anno_data::{Assets, Data, Factory, Properties, WareProduction};
use anno_stats::{BuildingThroughput, ThroughputReport};
use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Ron,
}

fn encode<T: Serialize>(value: &T, format: OutputFormat) -> Result<Option<String>> {
    Ok(match format {
        OutputFormat::Text => None,
        OutputFormat::Json => Some(serde_json::to_string_pretty(value)?),
        OutputFormat::Ron => Some(ron::ser::to_string_pretty(
            value,
            ron::ser::PrettyConfig::default(),
        )?),
    })
}

// ---------------------------------------------------------------------------
// summary
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Summary<'a> {
    properties: &'a Properties,
    assets: &'a Assets,
    localizations: usize,
}

pub fn summary(data: &Data, format: OutputFormat) -> Result<String> {
    let encoded = encode(
        &Summary {
            properties: &data.properties,
            assets: &data.assets,
            localizations: data.localizations.len(),
        },
        format,
    )?;
    Ok(encoded.unwrap_or_else(|| summary_text(data)))
}

fn factory_line(factory: &Factory) -> String {
    format!(
        "needs {} of {} (holds {}), second input {}",
        factory.raw_needed1, factory.raw_material1, factory.raw_capacity1, factory.raw_material2
    )
}

fn ware_line(ware: &WareProduction) -> String {
    format!(
        "makes {} of {} every {} (stores {})",
        ware.production_count, ware.product, ware.production_time, ware.production_capacity
    )
}

fn summary_text(data: &Data) -> String {
    let properties = &data.properties;
    let mut lines = vec![
        "Properties".to_string(),
        format!("  default factory: {}", factory_line(&properties.default_factory)),
        format!(
            "  default production: {}",
            ware_line(&properties.default_ware_production)
        ),
        format!(
            "  product icons: {}",
            properties.product_icon_guid.len()
        ),
        format!("Farm buildings ({})", data.assets.farm_buildings.len()),
    ];
    for farm in &data.assets.farm_buildings {
        lines.push(format!(
            "  {} [{}]: {}",
            farm.id.name,
            farm.id.guid,
            ware_line(&farm.ware_production)
        ));
    }
    lines.push(format!(
        "Factory buildings ({})",
        data.assets.factory_buildings.len()
    ));
    for building in &data.assets.factory_buildings {
        lines.push(format!(
            "  {} [{}]: {}; {}",
            building.id.name,
            building.id.guid,
            ware_line(&building.ware_production),
            factory_line(&building.factory)
        ));
    }
    lines.push(format!("Localizations: {}", data.localizations.len()));
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// throughput
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ThroughputRow<'a> {
    name: &'a str,
    building: &'a BuildingThroughput,
}

pub fn throughput(data: &Data, report: &ThroughputReport, format: OutputFormat) -> Result<String> {
    let rows: Vec<ThroughputRow<'_>> = report
        .buildings
        .iter()
        .map(|building| ThroughputRow {
            name: data
                .localized_name(&building.id)
                .unwrap_or(building.id.name.as_str()),
            building,
        })
        .collect();
    let encoded = encode(&rows, format)?;
    Ok(encoded.unwrap_or_else(|| {
        rows.iter()
            .map(throughput_line)
            .collect::<Vec<_>>()
            .join("\n")
    }))
}

fn rate(value: Fraction) -> String {
    if value.is_integer() {
        value.to_string()
    } else {
        format!("{value} (~{:.3})", value.to_f64())
    }
}

fn throughput_line(row: &ThroughputRow<'_>) -> String {
    let b = row.building;
    let demand = match &b.raw_demand {
        Some(demand) => format!(
            ", consumes {} t/min of {}",
            rate(demand.tons_per_minute),
            demand.material
        ),
        None => String::new(),
    };
    format!(
        "{}: {} t/min of {}, {} s/t{}",
        row.name,
        rate(b.tons_per_minute),
        b.product,
        rate(b.seconds_per_ton),
        demand
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anno_core::{Amount, Product, Time};
    use anno_data::{AssetId, FactoryBuilding, FarmBuilding, Localizations, ProductIconGuid};

    fn ware(product: &str, time_ms: i64, count_kg: i64) -> WareProduction {
        WareProduction {
            production_time: Time(time_ms),
            product: Product::new(product),
            production_capacity: Amount(100),
            production_count: Amount(count_kg),
        }
    }

    fn factory(material: &str, needed_kg: i64) -> Factory {
        Factory {
            raw_material1: Product::new(material),
            raw_capacity1: Amount(4000),
            raw_needed1: Amount(needed_kg),
            raw_material2: Product::new("None"),
        }
    }

    fn data() -> Data {
        Data {
            properties: Properties {
                default_factory: factory("None", 0),
                default_ware_production: ware("None", 60_000, 1000),
                product_icon_guid: ProductIconGuid::default(),
            },
            assets: Assets {
                farm_buildings: vec![FarmBuilding {
                    id: AssetId {
                        name: "SheepFarm".into(),
                        guid: "1".into(),
                    },
                    ware_production: ware("Wool", 90_000, 1000),
                }],
                factory_buildings: vec![FactoryBuilding {
                    id: AssetId {
                        name: "Weaver".into(),
                        guid: "2".into(),
                    },
                    ware_production: ware("Cloth", 30_000, 1000),
                    factory: factory("Wool", 2000),
                }],
            },
            localizations: Localizations::parse_str("2=Weaver's Hut\n").unwrap(),
        }
    }

    #[test]
    fn summary_text_lists_buildings() {
        let text = summary(&data(), OutputFormat::Text).unwrap();
        assert!(text.contains("Farm buildings (1)"));
        assert!(text.contains("SheepFarm [1]: makes 1000 kg of Wool every 90000 ms"));
        assert!(text.contains("Weaver [2]"));
        assert!(text.ends_with("Localizations: 1"));
    }

    #[test]
    fn summary_json() {
        let json = summary(&data(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["localizations"], 1);
        assert_eq!(value["assets"]["farm_buildings"][0]["id"]["name"], "SheepFarm");
    }

    #[test]
    fn summary_ron() {
        let text = summary(&data(), OutputFormat::Ron).unwrap();
        assert!(text.contains("localizations: 1"));
    }

    #[test]
    fn throughput_text_uses_localized_names() {
        let data = data();
        let report = ThroughputReport::from_assets(&data.assets).unwrap();
        let text = throughput(&data, &report, OutputFormat::Text).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "SheepFarm: 2/3 (~0.667) t/min of Wool, 90 s/t");
        assert_eq!(
            lines[1],
            "Weaver's Hut: 2 t/min of Cloth, 30 s/t, consumes 4 t/min of Wool"
        );
    }

    #[test]
    fn throughput_json() {
        let data = data();
        let report = ThroughputReport::from_assets(&data.assets).unwrap();
        let json = throughput(&data, &report, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[1]["name"], "Weaver's Hut");
        assert_eq!(value[0]["building"]["tons_per_minute"], serde_json::json!([2, 3]));
    }
}
