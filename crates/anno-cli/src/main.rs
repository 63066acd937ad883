//! anno - inspect Anno 1404 production balance data
//!
//! Loads `properties.xml`, `assets.xml` and the localization table from an
//! extracted game directory and prints what was decoded.

mod output;

use anno_data::{Data, LoadConfig};
use anno_stats::ThroughputReport;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use output::OutputFormat;

#[derive(Parser)]
#[command(name = "anno")]
#[command(about = "Inspect Anno 1404 production balance data")]
#[command(version)]
struct Cli {
    /// Load settings from a .toml, .ron or .json file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the extracted game archives (overrides config)
    #[arg(long, env = "ANNO_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Localization language, e.g. english (overrides config)
    #[arg(long, env = "ANNO_LANGUAGE", global = true)]
    language: Option<String>,

    /// Output encoding
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the decoded properties, assets and localization count
    Summary,

    /// Print production rates of every building
    Throughput,
}

impl Cli {
    fn load_config(&self) -> Result<LoadConfig> {
        let mut config = match &self.config {
            Some(path) => LoadConfig::from_file(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => LoadConfig::default(),
        };
        if let Some(dir) = &self.data_dir {
            config.base_dir = dir.clone();
        }
        if let Some(language) = &self.language {
            config.language = language.clone();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;
    tracing::debug!(
        base_dir = %config.base_dir.display(),
        language = %config.language,
        "loading game data"
    );

    let data = Data::load_with(&config)
        .with_context(|| format!("Failed to load game data from {}", config.base_dir.display()))?;

    let rendered = match cli.command {
        Commands::Summary => output::summary(&data, cli.format)?,
        Commands::Throughput => {
            let report = ThroughputReport::from_assets(&data.assets)
                .context("Failed to compute building throughput")?;
            output::throughput(&data, &report, cli.format)?
        }
    };
    println!("{rendered}");
    Ok(())
}
