#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end of the Bogotá block valuation wizard.
//!
//! Without a subcommand it runs the interactive wizard. The subcommands
//! list localities and blocks or analyse a single block end to end,
//! writing chart specifications and the assembled report as JSON.
//!
//! Uses `indicatif-log-bridge` (via [`avm_cli_utils::init_logger`]) so log
//! lines and progress bars never fight for the terminal.

mod interactive;
mod render;

use std::path::{Path, PathBuf};

use avm_analysis::AnalysisConfig;
use avm_analysis_models::AggregationResult;
use avm_catastro::DatasetStore;
use avm_catastro::load::{load_dir, load_remote};
use avm_catastro::registry::all_sources;
use avm_cli_utils::{IndicatifProgress, MultiProgress};
use avm_report::{Report, format_currency};
use avm_wizard::{Step, Wizard};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::render::JsonRenderer;

#[derive(Parser)]
#[command(name = "avm_cli", about = "Block valuation wizard for Bogotá")]
struct Cli {
    /// Read the `GeoJSON` collections from this directory instead of
    /// downloading them
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// TOML file overriding buffer radii and land-use colors
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory that receives the rendered chart specifications
    #[arg(long, global = true, default_value = "charts")]
    charts_dir: PathBuf,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every locality with its crime statistics
    Localities,
    /// List the blocks of a locality
    Blocks {
        /// Locality name (case-insensitive)
        #[arg(long)]
        locality: String,
        /// Maximum number of blocks to print
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Run the full analysis for one block and assemble its report
    Analyze {
        /// Locality name (case-insensitive)
        #[arg(long)]
        locality: String,
        /// Block identifier (`id_manzana_unif`)
        #[arg(long)]
        block: String,
        /// Write the JSON output here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// What the `analyze` subcommand and the interactive report step write.
#[derive(Serialize)]
struct AnalysisOutput<'a> {
    result: &'a AggregationResult,
    report: &'a Report,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = avm_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };

    let Some(command) = cli.command else {
        return interactive::run(&multi, cli.data_dir.as_deref(), config, cli.charts_dir).await;
    };

    let store = load_store(&multi, cli.data_dir.as_deref()).await?;

    match command {
        Commands::Localities => {
            let mut localities: Vec<_> = store.localities().iter().collect();
            localities.sort_by(|a, b| a.name.cmp(&b.name));
            for l in localities {
                println!(
                    "{:>3}  {:<28} {:>7} delitos  riesgo {}",
                    l.id, l.name, l.crime_count, l.risk_level
                );
            }
        }
        Commands::Blocks { locality, limit } => {
            let Some(locality) = store.locality_by_name(&locality) else {
                return Err(format!("Unknown locality: {locality}").into());
            };
            let blocks: Vec<_> = store.blocks_in(&locality.id).collect();
            println!("{} blocks in {}", blocks.len(), locality.name);
            for b in blocks.iter().take(limit.unwrap_or(usize::MAX)) {
                println!(
                    "{:<14} estrato {:<3} {:>14}",
                    b.id,
                    b.stratum.map_or_else(|| "-".to_string(), |s| s.to_string()),
                    format_currency(b.value_m2.unwrap_or(0.0)),
                );
            }
        }
        Commands::Analyze {
            locality,
            block,
            output,
        } => {
            let mut wizard = Wizard::new(config, JsonRenderer::new(cli.charts_dir));
            wizard.load(store)?;
            wizard.select_locality(&locality)?;
            wizard.confirm_locality()?;
            wizard.select_block(&block)?;
            while wizard.step() != Step::Report {
                wizard.advance()?;
            }
            write_output(&wizard, output.as_deref())?;
        }
    }

    Ok(())
}

/// Loads the dataset store from `data_dir` or over HTTP.
async fn load_store(
    multi: &MultiProgress,
    data_dir: Option<&Path>,
) -> Result<DatasetStore, Box<dyn std::error::Error>> {
    let sources = all_sources();
    let progress = IndicatifProgress::datasets_bar(multi, "Cargando datos");

    let store = match data_dir {
        Some(dir) => load_dir(dir, &sources, progress.as_ref())?,
        None => {
            let client = avm_catastro::fetch::client()?;
            load_remote(&client, &sources, progress).await?
        }
    };
    Ok(store)
}

/// Writes the analysis result and report of a wizard at the report step.
fn write_output(
    wizard: &Wizard<JsonRenderer>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = wizard.session();
    let (Some(result), Some(report)) = (&session.result, &session.report) else {
        return Err("The report has not been assembled".into());
    };

    let json = serde_json::to_string_pretty(&AnalysisOutput { result, report })?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            log::info!("Wrote report to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
