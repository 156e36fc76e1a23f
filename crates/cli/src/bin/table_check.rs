use std::env;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use flight_perf::config::{PerformanceSettings, load_settings, load_tables};
use flight_perf::interp::{InterpolationPolicy, Interpolator};
use flight_perf::tables::TableStore;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Validate performance tables and optionally interpolate a point"
)]
struct Cli {
    /// Table file or directory
    #[arg(long, default_value = "configs/tables")]
    tables: PathBuf,

    /// Settings file providing the interpolation tolerance
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Table to interpolate, e.g. `engine.thrust`
    #[arg(long, requires = "at")]
    lookup: Option<String>,

    /// Configuration key of the looked-up table, e.g. `MIL`
    #[arg(long)]
    configuration: Option<String>,

    /// Comma-separated coordinates, one per axis
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    at: Vec<f64>,

    /// Summary layout
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum Format {
    Text,
    Csv,
}

fn main() -> anyhow::Result<()> {
    if env::var("RUST_LOG").is_err() {
        unsafe { env::set_var("RUST_LOG", "info") }
    }
    pretty_env_logger::init();

    let cli = Cli::parse();
    let records = load_tables(&cli.tables)
        .with_context(|| format!("reading tables from {}", cli.tables.display()))?;
    let store = TableStore::load(&records)?;
    let settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => PerformanceSettings::default(),
    };

    match cli.format {
        Format::Text => print_text(&store),
        Format::Csv => print_csv(&store),
    }

    if let Some(name) = &cli.lookup {
        let table = store.table(name, cli.configuration.as_deref())?;
        if cli.at.len() != table.dimensions() {
            bail!(
                "{} expects {} coordinates ({}), got {}",
                table.id(),
                table.dimensions(),
                table
                    .axes()
                    .iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                cli.at.len()
            );
        }
        let interpolator =
            Interpolator::new(&store, InterpolationPolicy::from(&settings.interpolation));
        println!("=== Lookup {} at {:?} ===", table.id(), cli.at);
        for output in table.outputs() {
            let value = interpolator.lookup(
                name,
                cli.configuration.as_deref(),
                &cli.at,
                &output.name,
            )?;
            println!("{:<16}: {:.4} {}", output.name, value, output.unit);
        }
    }
    Ok(())
}

fn print_text(store: &TableStore) {
    println!("=== Performance Tables ({}) ===", store.len());
    for table in store.tables() {
        let axes = table
            .axes()
            .iter()
            .map(|a| format!("{} [{} .. {}] {}", a.name, a.min(), a.max(), a.unit))
            .collect::<Vec<_>>()
            .join(" x ");
        let outputs = table
            .outputs()
            .iter()
            .map(|o| o.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<28} {} points | {} -> {}",
            table.id().to_string(),
            table.grid_len(),
            axes,
            outputs
        );
    }
}

fn print_csv(store: &TableStore) {
    println!("table,axis,unit,points,min,max");
    for table in store.tables() {
        for axis in table.axes() {
            println!(
                "{},{},{},{},{},{}",
                table.id(),
                axis.name,
                axis.unit,
                axis.points.len(),
                axis.min(),
                axis.max()
            );
        }
    }
}
