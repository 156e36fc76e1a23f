//! Flight performance engine: atmosphere, performance tables, phase calculators,
//! reserve planning and mission card assembly.
//!
//! The member crates are re-exported here so front-ends depend on a single library.
//! [`Catalog`] loads a configuration directory laid out as:
//!
//! ```text
//! <dir>/tables/      performance tables (YAML lists or one TOML table per file)
//! <dir>/aircraft/    aircraft profiles
//! <dir>/settings.toml  optional performance settings
//! ```

use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

pub use perf_aircraft as aircraft;
pub use perf_atmosphere as atmosphere;
pub use perf_config as config;
pub use perf_core as primitives;
pub use perf_export as export;
pub use perf_fuel as fuel;
pub use perf_interp as interp;
pub use perf_mission as mission;
pub use perf_phases as phases;
pub use perf_tables as tables;

use perf_aircraft::{AircraftError, AircraftProfile};
use perf_config::{AircraftConfig, ConfigError, PerformanceSettings};
use perf_export::metrics::MetricRow;
use perf_mission::{MissionCard, MissionError, RequestError};
use perf_phases::PhaseContext;
use perf_tables::{TableError, TableStore};

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("configuration error in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Aircraft(#[from] AircraftError),
}

/// Everything loaded from a configuration directory.
#[derive(Debug)]
pub struct Catalog {
    pub tables: TableStore,
    pub aircraft: Vec<AircraftConfig>,
    pub settings: PerformanceSettings,
}

impl Catalog {
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let tables_path = dir.join("tables");
        let records =
            perf_config::load_tables(&tables_path).map_err(config_error_at(&tables_path))?;
        let tables = TableStore::load(&records)?;

        let aircraft_path = dir.join("aircraft");
        let aircraft =
            perf_config::load_aircraft(&aircraft_path).map_err(config_error_at(&aircraft_path))?;

        let settings_path = dir.join("settings.toml");
        let settings = if settings_path.exists() {
            perf_config::load_settings(&settings_path).map_err(config_error_at(&settings_path))?
        } else {
            PerformanceSettings::default()
        };

        info!(
            "catalog {}: {} tables, {} aircraft",
            dir.display(),
            tables.len(),
            aircraft.len()
        );
        Ok(Self {
            tables,
            aircraft,
            settings,
        })
    }

    /// Aircraft profile by name, or the first in the catalog.
    pub fn profile(&self, name: Option<&str>) -> Result<AircraftProfile, AircraftError> {
        perf_aircraft::catalog::select(&self.aircraft, name)
    }
}

fn config_error_at(path: &Path) -> impl FnOnce(ConfigError) -> CatalogError {
    let path = path.to_path_buf();
    move |source| CatalogError::Config { path, source }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Aircraft(#[from] AircraftError),
    #[error("invalid request: {0}")]
    Request(#[from] RequestError),
    #[error(transparent)]
    Mission(#[from] MissionError),
}

/// Plan a request file's mission against a loaded catalog.
pub fn run_request(
    catalog: &Catalog,
    request: &perf_config::MissionRequestConfig,
) -> Result<MissionCard, RunError> {
    let profile = catalog.profile(Some(&request.aircraft))?;
    let request = perf_mission::from_config(request, &catalog.settings)?;
    let ctx = PhaseContext::new(&profile, &catalog.tables, &catalog.settings);
    Ok(perf_mission::plan_mission(&request, &ctx)?)
}

/// Flatten a card into `section,metric,value,unit` rows.
pub fn metric_rows(card: &MissionCard) -> Vec<MetricRow> {
    card.section_metrics()
        .into_iter()
        .flat_map(|(section, metrics)| {
            metrics.into_iter().map(move |m| MetricRow {
                section: section.clone(),
                metric: m.name.to_string(),
                value: m.value,
                unit: m.unit.to_string(),
            })
        })
        .collect()
}
