//! Configuration models and loaders for the flight performance engine.
//!
//! Records are read from TOML (one record per file) or YAML (a list of records per file);
//! a directory mixes both and is read in sorted file order.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

mod request;
mod settings;

pub use request::*;
pub use settings::*;

/// Aircraft profile parsed from the aircraft catalog.
#[derive(Debug, Deserialize, Clone)]
pub struct AircraftConfig {
    pub name: String,
    pub wing_area_ft2: f64,
    pub engine_count: u32,
    pub min_gross_weight_lb: f64,
    pub max_gross_weight_lb: f64,
    /// Parasite drag increment with the landing gear extended.
    #[serde(default = "default_gear_cd0")]
    pub gear_cd0: f64,
    #[serde(default)]
    pub flap_schedule: FlapScheduleConfig,
}

/// Weight thresholds used when the flap setting is left to automatic selection.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FlapScheduleConfig {
    /// Below this gross weight flaps stay up.
    pub up_below_lb: f64,
    /// Below this gross weight maneuver flaps are used; full flaps above.
    pub maneuver_below_lb: f64,
}

impl Default for FlapScheduleConfig {
    fn default() -> Self {
        Self {
            up_below_lb: 55_000.0,
            maneuver_below_lb: 65_000.0,
        }
    }
}

fn default_gear_cd0() -> f64 {
    0.020
}

/// Performance table record: ordered axes and row-major output grids (last axis fastest).
#[derive(Debug, Deserialize, Clone)]
pub struct TableConfig {
    pub name: String,
    #[serde(default)]
    pub configuration: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub axes: Vec<AxisConfig>,
    pub outputs: Vec<OutputConfig>,
}

/// Independent variable of a performance table.
#[derive(Debug, Deserialize, Clone)]
pub struct AxisConfig {
    pub name: String,
    #[serde(default)]
    pub unit: String,
    pub points: Vec<f64>,
}

/// Dependent variable grid of a performance table.
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub name: String,
    #[serde(default)]
    pub unit: String,
    pub values: Vec<f64>,
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Load performance tables from a YAML/TOML file or a directory of them.
pub fn load_tables<P: AsRef<Path>>(path: P) -> Result<Vec<TableConfig>, ConfigError> {
    load_records(path)
}

/// Load aircraft profiles from a YAML/TOML file or a directory of them.
pub fn load_aircraft<P: AsRef<Path>>(path: P) -> Result<Vec<AircraftConfig>, ConfigError> {
    load_records(path)
}

/// Load performance settings from a single TOML file. Missing sections fall back to defaults.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<PerformanceSettings, ConfigError> {
    load_single(path)
}

/// Load a mission request from a single TOML or YAML file.
pub fn load_request<P: AsRef<Path>>(path: P) -> Result<MissionRequestConfig, ConfigError> {
    load_single(path)
}

fn load_single<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path) || is_yaml(path))
        .collect();
    entries.sort();
    for path in entries {
        if is_toml(&path) {
            let contents = std::fs::read_to_string(&path)?;
            let record: T = toml::from_str(&contents)?;
            records.push(record);
        } else {
            let reader = File::open(&path)?;
            let mut batch: Vec<T> = serde_yaml::from_reader(reader)?;
            records.append(&mut batch);
        }
    }
    Ok(records)
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "yaml" || ext == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_performance_settings_keep_defaults() {
        let settings: PerformanceSettings =
            toml::from_str("[landing]\ndistance_factor = 1.5\n").unwrap();
        assert_eq!(settings.landing.distance_factor, 1.5);
        assert_eq!(settings.landing.recovery_burn_lb, 3_000.0);
        assert_eq!(settings.landing.default_flaps, "FULL");
        assert_eq!(settings.cruise.max_altitude_ft, 45_000.0);
    }

    #[test]
    fn request_carries_store_weight_and_cruise_altitude() {
        let text = r#"
aircraft = "F-14D"

[state]
gross_weight_lb = 60000.0
cg_pct_mac = 18.0

[state.stores]
drag_index = 25.0
weight_lb = 1400.0

[environment]
pressure_altitude_ft = 0.0
oat_c = 15.0

[cruise]
altitude_ft = 25000.0

[fuel]
on_board_lb = 16000.0
recovery_distance_nm = 150.0
"#;
        let request: MissionRequestConfig = toml::from_str(text).unwrap();
        assert_eq!(request.state.stores.weight_lb, 1_400.0);
        assert_eq!(request.cruise.altitude_ft, Some(25_000.0));
        assert_eq!(request.cruise.objective, "best_range");
        assert_eq!(request.landing.weight_lb, None);
    }
}
