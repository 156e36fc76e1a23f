//! Mission request files: aircraft state, environment, phase options, fuel and legs.

use serde::Deserialize;

/// A complete calculation request as written by a planner.
#[derive(Debug, Deserialize, Clone)]
pub struct MissionRequestConfig {
    pub aircraft: String,
    pub state: StateConfig,
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub takeoff: TakeoffRequestConfig,
    #[serde(default)]
    pub climb: ClimbRequestConfig,
    #[serde(default)]
    pub cruise: CruiseRequestConfig,
    #[serde(default)]
    pub landing: LandingRequestConfig,
    pub fuel: FuelConfig,
    #[serde(default)]
    pub legs: Vec<LegConfig>,
}

/// Aircraft state at brake release.
#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    pub gross_weight_lb: f64,
    pub cg_pct_mac: f64,
    /// `UP`, `MANEUVER`, `FULL` or `AUTO`.
    #[serde(default = "default_flaps")]
    pub flaps: String,
    #[serde(default)]
    pub stores: StoresConfig,
    #[serde(default)]
    pub propulsion: PropulsionConfig,
}

fn default_flaps() -> String {
    "AUTO".to_string()
}

/// External store loadout.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoresConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub drag_index: f64,
    /// Weight of the expendable stores, included in `gross_weight_lb`.
    #[serde(default)]
    pub weight_lb: f64,
}

/// Propulsion mode in request files.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(tag = "type")]
pub enum PropulsionConfig {
    #[serde(rename = "derated")]
    Derated { rpm_pct: f64 },
    #[default]
    #[serde(rename = "military")]
    Military,
    #[serde(rename = "afterburner")]
    Afterburner,
    #[serde(rename = "economy")]
    Economy,
    #[serde(other)]
    Unsupported,
}

/// Departure options.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TakeoffRequestConfig {
    #[serde(default)]
    pub obstacle: Option<ObstacleConfig>,
}

/// Obstacle beyond the departure end of the runway.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ObstacleConfig {
    pub height_ft: f64,
    pub distance_nm: f64,
}

/// Raw environment inputs at the departure field.
#[derive(Debug, Deserialize, Clone)]
pub struct EnvironmentConfig {
    pub pressure_altitude_ft: f64,
    pub oat_c: f64,
    #[serde(default)]
    pub wind: WindConfig,
    /// Track used to resolve wind components when no runway is given.
    #[serde(default)]
    pub track_deg: Option<f64>,
    #[serde(default)]
    pub runway: Option<RunwayConfig>,
}

/// Wind as reported: direction it blows from.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct WindConfig {
    #[serde(default)]
    pub from_deg: f64,
    #[serde(default)]
    pub speed_kts: f64,
}

/// Runway description for takeoff and landing.
#[derive(Debug, Deserialize, Clone)]
pub struct RunwayConfig {
    pub length_ft: f64,
    pub heading_deg: f64,
    #[serde(default)]
    pub slope_pct: f64,
    /// `dry` or `wet`.
    #[serde(default = "default_surface")]
    pub condition: String,
}

fn default_surface() -> String {
    "dry".to_string()
}

/// Climb options; unset bounds fall back to the settings file.
#[derive(Debug, Deserialize, Clone)]
pub struct ClimbRequestConfig {
    /// `max_angle`, `max_rate` or `schedule`.
    #[serde(default = "default_climb_strategy")]
    pub strategy: String,
    #[serde(default)]
    pub floor_ft: Option<f64>,
    #[serde(default)]
    pub ceiling_ft: Option<f64>,
}

impl Default for ClimbRequestConfig {
    fn default() -> Self {
        Self {
            strategy: default_climb_strategy(),
            floor_ft: None,
            ceiling_ft: None,
        }
    }
}

fn default_climb_strategy() -> String {
    "max_rate".to_string()
}

/// Cruise options.
#[derive(Debug, Deserialize, Clone)]
pub struct CruiseRequestConfig {
    /// `best_endurance`, `best_range` or `most_efficient`.
    #[serde(default = "default_cruise_objective")]
    pub objective: String,
    /// Hold this pressure altitude and search Mach only; unset searches the altitude band.
    #[serde(default)]
    pub altitude_ft: Option<f64>,
}

impl Default for CruiseRequestConfig {
    fn default() -> Self {
        Self {
            objective: default_cruise_objective(),
            altitude_ft: None,
        }
    }
}

fn default_cruise_objective() -> String {
    "best_range".to_string()
}

/// Custom landing case; the planned cases are always computed alongside it.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LandingRequestConfig {
    /// Defaults to the gross weight less the configured recovery burn.
    #[serde(default)]
    pub weight_lb: Option<f64>,
    #[serde(default)]
    pub flaps: Option<String>,
}

/// Fuel state and recovery requirement.
#[derive(Debug, Deserialize, Clone)]
pub struct FuelConfig {
    pub on_board_lb: f64,
    pub recovery_distance_nm: f64,
}

/// Mission leg as written in request files.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum LegConfig {
    #[serde(rename = "departure")]
    Departure,
    #[serde(rename = "cruise")]
    Cruise { distance_nm: f64 },
    #[serde(rename = "loiter")]
    Loiter { minutes: f64 },
    #[serde(rename = "allowance")]
    Allowance {
        #[serde(default)]
        label: Option<String>,
        fuel_lb: f64,
        #[serde(default)]
        minutes: f64,
    },
    #[serde(rename = "descent")]
    Descent {
        fuel_lb: f64,
        minutes: f64,
        distance_nm: f64,
    },
}
