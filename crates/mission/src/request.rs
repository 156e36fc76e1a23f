//! Conversion of mission request files into calculator inputs.

use perf_aircraft::{
    AircraftError, AircraftState, Configuration, FlapSelection, FlapSetting, PropulsionMode,
    StoreLoadout,
};
use perf_atmosphere::{Runway, Surface, Wind};
use perf_config::{
    LegConfig, MissionRequestConfig, PerformanceSettings, PropulsionConfig, RunwayConfig,
};
use perf_fuel::{FuelPlan, MissionLeg};
use perf_phases::{
    ClimbError, ClimbRequest, ClimbStrategy, CruiseError, CruiseObjective, CruiseRequest,
    LandingRequest, Obstacle, TakeoffRequest,
};
use thiserror::Error;

/// Raw departure-field conditions; derived into an environment by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConditions {
    pub pressure_altitude_ft: f64,
    pub oat_c: f64,
    pub wind: Wind,
    pub runway: Option<Runway>,
}

/// A validated calculation request.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionRequest {
    pub aircraft: String,
    pub state: AircraftState,
    pub field: FieldConditions,
    pub takeoff: TakeoffRequest,
    pub climb: ClimbRequest,
    pub cruise: CruiseRequest,
    pub landing: LandingRequest,
    pub fuel: FuelPlan,
    pub legs: Vec<MissionLeg>,
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("aircraft: {0}")]
    Aircraft(#[from] AircraftError),
    #[error("climb: {0}")]
    Climb(#[from] ClimbError),
    #[error("cruise: {0}")]
    Cruise(#[from] CruiseError),
    #[error("unsupported propulsion mode")]
    UnsupportedPropulsion,
    #[error("unknown runway condition '{0}'")]
    UnknownSurface(String),
    #[error("obstacle distance must be positive, got {0} nm")]
    InvalidObstacle(f64),
}

fn propulsion(config: &PropulsionConfig) -> Result<PropulsionMode, RequestError> {
    match config {
        PropulsionConfig::Derated { rpm_pct } => Ok(PropulsionMode::Derated { rpm_pct: *rpm_pct }),
        PropulsionConfig::Military => Ok(PropulsionMode::Military),
        PropulsionConfig::Afterburner => Ok(PropulsionMode::Afterburner),
        PropulsionConfig::Economy => Ok(PropulsionMode::Economy),
        PropulsionConfig::Unsupported => Err(RequestError::UnsupportedPropulsion),
    }
}

fn runway_from(config: &RunwayConfig) -> Result<Runway, RequestError> {
    let surface = match config.condition.trim().to_ascii_lowercase().as_str() {
        "dry" => Surface::Dry,
        "wet" => Surface::Wet,
        other => return Err(RequestError::UnknownSurface(other.to_string())),
    };
    Ok(Runway {
        length_ft: config.length_ft,
        heading_deg: config.heading_deg,
        slope_pct: config.slope_pct,
        surface,
    })
}

fn leg_from(config: &LegConfig) -> MissionLeg {
    match config {
        LegConfig::Departure => MissionLeg::Departure,
        LegConfig::Cruise { distance_nm } => MissionLeg::Cruise {
            distance_nm: *distance_nm,
        },
        LegConfig::Loiter { minutes } => MissionLeg::Loiter { minutes: *minutes },
        LegConfig::Allowance {
            label,
            fuel_lb,
            minutes,
        } => MissionLeg::Allowance {
            label: label.clone().unwrap_or_else(|| "allowance".to_string()),
            fuel_lb: *fuel_lb,
            minutes: *minutes,
        },
        LegConfig::Descent {
            fuel_lb,
            minutes,
            distance_nm,
        } => MissionLeg::Descent {
            fuel_lb: *fuel_lb,
            minutes: *minutes,
            distance_nm: *distance_nm,
        },
    }
}

/// Convert a request file into calculator inputs; unset options fall back to `settings`.
pub fn from_config(
    config: &MissionRequestConfig,
    settings: &PerformanceSettings,
) -> Result<MissionRequest, RequestError> {
    let state = AircraftState {
        gross_weight_lb: config.state.gross_weight_lb,
        cg_pct_mac: config.state.cg_pct_mac,
        configuration: Configuration {
            flaps: config.state.flaps.parse::<FlapSelection>()?,
            stores: StoreLoadout {
                name: config.state.stores.name.clone(),
                drag_index: config.state.stores.drag_index,
                weight_lb: config.state.stores.weight_lb,
            },
        },
        propulsion: propulsion(&config.state.propulsion)?,
    };

    let env = &config.environment;
    let runway = env.runway.as_ref().map(runway_from).transpose()?;
    let track_deg = runway
        .map(|r| r.heading_deg)
        .or(env.track_deg)
        .unwrap_or_default();
    let field = FieldConditions {
        pressure_altitude_ft: env.pressure_altitude_ft,
        oat_c: env.oat_c,
        wind: Wind {
            from_deg: env.wind.from_deg,
            speed_kts: env.wind.speed_kts,
            track_deg,
        },
        runway,
    };

    let obstacle = match config.takeoff.obstacle {
        Some(o) if !(o.distance_nm > 0.0) => {
            return Err(RequestError::InvalidObstacle(o.distance_nm));
        }
        Some(o) => Some(Obstacle {
            height_ft: o.height_ft,
            distance_nm: o.distance_nm,
        }),
        None => None,
    };

    let landing_flaps = config
        .landing
        .flaps
        .as_deref()
        .map(str::parse::<FlapSetting>)
        .transpose()?;

    Ok(MissionRequest {
        aircraft: config.aircraft.clone(),
        state,
        field,
        takeoff: TakeoffRequest { obstacle },
        climb: ClimbRequest {
            strategy: config.climb.strategy.parse::<ClimbStrategy>()?,
            from_ft: config.climb.floor_ft.unwrap_or(settings.climb.band_floor_ft),
            to_ft: config.climb.ceiling_ft.unwrap_or(settings.climb.band_ceiling_ft),
        },
        cruise: CruiseRequest {
            objective: config.cruise.objective.parse::<CruiseObjective>()?,
            altitude_ft: config.cruise.altitude_ft,
        },
        landing: LandingRequest {
            weight_lb: config.landing.weight_lb,
            flaps: landing_flaps,
        },
        fuel: FuelPlan {
            fuel_on_board_lb: config.fuel.on_board_lb,
            recovery_distance_nm: config.fuel.recovery_distance_nm,
        },
        legs: config.legs.iter().map(leg_from).collect(),
    })
}
