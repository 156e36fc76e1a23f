//! Aircraft state, configuration, and propulsion mode descriptors.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub mod catalog;
pub mod derate;

/// Trailing-edge flap position; doubles as the configuration key of flap-dependent tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlapSetting {
    Up,
    Maneuver,
    Full,
}

impl FlapSetting {
    pub fn table_key(&self) -> &'static str {
        match self {
            FlapSetting::Up => "UP",
            FlapSetting::Maneuver => "MANEUVER",
            FlapSetting::Full => "FULL",
        }
    }
}

impl fmt::Display for FlapSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_key())
    }
}

impl FromStr for FlapSetting {
    type Err = AircraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UP" | "0" => Ok(FlapSetting::Up),
            "MANEUVER" | "MANEUVERING" | "20" => Ok(FlapSetting::Maneuver),
            "FULL" | "35" => Ok(FlapSetting::Full),
            _ => Err(AircraftError::UnknownFlapSetting(s.to_string())),
        }
    }
}

/// Flap request: a fixed setting or selection by weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlapSelection {
    Auto,
    Set(FlapSetting),
}

impl FromStr for FlapSelection {
    type Err = AircraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(FlapSelection::Auto)
        } else {
            s.parse().map(FlapSelection::Set)
        }
    }
}

/// External stores carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreLoadout {
    pub name: Option<String>,
    /// Drag count added to the clean polar.
    pub drag_index: f64,
    /// Expendable store weight, already part of the gross weight.
    pub weight_lb: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub flaps: FlapSelection,
    pub stores: StoreLoadout,
}

impl Configuration {
    pub fn clean() -> Self {
        Self {
            flaps: FlapSelection::Set(FlapSetting::Up),
            stores: StoreLoadout::default(),
        }
    }
}

/// Engine power request shared by all phases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropulsionMode {
    /// Reduced thrust at the requested RPM, clamped by the derate policy.
    Derated { rpm_pct: f64 },
    Military,
    Afterburner,
    /// Fixed reduced RPM for efficient transit.
    Economy,
}

impl fmt::Display for PropulsionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropulsionMode::Derated { rpm_pct } => write!(f, "DERATED {rpm_pct:.0}%"),
            PropulsionMode::Military => f.write_str("MIL"),
            PropulsionMode::Afterburner => f.write_str("AB"),
            PropulsionMode::Economy => f.write_str("ECON"),
        }
    }
}

/// State of the aircraft at brake release.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftState {
    pub gross_weight_lb: f64,
    pub cg_pct_mac: f64,
    pub configuration: Configuration,
    pub propulsion: PropulsionMode,
}

impl AircraftState {
    /// Same aircraft at a different weight.
    pub fn with_weight(&self, gross_weight_lb: f64) -> Self {
        Self {
            gross_weight_lb,
            ..self.clone()
        }
    }
}

/// Weight thresholds for automatic flap selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlapSchedule {
    pub up_below_lb: f64,
    pub maneuver_below_lb: f64,
}

/// Fixed airframe data for one aircraft type.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftProfile {
    pub name: String,
    pub wing_area_ft2: f64,
    pub engine_count: u32,
    pub min_gross_weight_lb: f64,
    pub max_gross_weight_lb: f64,
    pub gear_cd0: f64,
    pub flap_schedule: FlapSchedule,
}

impl AircraftProfile {
    pub fn check_weight(&self, weight_lb: f64) -> Result<(), AircraftError> {
        if !weight_lb.is_finite()
            || weight_lb < self.min_gross_weight_lb
            || weight_lb > self.max_gross_weight_lb
        {
            return Err(AircraftError::WeightOutOfEnvelope {
                weight_lb,
                min_lb: self.min_gross_weight_lb,
                max_lb: self.max_gross_weight_lb,
            });
        }
        Ok(())
    }

    pub fn check_state(&self, state: &AircraftState) -> Result<(), AircraftError> {
        self.check_weight(state.gross_weight_lb)?;
        if !(0.0..=100.0).contains(&state.cg_pct_mac) {
            return Err(AircraftError::InvalidCg(state.cg_pct_mac));
        }
        if !state.configuration.stores.drag_index.is_finite()
            || state.configuration.stores.drag_index < 0.0
        {
            return Err(AircraftError::InvalidDragIndex(
                state.configuration.stores.drag_index,
            ));
        }
        let store_weight = state.configuration.stores.weight_lb;
        if !store_weight.is_finite() || store_weight < 0.0 || store_weight >= state.gross_weight_lb {
            return Err(AircraftError::InvalidStoreWeight {
                weight_lb: store_weight,
                gross_weight_lb: state.gross_weight_lb,
            });
        }
        Ok(())
    }

    /// Flap setting for a selection at the given weight.
    pub fn resolve_flaps(&self, selection: FlapSelection, weight_lb: f64) -> FlapSetting {
        match selection {
            FlapSelection::Set(setting) => setting,
            FlapSelection::Auto if weight_lb < self.flap_schedule.up_below_lb => FlapSetting::Up,
            FlapSelection::Auto if weight_lb < self.flap_schedule.maneuver_below_lb => {
                FlapSetting::Maneuver
            }
            FlapSelection::Auto => FlapSetting::Full,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AircraftError {
    #[error("gross weight {weight_lb:.0} lb outside envelope [{min_lb:.0}, {max_lb:.0}]")]
    WeightOutOfEnvelope {
        weight_lb: f64,
        min_lb: f64,
        max_lb: f64,
    },
    #[error("centre of gravity {0:.1}% MAC is not a valid position")]
    InvalidCg(f64),
    #[error("store drag index {0} must be a non-negative number")]
    InvalidDragIndex(f64),
    #[error("store weight {weight_lb} lb must be non-negative and below gross weight {gross_weight_lb:.0} lb")]
    InvalidStoreWeight { weight_lb: f64, gross_weight_lb: f64 },
    #[error("unknown flap setting '{0}'")]
    UnknownFlapSetting(String),
    #[error("aircraft '{0}' not found in catalog")]
    NotFound(String),
    #[error("aircraft catalog is empty")]
    EmptyCatalog,
    #[error("invalid aircraft profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },
}
