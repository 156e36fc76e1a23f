//! Mission fuel planning: cumulative burn over the legs, Bingo and Joker reserves.
//!
//! The planner consumes the departure and cruise figures of already computed phase
//! records. It never clamps: a leg that needs more fuel than is on board fails the plan.

use std::fmt;

use log::{debug, warn};
use perf_config::ReserveSettings;
use perf_phases::{Advisory, AdvisoryLevel, ClimbRecord, CruiseRecord, TakeoffRecord};
use serde::Serialize;
use thiserror::Error;

/// One step of the mission profile.
#[derive(Debug, Clone, PartialEq)]
pub enum MissionLeg {
    /// Start, taxi and takeoff allowance plus the computed climb.
    Departure,
    /// Cruise at the optimised cruise point for a ground distance.
    Cruise { distance_nm: f64 },
    /// Hold at the cruise fuel flow.
    Loiter { minutes: f64 },
    /// Explicit fuel and time, e.g. combat or refuelling holds.
    Allowance {
        label: String,
        fuel_lb: f64,
        minutes: f64,
    },
    Descent {
        fuel_lb: f64,
        minutes: f64,
        distance_nm: f64,
    },
}

impl fmt::Display for MissionLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionLeg::Departure => write!(f, "departure"),
            MissionLeg::Cruise { distance_nm } => write!(f, "cruise {distance_nm:.0} nm"),
            MissionLeg::Loiter { minutes } => write!(f, "loiter {minutes:.0} min"),
            MissionLeg::Allowance { label, .. } => write!(f, "{label}"),
            MissionLeg::Descent { .. } => write!(f, "descent"),
        }
    }
}

/// Fuel state for the mission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelPlan {
    pub fuel_on_board_lb: f64,
    pub recovery_distance_nm: f64,
}

/// Fuel, time and distance spent getting airborne and up to the climb ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepartureBurn {
    pub fuel_lb: f64,
    pub minutes: f64,
    pub distance_nm: f64,
}

/// Steady cruise rates from the optimised cruise point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CruiseRates {
    pub ground_speed_kts: f64,
    pub fuel_flow_pph: f64,
}

impl CruiseRates {
    pub fn specific_range_nm_per_lb(&self) -> f64 {
        self.ground_speed_kts / self.fuel_flow_pph
    }
}

/// The phase figures the planner needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseRecords {
    pub start_weight_lb: f64,
    pub departure: DepartureBurn,
    pub cruise: CruiseRates,
}

impl PhaseRecords {
    pub fn from_records(
        takeoff: &TakeoffRecord,
        climb: &ClimbRecord,
        cruise: &CruiseRecord,
    ) -> Self {
        Self {
            start_weight_lb: takeoff.gross_weight_lb,
            departure: DepartureBurn {
                fuel_lb: takeoff.fuel_allowance_lb + climb.fuel_lb,
                minutes: takeoff.time_allowance_min + climb.time_min,
                distance_nm: climb.distance_nm,
            },
            cruise: CruiseRates {
                ground_speed_kts: cruise.ground_speed_kts,
                fuel_flow_pph: cruise.fuel_flow_pph,
            },
        }
    }
}

/// Reserve margins; defaults come from the settings file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReserveMargins {
    pub final_reserve_lb: f64,
    pub margin_pct: f64,
    pub approach_allowance_lb: f64,
    pub joker_margin_lb: f64,
}

impl From<&ReserveSettings> for ReserveMargins {
    fn from(s: &ReserveSettings) -> Self {
        Self {
            final_reserve_lb: s.final_reserve_lb,
            margin_pct: s.margin_pct,
            approach_allowance_lb: s.approach_allowance_lb,
            joker_margin_lb: s.joker_margin_lb,
        }
    }
}

impl Default for ReserveMargins {
    fn default() -> Self {
        Self::from(&ReserveSettings::default())
    }
}

/// Cumulative state after a leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelPoint {
    pub leg: String,
    pub burned_lb: f64,
    pub cumulative_lb: f64,
    pub remaining_lb: f64,
    pub elapsed_min: f64,
    pub distance_nm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecoveryRequirement {
    pub distance_nm: f64,
    pub fuel_lb: f64,
    pub time_min: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EndState {
    pub fuel_remaining_lb: f64,
    pub gross_weight_lb: f64,
    pub elapsed_min: f64,
    pub distance_nm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReserveProfile {
    pub fuel_on_board_lb: f64,
    pub bingo_lb: f64,
    pub joker_lb: f64,
    pub recovery: RecoveryRequirement,
    pub curve: Vec<FuelPoint>,
    pub end_state: EndState,
    pub advisories: Vec<Advisory>,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReserveError {
    #[error(
        "insufficient fuel at {leg}: {required_lb:.0} lb required, {available_lb:.0} lb on board"
    )]
    InsufficientFuel {
        leg: String,
        required_lb: f64,
        available_lb: f64,
    },
    #[error("invalid leg {leg}: {reason}")]
    InvalidLeg { leg: String, reason: String },
    #[error("invalid fuel plan: {0}")]
    InvalidPlan(String),
}

/// Bingo and the recovery requirement behind it.
pub fn bingo_fuel(
    recovery_distance_nm: f64,
    cruise: &CruiseRates,
    margins: &ReserveMargins,
) -> (f64, RecoveryRequirement) {
    let fuel_lb = recovery_distance_nm / cruise.specific_range_nm_per_lb();
    let recovery = RecoveryRequirement {
        distance_nm: recovery_distance_nm,
        fuel_lb,
        time_min: recovery_distance_nm / cruise.ground_speed_kts * 60.0,
    };
    let bingo = (fuel_lb + margins.approach_allowance_lb) * (1.0 + margins.margin_pct / 100.0)
        + margins.final_reserve_lb;
    (bingo, recovery)
}

/// Fuel, minutes and distance for one leg.
fn leg_burn(leg: &MissionLeg, records: &PhaseRecords) -> Result<(f64, f64, f64), ReserveError> {
    let invalid = |reason: &str| ReserveError::InvalidLeg {
        leg: leg.to_string(),
        reason: reason.to_string(),
    };
    let burn = match leg {
        MissionLeg::Departure => (
            records.departure.fuel_lb,
            records.departure.minutes,
            records.departure.distance_nm,
        ),
        MissionLeg::Cruise { distance_nm } => {
            if !(distance_nm.is_finite() && *distance_nm >= 0.0) {
                return Err(invalid("distance must be finite and non-negative"));
            }
            let hours = distance_nm / records.cruise.ground_speed_kts;
            (records.cruise.fuel_flow_pph * hours, hours * 60.0, *distance_nm)
        }
        MissionLeg::Loiter { minutes } => {
            if !(minutes.is_finite() && *minutes >= 0.0) {
                return Err(invalid("duration must be finite and non-negative"));
            }
            (records.cruise.fuel_flow_pph * minutes / 60.0, *minutes, 0.0)
        }
        MissionLeg::Allowance { fuel_lb, minutes, .. } => {
            if !(fuel_lb.is_finite() && *fuel_lb >= 0.0 && minutes.is_finite() && *minutes >= 0.0) {
                return Err(invalid("fuel and time must be finite and non-negative"));
            }
            (*fuel_lb, *minutes, 0.0)
        }
        MissionLeg::Descent {
            fuel_lb,
            minutes,
            distance_nm,
        } => {
            if ![*fuel_lb, *minutes, *distance_nm]
                .iter()
                .all(|v| v.is_finite() && *v >= 0.0)
            {
                return Err(invalid("fuel, time and distance must be finite and non-negative"));
            }
            (*fuel_lb, *minutes, *distance_nm)
        }
    };
    Ok(burn)
}

/// Burn the legs in order and derive Bingo and Joker.
pub fn plan_reserves(
    records: &PhaseRecords,
    legs: &[MissionLeg],
    plan: &FuelPlan,
    margins: &ReserveMargins,
) -> Result<ReserveProfile, ReserveError> {
    if !(plan.fuel_on_board_lb.is_finite() && plan.fuel_on_board_lb > 0.0) {
        return Err(ReserveError::InvalidPlan(format!(
            "fuel on board {} lb",
            plan.fuel_on_board_lb
        )));
    }
    if !(plan.recovery_distance_nm.is_finite() && plan.recovery_distance_nm >= 0.0) {
        return Err(ReserveError::InvalidPlan(format!(
            "recovery distance {} nm",
            plan.recovery_distance_nm
        )));
    }
    if !(records.cruise.ground_speed_kts > 0.0 && records.cruise.fuel_flow_pph > 0.0) {
        return Err(ReserveError::InvalidPlan(
            "cruise ground speed and fuel flow must be positive".to_string(),
        ));
    }

    let mut curve = Vec::with_capacity(legs.len());
    let mut cumulative_lb = 0.0;
    let mut elapsed_min = 0.0;
    let mut distance_nm = 0.0;
    for leg in legs {
        let (burned_lb, minutes, leg_distance) = leg_burn(leg, records)?;
        cumulative_lb += burned_lb;
        elapsed_min += minutes;
        distance_nm += leg_distance;
        if cumulative_lb > plan.fuel_on_board_lb {
            return Err(ReserveError::InsufficientFuel {
                leg: leg.to_string(),
                required_lb: cumulative_lb,
                available_lb: plan.fuel_on_board_lb,
            });
        }
        debug!("{leg}: {burned_lb:.0} lb, cumulative {cumulative_lb:.0} lb");
        curve.push(FuelPoint {
            leg: leg.to_string(),
            burned_lb,
            cumulative_lb,
            remaining_lb: plan.fuel_on_board_lb - cumulative_lb,
            elapsed_min,
            distance_nm,
        });
    }

    let (bingo_lb, recovery) = bingo_fuel(plan.recovery_distance_nm, &records.cruise, margins);
    let joker_lb = bingo_lb + margins.joker_margin_lb;
    let fuel_remaining_lb = plan.fuel_on_board_lb - cumulative_lb;
    let end_state = EndState {
        fuel_remaining_lb,
        gross_weight_lb: records.start_weight_lb - cumulative_lb,
        elapsed_min,
        distance_nm,
    };

    let mut advisories = Vec::new();
    if fuel_remaining_lb < bingo_lb {
        let advisory = Advisory {
            level: AdvisoryLevel::Red,
            message: format!(
                "end-of-mission fuel {fuel_remaining_lb:.0} lb below bingo {bingo_lb:.0} lb"
            ),
        };
        warn!("reserve advisory: {}", advisory.message);
        advisories.push(advisory);
    } else if fuel_remaining_lb < joker_lb {
        advisories.push(Advisory {
            level: AdvisoryLevel::Amber,
            message: format!(
                "end-of-mission fuel {fuel_remaining_lb:.0} lb below joker {joker_lb:.0} lb"
            ),
        });
    }

    Ok(ReserveProfile {
        fuel_on_board_lb: plan.fuel_on_board_lb,
        bingo_lb,
        joker_lb,
        recovery,
        curve,
        end_state,
        advisories,
    })
}
