//! Cruise optimisation over a bounded altitude × Mach grid.

use std::str::FromStr;

use log::debug;
use perf_aircraft::{AircraftError, AircraftState, FlapSetting};
use perf_atmosphere::{AtmosphereError, EnvironmentState};
use perf_interp::LookupError;
use serde::Serialize;

use crate::model::{self, EngineSetting, PowerError};
use crate::{Metric, Phase, PhaseContext, PhaseRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CruiseObjective {
    /// Lowest fuel flow: maximum time aloft.
    BestEndurance,
    /// Highest specific range: maximum ground distance per pound.
    BestRange,
    /// Fastest point within the long-range fraction of the best specific range.
    MostEfficient,
}

impl FromStr for CruiseObjective {
    type Err = CruiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "best_endurance" | "endurance" => Ok(CruiseObjective::BestEndurance),
            "best_range" | "range" => Ok(CruiseObjective::BestRange),
            "most_efficient" | "long_range" => Ok(CruiseObjective::MostEfficient),
            other => Err(CruiseError::UnknownObjective(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CruiseRequest {
    pub objective: CruiseObjective,
    /// Hold this pressure altitude and search Mach only.
    pub altitude_ft: Option<f64>,
}

/// Feasible steady cruise point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CruiseCandidate {
    pub altitude_ft: f64,
    pub mach: f64,
    pub ktas: f64,
    pub kcas: f64,
    pub ground_speed_kts: f64,
    pub fuel_flow_pph: f64,
    pub specific_range_nm_per_lb: f64,
    pub thrust_required_lbf: f64,
    pub thrust_available_lbf: f64,
}

/// Score of a candidate under an objective; higher is better.
fn score(objective: CruiseObjective, candidate: &CruiseCandidate, efficient_floor: f64) -> f64 {
    match objective {
        CruiseObjective::BestEndurance => -candidate.fuel_flow_pph,
        CruiseObjective::BestRange => candidate.specific_range_nm_per_lb,
        CruiseObjective::MostEfficient => {
            if candidate.specific_range_nm_per_lb >= efficient_floor {
                candidate.ktas
            } else {
                f64::NEG_INFINITY
            }
        }
    }
}

/// Best candidate under `objective`; equal scores go to the lower fuel flow.
pub fn select(
    objective: CruiseObjective,
    candidates: &[CruiseCandidate],
    long_range_fraction: f64,
) -> Option<CruiseCandidate> {
    let best_range = candidates
        .iter()
        .map(|c| c.specific_range_nm_per_lb)
        .fold(f64::NEG_INFINITY, f64::max);
    let efficient_floor = long_range_fraction * best_range;

    let mut best: Option<(f64, &CruiseCandidate)> = None;
    for candidate in candidates {
        let s = score(objective, candidate, efficient_floor);
        if s == f64::NEG_INFINITY {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_score, incumbent)) => {
                s > best_score
                    || (s == best_score && candidate.fuel_flow_pph < incumbent.fuel_flow_pph)
            }
        };
        if better {
            best = Some((s, candidate));
        }
    }
    best.map(|(_, c)| *c)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CruiseRecord {
    pub objective: CruiseObjective,
    pub thrust: String,
    pub weight_lb: f64,
    pub drag_index: f64,
    pub altitude_ft: f64,
    pub mach: f64,
    pub ktas: f64,
    pub kcas: f64,
    pub ground_speed_kts: f64,
    pub fuel_flow_pph: f64,
    pub specific_range_nm_per_lb: f64,
    pub thrust_required_lbf: f64,
    pub thrust_available_lbf: f64,
    pub candidates_evaluated: usize,
}

impl CruiseRecord {
    /// Endurance per 1,000 lb of fuel.
    pub fn minutes_per_1000_lb(&self) -> f64 {
        1_000.0 / self.fuel_flow_pph * 60.0
    }
}

impl PhaseRecord for CruiseRecord {
    fn phase(&self) -> Phase {
        Phase::Cruise
    }

    fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::new("altitude", self.altitude_ft, "ft"),
            Metric::new("mach", self.mach, "M"),
            Metric::new("true_airspeed", self.ktas, "KTAS"),
            Metric::new("indicated_airspeed", self.kcas, "KCAS"),
            Metric::new("ground_speed", self.ground_speed_kts, "kt"),
            Metric::new("fuel_flow", self.fuel_flow_pph, "lb/hr"),
            Metric::new("specific_range", self.specific_range_nm_per_lb, "nm/lb"),
            Metric::new("endurance", self.minutes_per_1000_lb(), "min/1000lb"),
            Metric::new("thrust_required", self.thrust_required_lbf, "lbf"),
        ]
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum CruiseError {
    #[error("aircraft state rejected: {0}")]
    Aircraft(#[from] AircraftError),
    #[error("table lookup failed: {0}")]
    Lookup(#[from] LookupError),
    #[error("engine setting rejected: {0}")]
    Power(#[from] PowerError),
    #[error("atmosphere: {0}")]
    Atmosphere(#[from] AtmosphereError),
    #[error("unknown cruise objective '{0}'")]
    UnknownObjective(String),
    #[error("cruise altitude {altitude_ft} ft outside [{min_ft}, {max_ft}] ft")]
    AltitudeOutOfRange {
        altitude_ft: f64,
        min_ft: f64,
        max_ft: f64,
    },
    #[error("invalid cruise grid: {0}")]
    InvalidGrid(String),
    #[error("no feasible cruise point in the search grid")]
    NoCruiseSolution,
}

fn grid_steps(min: f64, max: f64, step: f64, what: &str) -> Result<usize, CruiseError> {
    if !(min.is_finite() && max.is_finite() && step > 0.0) || max < min {
        return Err(CruiseError::InvalidGrid(format!(
            "{what} range {min}..{max} step {step}"
        )));
    }
    Ok(((max - min) / step + 1e-9).floor() as usize + 1)
}

/// Optimise cruise for the objective at the state's gross weight and store drag, over the
/// configured altitude band or at the requested altitude.
pub fn compute_cruise(
    state: &AircraftState,
    env: &EnvironmentState,
    ctx: &PhaseContext<'_>,
    request: &CruiseRequest,
) -> Result<CruiseRecord, CruiseError> {
    ctx.aircraft.check_state(state)?;
    let settings = &ctx.settings.cruise;
    let altitudes: Vec<f64> = match request.altitude_ft {
        Some(altitude_ft) => {
            if !(ctx.limits.min_altitude_ft..=ctx.limits.ceiling_ft).contains(&altitude_ft) {
                return Err(CruiseError::AltitudeOutOfRange {
                    altitude_ft,
                    min_ft: ctx.limits.min_altitude_ft,
                    max_ft: ctx.limits.ceiling_ft,
                });
            }
            vec![altitude_ft]
        }
        None => {
            let steps = grid_steps(
                settings.min_altitude_ft,
                settings.max_altitude_ft,
                settings.altitude_step_ft,
                "altitude",
            )?;
            (0..steps)
                .map(|i| settings.min_altitude_ft + settings.altitude_step_ft * i as f64)
                .collect()
        }
    };
    let machs = grid_steps(settings.min_mach, settings.max_mach, settings.mach_step, "mach")?;
    if altitudes.len() * machs > settings.max_candidates {
        return Err(CruiseError::InvalidGrid(format!(
            "{} grid points exceed the limit of {}",
            altitudes.len() * machs,
            settings.max_candidates
        )));
    }

    let weight = state.gross_weight_lb;
    let flaps = FlapSetting::Up;
    let setting = model::resolve_setting(state.propulsion, flaps, &ctx.derate)?;
    let military = EngineSetting::military();
    let extra_cd0 = state.configuration.stores.drag_index * settings.cd0_per_drag_index;
    let wing_area = ctx.aircraft.wing_area_ft2;

    let mut candidates = Vec::new();
    for &altitude_ft in &altitudes {
        let env_alt = env.at_altitude(altitude_ft, &ctx.limits)?;
        for j in 0..machs {
            let mach = settings.min_mach + settings.mach_step * j as f64;
            let ktas = mach * env_alt.speed_of_sound_kts;
            let aero = model::polar(ctx, flaps, mach)?;
            let q = model::dynamic_pressure_psf(&env_alt, ktas);
            let cl = model::lift_coefficient(weight, q, wing_area);
            if cl * settings.buffet_margin > aero.cl_max {
                continue;
            }
            let drag = q * wing_area * aero.drag_coefficient(cl, extra_cd0);
            let available = model::engine(ctx, &setting, &env_alt, mach)?;
            let mil = model::engine(ctx, &military, &env_alt, mach)?;
            let Some(fuel_flow_pph) = model::part_throttle_fuel_flow(
                drag,
                mil,
                available,
                ctx.derate.min_idle_fuel_flow_pph,
            ) else {
                continue;
            };
            let ground_speed_kts = ktas - env_alt.headwind_kts;
            if ground_speed_kts <= 0.0 {
                continue;
            }
            candidates.push(CruiseCandidate {
                altitude_ft,
                mach,
                ktas,
                kcas: env_alt.cas_from_tas(ktas),
                ground_speed_kts,
                fuel_flow_pph,
                specific_range_nm_per_lb: ground_speed_kts / fuel_flow_pph,
                thrust_required_lbf: drag,
                thrust_available_lbf: available.thrust_lbf,
            });
        }
    }

    let chosen = select(request.objective, &candidates, settings.long_range_fraction)
        .ok_or(CruiseError::NoCruiseSolution)?;
    debug!(
        "cruise {:?}: FL{:.0} M{:.2} {:.0} lb/hr {:.4} nm/lb ({} candidates)",
        request.objective,
        chosen.altitude_ft / 100.0,
        chosen.mach,
        chosen.fuel_flow_pph,
        chosen.specific_range_nm_per_lb,
        candidates.len()
    );

    Ok(CruiseRecord {
        objective: request.objective,
        thrust: setting.label,
        weight_lb: weight,
        drag_index: state.configuration.stores.drag_index,
        altitude_ft: chosen.altitude_ft,
        mach: chosen.mach,
        ktas: chosen.ktas,
        kcas: chosen.kcas,
        ground_speed_kts: chosen.ground_speed_kts,
        fuel_flow_pph: chosen.fuel_flow_pph,
        specific_range_nm_per_lb: chosen.specific_range_nm_per_lb,
        thrust_required_lbf: chosen.thrust_required_lbf,
        thrust_available_lbf: chosen.thrust_available_lbf,
        candidates_evaluated: candidates.len(),
    })
}
