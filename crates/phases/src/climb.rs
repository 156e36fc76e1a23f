//! Climb across an altitude band, stepped in sub-bands aligned to a fixed altitude grid.
//!
//! Sub-band boundaries fall on absolute multiples of the configured step, so a band split
//! at a multiple of the step reproduces exactly the same sub-bands as the unsplit band.

use std::str::FromStr;

use log::debug;
use perf_aircraft::{AircraftError, AircraftState, FlapSetting};
use perf_atmosphere::{AtmosphereError, EnvironmentState};
use perf_interp::LookupError;
use serde::Serialize;

use crate::model::{self, EngineSetting, FlightPoint, PowerError};
use crate::{Metric, Phase, PhaseContext, PhaseRecord};

pub const SCHEDULE_TABLE: &str = "climb.schedule";
const ALTITUDE_AXIS: &str = "pressure_altitude_ft";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClimbStrategy {
    /// Best gradient: altitude per distance.
    MaxAngle,
    /// Best rate of climb: altitude per time.
    MaxRate,
    /// Calibrated airspeed from the `climb.schedule` table.
    Schedule,
}

impl FromStr for ClimbStrategy {
    type Err = ClimbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "max_angle" => Ok(ClimbStrategy::MaxAngle),
            "max_rate" => Ok(ClimbStrategy::MaxRate),
            "schedule" => Ok(ClimbStrategy::Schedule),
            other => Err(ClimbError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Score of a candidate speed under a strategy; higher is better.
fn score(strategy: ClimbStrategy, point: &FlightPoint, weight_lb: f64) -> f64 {
    let gradient = point.gradient(weight_lb);
    match strategy {
        ClimbStrategy::MaxAngle => gradient,
        ClimbStrategy::MaxRate => model::vertical_speed_fpm(gradient, point.ktas),
        ClimbStrategy::Schedule => 0.0,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClimbRequest {
    pub strategy: ClimbStrategy,
    pub from_ft: f64,
    pub to_ft: f64,
}

/// One sub-band of the climb, flown at a constant speed chosen at its mid altitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimbSegment {
    pub from_ft: f64,
    pub to_ft: f64,
    pub kcas: f64,
    pub ktas: f64,
    pub mach: f64,
    pub rate_fpm: f64,
    pub gradient: f64,
    pub time_min: f64,
    pub fuel_lb: f64,
    pub distance_nm: f64,
    pub start_weight_lb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimbRecord {
    pub strategy: ClimbStrategy,
    pub thrust: String,
    pub from_ft: f64,
    pub to_ft: f64,
    pub initial_kcas: f64,
    pub final_kcas: f64,
    pub initial_rate_fpm: f64,
    pub average_gradient_ft_per_nm: f64,
    pub time_min: f64,
    pub fuel_lb: f64,
    pub distance_nm: f64,
    pub start_weight_lb: f64,
    pub end_weight_lb: f64,
    pub segments: Vec<ClimbSegment>,
}

impl PhaseRecord for ClimbRecord {
    fn phase(&self) -> Phase {
        Phase::Climb
    }

    fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::new("from_altitude", self.from_ft, "ft"),
            Metric::new("to_altitude", self.to_ft, "ft"),
            Metric::new("initial_speed", self.initial_kcas, "KCAS"),
            Metric::new("final_speed", self.final_kcas, "KCAS"),
            Metric::new("initial_rate", self.initial_rate_fpm, "ft/min"),
            Metric::new("average_gradient", self.average_gradient_ft_per_nm, "ft/nm"),
            Metric::new("time_to_altitude", self.time_min, "min"),
            Metric::new("fuel", self.fuel_lb, "lb"),
            Metric::new("distance", self.distance_nm, "nm"),
            Metric::new("end_weight", self.end_weight_lb, "lb"),
        ]
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ClimbError {
    #[error("aircraft state rejected: {0}")]
    Aircraft(#[from] AircraftError),
    #[error("table lookup failed: {0}")]
    Lookup(#[from] LookupError),
    #[error("engine setting rejected: {0}")]
    Power(#[from] PowerError),
    #[error("atmosphere: {0}")]
    Atmosphere(#[from] AtmosphereError),
    #[error("unknown climb strategy '{0}'")]
    UnknownStrategy(String),
    #[error("invalid climb band {from_ft} -> {to_ft} ft")]
    InvalidBand { from_ft: f64, to_ft: f64 },
    #[error("climb band {from_ft} -> {to_ft} ft leaves the tabulated range [{min_ft}, {max_ft}] ft")]
    BandOutsideTables {
        from_ft: f64,
        to_ft: f64,
        min_ft: f64,
        max_ft: f64,
    },
    #[error("climb band needs {count} sub-bands, limit is {limit}")]
    TooManySubBands { count: usize, limit: usize },
    #[error("no positive rate of climb at {altitude_ft:.0} ft")]
    CeilingReached { altitude_ft: f64 },
}

/// Sub-band boundaries from `from_ft` to `to_ft`, cut at multiples of `step_ft`.
pub fn sub_band_boundaries(
    from_ft: f64,
    to_ft: f64,
    step_ft: f64,
    limit: usize,
) -> Result<Vec<f64>, ClimbError> {
    if !(from_ft.is_finite() && to_ft.is_finite() && step_ft > 0.0) || to_ft <= from_ft {
        return Err(ClimbError::InvalidBand { from_ft, to_ft });
    }
    let count = ((to_ft - from_ft) / step_ft).ceil() as usize + 2;
    if count > limit {
        return Err(ClimbError::TooManySubBands { count, limit });
    }

    let mut boundaries = vec![from_ft];
    let mut k = (from_ft / step_ft).floor() + 1.0;
    loop {
        let cut = k * step_ft;
        if cut >= to_ft {
            break;
        }
        boundaries.push(cut);
        k += 1.0;
    }
    boundaries.push(to_ft);
    Ok(boundaries)
}

/// Climb from `request.from_ft` to `request.to_ft` starting at the state's gross weight.
pub fn compute_climb(
    state: &AircraftState,
    env: &EnvironmentState,
    ctx: &PhaseContext<'_>,
    request: &ClimbRequest,
) -> Result<ClimbRecord, ClimbError> {
    ctx.aircraft.check_state(state)?;
    let settings = &ctx.settings.climb;
    let setting = model::resolve_setting(state.propulsion, FlapSetting::Up, &ctx.derate)?;
    let (min_ft, max_ft) = altitude_coverage(ctx, &setting, request.strategy)?;
    if request.from_ft < min_ft || request.to_ft > max_ft {
        return Err(ClimbError::BandOutsideTables {
            from_ft: request.from_ft,
            to_ft: request.to_ft,
            min_ft,
            max_ft,
        });
    }
    let boundaries = sub_band_boundaries(
        request.from_ft,
        request.to_ft,
        settings.step_ft,
        settings.max_sub_bands,
    )?;
    let extra_cd0 = state.configuration.stores.drag_index * ctx.settings.cruise.cd0_per_drag_index;

    let mut weight = state.gross_weight_lb;
    let mut segments = Vec::with_capacity(boundaries.len() - 1);
    for pair in boundaries.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        let mid_env = env.at_altitude(0.5 * (lo + hi), &ctx.limits)?;
        let point = climb_speed(ctx, &mid_env, weight, extra_cd0, &setting, request.strategy)?;
        let gradient = point.gradient(weight);
        let rate_fpm = model::vertical_speed_fpm(gradient, point.ktas);
        if rate_fpm <= 0.0 {
            return Err(ClimbError::CeilingReached {
                altitude_ft: mid_env.pressure_altitude_ft,
            });
        }

        let time_min = (hi - lo) / rate_fpm;
        let fuel_lb = point.engine.fuel_flow_pph * time_min / 60.0;
        let ground_speed = (point.ktas - mid_env.headwind_kts).max(0.0);
        segments.push(ClimbSegment {
            from_ft: lo,
            to_ft: hi,
            kcas: point.kcas,
            ktas: point.ktas,
            mach: point.mach,
            rate_fpm,
            gradient,
            time_min,
            fuel_lb,
            distance_nm: ground_speed * time_min / 60.0,
            start_weight_lb: weight,
        });
        weight -= fuel_lb;
    }

    let time_min: f64 = segments.iter().map(|s| s.time_min).sum();
    let fuel_lb: f64 = segments.iter().map(|s| s.fuel_lb).sum();
    let distance_nm: f64 = segments.iter().map(|s| s.distance_nm).sum();
    let first = &segments[0];
    let last = &segments[segments.len() - 1];
    let record = ClimbRecord {
        strategy: request.strategy,
        thrust: setting.label.clone(),
        from_ft: request.from_ft,
        to_ft: request.to_ft,
        initial_kcas: first.kcas,
        final_kcas: last.kcas,
        initial_rate_fpm: first.rate_fpm,
        average_gradient_ft_per_nm: if distance_nm > 0.0 {
            (request.to_ft - request.from_ft) / distance_nm
        } else {
            0.0
        },
        time_min,
        fuel_lb,
        distance_nm,
        start_weight_lb: state.gross_weight_lb,
        end_weight_lb: weight,
        segments,
    };
    debug!(
        "climb {:?} {:.0}-{:.0} ft: {:.1} min, {:.0} lb, {:.1} nm",
        record.strategy, record.from_ft, record.to_ft, time_min, fuel_lb, distance_nm
    );
    Ok(record)
}

/// Pressure-altitude range covered by the atmosphere envelope and every table the climb reads.
fn altitude_coverage(
    ctx: &PhaseContext<'_>,
    setting: &EngineSetting,
    strategy: ClimbStrategy,
) -> Result<(f64, f64), ClimbError> {
    let mut range = (ctx.limits.min_altitude_ft, ctx.limits.ceiling_ft);
    let mut tables = vec![(model::ENGINE_TABLE, Some(setting.power.table_key()))];
    if strategy == ClimbStrategy::Schedule {
        tables.push((SCHEDULE_TABLE, None));
    }
    for (name, configuration) in tables {
        let table = ctx
            .tables
            .store()
            .table(name, configuration)
            .map_err(LookupError::from)?;
        if let Some(axis) = table.axes().iter().find(|a| a.name == ALTITUDE_AXIS) {
            range.0 = range.0.max(axis.min());
            range.1 = range.1.min(axis.max());
        }
    }
    Ok(range)
}

/// Pick the climb speed for one sub-band.
fn climb_speed(
    ctx: &PhaseContext<'_>,
    env: &EnvironmentState,
    weight: f64,
    extra_cd0: f64,
    setting: &EngineSetting,
    strategy: ClimbStrategy,
) -> Result<FlightPoint, ClimbError> {
    let flaps = FlapSetting::Up;
    if strategy == ClimbStrategy::Schedule {
        let kcas = ctx
            .tables
            .lookup(SCHEDULE_TABLE, None, &[env.pressure_altitude_ft], "kcas")?;
        let point = model::flight_point(ctx, env, weight, kcas, flaps, extra_cd0, setting)?;
        if point.cl > point.cl_max {
            return Err(ClimbError::CeilingReached {
                altitude_ft: env.pressure_altitude_ft,
            });
        }
        return Ok(point);
    }

    let settings = &ctx.settings.climb;
    let low_speed_polar = model::polar(ctx, flaps, env.mach_from_tas(env.tas_from_cas(150.0)))?;
    let v_stall = model::stall_speed_kcas(weight, low_speed_polar.cl_max, ctx.aircraft.wing_area_ft2);
    let v_min = settings.min_speed_factor * v_stall;
    let v_max = settings
        .max_kcas
        .min(env.cas_from_tas(settings.max_mach * env.speed_of_sound_kts));
    if v_max <= v_min {
        return Err(ClimbError::CeilingReached {
            altitude_ft: env.pressure_altitude_ft,
        });
    }

    let n = settings.speed_candidates.max(2);
    let mut best: Option<(f64, FlightPoint)> = None;
    for i in 0..n {
        let kcas = v_min + (v_max - v_min) * i as f64 / (n - 1) as f64;
        let point = model::flight_point(ctx, env, weight, kcas, flaps, extra_cd0, setting)?;
        if point.cl > point.cl_max {
            continue;
        }
        let s = score(strategy, &point, weight);
        let better = match &best {
            None => true,
            Some((best_score, best_point)) => {
                s > *best_score
                    || (s == *best_score
                        && point.engine.fuel_flow_pph < best_point.engine.fuel_flow_pph)
            }
        };
        if better {
            best = Some((s, point));
        }
    }
    best.map(|(_, point)| point)
        .ok_or(ClimbError::CeilingReached {
            altitude_ft: env.pressure_altitude_ft,
        })
}
