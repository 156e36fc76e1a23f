//! Takeoff: V-speeds, field length against the runway, initial climb gradient and trim.

use log::{debug, warn};
use perf_aircraft::derate::DerateClamp;
use perf_aircraft::{AircraftError, AircraftState};
use perf_atmosphere::{EnvironmentState, Surface};
use perf_interp::LookupError;
use serde::Serialize;

use crate::model::{self, EngineSetting, PowerError};
use crate::{Advisory, AdvisoryLevel, Metric, Phase, PhaseContext, PhaseRecord};

pub const SPEEDS_TABLE: &str = "takeoff.speeds";
pub const DISTANCE_TABLE: &str = "takeoff.distance";
pub const TRIM_TABLE: &str = "takeoff.trim";

/// Obstacle in the departure path, measured from the end of the runway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub height_ft: f64,
    pub distance_nm: f64,
}

impl Obstacle {
    pub fn required_gradient_ft_per_nm(&self) -> f64 {
        self.height_ft / self.distance_nm
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TakeoffRequest {
    pub obstacle: Option<Obstacle>,
}

/// Multipliers applied to the tabulated (military, zero wind, level dry) distances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceCorrections {
    pub thrust: f64,
    pub wind: f64,
    pub slope: f64,
    pub surface: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TakeoffRecord {
    pub flaps: String,
    pub thrust: String,
    #[serde(skip)]
    pub derate: Option<DerateClamp>,
    pub gross_weight_lb: f64,
    pub v1_kcas: f64,
    pub vr_kcas: f64,
    pub v2_kcas: f64,
    pub vfs_kcas: f64,
    pub ground_roll_ft: f64,
    pub takeoff_distance_ft: f64,
    pub accelerate_stop_ft: f64,
    pub required_field_length_ft: f64,
    pub runway_available_ft: f64,
    pub corrections: DistanceCorrections,
    pub climb_gradient: f64,
    pub climb_gradient_ft_per_nm: f64,
    pub ground_gradient_ft_per_nm: f64,
    pub vertical_speed_fpm: f64,
    pub stab_trim_deg: f64,
    pub trim_band_kcas: (f64, f64),
    pub fuel_allowance_lb: f64,
    pub time_allowance_min: f64,
    pub advisories: Vec<Advisory>,
}

impl TakeoffRecord {
    pub fn runway_margin_ft(&self) -> f64 {
        self.runway_available_ft - self.required_field_length_ft
    }
}

impl PhaseRecord for TakeoffRecord {
    fn phase(&self) -> Phase {
        Phase::Takeoff
    }

    fn metrics(&self) -> Vec<Metric> {
        let mut metrics = vec![
            Metric::new("v1", self.v1_kcas, "KCAS"),
            Metric::new("vr", self.vr_kcas, "KCAS"),
            Metric::new("v2", self.v2_kcas, "KCAS"),
            Metric::new("vfs", self.vfs_kcas, "KCAS"),
            Metric::new("ground_roll", self.ground_roll_ft, "ft"),
            Metric::new("takeoff_distance", self.takeoff_distance_ft, "ft"),
            Metric::new("accelerate_stop", self.accelerate_stop_ft, "ft"),
            Metric::new("required_field_length", self.required_field_length_ft, "ft"),
            Metric::new("runway_available", self.runway_available_ft, "ft"),
            Metric::new("climb_gradient", self.climb_gradient_ft_per_nm, "ft/nm"),
            Metric::new("vertical_speed", self.vertical_speed_fpm, "ft/min"),
            Metric::new("stab_trim", self.stab_trim_deg, "deg"),
            Metric::new("trim_band_low", self.trim_band_kcas.0, "KCAS"),
            Metric::new("trim_band_high", self.trim_band_kcas.1, "KCAS"),
            Metric::new("fuel_allowance", self.fuel_allowance_lb, "lb"),
        ];
        if let Some(clamp) = &self.derate {
            metrics.push(Metric::new("derate_requested", clamp.requested_pct, "%RPM"));
            metrics.push(Metric::new("derate_applied", clamp.applied_pct, "%RPM"));
        }
        metrics
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum TakeoffError {
    #[error("aircraft state rejected: {0}")]
    Aircraft(#[from] AircraftError),
    #[error("table lookup failed: {0}")]
    Lookup(#[from] LookupError),
    #[error("engine setting rejected: {0}")]
    Power(#[from] PowerError),
    #[error("takeoff requires a runway")]
    MissingRunway,
    #[error("runway limited: {required_ft:.0} ft required, {available_ft:.0} ft available")]
    RunwayLimited { required_ft: f64, available_ft: f64 },
    #[error("no climb gradient at V2 ({gradient:.4})")]
    NoClimbGradient { gradient: f64 },
    #[error(
        "obstacle not cleared: {required_ft_per_nm:.0} ft/nm required, {available_ft_per_nm:.0} ft/nm available"
    )]
    ObstacleNotCleared {
        required_ft_per_nm: f64,
        available_ft_per_nm: f64,
    },
}

/// Compute the takeoff record for the runway attached to `env`.
pub fn compute_takeoff(
    state: &AircraftState,
    env: &EnvironmentState,
    ctx: &PhaseContext<'_>,
    request: &TakeoffRequest,
) -> Result<TakeoffRecord, TakeoffError> {
    ctx.aircraft.check_state(state)?;
    let runway = env.runway.ok_or(TakeoffError::MissingRunway)?;
    let settings = &ctx.settings.takeoff;
    let weight = state.gross_weight_lb;
    let flaps = ctx
        .aircraft
        .resolve_flaps(state.configuration.flaps, weight);
    let flap_key = Some(flaps.table_key());
    let setting = model::resolve_setting(state.propulsion, flaps, &ctx.derate)?;

    let [v1, vr, v2, vfs] = ctx.tables.lookup_many(
        SPEEDS_TABLE,
        flap_key,
        &[weight],
        ["v1_kcas", "vr_kcas", "v2_kcas", "vfs_kcas"],
    )?;
    let [roll, accel_stop] = ctx.tables.lookup_many(
        DISTANCE_TABLE,
        flap_key,
        &[weight, env.pressure_altitude_ft, env.isa_deviation_c],
        ["ground_roll_ft", "accel_stop_ft"],
    )?;

    // Tabulated distances assume military thrust; scale by the thrust ratio at the
    // mean ground-roll speed.
    let vr_tas = env.tas_from_cas(vr);
    let roll_mach = env.mach_from_tas(0.7 * vr_tas);
    let military = model::engine(ctx, &EngineSetting::military(), env, roll_mach)?;
    let selected = model::engine(ctx, &setting, env, roll_mach)?;
    let corrections = DistanceCorrections {
        thrust: military.thrust_lbf / selected.thrust_lbf,
        wind: model::wind_distance_factor(
            vr_tas,
            env.headwind_kts,
            settings.headwind_credit,
            settings.tailwind_penalty,
        ),
        slope: if runway.slope_pct >= 0.0 {
            1.0 + settings.upslope_per_pct * runway.slope_pct
        } else {
            (1.0 + settings.downslope_per_pct * runway.slope_pct).max(0.5)
        },
        surface: match runway.surface {
            Surface::Dry => 1.0,
            Surface::Wet => settings.wet_runway_factor,
        },
    };

    let ground_roll_ft =
        roll * corrections.thrust * corrections.wind * corrections.slope * corrections.surface;
    let takeoff_distance_ft = ground_roll_ft * settings.runway_factor;
    // Only the acceleration segment of the abort scales with thrust.
    let accelerate_stop_ft = accel_stop
        * (0.5 + 0.5 * corrections.thrust)
        * corrections.wind
        * corrections.surface;
    let required_field_length_ft = takeoff_distance_ft.max(accelerate_stop_ft);
    if required_field_length_ft > runway.length_ft {
        return Err(TakeoffError::RunwayLimited {
            required_ft: required_field_length_ft,
            available_ft: runway.length_ft,
        });
    }

    // Initial climb at V2, gear up, takeoff flaps.
    let extra_cd0 = state.configuration.stores.drag_index * ctx.settings.cruise.cd0_per_drag_index;
    let point = model::flight_point(ctx, env, weight, v2, flaps, extra_cd0, &setting)?;
    let gradient = point.gradient(weight);
    if gradient <= 0.0 {
        return Err(TakeoffError::NoClimbGradient { gradient });
    }
    let climb_gradient_ft_per_nm = model::gradient_ft_per_nm(gradient);
    let ground_speed = (point.ktas - env.headwind_kts).max(1.0);
    let ground_gradient_ft_per_nm = climb_gradient_ft_per_nm * point.ktas / ground_speed;

    if let Some(obstacle) = request.obstacle {
        let required = obstacle.required_gradient_ft_per_nm();
        if ground_gradient_ft_per_nm < required {
            return Err(TakeoffError::ObstacleNotCleared {
                required_ft_per_nm: required,
                available_ft_per_nm: ground_gradient_ft_per_nm,
            });
        }
    }

    let stab_trim_deg =
        ctx.tables
            .lookup(TRIM_TABLE, None, &[state.cg_pct_mac, weight], "stab_trim_deg")?;

    let mut advisories = Vec::new();
    if climb_gradient_ft_per_nm < settings.red_gradient_ft_per_nm {
        advisories.push(Advisory {
            level: AdvisoryLevel::Red,
            message: format!(
                "climb gradient {climb_gradient_ft_per_nm:.0} ft/nm below {:.0} ft/nm: afterburner required",
                settings.red_gradient_ft_per_nm
            ),
        });
    } else if climb_gradient_ft_per_nm < settings.amber_gradient_ft_per_nm {
        advisories.push(Advisory {
            level: AdvisoryLevel::Amber,
            message: format!(
                "climb gradient {climb_gradient_ft_per_nm:.0} ft/nm below {:.0} ft/nm",
                settings.amber_gradient_ft_per_nm
            ),
        });
    }
    if let Some(clamp) = setting.derate.filter(|c| c.clamped_to_floor) {
        advisories.push(Advisory {
            level: AdvisoryLevel::Amber,
            message: format!(
                "requested {:.0}% RPM raised to {:.0}% floor for flaps {}",
                clamp.requested_pct, clamp.floor_pct, flaps
            ),
        });
    }
    for advisory in &advisories {
        warn!("takeoff advisory: {}", advisory.message);
    }

    let record = TakeoffRecord {
        flaps: flaps.table_key().to_string(),
        thrust: setting.label.clone(),
        derate: setting.derate,
        gross_weight_lb: weight,
        v1_kcas: v1,
        vr_kcas: vr,
        v2_kcas: v2,
        vfs_kcas: vfs,
        ground_roll_ft,
        takeoff_distance_ft,
        accelerate_stop_ft,
        required_field_length_ft,
        runway_available_ft: runway.length_ft,
        corrections,
        climb_gradient: gradient,
        climb_gradient_ft_per_nm,
        ground_gradient_ft_per_nm,
        vertical_speed_fpm: model::vertical_speed_fpm(gradient, point.ktas),
        stab_trim_deg,
        trim_band_kcas: (v2, v2 + settings.trim_band_kcas),
        fuel_allowance_lb: settings.allowance_fuel_lb,
        time_allowance_min: settings.allowance_minutes,
        advisories,
    };
    debug!(
        "takeoff: flaps {} thrust {} V1/VR/V2 {:.0}/{:.0}/{:.0} field {:.0}/{:.0} ft",
        record.flaps,
        record.thrust,
        v1,
        vr,
        v2,
        record.required_field_length_ft,
        runway.length_ft
    );
    Ok(record)
}
