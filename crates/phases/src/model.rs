//! Airframe and engine model shared by the phase calculators.
//!
//! Aerodynamics come from the `aero.polar` tables (CD = cd0 + k·CL²), installed thrust and
//! fuel flow from the `engine.thrust` decks. All speeds are knots, forces pounds.

use perf_aircraft::derate::{DerateClamp, DeratePolicy};
use perf_aircraft::{FlapSetting, PropulsionMode};
use perf_atmosphere::EnvironmentState;
use perf_core::constants::{FT_PER_NM, ISA_RHO0_SLUG_FT3};
use perf_core::units::{fps_to_kts, kts_to_fps};
use perf_interp::LookupError;
use thiserror::Error;

use crate::PhaseContext;

pub const POLAR_TABLE: &str = "aero.polar";
pub const ENGINE_TABLE: &str = "engine.thrust";

/// Drag polar coefficients at one Mach number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polar {
    pub cd0: f64,
    pub k: f64,
    pub cl_max: f64,
}

impl Polar {
    pub fn drag_coefficient(&self, cl: f64, extra_cd0: f64) -> f64 {
        self.cd0 + extra_cd0 + self.k * cl * cl
    }
}

pub fn polar(ctx: &PhaseContext<'_>, flaps: FlapSetting, mach: f64) -> Result<Polar, LookupError> {
    let [cd0, k, cl_max] =
        ctx.tables
            .lookup_many(POLAR_TABLE, Some(flaps.table_key()), &[mach], ["cd0", "k", "cl_max"])?;
    Ok(Polar { cd0, k, cl_max })
}

/// Engine deck selected by a power setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Power {
    Idle,
    Military,
    Afterburner,
}

impl Power {
    pub fn table_key(&self) -> &'static str {
        match self {
            Power::Idle => "IDLE",
            Power::Military => "MIL",
            Power::Afterburner => "AB",
        }
    }
}

/// Resolved engine setting: which deck, and the thrust scale applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSetting {
    pub power: Power,
    pub thrust_scale: f64,
    pub label: String,
    pub derate: Option<DerateClamp>,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PowerError {
    #[error("afterburner is not permitted by the derate policy")]
    AfterburnerNotPermitted,
}

/// Map a propulsion mode to an engine setting for the given flap configuration.
pub fn resolve_setting(
    mode: PropulsionMode,
    flaps: FlapSetting,
    policy: &DeratePolicy,
) -> Result<EngineSetting, PowerError> {
    let setting = match mode {
        PropulsionMode::Military => EngineSetting {
            power: Power::Military,
            thrust_scale: 1.0,
            label: "MIL".to_string(),
            derate: None,
        },
        PropulsionMode::Afterburner => {
            if !policy.allow_afterburner {
                return Err(PowerError::AfterburnerNotPermitted);
            }
            EngineSetting {
                power: Power::Afterburner,
                thrust_scale: 1.0,
                label: "AB".to_string(),
                derate: None,
            }
        }
        PropulsionMode::Economy => EngineSetting {
            power: Power::Military,
            thrust_scale: policy.thrust_fraction(policy.economy_rpm_pct),
            label: format!("ECON {:.0}%", policy.economy_rpm_pct),
            derate: None,
        },
        PropulsionMode::Derated { rpm_pct } => {
            let clamp = policy.clamp(rpm_pct, flaps);
            EngineSetting {
                power: Power::Military,
                thrust_scale: policy.thrust_fraction(clamp.applied_pct),
                label: format!("DERATED {:.0}%", clamp.applied_pct),
                derate: Some(clamp),
            }
        }
    };
    Ok(setting)
}

impl EngineSetting {
    pub fn military() -> Self {
        Self {
            power: Power::Military,
            thrust_scale: 1.0,
            label: "MIL".to_string(),
            derate: None,
        }
    }
}

/// Total installed thrust and fuel flow for all engines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOutput {
    pub thrust_lbf: f64,
    pub fuel_flow_pph: f64,
}

pub fn engine(
    ctx: &PhaseContext<'_>,
    setting: &EngineSetting,
    env: &EnvironmentState,
    mach: f64,
) -> Result<EngineOutput, LookupError> {
    let [thrust, fuel_flow] = ctx.tables.lookup_many(
        ENGINE_TABLE,
        Some(setting.power.table_key()),
        &[env.pressure_altitude_ft, mach, env.isa_deviation_c],
        ["thrust_lbf", "fuel_flow_pph"],
    )?;
    let engines = f64::from(ctx.aircraft.engine_count);
    let mut fuel_flow_pph = fuel_flow * engines * setting.thrust_scale;
    if setting.thrust_scale < 1.0 {
        fuel_flow_pph = fuel_flow_pph.max(ctx.derate.min_idle_fuel_flow_pph);
    }
    Ok(EngineOutput {
        thrust_lbf: thrust * engines * setting.thrust_scale,
        fuel_flow_pph,
    })
}

/// Fuel flow needed to hold `thrust_required` with `available` as the throttle limit.
///
/// Below military thrust the specific fuel consumption of the military deck is used, never
/// less than `idle_floor_pph`. Between military and afterburner the fuel flow is
/// interpolated linearly. `None` when the demand cannot be met.
pub fn part_throttle_fuel_flow(
    thrust_required: f64,
    military: EngineOutput,
    available: EngineOutput,
    idle_floor_pph: f64,
) -> Option<f64> {
    if !(thrust_required <= available.thrust_lbf) {
        return None;
    }
    if thrust_required <= military.thrust_lbf {
        let scaled = military.fuel_flow_pph * thrust_required / military.thrust_lbf;
        return Some(scaled.max(idle_floor_pph));
    }
    let span = available.thrust_lbf - military.thrust_lbf;
    if span <= 0.0 {
        return None;
    }
    let t = (thrust_required - military.thrust_lbf) / span;
    Some(military.fuel_flow_pph + t * (available.fuel_flow_pph - military.fuel_flow_pph))
}

/// Dynamic pressure (lb/ft²) at a true airspeed.
pub fn dynamic_pressure_psf(env: &EnvironmentState, ktas: f64) -> f64 {
    let v = kts_to_fps(ktas);
    0.5 * ISA_RHO0_SLUG_FT3 * env.density_ratio * v * v
}

pub fn lift_coefficient(weight_lb: f64, q_psf: f64, wing_area_ft2: f64) -> f64 {
    weight_lb / (q_psf * wing_area_ft2)
}

/// Stall speed (KCAS, taken equal to EAS) for a weight and maximum lift coefficient.
pub fn stall_speed_kcas(weight_lb: f64, cl_max: f64, wing_area_ft2: f64) -> f64 {
    fps_to_kts((2.0 * weight_lb / (ISA_RHO0_SLUG_FT3 * wing_area_ft2 * cl_max)).sqrt())
}

/// Still-air climb gradient (T − D) / W.
pub fn climb_gradient(thrust_lbf: f64, drag_lbf: f64, weight_lb: f64) -> f64 {
    (thrust_lbf - drag_lbf) / weight_lb
}

pub fn gradient_ft_per_nm(gradient: f64) -> f64 {
    gradient * FT_PER_NM
}

/// Vertical speed (ft/min) from a gradient at a true airspeed.
pub fn vertical_speed_fpm(gradient: f64, ktas: f64) -> f64 {
    gradient * kts_to_fps(ktas) * 60.0
}

/// Steady flight state at a speed: lift coefficient, drag and the engine at a setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightPoint {
    pub kcas: f64,
    pub ktas: f64,
    pub mach: f64,
    pub cl: f64,
    pub cl_max: f64,
    pub drag_lbf: f64,
    pub engine: EngineOutput,
}

impl FlightPoint {
    pub fn gradient(&self, weight_lb: f64) -> f64 {
        climb_gradient(self.engine.thrust_lbf, self.drag_lbf, weight_lb)
    }
}

/// Evaluate drag and thrust at a calibrated airspeed.
pub fn flight_point(
    ctx: &PhaseContext<'_>,
    env: &EnvironmentState,
    weight_lb: f64,
    kcas: f64,
    flaps: FlapSetting,
    extra_cd0: f64,
    setting: &EngineSetting,
) -> Result<FlightPoint, LookupError> {
    let ktas = env.tas_from_cas(kcas);
    let mach = env.mach_from_tas(ktas);
    let aero = polar(ctx, flaps, mach)?;
    let q = dynamic_pressure_psf(env, ktas);
    let cl = lift_coefficient(weight_lb, q, ctx.aircraft.wing_area_ft2);
    let drag_lbf = q * ctx.aircraft.wing_area_ft2 * aero.drag_coefficient(cl, extra_cd0);
    let engine = engine(ctx, setting, env, mach)?;
    Ok(FlightPoint {
        kcas,
        ktas,
        mach,
        cl,
        cl_max: aero.cl_max,
        drag_lbf,
        engine,
    })
}

/// Wind factor on a distance driven by `v² / 2a`, with the headwind credit/tailwind penalty applied.
pub fn wind_distance_factor(ktas: f64, headwind_kts: f64, credit: f64, penalty: f64) -> f64 {
    let effective = if headwind_kts >= 0.0 {
        headwind_kts * credit
    } else {
        headwind_kts * penalty
    };
    let ground = (ktas - effective).max(0.0);
    (ground / ktas).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn headwind_shortens_and_tailwind_lengthens() {
        let calm = wind_distance_factor(150.0, 0.0, 0.5, 1.5);
        let head = wind_distance_factor(150.0, 20.0, 0.5, 1.5);
        let tail = wind_distance_factor(150.0, -10.0, 0.5, 1.5);
        assert_relative_eq!(calm, 1.0);
        assert_relative_eq!(head, (140.0_f64 / 150.0).powi(2), epsilon = 1e-12);
        assert_relative_eq!(tail, (165.0_f64 / 150.0).powi(2), epsilon = 1e-12);
    }

    #[test]
    fn stall_speed_scales_with_root_weight() {
        let light = stall_speed_kcas(40_000.0, 1.2, 565.0);
        let heavy = stall_speed_kcas(160_000.0, 1.2, 565.0);
        assert_relative_eq!(heavy / light, 2.0, epsilon = 1e-12);
        assert!(light > 100.0 && light < 160.0);
    }

    #[test]
    fn derated_request_is_raised_to_flap_floor() {
        let policy = DeratePolicy::default();
        let setting =
            resolve_setting(PropulsionMode::Derated { rpm_pct: 80.0 }, FlapSetting::Full, &policy)
                .unwrap();
        let clamp = setting.derate.unwrap();
        assert!(clamp.clamped_to_floor);
        assert_relative_eq!(clamp.applied_pct, 96.0);
        assert_eq!(setting.label, "DERATED 96%");
        assert!(setting.thrust_scale < 1.0 && setting.thrust_scale > 0.9);
    }

    #[test]
    fn afterburner_respects_policy() {
        let mut policy = DeratePolicy::default();
        let ab = resolve_setting(PropulsionMode::Afterburner, FlapSetting::Up, &policy).unwrap();
        assert_eq!(ab.power, Power::Afterburner);
        policy.allow_afterburner = false;
        assert_eq!(
            resolve_setting(PropulsionMode::Afterburner, FlapSetting::Up, &policy).unwrap_err(),
            PowerError::AfterburnerNotPermitted
        );
    }

    #[test]
    fn part_throttle_flow_scales_and_interpolates() {
        let mil = EngineOutput {
            thrust_lbf: 20_000.0,
            fuel_flow_pph: 16_000.0,
        };
        let ab = EngineOutput {
            thrust_lbf: 30_000.0,
            fuel_flow_pph: 50_000.0,
        };
        let cruise = part_throttle_fuel_flow(10_000.0, mil, mil, 1_200.0).unwrap();
        assert_relative_eq!(cruise, 8_000.0);
        assert_relative_eq!(part_throttle_fuel_flow(100.0, mil, mil, 1_200.0).unwrap(), 1_200.0);
        let reheat = part_throttle_fuel_flow(25_000.0, mil, ab, 1_200.0).unwrap();
        assert_relative_eq!(reheat, 33_000.0);
        assert!(part_throttle_fuel_flow(31_000.0, mil, ab, 1_200.0).is_none());
    }

    #[test]
    fn no_throttle_range_above_military_gives_no_flow() {
        let mil = EngineOutput {
            thrust_lbf: 20_000.0,
            fuel_flow_pph: 16_000.0,
        };
        let flat = EngineOutput {
            thrust_lbf: 20_000.0,
            fuel_flow_pph: 40_000.0,
        };
        let degraded = EngineOutput {
            thrust_lbf: 18_000.0,
            fuel_flow_pph: 40_000.0,
        };
        assert!(part_throttle_fuel_flow(20_500.0, mil, flat, 1_200.0).is_none());
        assert!(part_throttle_fuel_flow(17_000.0, degraded, degraded, 1_200.0).is_some());
        assert!(part_throttle_fuel_flow(f64::NAN, mil, flat, 1_200.0).is_none());
    }

    #[test]
    fn gradient_conversions() {
        assert_relative_eq!(gradient_ft_per_nm(0.05), 0.05 * FT_PER_NM);
        // 10% at 120 KTAS is roughly 1,215 ft/min.
        assert_relative_eq!(vertical_speed_fpm(0.1, 120.0), 1_215.2, epsilon = 0.5);
    }
}
