//! Landing: approach speeds, landing distance and go-around capability, for a single
//! landing or for the set of recovery cases carried on a mission card.

use std::fmt;

use log::{debug, warn};
use perf_aircraft::{AircraftError, AircraftState, FlapSetting};
use perf_atmosphere::{EnvironmentState, Surface};
use perf_interp::LookupError;
use serde::Serialize;

use crate::model::{self, EngineSetting, Power};
use crate::{Advisory, AdvisoryLevel, Metric, Phase, PhaseContext, PhaseRecord};

pub const SPEEDS_TABLE: &str = "landing.speeds";
pub const DISTANCE_TABLE: &str = "landing.distance";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandingRequest {
    /// Defaults to the state's gross weight.
    pub weight_lb: Option<f64>,
    /// Defaults to the configured landing flaps.
    pub flaps: Option<FlapSetting>,
}

/// Recovery cases evaluated for a mission card, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LandingScenario {
    /// Gross weight less the recovery burn, stores kept.
    StoresRetained,
    /// As above with the expendable stores released; pylons and their drag stay.
    StoresExpended,
    /// Weight and flaps from the request, each defaulting as for the planned cases.
    Custom,
}

impl LandingScenario {
    pub const ALL: [LandingScenario; 3] = [
        LandingScenario::StoresRetained,
        LandingScenario::StoresExpended,
        LandingScenario::Custom,
    ];

    pub fn key(self) -> &'static str {
        match self {
            LandingScenario::StoresRetained => "stores_retained",
            LandingScenario::StoresExpended => "stores_expended",
            LandingScenario::Custom => "custom",
        }
    }

    /// Landing weight and flaps for this case. The planned weights never drop below the
    /// profile's minimum gross weight.
    pub fn request(
        self,
        state: &AircraftState,
        ctx: &PhaseContext<'_>,
        custom: &LandingRequest,
    ) -> LandingRequest {
        let floor = ctx.aircraft.min_gross_weight_lb;
        let planned = (state.gross_weight_lb - ctx.settings.landing.recovery_burn_lb).max(floor);
        match self {
            LandingScenario::StoresRetained => LandingRequest {
                weight_lb: Some(planned),
                flaps: None,
            },
            LandingScenario::StoresExpended => LandingRequest {
                weight_lb: Some((planned - state.configuration.stores.weight_lb).max(floor)),
                flaps: None,
            },
            LandingScenario::Custom => LandingRequest {
                weight_lb: Some(custom.weight_lb.unwrap_or(planned)),
                flaps: custom.flaps,
            },
        }
    }
}

impl fmt::Display for LandingScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Landing record tagged with the case it answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandingCase {
    pub scenario: LandingScenario,
    #[serde(flatten)]
    pub record: LandingRecord,
}

/// Go-around capability at the approach speed, gear down.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoAround {
    pub thrust: String,
    pub gradient: f64,
    pub gradient_ft_per_nm: f64,
    pub thrust_available_lbf: f64,
    pub drag_lbf: f64,
    /// Thrust needed for the configured minimum go-around gradient.
    pub thrust_required_lbf: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandingRecord {
    pub weight_lb: f64,
    pub flaps: String,
    pub vac_kcas: f64,
    pub vfs_kcas: f64,
    pub ground_roll_ft: f64,
    pub landing_distance_ft: f64,
    pub runway_available_ft: Option<f64>,
    pub dispatchable: Option<bool>,
    pub go_around: GoAround,
    pub advisories: Vec<Advisory>,
}

impl PhaseRecord for LandingRecord {
    fn phase(&self) -> Phase {
        Phase::Landing
    }

    fn metrics(&self) -> Vec<Metric> {
        let mut metrics = vec![
            Metric::new("landing_weight", self.weight_lb, "lb"),
            Metric::new("approach_speed", self.vac_kcas, "KCAS"),
            Metric::new("final_segment_speed", self.vfs_kcas, "KCAS"),
            Metric::new("ground_roll", self.ground_roll_ft, "ft"),
            Metric::new("landing_distance", self.landing_distance_ft, "ft"),
            Metric::new("go_around_gradient", self.go_around.gradient_ft_per_nm, "ft/nm"),
            Metric::new(
                "go_around_thrust_available",
                self.go_around.thrust_available_lbf,
                "lbf",
            ),
            Metric::new(
                "go_around_thrust_required",
                self.go_around.thrust_required_lbf,
                "lbf",
            ),
        ];
        if let Some(available) = self.runway_available_ft {
            metrics.push(Metric::new("runway_available", available, "ft"));
        }
        metrics
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum LandingError {
    #[error("aircraft state rejected: {0}")]
    Aircraft(#[from] AircraftError),
    #[error("table lookup failed: {0}")]
    Lookup(#[from] LookupError),
    #[error("go-around infeasible: best gradient {best_gradient:.4}")]
    GoAroundInfeasible { best_gradient: f64 },
    #[error("{scenario} case: {source}")]
    Scenario {
        scenario: LandingScenario,
        source: Box<LandingError>,
    },
}

/// Compute every recovery case in [`LandingScenario::ALL`] order. The first failing
/// case fails the whole set.
pub fn compute_landing_scenarios(
    state: &AircraftState,
    env: &EnvironmentState,
    ctx: &PhaseContext<'_>,
    custom: &LandingRequest,
) -> Result<Vec<LandingCase>, LandingError> {
    LandingScenario::ALL
        .iter()
        .map(|&scenario| {
            let request = scenario.request(state, ctx, custom);
            compute_landing(state, env, ctx, &request)
                .map(|record| LandingCase { scenario, record })
                .map_err(|err| LandingError::Scenario {
                    scenario,
                    source: Box::new(err),
                })
        })
        .collect()
}

/// Compute the landing record at the field described by `env`.
pub fn compute_landing(
    state: &AircraftState,
    env: &EnvironmentState,
    ctx: &PhaseContext<'_>,
    request: &LandingRequest,
) -> Result<LandingRecord, LandingError> {
    ctx.aircraft.check_state(state)?;
    let weight = request.weight_lb.unwrap_or(state.gross_weight_lb);
    ctx.aircraft.check_weight(weight)?;
    let settings = &ctx.settings.landing;
    let flaps = match request.flaps {
        Some(flaps) => flaps,
        None => settings.default_flaps.parse::<FlapSetting>()?,
    };
    let flap_key = Some(flaps.table_key());

    let [vac, vfs] =
        ctx.tables
            .lookup_many(SPEEDS_TABLE, flap_key, &[weight], ["vac_kcas", "vfs_kcas"])?;
    let roll = ctx.tables.lookup(
        DISTANCE_TABLE,
        flap_key,
        &[weight, env.pressure_altitude_ft, env.isa_deviation_c],
        "ground_roll_ft",
    )?;

    let takeoff = &ctx.settings.takeoff;
    let vac_tas = env.tas_from_cas(vac);
    let mut ground_roll_ft = roll
        * model::wind_distance_factor(
            vac_tas,
            env.headwind_kts,
            takeoff.headwind_credit,
            takeoff.tailwind_penalty,
        );
    if let Some(runway) = &env.runway {
        // Upslope shortens the rollout, downslope lengthens it.
        ground_roll_ft *= if runway.slope_pct >= 0.0 {
            (1.0 - takeoff.downslope_per_pct * runway.slope_pct).max(0.5)
        } else {
            1.0 - takeoff.upslope_per_pct * runway.slope_pct
        };
        if runway.surface == Surface::Wet {
            ground_roll_ft *= settings.wet_runway_factor;
        }
    }
    let landing_distance_ft = ground_roll_ft * settings.distance_factor;
    let runway_available_ft = env.runway.map(|r| r.length_ft);
    let dispatchable = runway_available_ft.map(|available| landing_distance_ft <= available);

    let go_around = go_around(state, env, ctx, weight, vac, flaps)?;

    let mut advisories = Vec::new();
    if let (Some(false), Some(available)) = (dispatchable, runway_available_ft) {
        advisories.push(Advisory {
            level: AdvisoryLevel::Red,
            message: format!(
                "landing distance {landing_distance_ft:.0} ft exceeds runway {available:.0} ft"
            ),
        });
    }
    if go_around.gradient < settings.go_around_gradient {
        advisories.push(Advisory {
            level: AdvisoryLevel::Amber,
            message: format!(
                "go-around gradient {:.1}% below {:.1}%",
                go_around.gradient * 100.0,
                settings.go_around_gradient * 100.0
            ),
        });
    }
    for advisory in &advisories {
        warn!("landing advisory: {}", advisory.message);
    }
    debug!(
        "landing: {weight:.0} lb flaps {flaps} Vac {vac:.0} distance {landing_distance_ft:.0} ft go-around {} {:.0} ft/nm",
        go_around.thrust, go_around.gradient_ft_per_nm
    );

    Ok(LandingRecord {
        weight_lb: weight,
        flaps: flaps.table_key().to_string(),
        vac_kcas: vac,
        vfs_kcas: vfs,
        ground_roll_ft,
        landing_distance_ft,
        runway_available_ft,
        dispatchable,
        go_around,
        advisories,
    })
}

/// First engine setting (Military, then Afterburner when permitted) with a positive gradient.
fn go_around(
    state: &AircraftState,
    env: &EnvironmentState,
    ctx: &PhaseContext<'_>,
    weight: f64,
    vac: f64,
    flaps: FlapSetting,
) -> Result<GoAround, LandingError> {
    let extra_cd0 = ctx.aircraft.gear_cd0
        + state.configuration.stores.drag_index * ctx.settings.cruise.cd0_per_drag_index;
    let mut settings = vec![EngineSetting::military()];
    if ctx.derate.allow_afterburner {
        settings.push(EngineSetting {
            power: Power::Afterburner,
            thrust_scale: 1.0,
            label: "AB".to_string(),
            derate: None,
        });
    }

    let mut best_gradient = f64::NEG_INFINITY;
    for setting in &settings {
        let point = model::flight_point(ctx, env, weight, vac, flaps, extra_cd0, setting)?;
        let gradient = point.gradient(weight);
        if gradient > 0.0 {
            return Ok(GoAround {
                thrust: setting.label.clone(),
                gradient,
                gradient_ft_per_nm: model::gradient_ft_per_nm(gradient),
                thrust_available_lbf: point.engine.thrust_lbf,
                drag_lbf: point.drag_lbf,
                thrust_required_lbf: point.drag_lbf
                    + weight * ctx.settings.landing.go_around_gradient,
            });
        }
        best_gradient = best_gradient.max(gradient);
    }
    Err(LandingError::GoAroundInfeasible { best_gradient })
}
