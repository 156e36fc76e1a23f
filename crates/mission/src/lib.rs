//! Mission orchestrator: derives the environment once, runs the four phase calculators in
//! parallel, plans reserves from their records, and assembles the mission card.

pub mod card;
pub mod request;

use chrono::Utc;
use log::{debug, info};
use perf_atmosphere::{AtmosphereError, EnvironmentState, derive_environment};
use perf_fuel::{PhaseRecords, ReserveMargins, plan_reserves};
use perf_phases::{
    PhaseContext, compute_climb, compute_cruise, compute_landing_scenarios, compute_takeoff,
};

pub use card::{
    BingoJokerSection, CardError, CardInputs, FuelSection, MissionCard, Section, SectionFailure,
    assemble,
};
pub use request::{FieldConditions, MissionRequest, RequestError, from_config};

/// Top-level mission planning error.
#[derive(Debug, thiserror::Error)]
pub enum MissionError {
    #[error("departure environment rejected: {0}")]
    Environment(#[from] AtmosphereError),
    #[error("request is for '{requested}' but the loaded profile is '{loaded}'")]
    AircraftMismatch { requested: String, loaded: String },
    #[error(transparent)]
    Card(#[from] CardError),
}

/// Derive the departure-field environment, with the runway attached when one is given.
pub fn field_environment(
    request: &MissionRequest,
    ctx: &PhaseContext<'_>,
) -> Result<EnvironmentState, AtmosphereError> {
    let field = &request.field;
    let env = derive_environment(
        field.pressure_altitude_ft,
        field.oat_c,
        field.wind,
        &ctx.limits,
    )?;
    Ok(match field.runway {
        Some(runway) => env.with_runway(runway),
        None => env,
    })
}

/// Run the full request and assemble its mission card.
///
/// Climb and cruise start at the brake-release weight less the takeoff fuel allowance.
/// Every landing case is computed at the departure field. Reserves are planned only when takeoff,
/// climb and cruise all succeeded.
pub fn plan_mission(
    request: &MissionRequest,
    ctx: &PhaseContext<'_>,
) -> Result<MissionCard, MissionError> {
    if !request.aircraft.eq_ignore_ascii_case(&ctx.aircraft.name) {
        return Err(MissionError::AircraftMismatch {
            requested: request.aircraft.clone(),
            loaded: ctx.aircraft.name.clone(),
        });
    }
    let env = field_environment(request, ctx)?;
    let airborne = request.state.with_weight(
        request.state.gross_weight_lb - ctx.settings.takeoff.allowance_fuel_lb,
    );

    let ((takeoff, climb), (cruise, landing)) = rayon::join(
        || {
            rayon::join(
                || compute_takeoff(&request.state, &env, ctx, &request.takeoff),
                || compute_climb(&airborne, &env, ctx, &request.climb),
            )
        },
        || {
            rayon::join(
                || compute_cruise(&airborne, &env, ctx, &request.cruise),
                || compute_landing_scenarios(&request.state, &env, ctx, &request.landing),
            )
        },
    );

    let reserves = match (&takeoff, &climb, &cruise) {
        (Ok(takeoff), Ok(climb), Ok(cruise)) => {
            let records = PhaseRecords::from_records(takeoff, climb, cruise);
            let margins = ReserveMargins::from(&ctx.settings.reserves);
            Some(plan_reserves(&records, &request.legs, &request.fuel, &margins))
        }
        _ => {
            debug!("reserve planning skipped: a prerequisite phase failed");
            None
        }
    };

    let card = assemble(CardInputs {
        aircraft: ctx.aircraft.name.clone(),
        generated_at: Utc::now(),
        takeoff: Some(takeoff),
        climb: Some(climb),
        cruise: Some(cruise),
        landing: Some(landing),
        reserves,
    })?;
    info!(
        "mission card for {}: bingo {:.0} lb, joker {:.0} lb, {} advisories",
        card.aircraft,
        card.bingo_joker.bingo_lb,
        card.bingo_joker.joker_lb,
        card.advisories().len()
    );
    Ok(card)
}
