//! Mission card assembly: the structured contract handed to report renderers.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use perf_fuel::{EndState, FuelPoint, RecoveryRequirement, ReserveError, ReserveProfile};
use perf_phases::{
    Advisory, ClimbError, ClimbRecord, CruiseError, CruiseRecord, LandingCase, LandingError,
    LandingRecord, LandingScenario, Metric, PhaseRecord, TakeoffError, TakeoffRecord,
};
use serde::Serialize;
use thiserror::Error;

/// Required sections of a mission card, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Section {
    Takeoff,
    Climb,
    Cruise,
    Landing,
    Fuel,
    BingoJoker,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Takeoff,
        Section::Climb,
        Section::Cruise,
        Section::Landing,
        Section::Fuel,
        Section::BingoJoker,
    ];
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Takeoff => "takeoff",
            Section::Climb => "climb",
            Section::Cruise => "cruise",
            Section::Landing => "landing",
            Section::Fuel => "fuel",
            Section::BingoJoker => "bingo_joker",
        };
        f.write_str(name)
    }
}

/// Why a section could not be filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionFailure {
    pub section: Section,
    pub reason: String,
}

impl fmt::Display for SectionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.section, self.reason)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CardError {
    #[error("incomplete mission card: {}", summarize(.failures))]
    IncompleteCard { failures: Vec<SectionFailure> },
}

fn summarize(failures: &[SectionFailure]) -> String {
    failures
        .iter()
        .map(SectionFailure::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Outcome of every computation feeding the card. `None` marks a section that never ran.
#[derive(Debug, Clone)]
pub struct CardInputs {
    pub aircraft: String,
    pub generated_at: DateTime<Utc>,
    pub takeoff: Option<Result<TakeoffRecord, TakeoffError>>,
    pub climb: Option<Result<ClimbRecord, ClimbError>>,
    pub cruise: Option<Result<CruiseRecord, CruiseError>>,
    pub landing: Option<Result<Vec<LandingCase>, LandingError>>,
    pub reserves: Option<Result<ReserveProfile, ReserveError>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelSection {
    pub fuel_on_board_lb: f64,
    pub curve: Vec<FuelPoint>,
    pub end_state: EndState,
    pub advisories: Vec<Advisory>,
}

impl FuelSection {
    pub fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::new("fuel_on_board", self.fuel_on_board_lb, "lb"),
            Metric::new(
                "mission_burn",
                self.fuel_on_board_lb - self.end_state.fuel_remaining_lb,
                "lb",
            ),
            Metric::new("fuel_remaining", self.end_state.fuel_remaining_lb, "lb"),
            Metric::new("end_weight", self.end_state.gross_weight_lb, "lb"),
            Metric::new("elapsed_time", self.end_state.elapsed_min, "min"),
            Metric::new("distance", self.end_state.distance_nm, "nm"),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BingoJokerSection {
    pub bingo_lb: f64,
    pub joker_lb: f64,
    pub recovery: RecoveryRequirement,
}

impl BingoJokerSection {
    pub fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::new("bingo", self.bingo_lb, "lb"),
            Metric::new("joker", self.joker_lb, "lb"),
            Metric::new("recovery_distance", self.recovery.distance_nm, "nm"),
            Metric::new("recovery_fuel", self.recovery.fuel_lb, "lb"),
            Metric::new("recovery_time", self.recovery.time_min, "min"),
        ]
    }
}

/// Complete mission card. Read-only once assembled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionCard {
    pub aircraft: String,
    /// RFC 3339, UTC.
    pub generated_at: String,
    pub takeoff: TakeoffRecord,
    pub climb: ClimbRecord,
    pub cruise: CruiseRecord,
    /// One record per recovery case.
    pub landing: Vec<LandingCase>,
    pub fuel: FuelSection,
    pub bingo_joker: BingoJokerSection,
}

impl MissionCard {
    /// Flat metrics per section label, in presentation order. Landing cases are
    /// labelled `landing.<case>`.
    pub fn section_metrics(&self) -> Vec<(String, Vec<Metric>)> {
        let mut sections = vec![
            (Section::Takeoff.to_string(), self.takeoff.metrics()),
            (Section::Climb.to_string(), self.climb.metrics()),
            (Section::Cruise.to_string(), self.cruise.metrics()),
        ];
        sections.extend(self.landing.iter().map(|case| {
            (
                format!("{}.{}", Section::Landing, case.scenario),
                case.record.metrics(),
            )
        }));
        sections.push((Section::Fuel.to_string(), self.fuel.metrics()));
        sections.push((Section::BingoJoker.to_string(), self.bingo_joker.metrics()));
        sections
    }

    pub fn landing_case(&self, scenario: LandingScenario) -> Option<&LandingRecord> {
        self.landing
            .iter()
            .find(|case| case.scenario == scenario)
            .map(|case| &case.record)
    }

    /// Every advisory on the card with the section that raised it.
    pub fn advisories(&self) -> Vec<(Section, &Advisory)> {
        let takeoff = self.takeoff.advisories.iter().map(|a| (Section::Takeoff, a));
        let landing = self
            .landing
            .iter()
            .flat_map(|case| case.record.advisories.iter())
            .map(|a| (Section::Landing, a));
        let fuel = self.fuel.advisories.iter().map(|a| (Section::Fuel, a));
        takeoff.chain(landing).chain(fuel).collect()
    }
}

fn take<T, E: fmt::Display>(
    section: Section,
    outcome: Option<Result<T, E>>,
    failures: &mut Vec<SectionFailure>,
) -> Option<T> {
    match outcome {
        Some(Ok(record)) => Some(record),
        Some(Err(err)) => {
            failures.push(SectionFailure {
                section,
                reason: err.to_string(),
            });
            None
        }
        None => {
            failures.push(SectionFailure {
                section,
                reason: "not computed".to_string(),
            });
            None
        }
    }
}

/// Combine the computed sections into a card, or list every section that is missing.
pub fn assemble(inputs: CardInputs) -> Result<MissionCard, CardError> {
    let mut failures = Vec::new();
    let takeoff = take(Section::Takeoff, inputs.takeoff, &mut failures);
    let climb = take(Section::Climb, inputs.climb, &mut failures);
    let cruise = take(Section::Cruise, inputs.cruise, &mut failures);
    let landing = take(Section::Landing, inputs.landing, &mut failures);
    let reserves = match inputs.reserves {
        Some(Ok(profile)) => Some(profile),
        Some(Err(err)) => {
            let reason = err.to_string();
            for section in [Section::Fuel, Section::BingoJoker] {
                failures.push(SectionFailure {
                    section,
                    reason: reason.clone(),
                });
            }
            None
        }
        None => {
            for section in [Section::Fuel, Section::BingoJoker] {
                failures.push(SectionFailure {
                    section,
                    reason: "not computed".to_string(),
                });
            }
            None
        }
    };

    match (takeoff, climb, cruise, landing, reserves) {
        (Some(takeoff), Some(climb), Some(cruise), Some(landing), Some(reserves))
            if failures.is_empty() =>
        {
            Ok(MissionCard {
                aircraft: inputs.aircraft,
                generated_at: inputs
                    .generated_at
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
                takeoff,
                climb,
                cruise,
                landing,
                fuel: FuelSection {
                    fuel_on_board_lb: reserves.fuel_on_board_lb,
                    curve: reserves.curve,
                    end_state: reserves.end_state,
                    advisories: reserves.advisories,
                },
                bingo_joker: BingoJokerSection {
                    bingo_lb: reserves.bingo_lb,
                    joker_lb: reserves.joker_lb,
                    recovery: reserves.recovery,
                },
            })
        }
        _ => Err(CardError::IncompleteCard { failures }),
    }
}
