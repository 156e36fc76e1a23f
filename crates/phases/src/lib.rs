//! Phase calculators (takeoff, climb, cruise, landing) over the interpolated table store.
//!
//! Each calculator is a pure function of the aircraft state, the derived environment and a
//! [`PhaseContext`] bundling the immutable tables and settings. Calculators fail fast with a
//! phase-specific error instead of returning partial records.

pub mod climb;
pub mod cruise;
pub mod landing;
pub mod model;
pub mod takeoff;

use std::fmt;

use perf_aircraft::AircraftProfile;
use perf_aircraft::derate::DeratePolicy;
use perf_atmosphere::EnvironmentLimits;
use perf_config::PerformanceSettings;
use perf_interp::{InterpolationPolicy, Interpolator};
use perf_tables::TableStore;
use serde::Serialize;

pub use climb::{ClimbError, ClimbRecord, ClimbRequest, ClimbSegment, ClimbStrategy, compute_climb};
pub use cruise::{CruiseError, CruiseObjective, CruiseRecord, CruiseRequest, compute_cruise};
pub use landing::{
    GoAround, LandingCase, LandingError, LandingRecord, LandingRequest, LandingScenario,
    compute_landing, compute_landing_scenarios,
};
pub use takeoff::{Obstacle, TakeoffError, TakeoffRecord, TakeoffRequest, compute_takeoff};

/// Immutable inputs shared by every calculator in one request.
#[derive(Debug, Clone)]
pub struct PhaseContext<'a> {
    pub aircraft: &'a AircraftProfile,
    pub tables: Interpolator<'a>,
    pub settings: &'a PerformanceSettings,
    pub derate: DeratePolicy,
    pub limits: EnvironmentLimits,
}

impl<'a> PhaseContext<'a> {
    pub fn new(
        aircraft: &'a AircraftProfile,
        store: &'a TableStore,
        settings: &'a PerformanceSettings,
    ) -> Self {
        Self {
            aircraft,
            tables: Interpolator::new(store, InterpolationPolicy::from(&settings.interpolation)),
            settings,
            derate: DeratePolicy::from(&settings.derate),
            limits: EnvironmentLimits::from(&settings.atmosphere),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Takeoff,
    Climb,
    Cruise,
    Landing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Takeoff => "takeoff",
            Phase::Climb => "climb",
            Phase::Cruise => "cruise",
            Phase::Landing => "landing",
        };
        f.write_str(name)
    }
}

/// Named value in a phase record, in presentation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

impl Metric {
    pub fn new(name: &'static str, value: f64, unit: &'static str) -> Self {
        Self { name, value, unit }
    }
}

/// Common view over the phase records.
pub trait PhaseRecord {
    fn phase(&self) -> Phase;

    /// Ordered metrics for renderers.
    fn metrics(&self) -> Vec<Metric>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdvisoryLevel {
    Amber,
    Red,
}

/// Caution attached to an otherwise valid record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub level: AdvisoryLevel,
    pub message: String,
}
