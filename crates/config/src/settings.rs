//! Tunable performance settings. Every field carries a documented default so a partial
//! (or absent) settings file is always usable.

use serde::Deserialize;

/// Top-level settings file layout.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct PerformanceSettings {
    pub interpolation: InterpolationSettings,
    pub atmosphere: AtmosphereSettings,
    pub takeoff: TakeoffSettings,
    pub climb: ClimbSettings,
    pub cruise: CruiseSettings,
    pub landing: LandingSettings,
    pub reserves: ReserveSettings,
    pub derate: DerateSettings,
}

/// Lookup guard applied by the interpolation engine.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InterpolationSettings {
    /// Allowed overshoot past an axis bound, as a fraction of the edge cell width (default 0.05).
    pub edge_tolerance_fraction: f64,
    /// Absolute slack added to the tolerance to absorb rounding (default 1e-9).
    pub absolute_epsilon: f64,
    /// Upper bound on bracketing search steps per axis (default 64).
    pub max_search_iterations: usize,
}

impl Default for InterpolationSettings {
    fn default() -> Self {
        Self {
            edge_tolerance_fraction: 0.05,
            absolute_epsilon: 1e-9,
            max_search_iterations: 64,
        }
    }
}

/// Modelled atmosphere envelope.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AtmosphereSettings {
    /// Lowest accepted pressure altitude (default -2,000 ft).
    pub min_altitude_ft: f64,
    /// Highest accepted pressure altitude (default 50,000 ft).
    pub ceiling_ft: f64,
    /// Largest accepted ISA deviation magnitude (default 50 °C).
    pub max_isa_deviation_c: f64,
}

impl Default for AtmosphereSettings {
    fn default() -> Self {
        Self {
            min_altitude_ft: -2_000.0,
            ceiling_ft: 50_000.0,
            max_isa_deviation_c: 50.0,
        }
    }
}

/// Takeoff corrections, safety factors, and advisory thresholds.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TakeoffSettings {
    /// Multiplier applied to the corrected takeoff distance (default 1.10).
    pub runway_factor: f64,
    /// Fraction of the reported headwind credited (default 0.5).
    pub headwind_credit: f64,
    /// Multiplier applied to the reported tailwind (default 1.5).
    pub tailwind_penalty: f64,
    /// Distance increase per percent of upslope (default 0.10).
    pub upslope_per_pct: f64,
    /// Distance decrease per percent of downslope (default 0.05).
    pub downslope_per_pct: f64,
    /// Multiplier for wet runways (default 1.15).
    pub wet_runway_factor: f64,
    /// Amber advisory below this climb gradient (default 300 ft/nm).
    pub amber_gradient_ft_per_nm: f64,
    /// Red advisory below this climb gradient (default 200 ft/nm).
    pub red_gradient_ft_per_nm: f64,
    /// Width of the trim speed band above V2 (default 15 kt).
    pub trim_band_kcas: f64,
    /// Start, taxi and takeoff fuel allowance (default 800 lb).
    pub allowance_fuel_lb: f64,
    /// Start, taxi and takeoff time allowance (default 10 min).
    pub allowance_minutes: f64,
}

impl Default for TakeoffSettings {
    fn default() -> Self {
        Self {
            runway_factor: 1.10,
            headwind_credit: 0.5,
            tailwind_penalty: 1.5,
            upslope_per_pct: 0.10,
            downslope_per_pct: 0.05,
            wet_runway_factor: 1.15,
            amber_gradient_ft_per_nm: 300.0,
            red_gradient_ft_per_nm: 200.0,
            trim_band_kcas: 15.0,
            allowance_fuel_lb: 800.0,
            allowance_minutes: 10.0,
        }
    }
}

/// Climb band bounds and the speed scan used by the optimising strategies.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClimbSettings {
    /// Default band floor (default 100 ft).
    pub band_floor_ft: f64,
    /// Default band top (default 6,000 ft).
    pub band_ceiling_ft: f64,
    /// Sub-band boundaries fall on multiples of this step (default 500 ft).
    pub step_ft: f64,
    /// Upper speed scanned (default 350 KCAS).
    pub max_kcas: f64,
    /// Upper Mach scanned (default 0.9).
    pub max_mach: f64,
    /// Lowest speed scanned as a multiple of clean stall speed (default 1.2).
    pub min_speed_factor: f64,
    /// Number of candidate speeds per sub-band (default 60).
    pub speed_candidates: usize,
    /// Cap on the number of sub-bands in one call (default 400).
    pub max_sub_bands: usize,
}

impl Default for ClimbSettings {
    fn default() -> Self {
        Self {
            band_floor_ft: 100.0,
            band_ceiling_ft: 6_000.0,
            step_ft: 500.0,
            max_kcas: 350.0,
            max_mach: 0.9,
            min_speed_factor: 1.2,
            speed_candidates: 60,
            max_sub_bands: 400,
        }
    }
}

/// Cruise optimisation grid.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CruiseSettings {
    pub min_altitude_ft: f64,
    pub max_altitude_ft: f64,
    pub altitude_step_ft: f64,
    pub min_mach: f64,
    pub max_mach: f64,
    pub mach_step: f64,
    /// Required ratio between maximum and operating lift coefficient (default 1.3).
    pub buffet_margin: f64,
    /// Fraction of best specific range accepted by the most-efficient objective (default 0.99).
    pub long_range_fraction: f64,
    /// CD0 increment per store drag-index count (default 1e-4).
    pub cd0_per_drag_index: f64,
    /// Cap on evaluated grid points (default 20,000).
    pub max_candidates: usize,
}

impl Default for CruiseSettings {
    fn default() -> Self {
        Self {
            min_altitude_ft: 5_000.0,
            max_altitude_ft: 45_000.0,
            altitude_step_ft: 2_500.0,
            min_mach: 0.40,
            max_mach: 0.95,
            mach_step: 0.01,
            buffet_margin: 1.3,
            long_range_fraction: 0.99,
            cd0_per_drag_index: 1e-4,
            max_candidates: 20_000,
        }
    }
}

/// Landing distance factors and go-around requirement.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LandingSettings {
    /// Flap setting used when the request does not name one (default "FULL").
    pub default_flaps: String,
    /// Dispatch factor on the unfactored ground roll (default 1.67).
    pub distance_factor: f64,
    /// Multiplier for wet runways (default 1.30).
    pub wet_runway_factor: f64,
    /// Minimum go-around gradient used for the thrust-required figure (default 0.025).
    pub go_around_gradient: f64,
    /// Fuel burned between brake release and the planned recovery (default 3,000 lb).
    pub recovery_burn_lb: f64,
}

impl Default for LandingSettings {
    fn default() -> Self {
        Self {
            default_flaps: "FULL".to_string(),
            distance_factor: 1.67,
            wet_runway_factor: 1.30,
            go_around_gradient: 0.025,
            recovery_burn_lb: 3_000.0,
        }
    }
}

/// Bingo/Joker reserve policy.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReserveSettings {
    /// Fuel that must remain on landing (default 2,000 lb).
    pub final_reserve_lb: f64,
    /// Percentage added to the recovery fuel (default 10%).
    pub margin_pct: f64,
    /// Fuel for approach and landing at the recovery field (default 600 lb).
    pub approach_allowance_lb: f64,
    /// Joker sits this far above Bingo (default 1,500 lb).
    pub joker_margin_lb: f64,
}

impl Default for ReserveSettings {
    fn default() -> Self {
        Self {
            final_reserve_lb: 2_000.0,
            margin_pct: 10.0,
            approach_allowance_lb: 600.0,
            joker_margin_lb: 1_500.0,
        }
    }
}

/// Reduced-thrust policy.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DerateSettings {
    pub allow_afterburner: bool,
    /// Absolute minimum takeoff RPM (default 85%).
    pub min_takeoff_rpm_pct: f64,
    /// RPM corresponding to military power (default 99%).
    pub military_rpm_pct: f64,
    /// RPM floor with flaps up (default 85%).
    pub floor_up_pct: f64,
    /// RPM floor with maneuver flaps (default 90%).
    pub floor_maneuver_pct: f64,
    /// RPM floor with full flaps (default 96%).
    pub floor_full_pct: f64,
    /// RPM fraction = thrust fraction ^ exponent (default 0.75).
    pub thrust_exponent: f64,
    /// Lowest total fuel flow at any reduced setting (default 1,200 lb/hr).
    pub min_idle_fuel_flow_pph: f64,
    /// RPM used by the economy propulsion mode (default 92%).
    pub economy_rpm_pct: f64,
}

impl Default for DerateSettings {
    fn default() -> Self {
        Self {
            allow_afterburner: true,
            min_takeoff_rpm_pct: 85.0,
            military_rpm_pct: 99.0,
            floor_up_pct: 85.0,
            floor_maneuver_pct: 90.0,
            floor_full_pct: 96.0,
            thrust_exponent: 0.75,
            min_idle_fuel_flow_pph: 1_200.0,
            economy_rpm_pct: 92.0,
        }
    }
}
