//! Reduced-thrust policy: RPM floors per flap setting and the RPM to thrust relation.

use perf_config::DerateSettings;

use crate::FlapSetting;

/// Outcome of clamping a requested RPM to the policy floors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerateClamp {
    pub requested_pct: f64,
    pub applied_pct: f64,
    pub floor_pct: f64,
    pub clamped_to_floor: bool,
}

#[derive(Debug, Clone)]
pub struct DeratePolicy {
    pub allow_afterburner: bool,
    pub min_takeoff_rpm_pct: f64,
    pub military_rpm_pct: f64,
    pub floor_up_pct: f64,
    pub floor_maneuver_pct: f64,
    pub floor_full_pct: f64,
    pub thrust_exponent: f64,
    pub min_idle_fuel_flow_pph: f64,
    pub economy_rpm_pct: f64,
}

impl Default for DeratePolicy {
    fn default() -> Self {
        Self::from(&DerateSettings::default())
    }
}

impl From<&DerateSettings> for DeratePolicy {
    fn from(s: &DerateSettings) -> Self {
        Self {
            allow_afterburner: s.allow_afterburner,
            min_takeoff_rpm_pct: s.min_takeoff_rpm_pct,
            military_rpm_pct: s.military_rpm_pct,
            floor_up_pct: s.floor_up_pct,
            floor_maneuver_pct: s.floor_maneuver_pct,
            floor_full_pct: s.floor_full_pct,
            thrust_exponent: s.thrust_exponent,
            min_idle_fuel_flow_pph: s.min_idle_fuel_flow_pph,
            economy_rpm_pct: s.economy_rpm_pct,
        }
    }
}

impl DeratePolicy {
    /// RPM floor for a flap setting, never below the absolute takeoff minimum.
    pub fn floor_pct(&self, flaps: FlapSetting) -> f64 {
        let floor = match flaps {
            FlapSetting::Up => self.floor_up_pct,
            FlapSetting::Maneuver => self.floor_maneuver_pct,
            FlapSetting::Full => self.floor_full_pct,
        };
        floor.max(self.min_takeoff_rpm_pct)
    }

    /// Raise a requested RPM to the floor; requests above military RPM are capped there.
    pub fn clamp(&self, requested_pct: f64, flaps: FlapSetting) -> DerateClamp {
        let requested = if requested_pct.is_finite() { requested_pct } else { 0.0 };
        let floor_pct = self.floor_pct(flaps);
        let applied_pct = requested.max(floor_pct).min(self.military_rpm_pct);
        DerateClamp {
            requested_pct: requested,
            applied_pct,
            floor_pct,
            clamped_to_floor: applied_pct > requested,
        }
    }

    /// Fraction of military thrust delivered at `rpm_pct`: rpm fraction = thrust fraction ^ exponent.
    pub fn thrust_fraction(&self, rpm_pct: f64) -> f64 {
        let rpm_fraction = (rpm_pct / self.military_rpm_pct).clamp(0.0, 1.0);
        rpm_fraction.powf(1.0 / self.thrust_exponent)
    }
}
