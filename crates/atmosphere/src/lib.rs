//! Standard atmosphere and derived environment state for performance calculations.
//!
//! Pressure altitude fixes pressure through the ISA model; the observed temperature
//! then fixes density and the ISA deviation carried into every table lookup.

use perf_config::AtmosphereSettings;
use perf_core::angles;
use perf_core::constants::{
    G0, GAMMA_AIR, ISA_LAPSE_K_M, ISA_P0_PA, ISA_RHO0_KG_M3, ISA_T0_K, R_AIR, TROPOPAUSE_M,
};
use perf_core::units::{c_to_k, ft_to_m, k_to_c, ms_to_kts};
use thiserror::Error;

/// ISA state at a pressure altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsaPoint {
    pub temperature_k: f64,
    pub pressure_pa: f64,
    pub density_kg_m3: f64,
}

/// ISA 1976 troposphere with an isothermal layer above the tropopause.
pub fn isa(pressure_altitude_ft: f64) -> IsaPoint {
    let h = ft_to_m(pressure_altitude_ft);
    let exponent = -G0 / (ISA_LAPSE_K_M * R_AIR);

    let (temperature_k, pressure_pa) = if h <= TROPOPAUSE_M {
        let t = ISA_T0_K + ISA_LAPSE_K_M * h;
        (t, ISA_P0_PA * (t / ISA_T0_K).powf(exponent))
    } else {
        let t11 = ISA_T0_K + ISA_LAPSE_K_M * TROPOPAUSE_M;
        let p11 = ISA_P0_PA * (t11 / ISA_T0_K).powf(exponent);
        (t11, p11 * (-G0 * (h - TROPOPAUSE_M) / (R_AIR * t11)).exp())
    };

    IsaPoint {
        temperature_k,
        pressure_pa,
        density_kg_m3: pressure_pa / (R_AIR * temperature_k),
    }
}

/// Wind relative to the track it is resolved against. Direction is where the wind blows from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Wind {
    pub from_deg: f64,
    pub speed_kts: f64,
    pub track_deg: f64,
}

impl Wind {
    pub fn calm() -> Self {
        Self::default()
    }

    /// Component along the track, positive on the nose.
    pub fn headwind_kts(&self) -> f64 {
        self.speed_kts * angles::delta_deg(self.from_deg, self.track_deg).to_radians().cos()
    }

    /// Component across the track, positive from the right.
    pub fn crosswind_kts(&self) -> f64 {
        self.speed_kts * angles::delta_deg(self.from_deg, self.track_deg).to_radians().sin()
    }
}

/// Runway surface condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Dry,
    Wet,
}

/// Runway available for takeoff or landing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Runway {
    pub length_ft: f64,
    pub heading_deg: f64,
    /// Positive for upslope in the direction of travel.
    pub slope_pct: f64,
    pub surface: Surface,
}

/// Accepted atmosphere envelope.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentLimits {
    pub min_altitude_ft: f64,
    pub ceiling_ft: f64,
    pub max_isa_deviation_c: f64,
}

impl Default for EnvironmentLimits {
    fn default() -> Self {
        Self::from(&AtmosphereSettings::default())
    }
}

impl From<&AtmosphereSettings> for EnvironmentLimits {
    fn from(settings: &AtmosphereSettings) -> Self {
        Self {
            min_altitude_ft: settings.min_altitude_ft,
            ceiling_ft: settings.ceiling_ft,
            max_isa_deviation_c: settings.max_isa_deviation_c,
        }
    }
}

/// Environment derived once per request and shared read-only by the phase calculators.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentState {
    pub pressure_altitude_ft: f64,
    pub oat_c: f64,
    pub isa_temperature_c: f64,
    pub isa_deviation_c: f64,
    pub pressure_pa: f64,
    pub density_kg_m3: f64,
    /// σ = ρ / ρ₀
    pub density_ratio: f64,
    /// δ = p / p₀
    pub pressure_ratio: f64,
    /// θ = T / T₀
    pub temperature_ratio: f64,
    pub speed_of_sound_kts: f64,
    pub wind: Wind,
    pub headwind_kts: f64,
    pub crosswind_kts: f64,
    pub runway: Option<Runway>,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AtmosphereError {
    #[error("{quantity} {value:.1} outside modelled envelope [{min:.1}, {max:.1}]")]
    OutOfEnvelope {
        quantity: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{0} must be finite")]
    NonFinite(&'static str),
}

/// Derive the environment at a pressure altitude from the observed temperature and wind.
pub fn derive_environment(
    pressure_altitude_ft: f64,
    oat_c: f64,
    wind: Wind,
    limits: &EnvironmentLimits,
) -> Result<EnvironmentState, AtmosphereError> {
    if !pressure_altitude_ft.is_finite() {
        return Err(AtmosphereError::NonFinite("pressure altitude"));
    }
    if !oat_c.is_finite() {
        return Err(AtmosphereError::NonFinite("outside air temperature"));
    }
    if !(wind.from_deg.is_finite() && wind.speed_kts.is_finite() && wind.track_deg.is_finite()) {
        return Err(AtmosphereError::NonFinite("wind"));
    }
    if pressure_altitude_ft < limits.min_altitude_ft || pressure_altitude_ft > limits.ceiling_ft {
        return Err(AtmosphereError::OutOfEnvelope {
            quantity: "pressure altitude (ft)",
            value: pressure_altitude_ft,
            min: limits.min_altitude_ft,
            max: limits.ceiling_ft,
        });
    }

    let standard = isa(pressure_altitude_ft);
    let isa_temperature_c = k_to_c(standard.temperature_k);
    let temperature_k = c_to_k(oat_c);
    if temperature_k <= 0.0 {
        return Err(AtmosphereError::OutOfEnvelope {
            quantity: "outside air temperature (C)",
            value: oat_c,
            min: isa_temperature_c - limits.max_isa_deviation_c,
            max: isa_temperature_c + limits.max_isa_deviation_c,
        });
    }
    let isa_deviation_c = oat_c - isa_temperature_c;
    if isa_deviation_c.abs() > limits.max_isa_deviation_c {
        return Err(AtmosphereError::OutOfEnvelope {
            quantity: "ISA deviation (C)",
            value: isa_deviation_c,
            min: -limits.max_isa_deviation_c,
            max: limits.max_isa_deviation_c,
        });
    }

    let density_kg_m3 = standard.pressure_pa / (R_AIR * temperature_k);
    let speed_of_sound_kts = ms_to_kts((GAMMA_AIR * R_AIR * temperature_k).sqrt());

    Ok(EnvironmentState {
        pressure_altitude_ft,
        oat_c,
        isa_temperature_c,
        isa_deviation_c,
        pressure_pa: standard.pressure_pa,
        density_kg_m3,
        density_ratio: density_kg_m3 / ISA_RHO0_KG_M3,
        pressure_ratio: standard.pressure_pa / ISA_P0_PA,
        temperature_ratio: temperature_k / ISA_T0_K,
        speed_of_sound_kts,
        wind,
        headwind_kts: wind.headwind_kts(),
        crosswind_kts: wind.crosswind_kts(),
        runway: None,
    })
}

impl EnvironmentState {
    /// Attach a runway and resolve the wind against its heading.
    pub fn with_runway(mut self, runway: Runway) -> Self {
        self.wind.track_deg = runway.heading_deg;
        self.headwind_kts = self.wind.headwind_kts();
        self.crosswind_kts = self.wind.crosswind_kts();
        self.runway = Some(runway);
        self
    }

    /// The same air mass at another pressure altitude: ISA deviation and wind are kept.
    pub fn at_altitude(
        &self,
        pressure_altitude_ft: f64,
        limits: &EnvironmentLimits,
    ) -> Result<EnvironmentState, AtmosphereError> {
        let isa_temperature_c = k_to_c(isa(pressure_altitude_ft).temperature_k);
        derive_environment(
            pressure_altitude_ft,
            isa_temperature_c + self.isa_deviation_c,
            self.wind,
            limits,
        )
    }

    /// Convert calibrated to true airspeed (incompressible, CAS taken as EAS).
    pub fn tas_from_cas(&self, kcas: f64) -> f64 {
        kcas / self.density_ratio.sqrt()
    }

    /// Convert true to calibrated airspeed.
    pub fn cas_from_tas(&self, ktas: f64) -> f64 {
        ktas * self.density_ratio.sqrt()
    }

    pub fn mach_from_tas(&self, ktas: f64) -> f64 {
        ktas / self.speed_of_sound_kts
    }
}
