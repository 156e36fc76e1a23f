//! Core units, constants, and shared primitives for the flight performance workspace.

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Standard gravity (m/s²).
    pub const G0: f64 = 9.80665;
    /// Specific gas constant for dry air (J/(kg·K)).
    pub const R_AIR: f64 = 287.052_87;
    /// Ratio of specific heats for air.
    pub const GAMMA_AIR: f64 = 1.4;
    /// ISA sea-level temperature (K).
    pub const ISA_T0_K: f64 = 288.15;
    /// ISA sea-level pressure (Pa).
    pub const ISA_P0_PA: f64 = 101_325.0;
    /// ISA sea-level density (kg/m³).
    pub const ISA_RHO0_KG_M3: f64 = 1.225;
    /// ISA sea-level density (slug/ft³).
    pub const ISA_RHO0_SLUG_FT3: f64 = 0.002_376_9;
    /// Tropospheric temperature lapse rate (K/m).
    pub const ISA_LAPSE_K_M: f64 = -0.0065;
    /// Geopotential altitude of the tropopause (m).
    pub const TROPOPAUSE_M: f64 = 11_000.0;
    /// Zero Celsius in kelvin.
    pub const CELSIUS_OFFSET_K: f64 = 273.15;
    /// Feet per nautical mile.
    pub const FT_PER_NM: f64 = 6_076.115;
    /// Seconds per hour.
    pub const SECONDS_PER_HOUR: f64 = 3_600.0;
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::CELSIUS_OFFSET_K;

    /// Convert feet to metres.
    #[inline]
    pub fn ft_to_m(v: f64) -> f64 {
        v * 0.3048
    }

    /// Convert metres to feet.
    #[inline]
    pub fn m_to_ft(v: f64) -> f64 {
        v / 0.3048
    }

    /// Convert knots to feet per second.
    #[inline]
    pub fn kts_to_fps(v: f64) -> f64 {
        v * 1.687_81
    }

    /// Convert feet per second to knots.
    #[inline]
    pub fn fps_to_kts(v: f64) -> f64 {
        v / 1.687_81
    }

    /// Convert metres per second to knots.
    #[inline]
    pub fn ms_to_kts(v: f64) -> f64 {
        v / 0.514_444
    }

    /// Convert degrees Celsius to kelvin.
    #[inline]
    pub fn c_to_k(v: f64) -> f64 {
        v + CELSIUS_OFFSET_K
    }

    /// Convert kelvin to degrees Celsius.
    #[inline]
    pub fn k_to_c(v: f64) -> f64 {
        v - CELSIUS_OFFSET_K
    }
}

/// Lightweight time utilities shared across crates.
pub mod time {
    use super::constants::SECONDS_PER_HOUR;

    /// Convert minutes to hours.
    #[inline]
    pub fn minutes_to_hours(minutes: f64) -> f64 {
        minutes / 60.0
    }

    /// Convert hours to minutes.
    #[inline]
    pub fn hours_to_minutes(hours: f64) -> f64 {
        hours * 60.0
    }

    /// Convert seconds to hours.
    #[inline]
    pub fn seconds_to_hours(seconds: f64) -> f64 {
        seconds / SECONDS_PER_HOUR
    }
}

/// Angle helpers for wind and runway geometry.
pub mod angles {
    /// Wrap a heading into `[0, 360)` degrees.
    #[inline]
    pub fn normalize_deg(deg: f64) -> f64 {
        deg.rem_euclid(360.0)
    }

    /// Signed difference `a - b` wrapped into `(-180, 180]` degrees.
    #[inline]
    pub fn delta_deg(a: f64, b: f64) -> f64 {
        let d = normalize_deg(a - b);
        if d > 180.0 { d - 360.0 } else { d }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_difference_wraps() {
        assert_eq!(angles::delta_deg(10.0, 350.0), 20.0);
        assert_eq!(angles::delta_deg(350.0, 10.0), -20.0);
        assert_eq!(angles::normalize_deg(-90.0), 270.0);
    }

    #[test]
    fn knots_round_trip_through_fps() {
        let v = units::fps_to_kts(units::kts_to_fps(150.0));
        assert!((v - 150.0).abs() < 1e-9);
    }
}
