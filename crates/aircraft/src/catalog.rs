//! Conversion of catalog records into runtime aircraft profiles.

use perf_config::AircraftConfig;

use crate::{AircraftError, AircraftProfile, FlapSchedule};

/// Convert an `AircraftConfig` into its runtime `AircraftProfile`.
pub fn from_config(config: &AircraftConfig) -> Result<AircraftProfile, AircraftError> {
    let invalid = |reason: &str| AircraftError::InvalidProfile {
        name: config.name.clone(),
        reason: reason.to_string(),
    };
    if !(config.wing_area_ft2 > 0.0) {
        return Err(invalid("wing area must be positive"));
    }
    if config.engine_count == 0 {
        return Err(invalid("at least one engine is required"));
    }
    if !(config.min_gross_weight_lb > 0.0 && config.max_gross_weight_lb > config.min_gross_weight_lb)
    {
        return Err(invalid("weight envelope must be positive and non-empty"));
    }
    if config.flap_schedule.maneuver_below_lb < config.flap_schedule.up_below_lb {
        return Err(invalid("flap schedule thresholds are out of order"));
    }

    Ok(AircraftProfile {
        name: config.name.clone(),
        wing_area_ft2: config.wing_area_ft2,
        engine_count: config.engine_count,
        min_gross_weight_lb: config.min_gross_weight_lb,
        max_gross_weight_lb: config.max_gross_weight_lb,
        gear_cd0: config.gear_cd0,
        flap_schedule: FlapSchedule {
            up_below_lb: config.flap_schedule.up_below_lb,
            maneuver_below_lb: config.flap_schedule.maneuver_below_lb,
        },
    })
}

/// Select an aircraft by name (case-insensitive), defaulting to the first catalog entry.
pub fn select(
    configs: &[AircraftConfig],
    requested: Option<&str>,
) -> Result<AircraftProfile, AircraftError> {
    if configs.is_empty() {
        return Err(AircraftError::EmptyCatalog);
    }

    let chosen = match requested {
        Some(name) => configs
            .iter()
            .find(|cfg| cfg.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| AircraftError::NotFound(name.to_string()))?,
        None => &configs[0],
    };

    from_config(chosen)
}
