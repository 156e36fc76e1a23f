use std::path::Path;

use approx::assert_relative_eq;
use flight_perf::Catalog;
use flight_perf::aircraft::{
    AircraftProfile, AircraftState, Configuration, FlapSelection, FlapSetting, PropulsionMode,
    StoreLoadout,
};
use flight_perf::atmosphere::{EnvironmentState, Runway, Surface, Wind, derive_environment};
use flight_perf::config::load_tables;
use flight_perf::phases::{
    AdvisoryLevel, ClimbError, ClimbRequest, ClimbStrategy, CruiseError, CruiseObjective,
    CruiseRequest, LandingError, LandingRequest, LandingScenario, Obstacle, PhaseContext,
    TakeoffError, TakeoffRequest, compute_climb, compute_cruise, compute_landing,
    compute_landing_scenarios, compute_takeoff,
};
use flight_perf::tables::TableStore;

fn catalog() -> Catalog {
    Catalog::load(Path::new("configs")).expect("configuration catalog")
}

fn profile(catalog: &Catalog) -> AircraftProfile {
    catalog.profile(Some("F-14D")).expect("F-14D profile")
}

fn state(weight_lb: f64) -> AircraftState {
    AircraftState {
        gross_weight_lb: weight_lb,
        cg_pct_mac: 18.0,
        configuration: Configuration {
            flaps: FlapSelection::Auto,
            stores: StoreLoadout {
                name: None,
                drag_index: 0.0,
                weight_lb: 0.0,
            },
        },
        propulsion: PropulsionMode::Military,
    }
}

fn sea_level(ctx: &PhaseContext<'_>, runway_ft: f64) -> EnvironmentState {
    derive_environment(0.0, 15.0, Wind::calm(), &ctx.limits)
        .expect("sea level ISA")
        .with_runway(Runway {
            length_ft: runway_ft,
            heading_deg: 360.0,
            slope_pct: 0.0,
            surface: Surface::Dry,
        })
}

#[test]
fn takeoff_fits_long_runway_and_climbs() {
    let catalog = catalog();
    let profile = profile(&catalog);
    let ctx = PhaseContext::new(&profile, &catalog.tables, &catalog.settings);
    let env = sea_level(&ctx, 8_000.0);

    let record = compute_takeoff(&state(45_000.0), &env, &ctx, &TakeoffRequest::default())
        .expect("takeoff at 45000 lb");
    assert_eq!(record.flaps, "UP");
    assert_eq!(record.thrust, "MIL");
    assert!(record.v1_kcas <= record.vr_kcas && record.vr_kcas <= record.v2_kcas);
    assert!(record.required_field_length_ft <= 8_000.0);
    assert!(record.climb_gradient > 0.0);
    assert!(record.runway_margin_ft() >= 0.0);
}

#[test]
fn short_runway_is_runway_limited() {
    let catalog = catalog();
    let profile = profile(&catalog);
    let ctx = PhaseContext::new(&profile, &catalog.tables, &catalog.settings);
    let env = sea_level(&ctx, 3_000.0);

    let err = compute_takeoff(&state(45_000.0), &env, &ctx, &TakeoffRequest::default())
        .unwrap_err();
    match err {
        TakeoffError::RunwayLimited {
            required_ft,
            available_ft,
        } => {
            assert!(required_ft > available_ft);
            assert_relative_eq!(available_ft, 3_000.0);
        }
        other => panic!("expected runway limit, got {other:?}"),
    }
}

#[test]
fn weak_gradient_is_flagged_red_without_changing_thrust() {
    let catalog = catalog();
    let profile = profile(&catalog);
    let mut settings = catalog.settings.clone();
    settings.takeoff.red_gradient_ft_per_nm = 50_000.0;
    settings.takeoff.amber_gradient_ft_per_nm = 60_000.0;
    let ctx = PhaseContext::new(&profile, &catalog.tables, &settings);
    let env = sea_level(&ctx, 8_000.0);

    let record = compute_takeoff(&state(45_000.0), &env, &ctx, &TakeoffRequest::default())
        .expect("takeoff is still computed");
    assert_eq!(record.thrust, "MIL");
    let red: Vec<_> = record
        .advisories
        .iter()
        .filter(|a| a.level == AdvisoryLevel::Red)
        .collect();
    assert_eq!(red.len(), 1);
    assert!(red[0].message.contains("afterburner"));
}

#[test]
fn unreachable_obstacle_is_reported() {
    let catalog = catalog();
    let profile = profile(&catalog);
    let ctx = PhaseContext::new(&profile, &catalog.tables, &catalog.settings);
    let env = sea_level(&ctx, 8_000.0);
    let request = TakeoffRequest {
        obstacle: Some(Obstacle {
            height_ft: 50_000.0,
            distance_nm: 0.5,
        }),
    };

    let err = compute_takeoff(&state(45_000.0), &env, &ctx, &request).unwrap_err();
    assert!(matches!(err, TakeoffError::ObstacleNotCleared { .. }));
}

#[test]
fn takeoff_without_runway_fails() {
    let catalog = catalog();
    let profile = profile(&catalog);
    let ctx = PhaseContext::new(&profile, &catalog.tables, &catalog.settings);
    let env = derive_environment(0.0, 15.0, Wind::calm(), &ctx.limits).expect("env");

    let err =
        compute_takeoff(&state(45_000.0), &env, &ctx, &TakeoffRequest::default()).unwrap_err();
    assert!(matches!(err, TakeoffError::MissingRunway));
}

#[test]
fn split_climb_matches_single_band() {
    let catalog = catalog();
    let profile = profile(&catalog);
    let ctx = PhaseContext::new(&profile, &catalog.tables, &catalog.settings);
    let env = sea_level(&ctx, 8_000.0);
    let start = state(45_000.0);
    let band = |from_ft, to_ft| ClimbRequest {
        strategy: ClimbStrategy::MaxRate,
        from_ft,
        to_ft,
    };

    let whole = compute_climb(&start, &env, &ctx, &band(100.0, 6_000.0)).expect("whole band");
    let lower = compute_climb(&start, &env, &ctx, &band(100.0, 3_000.0)).expect("lower band");
    let upper = compute_climb(
        &start.with_weight(lower.end_weight_lb),
        &env,
        &ctx,
        &band(3_000.0, 6_000.0),
    )
    .expect("upper band");

    assert_relative_eq!(whole.time_min, lower.time_min + upper.time_min, epsilon = 1e-6);
    assert_relative_eq!(whole.fuel_lb, lower.fuel_lb + upper.fuel_lb, epsilon = 1e-6);
    assert_relative_eq!(
        whole.distance_nm,
        lower.distance_nm + upper.distance_nm,
        epsilon = 1e-6
    );
    assert_relative_eq!(whole.end_weight_lb, upper.end_weight_lb, epsilon = 1e-6);
}

#[test]
fn every_climb_strategy_reaches_the_band_top() {
    let catalog = catalog();
    let profile = profile(&catalog);
    let ctx = PhaseContext::new(&profile, &catalog.tables, &catalog.settings);
    let env = sea_level(&ctx, 8_000.0);
    let start = state(45_000.0);

    for strategy in [
        ClimbStrategy::MaxRate,
        ClimbStrategy::MaxAngle,
        ClimbStrategy::Schedule,
    ] {
        let record = compute_climb(
            &start,
            &env,
            &ctx,
            &ClimbRequest {
                strategy,
                from_ft: 100.0,
                to_ft: 6_000.0,
            },
        )
        .expect("climb");
        assert!(record.time_min > 0.0 && record.fuel_lb > 0.0);
        assert!(record.segments.iter().all(|s| s.rate_fpm > 0.0));
        assert_relative_eq!(record.segments[0].from_ft, 100.0);
        assert_relative_eq!(record.segments[record.segments.len() - 1].to_ft, 6_000.0);
        assert!(record.end_weight_lb < start.gross_weight_lb);
    }
}

#[test]
fn climb_band_above_the_tables_is_refused_up_front() {
    let catalog = catalog();
    let profile = profile(&catalog);
    let ctx = PhaseContext::new(&profile, &catalog.tables, &catalog.settings);
    let env = sea_level(&ctx, 8_000.0);
    let request = ClimbRequest {
        strategy: ClimbStrategy::MaxRate,
        from_ft: 100.0,
        to_ft: 60_000.0,
    };

    match compute_climb(&state(45_000.0), &env, &ctx, &request).unwrap_err() {
        ClimbError::BandOutsideTables {
            to_ft,
            min_ft,
            max_ft,
            ..
        } => {
            assert_relative_eq!(to_ft, 60_000.0);
            assert!(min_ft <= 100.0);
            assert_relative_eq!(max_ft, 50_000.0);
        }
        other => panic!("expected a band outside the tables, got {other:?}"),
    }
}

#[test]
fn cruise_objectives_order_as_expected() {
    let catalog = catalog();
    let profile = profile(&catalog);
    let ctx = PhaseContext::new(&profile, &catalog.tables, &catalog.settings);
    let env = sea_level(&ctx, 8_000.0);
    let airborne = state(45_000.0);
    let cruise = |objective| {
        let request = CruiseRequest {
            objective,
            altitude_ft: None,
        };
        compute_cruise(&airborne, &env, &ctx, &request).expect("cruise")
    };

    let endurance = cruise(CruiseObjective::BestEndurance);
    let range = cruise(CruiseObjective::BestRange);
    let efficient = cruise(CruiseObjective::MostEfficient);

    assert!(endurance.fuel_flow_pph <= range.fuel_flow_pph);
    assert!(range.specific_range_nm_per_lb >= endurance.specific_range_nm_per_lb);
    assert!(range.specific_range_nm_per_lb >= efficient.specific_range_nm_per_lb);
    assert!(efficient.ktas >= range.ktas);
    assert!(
        efficient.specific_range_nm_per_lb
            >= catalog.settings.cruise.long_range_fraction * range.specific_range_nm_per_lb
                - 1e-12
    );
    assert!(range.thrust_required_lbf <= range.thrust_available_lbf);
}

#[test]
fn cruise_holds_a_requested_altitude() {
    let catalog = catalog();
    let profile = profile(&catalog);
    let ctx = PhaseContext::new(&profile, &catalog.tables, &catalog.settings);
    let env = sea_level(&ctx, 8_000.0);
    let airborne = state(45_000.0);
    let cruise = &catalog.settings.cruise;
    let request = CruiseRequest {
        objective: CruiseObjective::BestRange,
        altitude_ft: Some(22_000.0),
    };

    let record = compute_cruise(&airborne, &env, &ctx, &request).expect("cruise at FL220");
    assert_relative_eq!(record.altitude_ft, 22_000.0);
    assert!(record.mach >= cruise.min_mach && record.mach <= cruise.max_mach);
    let mach_points = ((cruise.max_mach - cruise.min_mach) / cruise.mach_step).round() as usize + 1;
    assert!(record.candidates_evaluated <= mach_points);

    let too_high = CruiseRequest {
        altitude_ft: Some(80_000.0),
        ..request
    };
    assert!(matches!(
        compute_cruise(&airborne, &env, &ctx, &too_high),
        Err(CruiseError::AltitudeOutOfRange { .. })
    ));
}

#[test]
fn landing_cases_follow_the_recovery_weights() {
    let catalog = catalog();
    let profile = profile(&catalog);
    let ctx = PhaseContext::new(&profile, &catalog.tables, &catalog.settings);
    let env = sea_level(&ctx, 10_000.0);
    let mut loaded = state(60_000.0);
    loaded.configuration.stores.drag_index = 25.0;
    loaded.configuration.stores.weight_lb = 1_400.0;
    let burn = catalog.settings.landing.recovery_burn_lb;

    let cases = compute_landing_scenarios(&loaded, &env, &ctx, &LandingRequest::default())
        .expect("landing cases");
    let scenarios: Vec<LandingScenario> = cases.iter().map(|c| c.scenario).collect();
    assert_eq!(scenarios, LandingScenario::ALL.to_vec());

    let retained = &cases[0].record;
    assert_relative_eq!(retained.weight_lb, 60_000.0 - burn);
    assert_eq!(retained.flaps, "FULL");
    let expended = &cases[1].record;
    assert_relative_eq!(expended.weight_lb, 60_000.0 - burn - 1_400.0);
    assert!(expended.landing_distance_ft < retained.landing_distance_ft);
    assert_eq!(cases[2].record, *retained);

    let custom = LandingRequest {
        weight_lb: Some(48_000.0),
        flaps: Some(FlapSetting::Maneuver),
    };
    let cases = compute_landing_scenarios(&loaded, &env, &ctx, &custom).expect("landing cases");
    assert_relative_eq!(cases[2].record.weight_lb, 48_000.0);
    assert_eq!(cases[2].record.flaps, "MANEUVER");
}

#[test]
fn light_aircraft_lands_at_the_minimum_weight() {
    let catalog = catalog();
    let profile = profile(&catalog);
    let ctx = PhaseContext::new(&profile, &catalog.tables, &catalog.settings);
    let env = sea_level(&ctx, 10_000.0);

    let cases = compute_landing_scenarios(&state(41_000.0), &env, &ctx, &LandingRequest::default())
        .expect("landing cases");
    assert!(cases
        .iter()
        .all(|c| c.record.weight_lb == profile.min_gross_weight_lb));
}

#[test]
fn failing_landing_case_is_named() {
    let catalog = catalog();
    let profile = profile(&catalog);
    let ctx = PhaseContext::new(&profile, &catalog.tables, &catalog.settings);
    let env = sea_level(&ctx, 10_000.0);
    let custom = LandingRequest {
        weight_lb: Some(100_000.0),
        flaps: None,
    };

    match compute_landing_scenarios(&state(60_000.0), &env, &ctx, &custom).unwrap_err() {
        LandingError::Scenario { scenario, source } => {
            assert_eq!(scenario, LandingScenario::Custom);
            assert!(matches!(*source, LandingError::Aircraft(_)));
        }
        other => panic!("expected a named landing case, got {other:?}"),
    }
}

#[test]
fn landing_applies_distance_factor_and_finds_go_around() {
    let catalog = catalog();
    let profile = profile(&catalog);
    let ctx = PhaseContext::new(&profile, &catalog.tables, &catalog.settings);
    let env = sea_level(&ctx, 8_000.0);

    let record = compute_landing(
        &state(45_000.0),
        &env,
        &ctx,
        &LandingRequest {
            weight_lb: Some(42_000.0),
            flaps: Some(FlapSetting::Full),
        },
    )
    .expect("landing");
    assert_eq!(record.flaps, "FULL");
    assert_relative_eq!(record.weight_lb, 42_000.0);
    assert_relative_eq!(
        record.landing_distance_ft,
        record.ground_roll_ft * catalog.settings.landing.distance_factor,
        epsilon = 1e-9
    );
    assert_eq!(record.runway_available_ft, Some(8_000.0));
    assert_eq!(record.go_around.thrust, "MIL");
    assert!(record.go_around.gradient > 0.0);
}

#[test]
fn weak_engines_make_go_around_infeasible() {
    let catalog = catalog();
    let profile = profile(&catalog);
    let mut records = load_tables("configs/tables").expect("table records");
    for record in records.iter_mut().filter(|r| r.name == "engine.thrust") {
        for output in record.outputs.iter_mut().filter(|o| o.name == "thrust_lbf") {
            output.values.iter_mut().for_each(|v| *v *= 0.01);
        }
    }
    let weak = TableStore::load(&records).expect("scaled tables");
    let ctx = PhaseContext::new(&profile, &weak, &catalog.settings);
    let env = sea_level(&ctx, 8_000.0);

    let err = compute_landing(&state(45_000.0), &env, &ctx, &LandingRequest::default())
        .unwrap_err();
    match err {
        LandingError::GoAroundInfeasible { best_gradient } => assert!(best_gradient <= 0.0),
        other => panic!("expected go-around failure, got {other:?}"),
    }
}
