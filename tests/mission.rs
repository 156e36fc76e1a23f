use std::path::Path;

use approx::assert_relative_eq;
use flight_perf::config::{MissionRequestConfig, load_request};
use flight_perf::mission::{CardError, MissionError, Section, from_config, plan_mission};
use flight_perf::phases::{LandingScenario, PhaseContext};
use flight_perf::{Catalog, RunError, metric_rows, run_request};

fn catalog() -> Catalog {
    Catalog::load(Path::new("configs")).expect("configuration catalog")
}

fn sample() -> MissionRequestConfig {
    load_request("configs/requests/sample.toml").expect("sample request")
}

#[test]
fn sample_request_produces_complete_card() {
    let catalog = catalog();
    let card = run_request(&catalog, &sample()).expect("mission card");

    assert_eq!(card.aircraft, "F-14D");
    assert!(card.generated_at.ends_with('Z'));
    assert!(card.takeoff.required_field_length_ft <= card.takeoff.runway_available_ft);
    assert_relative_eq!(card.climb.from_ft, catalog.settings.climb.band_floor_ft);
    assert_relative_eq!(card.climb.to_ft, catalog.settings.climb.band_ceiling_ft);
    let burn = catalog.settings.landing.recovery_burn_lb;
    let retained = card
        .landing_case(LandingScenario::StoresRetained)
        .expect("stores retained case");
    assert_relative_eq!(retained.weight_lb, 60_000.0 - burn);
    let expended = card
        .landing_case(LandingScenario::StoresExpended)
        .expect("stores expended case");
    assert_relative_eq!(expended.weight_lb, 60_000.0 - burn - 1_400.0);
    let custom = card
        .landing_case(LandingScenario::Custom)
        .expect("custom case");
    assert_relative_eq!(custom.weight_lb, 48_000.0);
    assert_relative_eq!(card.fuel.fuel_on_board_lb, 16_000.0);

    let reserves = &catalog.settings.reserves;
    assert_relative_eq!(
        card.bingo_joker.joker_lb,
        card.bingo_joker.bingo_lb + reserves.joker_margin_lb,
        epsilon = 1e-9
    );
    assert!(card.bingo_joker.bingo_lb > reserves.final_reserve_lb);
    assert_relative_eq!(card.bingo_joker.recovery.distance_nm, 150.0);
}

#[test]
fn fuel_curve_follows_the_legs_in_order() {
    let catalog = catalog();
    let card = run_request(&catalog, &sample()).expect("mission card");
    let curve = &card.fuel.curve;

    let legs: Vec<&str> = curve.iter().map(|p| p.leg.as_str()).collect();
    assert_eq!(legs[0], "departure");
    assert_eq!(legs[legs.len() - 1], "descent");
    assert_eq!(curve.len(), 5);
    for pair in curve.windows(2) {
        assert!(pair[1].cumulative_lb >= pair[0].cumulative_lb);
        assert!(pair[1].remaining_lb <= pair[0].remaining_lb);
        assert!(pair[1].elapsed_min >= pair[0].elapsed_min);
    }
    let last = &curve[curve.len() - 1];
    assert_relative_eq!(last.remaining_lb, card.fuel.end_state.fuel_remaining_lb, epsilon = 1e-9);
    assert_relative_eq!(
        last.cumulative_lb + last.remaining_lb,
        card.fuel.fuel_on_board_lb,
        epsilon = 1e-6
    );
}

#[test]
fn metric_rows_cover_every_section() {
    let catalog = catalog();
    let card = run_request(&catalog, &sample()).expect("mission card");
    let rows = metric_rows(&card);
    for section in Section::ALL {
        let name = section.to_string();
        let nested = format!("{name}.");
        assert!(
            rows.iter()
                .any(|r| r.section == name || r.section.starts_with(&nested)),
            "no metrics for section {name}"
        );
    }
    for scenario in LandingScenario::ALL {
        let label = format!("landing.{scenario}");
        let weight = rows
            .iter()
            .find(|r| r.section == label && r.metric == "landing_weight")
            .expect("landing weight row");
        let record = card.landing_case(scenario).expect("landing case");
        assert_relative_eq!(weight.value, record.weight_lb);
    }
    let bingo = rows
        .iter()
        .find(|r| r.section == "bingo_joker" && r.metric == "bingo")
        .expect("bingo row");
    assert_relative_eq!(bingo.value, card.bingo_joker.bingo_lb);
    assert_eq!(bingo.unit, "lb");
}

#[test]
fn failing_phases_are_all_reported() {
    let catalog = catalog();
    let mut request = sample();
    if let Some(runway) = request.environment.runway.as_mut() {
        runway.length_ft = 3_000.0;
    }
    request.landing.weight_lb = Some(100_000.0);

    let err = run_request(&catalog, &request).unwrap_err();
    let failures = match err {
        RunError::Mission(MissionError::Card(CardError::IncompleteCard { failures })) => failures,
        other => panic!("expected an incomplete card, got {other:?}"),
    };
    let sections: Vec<Section> = failures.iter().map(|f| f.section).collect();
    assert_eq!(
        sections,
        vec![
            Section::Takeoff,
            Section::Landing,
            Section::Fuel,
            Section::BingoJoker
        ]
    );
    assert!(failures[0].reason.contains("runway"));
    assert!(failures[2].reason.contains("not computed"));
}

#[test]
fn request_options_reach_the_card() {
    let catalog = catalog();
    let mut config = sample();
    config.cruise.altitude_ft = Some(27_500.0);
    config.state.stores.weight_lb = 2_000.0;

    let request = from_config(&config, &catalog.settings).expect("request");
    assert_relative_eq!(request.state.configuration.stores.weight_lb, 2_000.0);
    assert_eq!(request.cruise.altitude_ft, Some(27_500.0));

    let card = run_request(&catalog, &config).expect("mission card");
    assert_relative_eq!(card.cruise.altitude_ft, 27_500.0);
    let expended = card
        .landing_case(LandingScenario::StoresExpended)
        .expect("stores expended case");
    assert_relative_eq!(
        expended.weight_lb,
        60_000.0 - catalog.settings.landing.recovery_burn_lb - 2_000.0
    );
}

#[test]
fn request_for_another_aircraft_is_refused() {
    let catalog = catalog();
    let profile = catalog.profile(Some("F-14D")).expect("profile");
    let ctx = PhaseContext::new(&profile, &catalog.tables, &catalog.settings);
    let mut config = sample();
    config.aircraft = "F-18C".to_string();
    let request = from_config(&config, &catalog.settings).expect("request");

    let err = plan_mission(&request, &ctx).unwrap_err();
    assert!(matches!(err, MissionError::AircraftMismatch { .. }));
}

#[test]
fn unknown_aircraft_is_a_run_error() {
    let catalog = catalog();
    let mut config = sample();
    config.aircraft = "Concorde".to_string();
    assert!(matches!(
        run_request(&catalog, &config),
        Err(RunError::Aircraft(_))
    ));
}
