use approx::assert_relative_eq;
use flight_perf::config::load_tables;
use flight_perf::interp::{InterpolationPolicy, Interpolator, LookupError, interpolate, interpolate_all};
use flight_perf::tables::{PerformanceTable, TableStore};

fn store() -> TableStore {
    let records = load_tables("configs/tables").expect("table records");
    TableStore::load(&records).expect("valid tables")
}

/// Values at the 2^d vertices of the cell enclosing `coordinates`.
fn cell_vertices(table: &PerformanceTable, coordinates: &[f64], output: &str) -> Vec<f64> {
    let brackets = table.bracket(coordinates, 64).expect("brackets");
    let sizes: Vec<usize> = table.axes().iter().map(|a| a.points.len()).collect();
    let values = &table.output(output).expect("output").values;
    let d = sizes.len();
    (0..1usize << d)
        .map(|corner| {
            let mut flat = 0;
            for axis in 0..d {
                let i = brackets[axis].lower_index + ((corner >> axis) & 1);
                flat = flat * sizes[axis] + i;
            }
            values[flat]
        })
        .collect()
}

/// Deterministic coordinates spread over the table's interior.
fn sample_points(table: &PerformanceTable, count: usize) -> Vec<Vec<f64>> {
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    (0..count)
        .map(|_| {
            table
                .axes()
                .iter()
                .map(|axis| {
                    seed = seed
                        .wrapping_mul(6_364_136_223_846_793_005)
                        .wrapping_add(1_442_695_040_888_963_407);
                    let u = (seed >> 11) as f64 / (1u64 << 53) as f64;
                    axis.min() + u * (axis.max() - axis.min())
                })
                .collect()
        })
        .collect()
}

#[test]
fn grid_points_return_stored_values() {
    let store = store();
    let table = store.table("engine.thrust", Some("MIL")).expect("MIL table");
    let policy = InterpolationPolicy::default();
    // pressure_altitude_ft = 0 (index 1), mach = 0.2 (index 1), isa = 0 (index 2)
    let flat = (10 + 1) * 5 + 2;
    let expected = table.output("thrust_lbf").expect("thrust").values[flat];
    let value = interpolate(table, &[0.0, 0.2, 0.0], "thrust_lbf", &policy).expect("lookup");
    assert_relative_eq!(value, expected, epsilon = 1e-9);
}

#[test]
fn interior_values_are_bounded_by_the_enclosing_cell() {
    let store = store();
    let policy = InterpolationPolicy::default();
    for (name, configuration) in [
        ("engine.thrust", Some("MIL")),
        ("engine.thrust", Some("AB")),
        ("takeoff.distance", Some("FULL")),
        ("aero.polar", Some("UP")),
    ] {
        let table = store.table(name, configuration).expect("table");
        for coordinates in sample_points(table, 200) {
            for (output, value) in interpolate_all(table, &coordinates, &policy).expect("lookup") {
                let corners = cell_vertices(table, &coordinates, &output);
                let lo = corners.iter().copied().fold(f64::INFINITY, f64::min);
                let hi = corners.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                assert!(
                    value >= lo - 1e-9 && value <= hi + 1e-9,
                    "{name} {output} at {coordinates:?} = {value} outside [{lo}, {hi}]"
                );
            }
        }
    }
}

#[test]
fn one_dimensional_lookup_is_linear_between_points() {
    let store = store();
    let tables = Interpolator::new(&store, InterpolationPolicy::default());
    // 10000 ft -> 290, 20000 ft -> 275
    let kcas = tables
        .lookup("climb.schedule", None, &[15_000.0], "kcas")
        .expect("schedule");
    assert_relative_eq!(kcas, 282.5, epsilon = 1e-9);
}

#[test]
fn small_overshoot_clamps_to_the_edge() {
    let store = store();
    let tables = Interpolator::new(&store, InterpolationPolicy::default());
    // Last cell is 10000 ft wide; 5% tolerance admits 500 ft.
    let kcas = tables
        .lookup("climb.schedule", None, &[50_400.0], "kcas")
        .expect("within tolerance");
    assert_relative_eq!(kcas, 200.0, epsilon = 1e-9);
}

#[test]
fn extrapolation_beyond_tolerance_fails() {
    let store = store();
    let tables = Interpolator::new(&store, InterpolationPolicy::default());
    let err = tables
        .lookup("climb.schedule", None, &[52_000.0], "kcas")
        .unwrap_err();
    match err {
        LookupError::Extrapolation { axis, value, max, .. } => {
            assert_eq!(axis, "pressure_altitude_ft");
            assert_relative_eq!(value, 52_000.0);
            assert_relative_eq!(max, 50_000.0);
        }
        other => panic!("expected extrapolation error, got {other:?}"),
    }
}

#[test]
fn lookup_many_matches_single_lookups() {
    let store = store();
    let tables = Interpolator::new(&store, InterpolationPolicy::default());
    let coordinates = [12_345.0, 0.73, 7.5];
    let [thrust, flow] = tables
        .lookup_many("engine.thrust", Some("MIL"), &coordinates, ["thrust_lbf", "fuel_flow_pph"])
        .expect("lookup");
    let single = tables
        .lookup("engine.thrust", Some("MIL"), &coordinates, "fuel_flow_pph")
        .expect("lookup");
    assert_relative_eq!(flow, single, epsilon = 1e-12);
    assert!(thrust > 0.0);
    assert!(matches!(
        tables.lookup("engine.thrust", Some("MIL"), &coordinates, "torque"),
        Err(LookupError::MissingOutput { .. })
    ));
}
