use flight_perf::config::{AxisConfig, OutputConfig, TableConfig, load_tables};
use flight_perf::tables::{TableError, TableRegistry, TableStore};

fn axis(name: &str, points: &[f64]) -> AxisConfig {
    AxisConfig {
        name: name.to_string(),
        unit: String::new(),
        points: points.to_vec(),
    }
}

fn output(name: &str, values: &[f64]) -> OutputConfig {
    OutputConfig {
        name: name.to_string(),
        unit: String::new(),
        values: values.to_vec(),
    }
}

fn table(name: &str, axes: Vec<AxisConfig>, outputs: Vec<OutputConfig>) -> TableConfig {
    TableConfig {
        name: name.to_string(),
        configuration: None,
        description: None,
        axes,
        outputs,
    }
}

fn reason(err: TableError) -> String {
    match err {
        TableError::Malformed { reason, .. } => reason,
        other => panic!("expected malformed table, got {other:?}"),
    }
}

#[test]
fn shipped_tables_load() {
    let records = load_tables("configs/tables").expect("table records");
    let store = TableStore::load(&records).expect("valid tables");
    assert_eq!(store.len(), records.len());
    for (name, configuration) in [
        ("engine.thrust", Some("MIL")),
        ("engine.thrust", Some("AB")),
        ("aero.polar", Some("UP")),
        ("takeoff.speeds", Some("FULL")),
        ("landing.distance", Some("FULL")),
        ("climb.schedule", None),
    ] {
        assert!(
            store.table(name, configuration).is_ok(),
            "missing {name} {configuration:?}"
        );
    }
}

#[test]
fn ragged_table_is_rejected() {
    let ragged = table(
        "ragged",
        vec![axis("x", &[0.0, 1.0, 2.0]), axis("y", &[0.0, 1.0])],
        vec![output("z", &[1.0, 2.0, 3.0, 4.0, 5.0])],
    );
    let err = TableStore::load(&[ragged]).unwrap_err();
    assert!(reason(err).contains("grid requires 6"));
}

#[test]
fn non_monotonic_axis_is_rejected() {
    let unsorted = table(
        "unsorted",
        vec![axis("x", &[0.0, 2.0, 1.0])],
        vec![output("z", &[1.0, 2.0, 3.0])],
    );
    let err = TableStore::load(&[unsorted]).unwrap_err();
    assert!(reason(err).contains("not strictly increasing"));

    let repeated = table(
        "repeated",
        vec![axis("x", &[0.0, 1.0, 1.0])],
        vec![output("z", &[1.0, 2.0, 3.0])],
    );
    assert!(TableStore::load(&[repeated]).is_err());
}

#[test]
fn duplicate_table_definition_is_rejected() {
    let record = table(
        "dup",
        vec![axis("x", &[0.0, 1.0])],
        vec![output("z", &[1.0, 2.0])],
    );
    let err = TableStore::load(&[record.clone(), record]).unwrap_err();
    assert!(reason(err).contains("duplicate table"));
}

#[test]
fn configuration_specific_table_wins_over_default() {
    let mut specific = table(
        "speeds",
        vec![axis("w", &[0.0, 1.0])],
        vec![output("v", &[10.0, 20.0])],
    );
    specific.configuration = Some("FULL".to_string());
    let default = table(
        "speeds",
        vec![axis("w", &[0.0, 1.0])],
        vec![output("v", &[1.0, 2.0])],
    );
    let store = TableStore::load(&[specific, default]).expect("store");

    let full = store.table("speeds", Some("FULL")).expect("FULL table");
    assert_eq!(full.id().configuration.as_deref(), Some("FULL"));
    let up = store.table("speeds", Some("UP")).expect("falls back to default");
    assert_eq!(up.id().configuration, None);
    assert!(matches!(
        store.table("missing", None),
        Err(TableError::NotFound(_))
    ));
}

#[test]
fn failed_reload_keeps_previous_store() {
    let good = table(
        "good",
        vec![axis("x", &[0.0, 1.0])],
        vec![output("z", &[1.0, 2.0])],
    );
    let registry = TableRegistry::new(TableStore::load(&[good.clone()]).expect("store"));
    let before = registry.snapshot();

    let broken = table(
        "broken",
        vec![axis("x", &[0.0, 1.0])],
        vec![output("z", &[1.0])],
    );
    assert!(registry.reload(&[good.clone(), broken]).is_err());
    let after = registry.snapshot();
    assert_eq!(after.len(), 1);
    assert!(after.table("good", None).is_ok());

    let replacement = table(
        "replacement",
        vec![axis("x", &[0.0, 1.0])],
        vec![output("z", &[3.0, 4.0])],
    );
    assert_eq!(registry.reload(&[good, replacement]).expect("reload"), 2);
    // Snapshots taken earlier are unaffected by the swap.
    assert_eq!(before.len(), 1);
    assert_eq!(registry.snapshot().len(), 2);
}
