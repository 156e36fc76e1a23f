//! Export helpers for mission card JSON and flat CSV artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod card {
    use serde::Serialize;
    use serde_json::to_writer_pretty;
    use std::io::Write;

    use crate::ExportError;

    /// Pretty-printed JSON followed by a newline.
    pub fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), ExportError> {
        to_writer_pretty(&mut *writer, value)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

pub mod metrics {
    use serde::Serialize;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use crate::ExportError;

    /// One row of the flat metrics table.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct MetricRow {
        pub section: String,
        pub metric: String,
        pub value: f64,
        pub unit: String,
    }

    /// Write serializable records as CSV with a header row taken from the field names.
    pub fn write_records<T: Serialize>(
        writer: &mut dyn Write,
        records: &[T],
    ) -> Result<(), ExportError> {
        let mut csv = csv::Writer::from_writer(writer);
        for record in records {
            csv.serialize(record)?;
        }
        csv.flush()?;
        Ok(())
    }

    /// `section,metric,value,unit`.
    pub fn write_metrics(writer: &mut dyn Write, rows: &[MetricRow]) -> Result<(), ExportError> {
        write_records(writer, rows)
    }

    /// Paths of the JSON card and its CSV sidecars.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct BundlePaths {
        pub card: PathBuf,
        pub metrics: PathBuf,
        pub fuel_curve: PathBuf,
    }

    /// Sidecar paths next to `output`: `<stem>.json`, `<stem>_metrics.csv`, `<stem>_fuel.csv`.
    pub fn bundle_paths(output: &Path) -> BundlePaths {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("mission_card");
        BundlePaths {
            card: parent.join(format!("{stem}.json")),
            metrics: parent.join(format!("{stem}_metrics.csv")),
            fuel_curve: parent.join(format!("{stem}_fuel.csv")),
        }
    }

    /// Write the card JSON, its metrics table and the fuel-burn curve side by side.
    pub fn write_bundle<C: Serialize, F: Serialize>(
        output: &Path,
        card: &C,
        rows: &[MetricRow],
        fuel_curve: &[F],
    ) -> Result<BundlePaths, ExportError> {
        let paths = bundle_paths(output);
        let mut writer = crate::writer_for_path(&paths.card)?;
        crate::card::write_json(&mut *writer, card)?;
        let mut writer = crate::writer_for_path(&paths.metrics)?;
        write_metrics(&mut *writer, rows)?;
        let mut writer = crate::writer_for_path(&paths.fuel_curve)?;
        write_records(&mut *writer, fuel_curve)?;
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::metrics::{MetricRow, bundle_paths, write_bundle, write_metrics};
    use serde::Serialize;
    use std::path::Path;

    #[derive(Serialize)]
    struct Point {
        leg: &'static str,
        cumulative_lb: f64,
    }

    fn rows() -> Vec<MetricRow> {
        vec![
            MetricRow {
                section: "takeoff".to_string(),
                metric: "v1".to_string(),
                value: 145.5,
                unit: "KCAS".to_string(),
            },
            MetricRow {
                section: "bingo_joker".to_string(),
                metric: "bingo".to_string(),
                value: 4310.0,
                unit: "lb".to_string(),
            },
        ]
    }

    #[test]
    fn metrics_csv_has_header_and_rows() {
        let mut buffer = Vec::new();
        write_metrics(&mut buffer, &rows()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "section,metric,value,unit");
        assert_eq!(lines[1], "takeoff,v1,145.5,KCAS");
        assert_eq!(lines[2], "bingo_joker,bingo,4310.0,lb");
    }

    #[test]
    fn bundle_paths_share_the_stem() {
        let paths = bundle_paths(Path::new("out/cards/alpha.json"));
        assert_eq!(paths.card, Path::new("out/cards/alpha.json"));
        assert_eq!(paths.metrics, Path::new("out/cards/alpha_metrics.csv"));
        assert_eq!(paths.fuel_curve, Path::new("out/cards/alpha_fuel.csv"));
    }

    #[test]
    fn bundle_writes_all_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("card.json");
        let curve = [Point {
            leg: "departure",
            cumulative_lb: 1_200.0,
        }];
        let card = serde_json::json!({ "aircraft": "F-14D" });
        let paths = write_bundle(&output, &card, &rows(), &curve).unwrap();
        let json = std::fs::read_to_string(&paths.card).unwrap();
        assert!(json.contains("\"aircraft\": \"F-14D\""));
        let fuel = std::fs::read_to_string(&paths.fuel_curve).unwrap();
        assert!(fuel.starts_with("leg,cumulative_lb\ndeparture,1200.0"));
    }
}
