//! Guarded N-dimensional multilinear interpolation over performance tables.
//!
//! Coordinates inside the grid interpolate across the enclosing cell (2^d reads).
//! Coordinates past an axis bound by no more than the policy tolerance are clamped
//! to the bound; anything further fails with [`LookupError::Extrapolation`].

use perf_config::InterpolationSettings;
use perf_tables::{BracketPosition, PerformanceTable, TableError, TableStore};
use thiserror::Error;

mod lattice;

use lattice::Lattice;

/// Tolerance and search bounds applied to every lookup.
#[derive(Debug, Clone, Copy)]
pub struct InterpolationPolicy {
    pub edge_tolerance_fraction: f64,
    pub absolute_epsilon: f64,
    pub max_search_iterations: usize,
}

impl Default for InterpolationPolicy {
    fn default() -> Self {
        Self::from(&InterpolationSettings::default())
    }
}

impl From<&InterpolationSettings> for InterpolationPolicy {
    fn from(settings: &InterpolationSettings) -> Self {
        Self {
            edge_tolerance_fraction: settings.edge_tolerance_fraction,
            absolute_epsilon: settings.absolute_epsilon,
            max_search_iterations: settings.max_search_iterations,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LookupError {
    #[error("{table}: {axis} = {value:.3} outside [{min}, {max}] beyond tolerance")]
    Extrapolation {
        table: String,
        axis: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("table '{table}' has no output '{output}'")]
    MissingOutput { table: String, output: String },
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Interpolation cell resolved for one coordinate set, reusable across outputs.
struct Cell {
    first_vertex: usize,
    offsets: Vec<usize>,
    weights: Vec<f64>,
}

impl Cell {
    fn resolve(
        table: &PerformanceTable,
        coordinates: &[f64],
        policy: &InterpolationPolicy,
    ) -> Result<Self, LookupError> {
        let brackets = table.bracket(coordinates, policy.max_search_iterations)?;

        let mut index = Vec::with_capacity(brackets.len());
        let mut x = Vec::with_capacity(brackets.len());
        for (axis, bracket) in table.axes().iter().zip(&brackets) {
            let fraction = match bracket.position {
                BracketPosition::Inside => bracket.fraction,
                BracketPosition::Below(by) | BracketPosition::Above(by) => {
                    let upper = matches!(bracket.position, BracketPosition::Above(_));
                    let tolerance = policy.edge_tolerance_fraction * axis.edge_width(upper)
                        + policy.absolute_epsilon;
                    if by > tolerance {
                        return Err(LookupError::Extrapolation {
                            table: table.id().to_string(),
                            axis: axis.name.clone(),
                            value: bracket.value,
                            min: axis.min(),
                            max: axis.max(),
                        });
                    }
                    if upper { 1.0 } else { 0.0 }
                }
            };
            index.push(bracket.lower_index);
            x.push(fraction.clamp(0.0, 1.0));
        }

        let sizes: Vec<usize> = table.axes().iter().map(|a| a.points.len()).collect();
        let lattice = Lattice::new(&sizes);
        let mut weights = vec![0.0; lattice.hypercube_offsets().len()];
        interpn_weights(&x, &mut weights);

        Ok(Self {
            first_vertex: lattice.flat_index(&index),
            offsets: lattice.hypercube_offsets().to_vec(),
            weights,
        })
    }

    fn apply(&self, data: &[f64]) -> f64 {
        self.offsets
            .iter()
            .zip(&self.weights)
            .filter(|(_, w)| **w != 0.0)
            .map(|(o, w)| data[self.first_vertex + o] * w)
            .sum()
    }
}

/// Vertex weights for normalized cell coordinates `x ∈ [0, 1]^d`.
///
/// Built incrementally one dimension at a time (Gupta et al., JMLR 17). Weight `i`
/// belongs to the vertex whose bit `d` selects the upper point along axis `d`.
fn interpn_weights(x: &[f64], weights_out: &mut [f64]) {
    weights_out[0] = 1.0;

    let mut wi = 1usize;
    for (d, xd) in x.iter().enumerate() {
        let sd = 1 << d;
        for k in 0..sd {
            weights_out[wi] = xd * weights_out[k];
            weights_out[k] *= 1.0 - xd;
            wi += 1;
        }
    }
}

/// Interpolate one named output of `table` at `coordinates` (one per axis, in axis order).
pub fn interpolate(
    table: &PerformanceTable,
    coordinates: &[f64],
    output: &str,
    policy: &InterpolationPolicy,
) -> Result<f64, LookupError> {
    let data = table
        .output(output)
        .ok_or_else(|| LookupError::MissingOutput {
            table: table.id().to_string(),
            output: output.to_string(),
        })?;
    let cell = Cell::resolve(table, coordinates, policy)?;
    Ok(cell.apply(&data.values))
}

/// Interpolate every output of `table` at `coordinates`, in table order.
pub fn interpolate_all(
    table: &PerformanceTable,
    coordinates: &[f64],
    policy: &InterpolationPolicy,
) -> Result<Vec<(String, f64)>, LookupError> {
    let cell = Cell::resolve(table, coordinates, policy)?;
    Ok(table
        .outputs()
        .iter()
        .map(|o| (o.name.clone(), cell.apply(&o.values)))
        .collect())
}

/// Store-bound lookup helper used by the phase calculators.
#[derive(Debug, Clone, Copy)]
pub struct Interpolator<'a> {
    store: &'a TableStore,
    policy: InterpolationPolicy,
}

impl<'a> Interpolator<'a> {
    pub fn new(store: &'a TableStore, policy: InterpolationPolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &'a TableStore {
        self.store
    }

    pub fn policy(&self) -> &InterpolationPolicy {
        &self.policy
    }

    /// Single output of table `name` (optionally configuration-specific).
    pub fn lookup(
        &self,
        name: &str,
        configuration: Option<&str>,
        coordinates: &[f64],
        output: &str,
    ) -> Result<f64, LookupError> {
        let table = self.store.table(name, configuration)?;
        interpolate(table, coordinates, output, &self.policy)
    }

    /// Several outputs sharing one cell resolution, returned in the requested order.
    pub fn lookup_many<const N: usize>(
        &self,
        name: &str,
        configuration: Option<&str>,
        coordinates: &[f64],
        outputs: [&str; N],
    ) -> Result<[f64; N], LookupError> {
        let table = self.store.table(name, configuration)?;
        let cell = Cell::resolve(table, coordinates, &self.policy)?;
        let mut values = [0.0; N];
        for (slot, output) in values.iter_mut().zip(outputs) {
            let data = table
                .output(output)
                .ok_or_else(|| LookupError::MissingOutput {
                    table: table.id().to_string(),
                    output: output.to_string(),
                })?;
            *slot = cell.apply(&data.values);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use perf_config::{AxisConfig, OutputConfig, TableConfig};

    fn plane() -> PerformanceTable {
        // z = 2x + 3y + 1 on x ∈ {0, 1, 2}, y ∈ {0, 10}
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 10.0];
        let mut values = Vec::new();
        for x in xs {
            for y in ys {
                values.push(2.0 * x + 3.0 * y + 1.0);
            }
        }
        PerformanceTable::from_config(&TableConfig {
            name: "plane".to_string(),
            configuration: None,
            description: None,
            axes: vec![
                AxisConfig {
                    name: "x".to_string(),
                    unit: String::new(),
                    points: xs.to_vec(),
                },
                AxisConfig {
                    name: "y".to_string(),
                    unit: String::new(),
                    points: ys.to_vec(),
                },
            ],
            outputs: vec![OutputConfig {
                name: "z".to_string(),
                unit: String::new(),
                values,
            }],
        })
        .expect("valid table")
    }

    #[test]
    fn weights_sum_to_one() {
        let mut w = vec![0.0; 8];
        interpn_weights(&[0.3, 0.6, 0.9], &mut w);
        assert_relative_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(w[0], 0.7 * 0.4 * 0.1, epsilon = 1e-12);
        assert_relative_eq!(w[7], 0.3 * 0.6 * 0.9, epsilon = 1e-12);
    }

    #[test]
    fn linear_surface_is_reproduced() {
        let table = plane();
        let policy = InterpolationPolicy::default();
        let z = interpolate(&table, &[1.25, 4.0], "z", &policy).unwrap();
        assert_relative_eq!(z, 2.0 * 1.25 + 3.0 * 4.0 + 1.0, epsilon = 1e-12);
    }

    #[test]
    fn grid_point_returns_stored_value() {
        let table = plane();
        let policy = InterpolationPolicy::default();
        assert_eq!(interpolate(&table, &[1.0, 10.0], "z", &policy).unwrap(), 33.0);
        assert_eq!(interpolate(&table, &[2.0, 0.0], "z", &policy).unwrap(), 5.0);
    }

    #[test]
    fn small_overshoot_clamps_to_bound() {
        let table = plane();
        let policy = InterpolationPolicy::default();
        // edge cell on x is 1.0 wide, tolerance 0.05
        let z = interpolate(&table, &[2.04, 10.0], "z", &policy).unwrap();
        assert_eq!(z, 35.0);
    }

    #[test]
    fn overshoot_beyond_tolerance_fails() {
        let table = plane();
        let policy = InterpolationPolicy::default();
        let err = interpolate(&table, &[2.2, 5.0], "z", &policy).unwrap_err();
        assert!(matches!(err, LookupError::Extrapolation { ref axis, .. } if axis == "x"));
    }

    #[test]
    fn dimension_and_output_errors() {
        let table = plane();
        let policy = InterpolationPolicy::default();
        assert!(matches!(
            interpolate(&table, &[1.0], "z", &policy),
            Err(LookupError::Table(TableError::DimensionMismatch { .. }))
        ));
        assert!(matches!(
            interpolate(&table, &[1.0, 1.0], "w", &policy),
            Err(LookupError::MissingOutput { .. })
        ));
    }
}
