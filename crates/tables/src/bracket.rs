//! Bounded bracketing search along table axes.

use crate::{Axis, PerformanceTable, TableError};

/// Where a coordinate fell relative to the axis range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BracketPosition {
    Inside,
    /// Below the first grid point by the given amount.
    Below(f64),
    /// Above the last grid point by the given amount.
    Above(f64),
}

/// Grid cell enclosing a coordinate along one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisBracket {
    pub axis: String,
    pub value: f64,
    /// Index of the lower grid point; the cell is `[lower_index, lower_index + 1]`.
    pub lower_index: usize,
    pub lower: f64,
    pub upper: f64,
    /// Position inside the cell, `(value - lower) / (upper - lower)`; outside `[0, 1]` when out of range.
    pub fraction: f64,
    /// Coordinate coincides with a grid point.
    pub on_grid_line: bool,
    pub position: BracketPosition,
}

impl AxisBracket {
    pub fn cell_width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Locate the cell for `value`, never taking more than `max_iterations` bisection steps.
pub fn locate(axis: &Axis, value: f64, max_iterations: usize) -> Result<AxisBracket, TableError> {
    let points = &axis.points;
    let mut lo = 0usize;
    let mut hi = points.len() - 1;
    let mut iterations = 0usize;

    while hi - lo > 1 {
        iterations += 1;
        if iterations > max_iterations {
            return Err(TableError::SearchExhausted {
                axis: axis.name.clone(),
                limit: max_iterations,
            });
        }
        let mid = lo + (hi - lo) / 2;
        if points[mid] <= value {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let lower = points[lo];
    let upper = points[lo + 1];
    let on_grid_line = value == lower || value == upper;
    let fraction = if value == lower {
        0.0
    } else if value == upper {
        1.0
    } else {
        (value - lower) / (upper - lower)
    };
    let position = if value < axis.min() {
        BracketPosition::Below(axis.min() - value)
    } else if value > axis.max() {
        BracketPosition::Above(value - axis.max())
    } else {
        BracketPosition::Inside
    };

    Ok(AxisBracket {
        axis: axis.name.clone(),
        value,
        lower_index: lo,
        lower,
        upper,
        fraction,
        on_grid_line,
        position,
    })
}

pub(crate) fn bracket_all(
    table: &PerformanceTable,
    values: &[f64],
    max_iterations: usize,
) -> Result<Vec<AxisBracket>, TableError> {
    if values.len() != table.dimensions() {
        return Err(TableError::DimensionMismatch {
            table: table.id().to_string(),
            expected: table.dimensions(),
            got: values.len(),
        });
    }
    table
        .axes()
        .iter()
        .zip(values)
        .map(|(axis, &value)| {
            if !value.is_finite() {
                return Err(TableError::NonFiniteCoordinate {
                    table: table.id().to_string(),
                    axis: axis.name.clone(),
                });
            }
            locate(axis, value, max_iterations)
        })
        .collect()
}
