//! Immutable store of aerodynamic and propulsion performance tables.
//!
//! Tables are validated as a whole on load: a store is either fully built or rejected.
//! Reloading goes through [`TableRegistry`], which swaps the complete store at once.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use log::{debug, info};
use perf_config::TableConfig;
use thiserror::Error;

mod bracket;

pub use bracket::{AxisBracket, BracketPosition, locate};

/// Table key: name plus optional configuration (flap setting, power setting, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableId {
    pub name: String,
    pub configuration: Option<String>,
}

impl TableId {
    pub fn new(name: &str, configuration: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            configuration: configuration.map(str::to_uppercase),
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.configuration {
            Some(cfg) => write!(f, "{}@{}", self.name, cfg),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Independent variable with strictly increasing grid points.
#[derive(Debug, Clone)]
pub struct Axis {
    pub name: String,
    pub unit: String,
    pub points: Vec<f64>,
}

impl Axis {
    pub fn min(&self) -> f64 {
        self.points[0]
    }

    pub fn max(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// Width of the first (`upper == false`) or last grid cell.
    pub fn edge_width(&self, upper: bool) -> f64 {
        let n = self.points.len();
        if upper {
            self.points[n - 1] - self.points[n - 2]
        } else {
            self.points[1] - self.points[0]
        }
    }
}

/// Dependent variable stored row-major, last axis varying fastest.
#[derive(Debug, Clone)]
pub struct Output {
    pub name: String,
    pub unit: String,
    pub values: Vec<f64>,
}

/// Validated, immutable performance table.
#[derive(Debug, Clone)]
pub struct PerformanceTable {
    id: TableId,
    description: Option<String>,
    axes: Vec<Axis>,
    outputs: Vec<Output>,
}

impl PerformanceTable {
    pub fn id(&self) -> &TableId {
        &self.id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn dimensions(&self) -> usize {
        self.axes.len()
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        self.outputs.iter().find(|o| o.name == name)
    }

    /// Number of grid points per output.
    pub fn grid_len(&self) -> usize {
        self.axes.iter().map(|a| a.points.len()).product()
    }

    /// Bracketing cell along every axis for the given coordinates.
    pub fn bracket(
        &self,
        coordinates: &[f64],
        max_iterations: usize,
    ) -> Result<Vec<AxisBracket>, TableError> {
        bracket::bracket_all(self, coordinates, max_iterations)
    }

    /// Build a table from its record, enforcing rectangularity and monotonic axes.
    pub fn from_config(config: &TableConfig) -> Result<Self, TableError> {
        let id = TableId::new(&config.name, config.configuration.as_deref());
        let malformed = |reason: String| TableError::Malformed {
            table: id.to_string(),
            reason,
        };

        if config.name.trim().is_empty() {
            return Err(malformed("table name is empty".to_string()));
        }
        if config.axes.is_empty() {
            return Err(malformed("no axes defined".to_string()));
        }

        let mut expected_len = 1usize;
        for (i, axis) in config.axes.iter().enumerate() {
            if axis.name.trim().is_empty() {
                return Err(malformed(format!("axis {i} has no name")));
            }
            if config.axes[..i].iter().any(|a| a.name == axis.name) {
                return Err(malformed(format!("duplicate axis '{}'", axis.name)));
            }
            if axis.points.len() < 2 {
                return Err(malformed(format!(
                    "axis '{}' needs at least two points, found {}",
                    axis.name,
                    axis.points.len()
                )));
            }
            if let Some(bad) = axis.points.iter().find(|p| !p.is_finite()) {
                return Err(malformed(format!(
                    "axis '{}' has non-finite point {bad}",
                    axis.name
                )));
            }
            if let Some(pair) = axis.points.windows(2).find(|pair| pair[1] <= pair[0]) {
                return Err(malformed(format!(
                    "axis '{}' is not strictly increasing at {} -> {}",
                    axis.name, pair[0], pair[1]
                )));
            }
            expected_len = expected_len
                .checked_mul(axis.points.len())
                .ok_or_else(|| malformed("grid size overflows".to_string()))?;
        }

        if config.outputs.is_empty() {
            return Err(malformed("no outputs defined".to_string()));
        }
        for (i, output) in config.outputs.iter().enumerate() {
            if config.outputs[..i].iter().any(|o| o.name == output.name) {
                return Err(malformed(format!("duplicate output '{}'", output.name)));
            }
            if output.values.len() != expected_len {
                return Err(malformed(format!(
                    "output '{}' has {} values, grid requires {}",
                    output.name,
                    output.values.len(),
                    expected_len
                )));
            }
            if let Some(pos) = output.values.iter().position(|v| !v.is_finite()) {
                return Err(malformed(format!(
                    "output '{}' has non-finite value at index {pos}",
                    output.name
                )));
            }
        }

        Ok(Self {
            id,
            description: config.description.clone(),
            axes: config
                .axes
                .iter()
                .map(|a| Axis {
                    name: a.name.clone(),
                    unit: a.unit.clone(),
                    points: a.points.clone(),
                })
                .collect(),
            outputs: config
                .outputs
                .iter()
                .map(|o| Output {
                    name: o.name.clone(),
                    unit: o.unit.clone(),
                    values: o.values.clone(),
                })
                .collect(),
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    #[error("malformed table '{table}': {reason}")]
    Malformed { table: String, reason: String },
    #[error("table '{0}' not found")]
    NotFound(String),
    #[error("table '{table}' expects {expected} coordinates, got {got}")]
    DimensionMismatch {
        table: String,
        expected: usize,
        got: usize,
    },
    #[error("coordinate for axis '{axis}' of table '{table}' is not finite")]
    NonFiniteCoordinate { table: String, axis: String },
    #[error("bracketing search on axis '{axis}' exceeded {limit} iterations")]
    SearchExhausted { axis: String, limit: usize },
}

/// Immutable collection of validated tables keyed by [`TableId`].
#[derive(Debug, Default)]
pub struct TableStore {
    tables: BTreeMap<TableId, PerformanceTable>,
}

impl TableStore {
    /// Validate every record and build the store; any defect rejects the whole load.
    pub fn load(records: &[TableConfig]) -> Result<Self, TableError> {
        let mut tables = BTreeMap::new();
        for record in records {
            let table = PerformanceTable::from_config(record)?;
            debug!(
                "table {} validated: {} axes, {} outputs, {} grid points",
                table.id(),
                table.dimensions(),
                table.outputs().len(),
                table.grid_len()
            );
            let id = table.id().clone();
            if tables.insert(id.clone(), table).is_some() {
                return Err(TableError::Malformed {
                    table: id.to_string(),
                    reason: "duplicate table definition".to_string(),
                });
            }
        }
        info!("loaded {} performance tables", tables.len());
        Ok(Self { tables })
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn tables(&self) -> impl Iterator<Item = &PerformanceTable> {
        self.tables.values()
    }

    /// Find a table; a configuration-specific table wins over the configuration-less default.
    pub fn table(
        &self,
        name: &str,
        configuration: Option<&str>,
    ) -> Result<&PerformanceTable, TableError> {
        let specific = TableId::new(name, configuration);
        if let Some(table) = self.tables.get(&specific) {
            return Ok(table);
        }
        if configuration.is_some() {
            if let Some(table) = self.tables.get(&TableId::new(name, None)) {
                return Ok(table);
            }
        }
        Err(TableError::NotFound(specific.to_string()))
    }

    /// Bracketing grid values along every axis for the given coordinates.
    pub fn lookup_axis(
        &self,
        name: &str,
        configuration: Option<&str>,
        axis_values: &[f64],
        max_iterations: usize,
    ) -> Result<Vec<AxisBracket>, TableError> {
        self.table(name, configuration)?
            .bracket(axis_values, max_iterations)
    }
}

/// Process-wide holder for the active store.
///
/// Readers take a snapshot and keep using it for the whole calculation; a reload
/// validates the replacement first and only then swaps it in.
#[derive(Debug)]
pub struct TableRegistry {
    current: RwLock<Arc<TableStore>>,
}

impl TableRegistry {
    pub fn new(store: TableStore) -> Self {
        Self {
            current: RwLock::new(Arc::new(store)),
        }
    }

    pub fn snapshot(&self) -> Arc<TableStore> {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&*guard)
    }

    /// Replace the store. On error the previous store stays active.
    pub fn reload(&self, records: &[TableConfig]) -> Result<usize, TableError> {
        let store = TableStore::load(records)?;
        let count = store.len();
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(store);
        info!("table store reloaded with {count} tables");
        Ok(count)
    }
}
