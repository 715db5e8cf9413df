use serde::{Deserialize, Serialize};

use crate::{GridError, GridMdp};

/// A `[row, col]` grid coordinate, row 0 at the top.
pub type Cell = [usize; 2];

/// Controls how rollout rewards are aggregated into a return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    /// Sum raw rewards until the goal or the horizon.
    EpisodicUndiscounted,
    /// Sum discounted rewards using `gamma`.
    #[default]
    Discounted,
}

fn default_gamma() -> f64 {
    0.95
}

fn default_horizon() -> usize {
    100
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Serializable grid-world schema used for YAML IO and validation.
pub struct GridSpec {
    /// Schema version for future compatibility checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    pub rows: usize,
    pub cols: usize,
    pub start: Cell,
    /// Absorbing cell.
    pub goal: Cell,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub walls: Vec<Cell>,
    /// Cells that use the second row of every transition-weight matrix.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slippery: Vec<Cell>,
    /// Feature index of each cell, one row per grid row. Defaults to one feature per cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<Vec<usize>>>,
    /// Length of the reward vector. Defaults to the largest feature index plus one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_features: Option<usize>,
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    /// Maximum number of steps in a rollout.
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    #[serde(default)]
    pub return_type: ReturnType,
    /// Seed of the rollout RNG.
    #[serde(default)]
    pub seed: u64,
}

impl GridSpec {
    /// Number of cells, which is also the number of states.
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Length of the reward vector this grid consumes.
    pub fn feature_count(&self) -> usize {
        match (&self.features, self.num_features) {
            (_, Some(count)) => count,
            (Some(features), None) => features
                .iter()
                .flatten()
                .max()
                .map_or(0, |largest| largest + 1),
            (None, None) => self.cell_count(),
        }
    }

    /// Validate bounds, walls, discounting, and the feature map.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GridError::EmptyGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }

        self.check_cell("start", self.start)?;
        self.check_cell("goal", self.goal)?;
        for (i, &wall) in self.walls.iter().enumerate() {
            self.check_cell("wall", wall)?;
            if self.walls[..i].contains(&wall) {
                return Err(GridError::DuplicateWall {
                    row: wall[0],
                    col: wall[1],
                });
            }
        }
        for &cell in &self.slippery {
            self.check_cell("slippery", cell)?;
        }

        // Start and goal must be reachable cells.
        for (what, cell) in [("start", self.start), ("goal", self.goal)] {
            if self.walls.contains(&cell) {
                return Err(GridError::BlockedCell {
                    what,
                    row: cell[0],
                    col: cell[1],
                });
            }
        }

        if !self.gamma.is_finite() || !(0.0..1.0).contains(&self.gamma) {
            return Err(GridError::InvalidGamma { value: self.gamma });
        }
        if self.horizon == 0 {
            return Err(GridError::ZeroHorizon);
        }

        self.validate_features()
    }

    fn validate_features(&self) -> Result<(), GridError> {
        let num_features = self.feature_count();
        let Some(features) = &self.features else {
            if num_features != self.cell_count() {
                return Err(GridError::FeatureCount {
                    expected: self.cell_count(),
                    actual: num_features,
                });
            }
            return Ok(());
        };

        let bad_row = features
            .iter()
            .position(|row| row.len() != self.cols)
            .or_else(|| (features.len() != self.rows).then_some(features.len().min(self.rows)));
        if let Some(bad_row) = bad_row {
            return Err(GridError::FeatureShape {
                rows: self.rows,
                cols: self.cols,
                actual_rows: features.len(),
                bad_row,
                actual_cols: features.get(bad_row).map_or(0, Vec::len),
            });
        }

        for (row, values) in features.iter().enumerate() {
            for (col, &feature) in values.iter().enumerate() {
                if feature >= num_features {
                    return Err(GridError::FeatureOutOfRange {
                        row,
                        col,
                        feature,
                        num_features,
                    });
                }
            }
        }
        Ok(())
    }

    fn check_cell(&self, what: &'static str, cell: Cell) -> Result<(), GridError> {
        if cell[0] >= self.rows || cell[1] >= self.cols {
            return Err(GridError::CellOutOfBounds {
                what,
                row: cell[0],
                col: cell[1],
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Compile this spec into the runtime representation.
    pub fn compile(&self) -> Result<GridMdp, GridError> {
        GridMdp::from_spec(self)
    }
}
