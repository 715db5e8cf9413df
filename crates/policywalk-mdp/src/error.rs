use policywalk_core::BirlError;
use thiserror::Error;

#[derive(Debug, Error)]
/// Error type for grid loading, validation, compilation, and builder operations.
pub enum GridError {
    #[error("failed to read YAML file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("grid must have at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("{what} cell ({row}, {col}) lies outside the {rows}x{cols} grid")]
    CellOutOfBounds {
        what: &'static str,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("{what} cell ({row}, {col}) is a wall")]
    BlockedCell {
        what: &'static str,
        row: usize,
        col: usize,
    },

    #[error("wall cell ({row}, {col}) is listed more than once")]
    DuplicateWall { row: usize, col: usize },

    #[error("discount factor must lie in [0, 1), got {value}")]
    InvalidGamma { value: f64 },

    #[error("rollout horizon must be greater than 0")]
    ZeroHorizon,

    #[error("feature map must be {rows}x{cols}, got {actual_rows} rows with row {bad_row} of length {actual_cols}")]
    FeatureShape {
        rows: usize,
        cols: usize,
        actual_rows: usize,
        bad_row: usize,
        actual_cols: usize,
    },

    #[error("cell ({row}, {col}) uses feature {feature} but only {num_features} features exist")]
    FeatureOutOfRange {
        row: usize,
        col: usize,
        feature: usize,
        num_features: usize,
    },

    #[error("one-hot cell features need exactly {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("builder has no {what} cell")]
    BuilderMissingCell { what: &'static str },

    #[error("invalid demonstrations: {0}")]
    Demonstrations(#[from] BirlError),
}
