//! Error types for grid and engine operations

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifeError {
    #[error("coordinates ({row}, {col}) out of bounds for {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("{pattern_rows}x{pattern_cols} pattern does not fit at ({row}, {col}) in {rows}x{cols} grid")]
    PatternDoesNotFit {
        pattern_rows: usize,
        pattern_cols: usize,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("expected a {expected_rows}x{expected_cols} grid, got {rows}x{cols}")]
    DimensionMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("grid cannot be modified while the simulation is running")]
    SimulationRunning,
}

pub type LifeResult<T> = std::result::Result<T, LifeError>;
