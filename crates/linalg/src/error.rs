//! Linear algebra error types

use thiserror::Error;

use crate::matrix::Orientation;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Orientation mismatch: operation requires {expected:?} storage, matrix is {got:?}")]
    OrientationMismatch {
        expected: Orientation,
        got: Orientation,
    },

    #[error("Matrix is not positive-definite at working precision: pivot {pivot} is not positive")]
    NotPositiveDefinite { pivot: usize },

    #[error("Insufficient precision: inverse diagonal entry {index} is not positive")]
    InsufficientPrecision { index: usize },

    #[error("Triangular inversion requires a unit diagonal: entry {index} is not one")]
    NotUnitDiagonal { index: usize },

    #[error("Eigensolver failed: {0}")]
    Eigen(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Fixed-point error: {0}")]
    FixedPoint(#[from] moment_fixed_point::FixedPointError),
}

pub type Result<T> = std::result::Result<T, LinalgError>;
