//! Fixed-point error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FixedPointError {
    #[error("Scale mismatch: expected {expected}, got {got}")]
    ScaleMismatch { expected: u32, got: u32 },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Square root of negative value")]
    NegativeSqrt,

    #[error("Non-finite value cannot be represented: {value}")]
    NonFinite { value: f64 },

    #[error("Invalid scale: {0} (must be at most {max})", max = crate::fixed::MAX_SCALE)]
    InvalidScale(u32),
}

pub type Result<T> = std::result::Result<T, FixedPointError>;
