//! Moment Linear Algebra
//!
//! In-place linear algebra over scaled arbitrary-precision integers, aimed at
//! symmetric positive-definite Hankel moment matrices that are far too
//! ill-conditioned for double precision.
//!
//! The usual flow is [`moment_init`] → [`partial_inverse`] (LDLᵗ
//! decomposition, diagonal extraction, reorientation, triangular inversion)
//! → [`extremal_eigenvalue`] on the small leading block of the inverse.

mod decompose;
mod diagonal;
mod eigen;
mod error;
mod format;
mod invert;
mod matrix;
mod moment;
mod partial;

pub use decompose::{cholesky, ldl_decompose};
pub use diagonal::{extract_diagonal, impose_diagonal, invert_diagonal};
pub use eigen::{extremal_eigenvalue, DenseSymmetricSolver, EigenMode, EigenSolver};
pub use error::{LinalgError, Result};
pub use format::{format_matrix, format_vector, FormatConfig};
pub use invert::invert_unit_lower;
pub use matrix::{ColumnsMut, Matrix, Orientation, RowsMut};
pub use moment::{hankel_moments, moment, moment_init};
pub use partial::{partial_inverse, PartialInverse, PipelineConfig, DEFAULT_BLOCK_DIM};
