//! Hand-off of a small block to a dense double-precision eigensolver

use nalgebra::DMatrix;

use crate::error::{LinalgError, Result};
use crate::matrix::Matrix;

/// Which end of the spectrum to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EigenMode {
    Smallest,
    Largest,
}

/// Eigenvalues of a dense symmetric matrix given in row-major order
pub trait EigenSolver {
    fn eigenvalues(&self, dim: usize, row_major: &[f64]) -> Result<Vec<f64>>;
}

/// Symmetric eigensolver backed by nalgebra
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseSymmetricSolver;

impl EigenSolver for DenseSymmetricSolver {
    fn eigenvalues(&self, dim: usize, row_major: &[f64]) -> Result<Vec<f64>> {
        if row_major.len() != dim * dim {
            return Err(LinalgError::DimensionMismatch {
                expected: dim * dim,
                got: row_major.len(),
            });
        }
        if row_major.iter().any(|v| !v.is_finite()) {
            return Err(LinalgError::Eigen(
                "input is not representable in double precision".to_string(),
            ));
        }
        if dim == 0 {
            return Ok(Vec::new());
        }

        let matrix = DMatrix::from_row_slice(dim, dim, row_major);
        let eigen = matrix
            .try_symmetric_eigen(f64::EPSILON, 0)
            .ok_or_else(|| LinalgError::Eigen("symmetric eigensolver did not converge".to_string()))?;
        Ok(eigen.eigenvalues.iter().copied().collect())
    }
}

/// Smallest or largest eigenvalue of `matrix`, computed in double precision
pub fn extremal_eigenvalue<S: EigenSolver + ?Sized>(
    solver: &S,
    matrix: &Matrix,
    mode: EigenMode,
) -> Result<f64> {
    let dim = matrix.dim();
    let mut doubles = vec![0.0; dim * dim];
    matrix.dump_as_doubles(&mut doubles)?;

    let eigenvalues = solver.eigenvalues(dim, &doubles)?;
    let pick = match mode {
        EigenMode::Smallest => eigenvalues.iter().copied().reduce(f64::min),
        EigenMode::Largest => eigenvalues.iter().copied().reduce(f64::max),
    };
    let value = pick.ok_or_else(|| LinalgError::Eigen("empty matrix".to_string()))?;
    if !value.is_finite() {
        return Err(LinalgError::Eigen(format!("non-finite eigenvalue {}", value)));
    }
    Ok(value)
}
