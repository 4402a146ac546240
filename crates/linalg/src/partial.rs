//! Leading block of a matrix inverse from its LDLᵗ factors
//!
//! With `M = L·D·Lᵗ` the inverse is `M⁻¹ = (Lᵗ)⁻¹·D⁻¹·L⁻¹`. Only the leading
//! `k × k` block is needed downstream, so instead of forming the dense
//! products each cell is summed directly:
//!
//! ```text
//! out(i, j) = Σ_n (Lᵗ)⁻¹(i, n) · L⁻¹(n, j) / D(n)
//! ```
//!
//! That is O(k²·dim) big-number multiplications instead of O(dim³).

use std::time::Instant;

use moment_fixed_point::{ScaledInteger, ScaledVector};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::decompose::ldl_decompose;
use crate::diagonal::extract_diagonal;
use crate::error::{LinalgError, Result};
use crate::invert::invert_unit_lower;
use crate::matrix::{Matrix, Orientation};

/// Default edge length of the computed inverse block
pub const DEFAULT_BLOCK_DIM: usize = 10;

/// Partial-inverse configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Edge length of the leading block of the inverse to compute
    pub block_dim: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            block_dim: DEFAULT_BLOCK_DIM,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(block) = std::env::var("MOMENT_BLOCK_DIM") {
            if let Ok(b) = block.parse() {
                config.block_dim = b;
            }
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_dim == 0 {
            return Err(LinalgError::Config(
                "block dimension must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Output of [`partial_inverse`]
#[derive(Debug, Clone)]
pub struct PartialInverse {
    /// Leading block of `M⁻¹`, row-oriented
    pub block: Matrix,
    /// The `D` factor of `M = L·D·Lᵗ`
    pub diagonal: ScaledVector,
}

/// Compute the leading block of the inverse of a symmetric positive-definite
/// matrix.
///
/// `matrix` must be column-oriented and is consumed as scratch space: on
/// success it holds `L⁻¹` in row orientation. On failure its contents are
/// unspecified and must not be reused.
///
/// Fails with [`LinalgError::InsufficientPrecision`] when a diagonal entry of
/// the block truncates to zero or below at the working scale.
pub fn partial_inverse(matrix: &mut Matrix, config: &PipelineConfig) -> Result<PartialInverse> {
    config.validate()?;
    let dim = matrix.dim();
    let scale = matrix.scale();
    let start = Instant::now();

    debug!(dim, scale, "LDLt-decomposing input matrix");
    ldl_decompose(matrix)?;
    debug!(elapsed = ?start.elapsed(), "decomposition done");

    let mut diagonal = ScaledVector::zeros(dim, 0, scale);
    extract_diagonal(matrix, &mut diagonal, true)?;
    if let Some(last) = diagonal.iter().last() {
        info!(last_pivot = %last, "extracted D");
    }

    debug!("reorienting L into rows");
    matrix.reorient();

    debug!("inverting L");
    invert_unit_lower(matrix)?;
    let l_inverse = &*matrix;

    let mut lt_inverse = l_inverse.clone();
    lt_inverse.transpose();
    debug!(elapsed = ?start.elapsed(), "computed L⁻¹ and (Lᵗ)⁻¹");

    let k = config.block_dim.min(dim);
    let mut block = Matrix::new(k, scale, Orientation::Row)?;
    block.lines_mut().par_iter_mut().try_for_each(|row| -> Result<()> {
        let i = row.id();
        for j in 0..k {
            let mut sum = ScaledInteger::zero(scale);
            // (Lᵗ)⁻¹(i, n) vanishes for n < i and L⁻¹(n, j) for n < j
            for n in i.max(j)..dim {
                let term = lt_inverse
                    .at(i, n)
                    .mul(l_inverse.at(n, j))?
                    .div(&diagonal[n])?;
                sum.add_assign(&term)?;
            }
            row[j] = sum;
        }
        Ok(())
    })?;

    // The inverse of an SPD matrix has a strictly positive diagonal
    if let Some(index) = (0..k).find(|&i| !block.at(i, i).is_positive()) {
        return Err(LinalgError::InsufficientPrecision { index });
    }

    info!(block = k, dim, elapsed = ?start.elapsed(), "partial inverse complete");

    Ok(PartialInverse { block, diagonal })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_of_diagonal_matrix() {
        let values = [4.0, 37.0, 98.0];
        let mut source = vec![0.0; 9];
        for (k, v) in values.iter().enumerate() {
            source[k * 3 + k] = *v;
        }
        let mut m = Matrix::from_f64_row_major(3, 256, Orientation::Column, &source).unwrap();
        let result = partial_inverse(&mut m, &PipelineConfig::default()).unwrap();

        assert_eq!(result.diagonal.to_f64_vec(), values.to_vec());
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 / values[i] } else { 0.0 };
                assert!((result.block.at(i, j).to_f64() - expected).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn test_block_is_clamped_to_dim() {
        let mut m =
            Matrix::from_f64_row_major(2, 64, Orientation::Column, &[4.0, 2.0, 2.0, 3.0])
                .unwrap();
        let config = PipelineConfig { block_dim: 10 };
        let result = partial_inverse(&mut m, &config).unwrap();
        assert_eq!(result.block.dim(), 2);
        // inverse of [[4,2],[2,3]] is [[3,-2],[-2,4]] / 8
        let got = result.block.to_f64_row_major();
        let expected = [0.375, -0.25, -0.25, 0.5];
        for (g, e) in got.iter().zip(expected) {
            assert!((g - e).abs() < 1e-15);
        }
        assert_eq!(m.orientation(), Orientation::Row);
    }

    #[test]
    fn test_vanishing_inverse_is_reported() {
        // [[4,2],[2,3]] decomposes at scale 0 but its inverse truncates away
        let mut m =
            Matrix::from_f64_row_major(2, 0, Orientation::Column, &[4.0, 2.0, 2.0, 3.0])
                .unwrap();
        assert_eq!(
            partial_inverse(&mut m, &PipelineConfig::default()).map(|r| r.block),
            Err(LinalgError::InsufficientPrecision { index: 0 })
        );
    }

    #[test]
    fn test_zero_block_rejected() {
        let mut m = Matrix::identity(2, 64, Orientation::Column).unwrap();
        let config = PipelineConfig { block_dim: 0 };
        assert!(matches!(
            partial_inverse(&mut m, &config),
            Err(LinalgError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_row_oriented_input() {
        let mut m = Matrix::identity(2, 64, Orientation::Row).unwrap();
        assert!(matches!(
            partial_inverse(&mut m, &PipelineConfig::default()),
            Err(LinalgError::OrientationMismatch { .. })
        ));
    }
}
