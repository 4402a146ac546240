//! Cholesky-style factorizations

use moment_fixed_point::ScaledInteger;
use rayon::prelude::*;
use tracing::trace;

use crate::error::{LinalgError, Result};
use crate::matrix::Matrix;

/// In-place LDLᵗ decomposition of a symmetric positive-definite matrix.
///
/// The matrix must be column-oriented. On return the lower triangle holds `L`
/// with `D` written over its diagonal and the strict upper triangle is zeroed.
/// Only the lower triangle of the input is read.
///
/// Pivots are processed left to right. For pivot `k` the sub-diagonal part of
/// column `k` is divided by the pivot, then every column `c > k` is updated
/// from a snapshot of column `k` taken before the division:
/// `A[c][r] -= snapshot[c] * A[k][r]` for `r >= c`. Columns right of the pivot
/// are updated in parallel; the next pivot starts once all of them are done.
///
/// Fails with [`LinalgError::NotPositiveDefinite`] as soon as a pivot is not
/// strictly positive, which includes pivots that vanish at the working scale.
pub fn ldl_decompose(matrix: &mut Matrix) -> Result<()> {
    let dim = matrix.dim();
    let scale = matrix.scale();
    let mut columns = matrix.columns_mut()?;

    for k in 0..dim {
        let (pivot, trailing) = columns.split_pivot_mut(k);
        let snapshot = pivot.clone();
        let diagonal = &snapshot[k];

        if !diagonal.is_positive() {
            return Err(LinalgError::NotPositiveDefinite { pivot: k });
        }

        for row in 0..k {
            pivot[row] = ScaledInteger::zero(scale);
        }
        for row in (k + 1)..dim {
            pivot[row] = snapshot[row].div(diagonal)?;
        }

        let pivot = &*pivot;
        trailing.par_iter_mut().try_for_each(|dest| -> Result<()> {
            let col = dest.id();
            let y = &snapshot[col];
            for row in col..dim {
                let update = y.mul(&pivot[row])?;
                dest[row].sub_assign(&update)?;
            }
            Ok(())
        })?;

        trace!(pivot = k, "LDLt pivot applied");
    }

    Ok(())
}

/// Classic Cholesky decomposition `A = L·Lᵗ` into `lower`.
///
/// `initial` is read through logical indices, so either orientation works.
/// The lower triangle of `lower` receives `L` and the strict upper triangle is
/// zeroed.
pub fn cholesky(initial: &Matrix, lower: &mut Matrix) -> Result<()> {
    if initial.dim() != lower.dim() {
        return Err(LinalgError::DimensionMismatch {
            expected: initial.dim(),
            got: lower.dim(),
        });
    }
    if initial.scale() != lower.scale() {
        return Err(moment_fixed_point::FixedPointError::ScaleMismatch {
            expected: initial.scale(),
            got: lower.scale(),
        }
        .into());
    }

    let dim = initial.dim();
    let scale = initial.scale();

    for i in 0..dim {
        for j in 0..=i {
            let mut sum = ScaledInteger::zero(scale);
            if j == i {
                for k in 0..j {
                    sum.add_assign(&lower.at(j, k).square())?;
                }
                let radicand = initial.at(j, j).sub(&sum)?;
                if !radicand.is_positive() {
                    return Err(LinalgError::NotPositiveDefinite { pivot: j });
                }
                *lower.at_mut(j, j) = radicand.sqrt()?;
            } else {
                for k in 0..j {
                    sum.add_assign(&lower.at(i, k).mul(lower.at(j, k))?)?;
                }
                let value = initial.at(i, j).sub(&sum)?.div(lower.at(j, j))?;
                *lower.at_mut(i, j) = value;
            }
        }
        for j in (i + 1)..dim {
            *lower.at_mut(i, j) = ScaledInteger::zero(scale);
        }
    }

    Ok(())
}
