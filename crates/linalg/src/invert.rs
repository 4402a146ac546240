//! In-place inversion of unit-lower-triangular matrices

use moment_fixed_point::ScaledInteger;
use rayon::prelude::*;
use tracing::trace;

use crate::error::{LinalgError, Result};
use crate::matrix::Matrix;

/// Invert a unit-lower-triangular matrix in place by forward elimination.
///
/// The matrix must be row-oriented; a column-oriented matrix is rejected with
/// [`LinalgError::OrientationMismatch`]. The diagonal must be exactly one
/// (see [`crate::extract_diagonal`]), otherwise
/// [`LinalgError::NotUnitDiagonal`] is returned before anything is modified.
/// Entries above the diagonal are assumed to be zero and are not checked.
///
/// For each pivot row `k`, every later row `r` is eliminated with
/// `f = row_r[k]`: column `k` becomes `-f` and every other column `i` becomes
/// `row_r[i] - pivot_k[i] * f`. Rows below the pivot are independent and run
/// in parallel; pivots run strictly in order.
pub fn invert_unit_lower(matrix: &mut Matrix) -> Result<()> {
    let dim = matrix.dim();
    let one = ScaledInteger::one(matrix.scale())?;
    let mut rows = matrix.rows_mut()?;

    if let Some(index) = (0..dim).find(|&k| rows.row(k)[k] != one) {
        return Err(LinalgError::NotUnitDiagonal { index });
    }

    for k in 0..dim {
        let (pivot, trailing) = rows.split_pivot_mut(k);
        let pivot = &*pivot;

        trailing.par_iter_mut().try_for_each(|dest| -> Result<()> {
            let factor = dest[k].clone();
            for i in 0..dim {
                if i == k {
                    dest[i] = dest[i].neg();
                } else if !pivot[i].is_zero() {
                    let update = pivot[i].mul(&factor)?;
                    dest[i].sub_assign(&update)?;
                }
            }
            Ok(())
        })?;

        trace!(pivot = k, "elimination pivot applied");
    }

    Ok(())
}
