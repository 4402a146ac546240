//! Diagonal extraction, imposition and inversion

use moment_fixed_point::{FixedPointError, ScaledInteger, ScaledVector};

use crate::error::{LinalgError, Result};
use crate::matrix::Matrix;

fn check_shape(vector: &ScaledVector, matrix: &Matrix) -> Result<()> {
    if vector.len() != matrix.dim() {
        return Err(LinalgError::DimensionMismatch {
            expected: matrix.dim(),
            got: vector.len(),
        });
    }
    if vector.scale() != matrix.scale() {
        return Err(FixedPointError::ScaleMismatch {
            expected: matrix.scale(),
            got: vector.scale(),
        }
        .into());
    }
    Ok(())
}

/// Copy the diagonal of `matrix` into `dest`.
///
/// With `replace`, every diagonal entry is then set to one, turning an LDLᵗ
/// result into a unit-diagonal `L`. The diagonal is the same in either
/// orientation.
pub fn extract_diagonal(
    matrix: &mut Matrix,
    dest: &mut ScaledVector,
    replace: bool,
) -> Result<()> {
    check_shape(dest, matrix)?;
    let one = ScaledInteger::one(matrix.scale())?;

    for k in 0..matrix.dim() {
        let entry = &mut matrix.line_mut(k)[k];
        if replace {
            dest[k] = std::mem::replace(entry, one.clone());
        } else {
            dest[k] = entry.clone();
        }
    }
    Ok(())
}

/// Write `src` onto the diagonal of `dest`, leaving off-diagonal entries alone
pub fn impose_diagonal(src: &ScaledVector, dest: &mut Matrix) -> Result<()> {
    check_shape(src, dest)?;
    for (k, value) in src.iter().enumerate() {
        dest.line_mut(k)[k] = value.clone();
    }
    Ok(())
}

/// Replace every element `e` with `1 / e`.
///
/// The vector is left untouched if any element is zero.
pub fn invert_diagonal(vector: &mut ScaledVector) -> Result<()> {
    if vector.iter().any(ScaledInteger::is_zero) {
        return Err(FixedPointError::DivisionByZero.into());
    }
    let one = ScaledInteger::one(vector.scale())?;
    for element in vector.iter_mut() {
        *element = one.div(element)?;
    }
    Ok(())
}
