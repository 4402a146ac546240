//! Factorial moment seeding for Hankel matrices
//!
//! Entry `(i, j)` of the moment matrix depends only on `i + j`:
//! `m(i + j) = 2 · (2(i + j) + 1)!`. The values grow factorially, which makes
//! the matrix positive-definite but extremely ill-conditioned.

use moment_fixed_point::{ScaledInteger, ScaledVector};
use num_bigint::BigInt;
use num_traits::One;
use rayon::prelude::*;

use crate::error::Result;
use crate::matrix::Matrix;

/// Moment `(i, j)` at `scale`
pub fn moment(i: usize, j: usize, scale: u32) -> Result<ScaledInteger> {
    let n = 2 * (i + j) as u64 + 1;
    Ok(ScaledInteger::factorial(n).rescale(scale)?.shl(1))
}

/// The `count` distinct Hankel moments `m(0) .. m(count - 1)` at `scale`.
///
/// Consecutive odd factorials are built incrementally,
/// `(2s + 1)! = (2s - 1)! · 2s · (2s + 1)`.
pub fn hankel_moments(count: usize, scale: u32) -> Result<Vec<ScaledInteger>> {
    ScaledInteger::from_raw(0, scale)?;
    let mut factorial = BigInt::one();
    let mut moments = Vec::with_capacity(count);
    for s in 0..count as u64 {
        if s > 0 {
            factorial *= 2 * s;
            factorial *= 2 * s + 1;
        }
        moments.push(ScaledInteger::from_raw(&factorial << (scale + 1), scale)?);
    }
    Ok(moments)
}

/// Fill every entry of `matrix` with its moment.
///
/// The matrix is symmetric, so the result does not depend on orientation.
/// Lines are filled in parallel.
pub fn moment_init(matrix: &mut Matrix) -> Result<()> {
    let dim = matrix.dim();
    let moments = hankel_moments((2 * dim).saturating_sub(1), matrix.scale())?;

    matrix.lines_mut().par_iter_mut().for_each(|line: &mut ScaledVector| {
        let i = line.id();
        for (j, value) in line.iter_mut().enumerate() {
            *value = moments[i + j].clone();
        }
    });
    Ok(())
}
