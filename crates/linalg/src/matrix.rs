//! Square fixed-point matrix stored as one vector per line

use moment_fixed_point::{FixedPointError, ScaledInteger, ScaledVector};
use rayon::prelude::*;

use crate::error::{LinalgError, Result};

/// Whether a backing line of a [`Matrix`] is a row or a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Row,
    Column,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Row => Orientation::Column,
            Orientation::Column => Orientation::Row,
        }
    }
}

/// An N×N matrix of fixed-point values sharing one scale.
///
/// Storage is always one [`ScaledVector`] per index; `orientation` decides
/// whether line `i` is logical row `i` or logical column `i`. Line `i` always
/// carries id `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    dim: usize,
    scale: u32,
    orientation: Orientation,
    lines: Vec<ScaledVector>,
}

impl Matrix {
    /// Create a zero matrix
    pub fn new(dim: usize, scale: u32, orientation: Orientation) -> Result<Self> {
        // Validates the scale
        ScaledInteger::from_raw(0, scale)?;
        let lines = (0..dim)
            .map(|id| ScaledVector::zeros(dim, id, scale))
            .collect();
        Ok(Self {
            dim,
            scale,
            orientation,
            lines,
        })
    }

    /// Create from `dim * dim` values in logical row-major order.
    ///
    /// Values are copied and rescaled to `scale`.
    pub fn from_row_major(
        dim: usize,
        scale: u32,
        orientation: Orientation,
        source: &[ScaledInteger],
    ) -> Result<Self> {
        if source.len() != dim * dim {
            return Err(LinalgError::DimensionMismatch {
                expected: dim * dim,
                got: source.len(),
            });
        }

        let mut matrix = Self::new(dim, scale, orientation)?;
        for (index, value) in source.iter().enumerate() {
            *matrix.at_mut(index / dim, index % dim) = value.rescale(scale)?;
        }
        Ok(matrix)
    }

    /// Create from `dim * dim` floating-point values in logical row-major order
    pub fn from_f64_row_major(
        dim: usize,
        scale: u32,
        orientation: Orientation,
        source: &[f64],
    ) -> Result<Self> {
        let values = source
            .iter()
            .map(|&v| ScaledInteger::from_f64(v, scale))
            .collect::<std::result::Result<Vec<_>, FixedPointError>>()?;
        Self::from_row_major(dim, scale, orientation, &values)
    }

    pub fn identity(dim: usize, scale: u32, orientation: Orientation) -> Result<Self> {
        let mut matrix = Self::new(dim, scale, orientation)?;
        let one = ScaledInteger::one(scale)?;
        for (k, line) in matrix.lines.iter_mut().enumerate() {
            line[k] = one.clone();
        }
        Ok(matrix)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Backing line `index`: a row or a column depending on orientation
    pub fn line(&self, index: usize) -> &ScaledVector {
        &self.lines[index]
    }

    /// Mutable backing line. Values written through it must carry the
    /// matrix scale; use [`Matrix::set`] for a checked write.
    pub fn line_mut(&mut self, index: usize) -> &mut ScaledVector {
        &mut self.lines[index]
    }

    pub fn lines(&self) -> &[ScaledVector] {
        &self.lines
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [ScaledVector] {
        &mut self.lines
    }

    /// Element at logical position (row, col)
    pub fn at(&self, row: usize, col: usize) -> &ScaledInteger {
        match self.orientation {
            Orientation::Row => &self.lines[row][col],
            Orientation::Column => &self.lines[col][row],
        }
    }

    /// Mutable element at logical position (row, col).
    ///
    /// The scale of the written value is not checked; a foreign scale only
    /// surfaces later as a `ScaleMismatch` from arithmetic. Prefer
    /// [`Matrix::set`].
    pub fn at_mut(&mut self, row: usize, col: usize) -> &mut ScaledInteger {
        match self.orientation {
            Orientation::Row => &mut self.lines[row][col],
            Orientation::Column => &mut self.lines[col][row],
        }
    }

    /// Write `value` at logical position (row, col), checking scale and bounds
    pub fn set(&mut self, row: usize, col: usize, value: ScaledInteger) -> Result<()> {
        if row >= self.dim || col >= self.dim {
            return Err(LinalgError::DimensionMismatch {
                expected: self.dim,
                got: row.max(col),
            });
        }
        let (line, index) = match self.orientation {
            Orientation::Row => (row, col),
            Orientation::Column => (col, row),
        };
        self.lines[line].set(index, value)?;
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&ScaledInteger> {
        if row >= self.dim || col >= self.dim {
            return None;
        }
        Some(self.at(row, col))
    }

    /// Row view, available only on row-oriented storage
    pub fn rows_mut(&mut self) -> Result<RowsMut<'_>> {
        self.require(Orientation::Row)?;
        Ok(RowsMut {
            rows: &mut self.lines,
        })
    }

    /// Column view, available only on column-oriented storage
    pub fn columns_mut(&mut self) -> Result<ColumnsMut<'_>> {
        self.require(Orientation::Column)?;
        Ok(ColumnsMut {
            columns: &mut self.lines,
        })
    }

    fn require(&self, expected: Orientation) -> Result<()> {
        if self.orientation != expected {
            return Err(LinalgError::OrientationMismatch {
                expected,
                got: self.orientation,
            });
        }
        Ok(())
    }

    /// In-place transpose: swaps each element above the diagonal with its
    /// mirror below it. The orientation flag is unchanged, so the logical
    /// matrix is transposed.
    pub fn transpose(&mut self) {
        for i in 0..self.dim {
            let (head, tail) = self.lines.split_at_mut(i + 1);
            let line_i = &mut head[i];
            for line_j in tail.iter_mut() {
                let j = line_j.id();
                std::mem::swap(&mut line_i[j], &mut line_j[i]);
            }
        }
    }

    /// Transpose the storage and flip the orientation flag. The logical
    /// matrix is unchanged; only which lines are rows or columns changes.
    pub fn reorient(&mut self) {
        self.transpose();
        self.orientation = self.orientation.flipped();
    }

    /// Copy of the leading `k × k` block
    pub fn block(&self, k: usize) -> Result<Matrix> {
        if k > self.dim {
            return Err(LinalgError::DimensionMismatch {
                expected: self.dim,
                got: k,
            });
        }
        let mut out = Matrix::new(k, self.scale, self.orientation)?;
        for (id, line) in out.lines.iter_mut().enumerate() {
            for (index, value) in line.iter_mut().enumerate() {
                *value = self.lines[id][index].clone();
            }
        }
        Ok(out)
    }

    fn check_dim(&self, other: &Matrix) -> Result<()> {
        if self.dim != other.dim {
            return Err(LinalgError::DimensionMismatch {
                expected: self.dim,
                got: other.dim,
            });
        }
        Ok(())
    }

    /// Element-wise `self += other`
    pub fn add_matrix(&mut self, other: &Matrix) -> Result<()> {
        self.check_dim(other)?;
        for row in 0..self.dim {
            for col in 0..self.dim {
                self.at_mut(row, col).add_assign(other.at(row, col))?;
            }
        }
        Ok(())
    }

    /// Element-wise `self -= other`
    pub fn sub_matrix(&mut self, other: &Matrix) -> Result<()> {
        self.check_dim(other)?;
        for row in 0..self.dim {
            for col in 0..self.dim {
                self.at_mut(row, col).sub_assign(other.at(row, col))?;
            }
        }
        Ok(())
    }

    /// `self = self * other` (schoolbook product into a temporary)
    pub fn mul_matrix(&mut self, other: &Matrix) -> Result<()> {
        *self = self.multiply(other)?;
        Ok(())
    }

    /// Matrix product `self * other`, same orientation as `self`
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        self.check_dim(other)?;
        let dim = self.dim;
        let orientation = self.orientation;
        let mut product = Matrix::new(dim, self.scale, orientation)?;

        product.lines.par_iter_mut().try_for_each(|line| -> Result<()> {
            let a = line.id();
            for b in 0..dim {
                let (i, j) = match orientation {
                    Orientation::Row => (a, b),
                    Orientation::Column => (b, a),
                };
                let cell = &mut line[b];
                for k in 0..dim {
                    cell.add_assign(&self.at(i, k).mul(other.at(k, j))?)?;
                }
            }
            Ok(())
        })?;

        Ok(product)
    }

    /// Add a scalar to every element
    pub fn add_scalar(&mut self, addend: &ScaledInteger) -> Result<()> {
        for value in self.lines.iter_mut().flat_map(|line| line.iter_mut()) {
            value.add_assign(addend)?;
        }
        Ok(())
    }

    /// Subtract a scalar from every element
    pub fn sub_scalar(&mut self, subtrahend: &ScaledInteger) -> Result<()> {
        for value in self.lines.iter_mut().flat_map(|line| line.iter_mut()) {
            value.sub_assign(subtrahend)?;
        }
        Ok(())
    }

    /// Multiply every element by a scalar
    pub fn mul_scalar(&mut self, multiplicand: &ScaledInteger) -> Result<()> {
        for value in self.lines.iter_mut().flat_map(|line| line.iter_mut()) {
            *value = value.mul(multiplicand)?;
        }
        Ok(())
    }

    /// Lossy conversion into `dest`, logical row-major
    pub fn dump_as_doubles(&self, dest: &mut [f64]) -> Result<()> {
        if dest.len() != self.dim * self.dim {
            return Err(LinalgError::DimensionMismatch {
                expected: self.dim * self.dim,
                got: dest.len(),
            });
        }
        dest.copy_from_slice(&self.to_f64_row_major());
        Ok(())
    }

    /// Lossy conversion to a logical row-major `Vec`
    pub fn to_f64_row_major(&self) -> Vec<f64> {
        let dim = self.dim;
        (0..dim * dim)
            .map(|index| self.at(index / dim, index % dim).to_f64())
            .collect()
    }
}

/// Split `lines` into the pivot line `k` and every line after it
fn split_pivot(lines: &mut [ScaledVector], k: usize) -> (&mut ScaledVector, &mut [ScaledVector]) {
    let (head, tail) = lines.split_at_mut(k + 1);
    (&mut head[k], tail)
}

/// Mutable access to the rows of a row-oriented [`Matrix`]
pub struct RowsMut<'a> {
    rows: &'a mut [ScaledVector],
}

impl<'a> RowsMut<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> &ScaledVector {
        &self.rows[index]
    }

    pub fn row_mut(&mut self, index: usize) -> &mut ScaledVector {
        &mut self.rows[index]
    }

    /// Pivot row `k` and the rows below it, borrowed disjointly
    pub fn split_pivot_mut(&mut self, k: usize) -> (&mut ScaledVector, &mut [ScaledVector]) {
        split_pivot(&mut *self.rows, k)
    }
}

/// Mutable access to the columns of a column-oriented [`Matrix`]
pub struct ColumnsMut<'a> {
    columns: &'a mut [ScaledVector],
}

impl<'a> ColumnsMut<'a> {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, index: usize) -> &ScaledVector {
        &self.columns[index]
    }

    pub fn column_mut(&mut self, index: usize) -> &mut ScaledVector {
        &mut self.columns[index]
    }

    /// Pivot column `k` and the columns right of it, borrowed disjointly
    pub fn split_pivot_mut(&mut self, k: usize) -> (&mut ScaledVector, &mut [ScaledVector]) {
        split_pivot(&mut *self.columns, k)
    }
}
