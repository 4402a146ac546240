//! Fixed-point vector operations

use std::ops::{Index, IndexMut};

use crate::error::{FixedPointError, Result};
use crate::fixed::ScaledInteger;

/// A vector of fixed-point values with common scale.
///
/// `id` is the position of the vector inside a parent matrix (its row or
/// column index); standalone vectors use 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaledVector {
    id: usize,
    scale: u32,
    data: Vec<ScaledInteger>,
}

impl ScaledVector {
    /// Create a zero vector of given length
    pub fn zeros(len: usize, id: usize, scale: u32) -> Self {
        Self {
            id,
            scale,
            data: vec![ScaledInteger::zero(scale); len],
        }
    }

    /// Create a vector from existing values, rescaling each to `scale`
    pub fn from_elements(elements: Vec<ScaledInteger>, id: usize, scale: u32) -> Result<Self> {
        let data = elements
            .into_iter()
            .map(|e| if e.scale == scale { Ok(e) } else { e.rescale(scale) })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { id, scale, data })
    }

    /// Create a vector from floating-point values
    pub fn from_f64_slice(values: &[f64], scale: u32) -> Result<Self> {
        let data = values
            .iter()
            .map(|&v| ScaledInteger::from_f64(v, scale))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { id: 0, scale, data })
    }

    /// Convert to floating-point vector
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.data.iter().map(ScaledInteger::to_f64).collect()
    }

    /// Get the length of the vector
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the vector is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Get element at index
    pub fn get(&self, index: usize) -> Option<&ScaledInteger> {
        self.data.get(index)
    }

    /// Replace the element at `index`, checking its scale
    pub fn set(&mut self, index: usize, value: ScaledInteger) -> Result<()> {
        if value.scale != self.scale {
            return Err(FixedPointError::ScaleMismatch {
                expected: self.scale,
                got: value.scale,
            });
        }
        let len = self.len();
        let slot = self
            .data
            .get_mut(index)
            .ok_or(FixedPointError::DimensionMismatch {
                expected: len,
                got: index,
            })?;
        *slot = value;
        Ok(())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScaledInteger> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ScaledInteger> {
        self.data.iter_mut()
    }

    pub fn as_slice(&self) -> &[ScaledInteger] {
        &self.data
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.scale != other.scale {
            return Err(FixedPointError::ScaleMismatch {
                expected: self.scale,
                got: other.scale,
            });
        }
        if self.len() != other.len() {
            return Err(FixedPointError::DimensionMismatch {
                expected: self.len(),
                got: other.len(),
            });
        }
        Ok(())
    }

    /// Element-wise addition
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a.add(b))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id: self.id,
            scale: self.scale,
            data,
        })
    }

    /// Element-wise subtraction
    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a.sub(b))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id: self.id,
            scale: self.scale,
            data,
        })
    }

    /// Dot product with another vector.
    ///
    /// Products are accumulated at double scale and rescaled once at the end.
    pub fn dot(&self, other: &Self) -> Result<ScaledInteger> {
        self.check_compatible(other)?;
        let sum = self
            .data
            .iter()
            .zip(&other.data)
            .fold(num_bigint::BigInt::default(), |acc, (a, b)| acc + &a.raw * &b.raw);
        Ok(ScaledInteger {
            raw: sum >> self.scale,
            scale: self.scale,
        })
    }

    /// Multiply each element by a scalar
    pub fn scale_by(&self, scalar: &ScaledInteger) -> Result<Self> {
        let data = self
            .data
            .iter()
            .map(|x| x.mul(scalar))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id: self.id,
            scale: self.scale,
            data,
        })
    }

    /// Negate all elements
    pub fn neg(&self) -> Self {
        Self {
            id: self.id,
            scale: self.scale,
            data: self.data.iter().map(ScaledInteger::neg).collect(),
        }
    }
}

impl Index<usize> for ScaledVector {
    type Output = ScaledInteger;

    fn index(&self, index: usize) -> &ScaledInteger {
        &self.data[index]
    }
}

/// Unchecked write access: the caller keeps every element at the vector's
/// scale. [`ScaledVector::set`] checks it.
impl IndexMut<usize> for ScaledVector {
    fn index_mut(&mut self, index: usize) -> &mut ScaledInteger {
        &mut self.data[index]
    }
}

impl<'a> IntoIterator for &'a ScaledVector {
    type Item = &'a ScaledInteger;
    type IntoIter = std::slice::Iter<'a, ScaledInteger>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl std::fmt::Display for ScaledVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, value) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str("\t")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}
