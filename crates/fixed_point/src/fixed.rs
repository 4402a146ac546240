//! Fixed-point scalar type

use std::cmp::Ordering;

use num_bigint::{BigInt, BigUint};
use num_traits::{Float, One, Signed, ToPrimitive, Zero};

use crate::error::{FixedPointError, Result};

/// Default scale factor exponent (S=256 means 2^256)
pub const DEFAULT_SCALE: u32 = 256;

/// Maximum scale accepted by the constructors
pub const MAX_SCALE: u32 = 1 << 24;

/// A fixed-point number represented as an arbitrary-precision integer with
/// implicit scaling factor 2^S
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScaledInteger {
    /// The raw integer value
    pub raw: BigInt,
    /// Scale factor exponent (value represents raw / 2^scale)
    pub scale: u32,
}

/// Create `magnitude` as a fixed-point value at the given scale.
///
/// `scaled_value(3, 8)` has raw value `3 << 8`.
pub fn scaled_value(magnitude: impl Into<BigInt>, scale: u32) -> Result<ScaledInteger> {
    check_scale(scale)?;
    Ok(ScaledInteger {
        raw: magnitude.into() << scale,
        scale,
    })
}

fn check_scale(scale: u32) -> Result<()> {
    if scale > MAX_SCALE {
        return Err(FixedPointError::InvalidScale(scale));
    }
    Ok(())
}

/// `x * 2^exp` without overflowing `powi` for large exponents
fn ldexp(mut x: f64, mut exp: i64) -> f64 {
    const STEP: i64 = 1000;
    while exp > STEP && x.is_finite() {
        x *= 2f64.powi(STEP as i32);
        exp -= STEP;
    }
    while exp < -STEP && x != 0.0 {
        x *= 2f64.powi(-STEP as i32);
        exp += STEP;
    }
    x * 2f64.powi(exp as i32)
}

impl ScaledInteger {
    /// Create a new fixed-point value from raw integer and scale
    pub fn from_raw(raw: impl Into<BigInt>, scale: u32) -> Result<Self> {
        check_scale(scale)?;
        Ok(Self {
            raw: raw.into(),
            scale,
        })
    }

    /// Create a fixed-point value from a floating-point number.
    ///
    /// The binary64 value is decoded exactly and truncated toward zero at
    /// `scale` fractional bits.
    pub fn from_f64(value: f64, scale: u32) -> Result<Self> {
        check_scale(scale)?;
        if !value.is_finite() {
            return Err(FixedPointError::NonFinite { value });
        }

        let (mantissa, exponent, sign) = Float::integer_decode(value);
        let shift = exponent as i64 + scale as i64;
        let magnitude = BigInt::from(mantissa);
        let magnitude = if shift >= 0 {
            magnitude << shift as u64
        } else {
            magnitude >> shift.unsigned_abs()
        };

        Ok(Self {
            raw: if sign < 0 { -magnitude } else { magnitude },
            scale,
        })
    }

    /// Convert back to floating-point (lossy).
    ///
    /// Rounds to nearest, ties to even, outside the subnormal range.
    pub fn to_f64(&self) -> f64 {
        // Mantissa bits plus a round bit and a sticky bit
        let keep = f64::MANTISSA_DIGITS as u64 + 2;
        let magnitude = self.raw.magnitude();
        let excess = magnitude.bits().saturating_sub(keep);
        let mut top: BigUint = magnitude >> excess;
        if magnitude.trailing_zeros().map_or(false, |zeros| zeros < excess) {
            top |= BigUint::one();
        }
        let value = ldexp(top.to_f64().unwrap_or(0.0), excess as i64 - self.scale as i64);
        if self.raw.is_negative() {
            -value
        } else {
            value
        }
    }

    /// Exact decimal expansion truncated to `digits` fractional digits
    pub fn to_decimal_string(&self, digits: usize) -> String {
        let magnitude = self.raw.magnitude();
        let integer: BigUint = magnitude >> self.scale;
        let fraction: BigUint = magnitude - (&integer << self.scale);

        let mut out = String::new();
        if self.raw.is_negative() {
            out.push('-');
        }
        out.push_str(&integer.to_string());

        if digits > 0 {
            let ten = BigUint::from(10u32);
            let shifted: BigUint = (fraction * ten.pow(digits as u32)) >> self.scale;
            out.push('.');
            out.push_str(&format!("{:0>width$}", shifted.to_string(), width = digits));
        }
        out
    }

    /// Create a zero value with the given scale
    pub fn zero(scale: u32) -> Self {
        Self {
            raw: BigInt::zero(),
            scale,
        }
    }

    /// Create a one value with the given scale
    pub fn one(scale: u32) -> Result<Self> {
        check_scale(scale)?;
        // 1.0 = 2^scale in raw form
        Ok(Self {
            raw: BigInt::one() << scale,
            scale,
        })
    }

    /// `n!` at scale 0
    pub fn factorial(n: u64) -> Self {
        let raw = (2..=n).fold(BigInt::one(), |acc, k| acc * k);
        Self { raw, scale: 0 }
    }

    fn check_same_scale(&self, other: &Self) -> Result<()> {
        if self.scale != other.scale {
            return Err(FixedPointError::ScaleMismatch {
                expected: self.scale,
                got: other.scale,
            });
        }
        Ok(())
    }

    /// Add two fixed-point values (must have same scale)
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.check_same_scale(other)?;
        Ok(Self {
            raw: &self.raw + &other.raw,
            scale: self.scale,
        })
    }

    /// Subtract two fixed-point values (must have same scale)
    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.check_same_scale(other)?;
        Ok(Self {
            raw: &self.raw - &other.raw,
            scale: self.scale,
        })
    }

    /// In-place addition
    pub fn add_assign(&mut self, other: &Self) -> Result<()> {
        self.check_same_scale(other)?;
        self.raw += &other.raw;
        Ok(())
    }

    /// In-place subtraction
    pub fn sub_assign(&mut self, other: &Self) -> Result<()> {
        self.check_same_scale(other)?;
        self.raw -= &other.raw;
        Ok(())
    }

    /// Multiply two fixed-point values.
    ///
    /// The full product carries scale 2S; it is shifted right by exactly S
    /// once (arithmetic shift, rounds toward negative infinity). Neither
    /// operand is pre-shifted, so no fractional bits are dropped before the
    /// product exists.
    pub fn mul(&self, other: &Self) -> Result<Self> {
        self.check_same_scale(other)?;
        let product = &self.raw * &other.raw;
        Ok(Self {
            raw: product >> self.scale,
            scale: self.scale,
        })
    }

    /// Divide two fixed-point values.
    ///
    /// The dividend is widened by S bits before the truncating integer
    /// division, so the quotient keeps scale S with error below 2^-S.
    pub fn div(&self, other: &Self) -> Result<Self> {
        self.check_same_scale(other)?;
        if other.raw.is_zero() {
            return Err(FixedPointError::DivisionByZero);
        }
        let widened = &self.raw << self.scale;
        Ok(Self {
            raw: widened / &other.raw,
            scale: self.scale,
        })
    }

    /// `self * self`
    pub fn square(&self) -> Self {
        Self {
            raw: (&self.raw * &self.raw) >> self.scale,
            scale: self.scale,
        }
    }

    /// Square root at the same scale.
    ///
    /// `sqrt(raw / 2^S) = sqrt(raw * 2^S) / 2^S`, so the radicand is widened by
    /// S bits before the integer square root.
    pub fn sqrt(&self) -> Result<Self> {
        if self.raw.is_negative() {
            return Err(FixedPointError::NegativeSqrt);
        }
        let widened = &self.raw << self.scale;
        Ok(Self {
            raw: widened.sqrt(),
            scale: self.scale,
        })
    }

    /// Shift the raw value left without changing the scale
    pub fn shl(&self, amount: u32) -> Self {
        Self {
            raw: &self.raw << amount,
            scale: self.scale,
        }
    }

    /// Shift the raw value right (arithmetic) without changing the scale
    pub fn shr(&self, amount: u32) -> Self {
        Self {
            raw: &self.raw >> amount,
            scale: self.scale,
        }
    }

    /// Move the value to another scale, truncating when the scale shrinks
    pub fn rescale(&self, scale: u32) -> Result<Self> {
        check_scale(scale)?;
        let raw = match scale.cmp(&self.scale) {
            Ordering::Greater => &self.raw << (scale - self.scale),
            Ordering::Less => &self.raw >> (self.scale - scale),
            Ordering::Equal => self.raw.clone(),
        };
        Ok(Self { raw, scale })
    }

    /// Negate the value
    pub fn neg(&self) -> Self {
        Self {
            raw: -&self.raw,
            scale: self.scale,
        }
    }

    /// Get the absolute value
    pub fn abs(&self) -> Self {
        Self {
            raw: self.raw.abs(),
            scale: self.scale,
        }
    }

    /// -1, 0 or 1 as a plain integer
    pub fn signum(&self) -> i8 {
        match self.raw.sign() {
            num_bigint::Sign::Minus => -1,
            num_bigint::Sign::NoSign => 0,
            num_bigint::Sign::Plus => 1,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.raw.is_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.raw.is_negative()
    }

    /// Compare two values of the same scale
    pub fn checked_cmp(&self, other: &Self) -> Result<Ordering> {
        self.check_same_scale(other)?;
        Ok(self.raw.cmp(&other.raw))
    }
}

impl Default for ScaledInteger {
    fn default() -> Self {
        Self::zero(DEFAULT_SCALE)
    }
}

impl std::fmt::Display for ScaledInteger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match f.precision() {
            Some(digits) => f.write_str(&self.to_decimal_string(digits)),
            None => write!(f, "{:.6}", self.to_f64()),
        }
    }
}
