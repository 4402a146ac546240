//! Moment Fixed-Point Encoding
//!
//! Arbitrary-precision fixed-point numbers for ill-conditioned linear algebra.
//! Each value is a `BigInt` with an implicit scaling factor 2^S, so the
//! represented real number is `raw / 2^scale`.

mod error;
mod fixed;
mod vector;

pub use error::{FixedPointError, Result};
pub use fixed::{scaled_value, ScaledInteger, DEFAULT_SCALE, MAX_SCALE};
pub use vector::ScaledVector;
