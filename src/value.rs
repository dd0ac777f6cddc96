//! Numeric types and sampling utilities for basis computations.
//!
//! This module defines the [`Value`] trait, which abstracts the numeric
//! types that bases can be evaluated with, ensuring compatibility with
//! nalgebra and floating-point operations.
//!
//! # Traits
//!
//! - [`Value`]: Extends `RealField` and `FloatCore` to provide:
//!   - A canonical `two()` constant.
//!   - `try_cast` for safe type conversion with error handling.
//!   - `powi` for integer exponentiation.
//!   - `falling_factorial`, the constant produced by repeated differentiation of a power.
//!
//! # Sampling
//!
//! - [`linspace`]: Evenly spaced points over an interval, both ends included.
//!
//! # Example
//!
//! ```rust
//! use fdbasis::value::{linspace, Value};
//!
//! let points = linspace(0.0, 1.0, 11);
//! assert_eq!(points.len(), 11);
//!
//! // d²/dt² t⁴ = 12 t²
//! assert_eq!(f64::falling_factorial(4, 2), 12.0);
//! ```
use crate::error::Error;

/// Numeric type for bases
pub trait Value:
    nalgebra::Scalar
    + nalgebra::ComplexField<RealField = Self>
    + nalgebra::RealField
    + num_traits::float::FloatCore
    + std::fmt::LowerExp
{
    /// Returns the value 2.0
    #[must_use]
    fn two() -> Self {
        Self::one() + Self::one()
    }

    /// Tries to cast a value to the target type
    ///
    /// # Errors
    /// Returns an error if the cast fails
    fn try_cast<U: num_traits::NumCast>(n: U) -> Result<Self, Error> {
        num_traits::cast(n).ok_or(Error::CastFailed)
    }

    /// Converts the value to `usize`
    fn as_usize(&self) -> Option<usize> {
        num_traits::cast(*self)
    }

    /// Raises the value to the power of an integer
    #[must_use]
    fn powi(self, n: i32) -> Self {
        nalgebra::ComplexField::powi(self, n)
    }

    /// Get the absolute value for a numeric type
    #[must_use]
    fn abs(self) -> Self {
        nalgebra::ComplexField::abs(self)
    }

    /// Returns the absolute difference between two values.
    #[must_use]
    fn abs_sub(self, other: Self) -> Self {
        nalgebra::ComplexField::abs(self - other)
    }

    /// Returns true if `self` and `other` agree within `tol`, scaled by their magnitude.
    fn is_close(self, other: Self, tol: Self) -> bool {
        let scale = nalgebra::RealField::max(
            Self::one(),
            nalgebra::RealField::max(Value::abs(self), Value::abs(other)),
        );
        self == other || self.abs_sub(other) <= tol * scale
    }

    /// Computes the falling factorial `k·(k-1)·…·(k-d+1)`.
    ///
    /// This is the constant in front of `t^(k-d)` after differentiating `t^k` `d` times.
    /// It is `1` for `d = 0` and `0` whenever `d > k`.
    #[must_use]
    fn falling_factorial(k: usize, d: usize) -> Self {
        if d > k {
            return Self::zero();
        }

        let mut result = Self::one();
        for i in 0..d {
            result *= Self::from_positive_int(k - i);
        }
        result
    }

    /// Converts a `usize` to the target numeric type.
    ///
    /// Results in `infinity` if the value is out of range.
    #[must_use]
    fn from_positive_int(n: usize) -> Self {
        Self::try_cast(n).unwrap_or(Self::infinity())
    }
}

impl<T> Value for T where
    T: nalgebra::Scalar
        + nalgebra::ComplexField<RealField = Self>
        + nalgebra::RealField
        + num_traits::float::FloatCore
        + std::fmt::LowerExp
{
}

/// Returns `n` evenly spaced points from `start` to `end`, both included.
///
/// `n = 0` gives an empty vector and `n = 1` gives `[start]`.
#[must_use]
pub fn linspace<T: Value>(start: T, end: T, n: usize) -> Vec<T> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / T::from_positive_int(n - 1);
            let mut points: Vec<T> = (0..n - 1)
                .map(|i| start + step * T::from_positive_int(i))
                .collect();
            points.push(end);
            points
        }
    }
}

/// Trait for infallible integer casting with clamping.
pub trait IntClampedCast:
    num_traits::Num + num_traits::NumCast + num_traits::Bounded + Copy + PartialOrd + Ord
{
    /// Clamps a value to the range of the target type and casts it.
    fn clamped_cast<T: num_traits::PrimInt>(self) -> T {
        //
        // Simple case: self is in range of T
        if let Some(v) = num_traits::cast(self) {
            return v;
        }

        let min = match num_traits::cast::<T, Self>(T::min_value()) {
            Some(v) => v,              // Self can go lower than T - clamp to min
            None => Self::min_value(), // Self cannot go lower than T
        };

        let max = match num_traits::cast::<T, Self>(T::max_value()) {
            Some(v) => v,              // Self can go higher than T - clamp to max
            None => Self::max_value(), // Self cannot go higher than T
        };

        let clamped = self.clamp(min, max);
        num_traits::cast(clamped).unwrap_or_else(T::max_value)
    }
}
impl<T: num_traits::PrimInt> IntClampedCast for T {}
