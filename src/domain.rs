//! Domain descriptors for bases.
//!
//! A [`DomainRange`] is the interval (or product of intervals) over which the functions of a
//! basis are defined. It is validated once at construction and never changes afterwards;
//! clones share the same interval storage.
use std::sync::Arc;

use crate::{
    error::{Error, Result},
    value::Value,
};

/// What to do with evaluation points that fall outside the domain of a basis.
///
/// The default is to reject them. Extrapolation must be asked for explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extrapolation {
    /// Fail with [`Error::OutOfDomain`] if any point is outside the domain.
    #[default]
    Reject,

    /// Evaluate the basis functions outside the domain anyway.
    ///
    /// The result is whatever the closed form of each function gives there; for B-splines
    /// this extends the boundary polynomial pieces.
    Allow,
}

/// An interval, or a product of intervals, defining where basis functions are valid.
///
/// Every dimension satisfies `start < end`, and both ends are finite.
///
/// Equality is exact and by value. Use [`DomainRange::same_domain`] to compare domains
/// within a floating-point tolerance, which is what binary basis operations do.
///
/// # Example
/// ```rust
/// use fdbasis::DomainRange;
///
/// let domain = DomainRange::<f64>::new(0.0, 5.0).unwrap();
/// assert_eq!(domain.length(), 5.0);
/// assert!(domain.contains(2.5));
/// assert!(DomainRange::<f64>::new(1.0, 1.0).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct DomainRange<T: Value = f64> {
    intervals: Arc<[(T, T)]>,
}
impl<T: Value> DomainRange<T> {
    /// Creates a one-dimensional domain `[start, end]`.
    ///
    /// # Errors
    /// Returns an error if `start >= end` or either end is not finite.
    pub fn new(start: T, end: T) -> Result<Self> {
        Self::from_intervals(&[(start, end)])
    }

    /// Creates a multi-dimensional domain from one interval per dimension.
    ///
    /// # Errors
    /// Returns an error if there are no intervals, or any interval is empty, reversed, or infinite.
    pub fn from_intervals(intervals: &[(T, T)]) -> Result<Self> {
        if intervals.is_empty() {
            return Err(Error::DimensionMismatch {
                expected: 1,
                found: 0,
            });
        }

        for &(start, end) in intervals {
            let finite = num_traits::float::FloatCore::is_finite(start)
                && num_traits::float::FloatCore::is_finite(end);
            if !finite || start >= end {
                return Err(Error::InvalidDomain {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
        }

        Ok(Self {
            intervals: intervals.into(),
        })
    }

    /// The tolerance used by [`DomainRange::same_domain`].
    #[must_use]
    pub fn default_tolerance() -> T {
        T::epsilon().sqrt()
    }

    /// Number of dimensions of the domain.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.intervals.len()
    }

    /// All intervals of the domain, one per dimension.
    #[must_use]
    pub fn intervals(&self) -> &[(T, T)] {
        &self.intervals
    }

    /// The interval for dimension `i`, if it exists.
    #[must_use]
    pub fn interval(&self, i: usize) -> Option<(T, T)> {
        self.intervals.get(i).copied()
    }

    /// Start of the first dimension.
    #[must_use]
    pub fn start(&self) -> T {
        self.intervals[0].0
    }

    /// End of the first dimension.
    #[must_use]
    pub fn end(&self) -> T {
        self.intervals[0].1
    }

    /// Length of the first dimension.
    #[must_use]
    pub fn length(&self) -> T {
        self.end() - self.start()
    }

    /// Returns true if `t` lies in the closed first-dimension interval.
    #[must_use]
    pub fn contains(&self, t: T) -> bool {
        t >= self.start() && t <= self.end()
    }

    /// Fails with [`Error::DimensionMismatch`] unless the domain has `expected` dimensions.
    ///
    /// # Errors
    /// Returns an error if the dimensionality differs.
    pub fn ensure_dim(&self, expected: usize) -> Result<()> {
        if self.dim() == expected {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                expected,
                found: self.dim(),
            })
        }
    }

    /// Checks that every point lies inside the first-dimension interval.
    ///
    /// `NaN` is never inside.
    ///
    /// # Errors
    /// Returns [`Error::OutOfDomain`] for the first offending point.
    pub fn check_points(&self, points: &[T]) -> Result<()> {
        match points.iter().find(|&&t| !self.contains(t)) {
            Some(point) => Err(Error::OutOfDomain {
                point: point.to_string(),
                start: self.start().to_string(),
                end: self.end().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Returns true if both domains have the same dimensions, and every end agrees
    /// within [`DomainRange::default_tolerance`].
    #[must_use]
    pub fn same_domain(&self, other: &Self) -> bool {
        self.same_domain_within(other, Self::default_tolerance())
    }

    /// Same as [`DomainRange::same_domain`], with an explicit tolerance.
    #[must_use]
    pub fn same_domain_within(&self, other: &Self, tol: T) -> bool {
        Arc::ptr_eq(&self.intervals, &other.intervals)
            || (self.dim() == other.dim()
                && self
                    .intervals
                    .iter()
                    .zip(other.intervals.iter())
                    .all(|(a, b)| a.0.is_close(b.0, tol) && a.1.is_close(b.1, tol)))
    }

    /// Fails with [`Error::IncompatibleDomain`] unless the domains are the same.
    ///
    /// # Errors
    /// Returns an error if [`DomainRange::same_domain`] is false.
    pub fn ensure_same(&self, other: &Self) -> Result<()> {
        if self.same_domain(other) {
            Ok(())
        } else {
            Err(Error::IncompatibleDomain {
                lhs: self.to_string(),
                rhs: other.to_string(),
            })
        }
    }
}
impl<T: Value> PartialEq for DomainRange<T> {
    fn eq(&self, other: &Self) -> bool {
        self.intervals == other.intervals
    }
}
impl<T: Value> std::fmt::Display for DomainRange<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .intervals
            .iter()
            .map(|(start, end)| format!("[{start}, {end}]"))
            .collect();
        write!(f, "{}", parts.join(" x "))
    }
}
