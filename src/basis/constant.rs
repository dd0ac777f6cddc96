use nalgebra::DMatrix;

use crate::{
    basis::{AnyBasis, Basis},
    domain::DomainRange,
    error::Result,
    value::Value,
};

/// Basis consisting of the single function `φ₀(t) = 1`.
///
/// Represents constant functions. Multiplying by a constant does not leave the span of the
/// other operand, so the product basis with any basis `B` is `B` itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantBasis<T: Value = f64> {
    domain_range: DomainRange<T>,
}
impl<T: Value> ConstantBasis<T> {
    /// Creates a constant basis over a one-dimensional domain.
    ///
    /// # Errors
    /// Returns an error if the domain is not one-dimensional.
    pub fn new(domain_range: DomainRange<T>) -> Result<Self> {
        domain_range.ensure_dim(1)?;
        Ok(Self { domain_range })
    }
}
impl<T: Value> Basis<T> for ConstantBasis<T> {
    type Derivative = Self;

    fn domain_range(&self) -> &DomainRange<T> {
        &self.domain_range
    }

    fn n_basis(&self) -> usize {
        1
    }

    fn evaluate_unchecked(&self, points: &[T], derivative: usize) -> DMatrix<T> {
        if derivative == 0 {
            DMatrix::from_element(1, points.len(), T::one())
        } else {
            DMatrix::zeros(1, points.len())
        }
    }

    fn derivative(&self, coefficients: &DMatrix<T>, order: usize) -> Result<(Self, DMatrix<T>)> {
        self.check_coefficients(coefficients)?;
        if order == 0 {
            return Ok((self.clone(), coefficients.clone()));
        }

        Ok((self.clone(), DMatrix::zeros(coefficients.nrows(), 1)))
    }

    fn gram_matrix(&self) -> DMatrix<T> {
        DMatrix::from_element(1, 1, self.domain_range.length())
    }

    fn basis_of_product(&self, other: &AnyBasis<T>) -> Result<AnyBasis<T>> {
        self.domain_range.ensure_same(other.domain_range())?;
        Ok(other.clone())
    }

    fn rbasis_of_product(&self, other: &AnyBasis<T>) -> Result<AnyBasis<T>> {
        Ok(other.clone())
    }

    fn with_domain_range(&self, domain_range: DomainRange<T>) -> Result<Self> {
        Self::new(domain_range)
    }
}
