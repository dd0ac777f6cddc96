use nalgebra::DMatrix;

use crate::{
    basis::{default_basis_of_product, AnyBasis, Basis},
    domain::DomainRange,
    error::{Error, Result},
    value::{IntClampedCast, Value},
};

/// Standard (non-normalized) monomial basis.
///
/// The monomial basis represents functions using the familiar powers of `t`:
///
/// ```text
/// 1, t, t², …, tⁿ⁻¹
/// ```
///
/// This is the simplest and most intuitive basis. However, it is **not normalized**, which
/// means its Gram matrix becomes badly conditioned for large `n_basis` (it is a Hilbert
/// matrix on `[0, 1]`).
///
/// # Example
/// ```rust
/// use fdbasis::{basis::{Basis, MonomialBasis}, DomainRange};
///
/// let basis = MonomialBasis::new(DomainRange::<f64>::new(0.0, 5.0).unwrap(), 3).unwrap();
/// let values = basis.evaluate(&[0.0, 1.0, 2.0], 0).unwrap();
/// assert_eq!(values.row(2).iter().copied().collect::<Vec<_>>(), vec![0.0, 1.0, 4.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MonomialBasis<T: Value = f64> {
    domain_range: DomainRange<T>,
    n_basis: usize,
}
impl<T: Value> MonomialBasis<T> {
    /// Creates the basis `1, t, …, t^(n_basis - 1)` over a one-dimensional domain.
    ///
    /// # Errors
    /// Returns an error if `n_basis` is 0 or the domain is not one-dimensional.
    pub fn new(domain_range: DomainRange<T>, n_basis: usize) -> Result<Self> {
        if n_basis == 0 {
            return Err(Error::InvalidNumberOfBasis(n_basis));
        }

        domain_range.ensure_dim(1)?;
        Ok(Self {
            domain_range,
            n_basis,
        })
    }

    /// Highest power in the basis.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.n_basis - 1
    }

    /// Returns the constant and exponent of the `derivative`-th derivative of each basis function.
    ///
    /// `d^d/dt^d tᵏ = k·(k-1)·…·(k-d+1) · t^(k-d)`, and the constant is 0 when `k < d`.
    ///
    /// When `k < d` the exponent is clamped to 0 instead of going negative. The constant is
    /// already 0 there, so this only keeps `0^(negative)` from producing an infinity that
    /// would turn the product into `NaN`.
    fn coefficients_and_exponents(&self, derivative: usize) -> Vec<(T, i32)> {
        (0..self.n_basis)
            .map(|k| {
                let coef = T::falling_factorial(k, derivative);
                let exponent = k.saturating_sub(derivative).clamped_cast::<i32>();
                (coef, exponent)
            })
            .collect()
    }

    /// Values of `∫ tᵐ dt` over the domain, for `m = 0 … count - 1`.
    ///
    /// Barrow's rule: the antiderivative `t^(m+1) / (m+1)` evaluated at both ends.
    fn power_integrals(&self, count: usize) -> Vec<T> {
        let (a, b) = (self.domain_range.start(), self.domain_range.end());

        // Integral constants 1/(m+1), then the difference of the endpoint powers
        (0..count)
            .map(|m| {
                let exponent = (m + 1).clamped_cast::<i32>();
                let integral_coef = T::one() / T::from_positive_int(m + 1);
                integral_coef * (Value::powi(b, exponent) - Value::powi(a, exponent))
            })
            .collect()
    }
}
impl<T: Value> Basis<T> for MonomialBasis<T> {
    type Derivative = Self;

    fn domain_range(&self) -> &DomainRange<T> {
        &self.domain_range
    }

    fn n_basis(&self) -> usize {
        self.n_basis
    }

    fn evaluate_unchecked(&self, points: &[T], derivative: usize) -> DMatrix<T> {
        let terms = self.coefficients_and_exponents(derivative);
        DMatrix::from_fn(self.n_basis, points.len(), |k, j| {
            let (coef, exponent) = terms[k];
            coef * Value::powi(points[j], exponent)
        })
    }

    fn derivative(&self, coefficients: &DMatrix<T>, order: usize) -> Result<(Self, DMatrix<T>)> {
        self.check_coefficients(coefficients)?;
        if order == 0 {
            return Ok((self.clone(), coefficients.clone()));
        }

        if order >= self.n_basis {
            // Every term vanishes; keep the smallest valid basis and represent the zero function
            tracing::debug!(
                n_basis = self.n_basis,
                order,
                "derivative order exceeds the degree, result is the zero function"
            );
            let basis = Self::new(self.domain_range.clone(), 1)?;
            return Ok((basis, DMatrix::zeros(coefficients.nrows(), 1)));
        }

        // Degrees shift down by `order`; the term cₖ tᵏ becomes cₖ·k!/(k-order)! t^(k-order)
        let n_basis = self.n_basis - order;
        let derived = DMatrix::from_fn(coefficients.nrows(), n_basis, |row, j| {
            coefficients[(row, j + order)] * T::falling_factorial(j + order, order)
        });

        Ok((Self::new(self.domain_range.clone(), n_basis)?, derived))
    }

    /// Closed form Gram matrix.
    ///
    /// `G[i, j] = ∫ t^(i+j) dt` only depends on `i + j`, so the `2n - 1` power integrals are
    /// computed once and laid out along the anti-diagonals (a Hankel matrix).
    fn gram_matrix(&self) -> DMatrix<T> {
        let n = self.n_basis;
        let integrals = self.power_integrals(2 * n - 1);

        tracing::trace!(n_basis = n, "monomial gram matrix built");
        DMatrix::from_fn(n, n, |i, j| integrals[i + j])
    }

    fn basis_of_product(&self, other: &AnyBasis<T>) -> Result<AnyBasis<T>> {
        self.domain_range.ensure_same(other.domain_range())?;

        match other {
            // Degrees up to n1+n2-2 only need n1+n2-1 functions; one extra is kept on purpose
            AnyBasis::Monomial(other) => {
                let n_basis = self.n_basis + other.n_basis;
                Ok(Self::new(self.domain_range.clone(), n_basis)?.into())
            }

            _ => other.rbasis_of_product(&self.clone().into()),
        }
    }

    fn rbasis_of_product(&self, other: &AnyBasis<T>) -> Result<AnyBasis<T>> {
        default_basis_of_product(&self.clone().into(), other)
    }

    fn with_domain_range(&self, domain_range: DomainRange<T>) -> Result<Self> {
        Self::new(domain_range, self.n_basis)
    }
}
