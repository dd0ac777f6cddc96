//! Function bases for representing functional data
//!
//! This module defines the [`Basis`] trait, the contract every family of basis functions
//! satisfies, and [`AnyBasis`], a tagged union over the families provided by this crate.
//!
//! A basis is a finite ordered family of real-valued functions `φ₀, φ₁, …, φₙ₋₁` over a
//! [`DomainRange`]. A function `f` is represented by coefficients `cⱼ` such that:
//! ```math
//! f(t) = Σ (c_j * φ_j(t))
//! ```
//!
//! # Provided Bases
//! - [`ConstantBasis`]: The single function `1`.
//! - [`MonomialBasis`]: The powers `1, t, t², …, tⁿ⁻¹`. Its Gram matrix is computed in closed form.
//! - [`FourierBasis`]: Normalized sines and cosines of increasing frequency.
//! - [`BSplineBasis`]: Piecewise polynomials with compact support, built from breakpoints.
//!
//! # Products of Bases
//! [`Basis::basis_of_product`] answers "which basis can represent `f·g`, for `f` and `g` in
//! these two bases?". Each basis knows how to combine with its own kind; for any other kind
//! it hands the question to the other operand through [`Basis::rbasis_of_product`], and if
//! neither has a specific rule, [`default_basis_of_product`] builds a B-spline basis.
//!
//! # Rolling Your Own
//! To implement a custom basis:
//! 1. Implement `evaluate_unchecked` to fill the `(n_basis, n_points)` value matrix.
//! 2. Implement `derivative` to express the derivative of a coefficient matrix in some basis.
//! 3. Implement `gram_matrix`, in closed form if possible, or using [`crate::quadrature`].
//!
//! Custom bases cannot take part in [`AnyBasis`], so `basis_of_product` for them should
//! return one of the provided families.
use nalgebra::DMatrix;

use crate::{
    domain::{DomainRange, Extrapolation},
    error::Result,
    value::Value,
};

pub(crate) mod constant;
pub use constant::ConstantBasis;

pub(crate) mod monomial;
pub use monomial::MonomialBasis;

pub(crate) mod fourier;
pub use fourier::FourierBasis;

pub(crate) mod bspline;
pub use bspline::BSplineBasis;

mod any;
pub use any::AnyBasis;

/// A trait representing a finite basis of real-valued functions.
///
/// Bases are immutable values: operations that would change the domain or the number of
/// functions return a new basis. This makes them safe to share between threads and between
/// any number of coefficient sets.
///
/// # Type Parameters
/// - `T`: The numeric type used for coefficients and evaluation (e.g., `f64`).
pub trait Basis<T: Value = f64>:
    Sized + Clone + PartialEq + std::fmt::Debug + Send + Sync + Into<AnyBasis<T>>
{
    /// The basis the derivative of a represented function is expressed in.
    ///
    /// This allows the derivative to live in a different, usually smaller, basis.
    type Derivative: Basis<T>;

    /// The domain the basis functions are defined over.
    fn domain_range(&self) -> &DomainRange<T>;

    /// Number of functions in the basis. Always at least 1.
    fn n_basis(&self) -> usize;

    /// Evaluates every basis function (or its `derivative`-th derivative) at every point,
    /// without checking the points against the domain.
    ///
    /// Returns a matrix of shape `(n_basis, points.len())`; row `j` holds `φⱼ⁽ᵈ⁾` at each point.
    fn evaluate_unchecked(&self, points: &[T], derivative: usize) -> DMatrix<T>;

    /// Evaluates every basis function (or its `derivative`-th derivative) at every point.
    ///
    /// Returns a matrix of shape `(n_basis, points.len())`.
    ///
    /// # Errors
    /// Returns [`crate::error::Error::OutOfDomain`] if any point is outside the domain.
    fn evaluate(&self, points: &[T], derivative: usize) -> Result<DMatrix<T>> {
        self.evaluate_with(points, derivative, Extrapolation::Reject)
    }

    /// Same as [`Basis::evaluate`], with an explicit [`Extrapolation`] policy.
    ///
    /// # Errors
    /// Returns an error if `extrapolation` is [`Extrapolation::Reject`] and a point is outside the domain.
    fn evaluate_with(
        &self,
        points: &[T],
        derivative: usize,
        extrapolation: Extrapolation,
    ) -> Result<DMatrix<T>> {
        if extrapolation == Extrapolation::Reject {
            self.domain_range().check_points(points)?;
        }

        Ok(self.evaluate_unchecked(points, derivative))
    }

    /// Differentiates the functions represented by `coefficients`.
    ///
    /// `coefficients` has shape `(n_functions, n_basis)`, one row per function. Returns the
    /// basis the derivative is expressed in, and the derivative's coefficients against it.
    ///
    /// Evaluating the returned pair gives the same values as evaluating this basis with
    /// `derivative = order`.
    ///
    /// # Errors
    /// Returns an error if `coefficients` does not have `n_basis` columns.
    fn derivative(
        &self,
        coefficients: &DMatrix<T>,
        order: usize,
    ) -> Result<(Self::Derivative, DMatrix<T>)>;

    /// Returns the Gram matrix `G[i, j] = ∫ φᵢ(t)·φⱼ(t) dt` over the domain.
    ///
    /// The matrix is `(n_basis, n_basis)`, symmetric and positive semi-definite.
    fn gram_matrix(&self) -> DMatrix<T>;

    /// Returns a basis able to represent the pointwise product of any function in the span
    /// of `self` with any function in the span of `other`.
    ///
    /// # Errors
    /// Returns [`crate::error::Error::IncompatibleDomain`] if the domains differ.
    fn basis_of_product(&self, other: &AnyBasis<T>) -> Result<AnyBasis<T>>;

    /// Reverse half of [`Basis::basis_of_product`].
    ///
    /// Called by another basis that has no rule for combining with `self`. The domains have
    /// already been checked.
    ///
    /// # Errors
    /// Returns an error if the resulting basis cannot be constructed.
    fn rbasis_of_product(&self, other: &AnyBasis<T>) -> Result<AnyBasis<T>>;

    /// Returns a copy of this basis defined over another domain.
    ///
    /// # Errors
    /// Returns an error if the domain is not valid for this basis.
    fn with_domain_range(&self, domain_range: DomainRange<T>) -> Result<Self>;

    /// Returns true if both bases are defined over the same domain, within tolerance.
    fn same_domain<B: Basis<T>>(&self, other: &B) -> bool {
        self.domain_range().same_domain(other.domain_range())
    }

    /// Checks that `coefficients` has one column per basis function.
    ///
    /// # Errors
    /// Returns [`crate::error::Error::CoefficientShape`] otherwise.
    fn check_coefficients(&self, coefficients: &DMatrix<T>) -> Result<()> {
        if coefficients.ncols() == self.n_basis() {
            Ok(())
        } else {
            Err(crate::error::Error::CoefficientShape {
                expected: self.n_basis(),
                found: coefficients.ncols(),
            })
        }
    }
}

/// Resolves the product basis of two bases of any kind.
///
/// Convenience wrapper around [`Basis::basis_of_product`] for concrete types.
///
/// # Errors
/// Returns [`crate::error::Error::IncompatibleDomain`] if the domains differ.
///
/// # Example
/// ```rust
/// use fdbasis::basis::{basis_of_product, AnyBasis, Basis, MonomialBasis};
/// use fdbasis::DomainRange;
///
/// let domain = DomainRange::<f64>::new(0.0, 1.0).unwrap();
/// let a = MonomialBasis::new(domain.clone(), 2).unwrap();
/// let b = MonomialBasis::new(domain, 3).unwrap();
///
/// let product = basis_of_product(&a, &b).unwrap();
/// assert!(matches!(product, AnyBasis::Monomial(ref m) if m.n_basis() == 5));
/// ```
pub fn basis_of_product<A: Basis<T>, B: Basis<T>, T: Value>(
    lhs: &A,
    rhs: &B,
) -> Result<AnyBasis<T>> {
    lhs.basis_of_product(&rhs.clone().into())
}

/// The generic product rule, used when neither operand has a specific rule for the other.
///
/// Produces a B-spline basis of order `min(8, n₁ + n₂)` with `max(n₁ + n₂, order + 1)`
/// functions and uniform breakpoints.
///
/// # Errors
/// Returns an error if the domains differ, or are not one-dimensional.
pub fn default_basis_of_product<T: Value>(
    one: &AnyBasis<T>,
    other: &AnyBasis<T>,
) -> Result<AnyBasis<T>> {
    one.domain_range().ensure_same(other.domain_range())?;

    let total = one.n_basis() + other.n_basis();
    let order = total.min(8);
    let n_basis = total.max(order + 1);

    tracing::debug!(
        lhs = one.kind(),
        rhs = other.kind(),
        n_basis,
        order,
        "no specific product rule, using a B-spline basis"
    );
    Ok(BSplineBasis::new(one.domain_range().clone(), n_basis, order)?.into())
}
