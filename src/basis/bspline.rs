use std::sync::Arc;

use nalgebra::DMatrix;

use crate::{
    basis::{AnyBasis, Basis},
    domain::DomainRange,
    error::{Error, Result},
    quadrature,
    value::{linspace, Value},
};

/// Default order of a B-spline basis (cubic splines).
pub const DEFAULT_ORDER: usize = 4;

/// Highest order produced when multiplying two B-spline bases.
const MAX_PRODUCT_ORDER: usize = 20;

/// Highest order produced when multiplying a B-spline basis with another kind of basis.
const MAX_MIXED_PRODUCT_ORDER: usize = 8;

/// B-spline basis of piecewise polynomials.
///
/// A B-spline basis of order `k` (degree `k - 1`) is defined by an increasing list of
/// breakpoints `a = b₀ < b₁ < … < bₘ₋₁ = b`. Every function is a polynomial of degree `k - 1`
/// between consecutive breakpoints, `k - 2` times continuously differentiable across them, and
/// nonzero over at most `k` intervals. There are `m + k - 2` functions, and they sum to 1
/// everywhere in the domain.
///
/// The functions are computed with the Cox-de Boor recursion over the clamped knot vector:
/// the breakpoints, with both ends repeated `k` times.
///
/// # When to use
/// - Use for non-periodic data that needs local flexibility.
/// - The Gram matrix is banded and well conditioned, unlike the monomial one.
///
/// # Example
/// ```rust
/// use fdbasis::{basis::{Basis, BSplineBasis}, DomainRange};
///
/// let basis = BSplineBasis::new(DomainRange::<f64>::new(0.0, 1.0).unwrap(), 6, 4).unwrap();
/// let values = basis.evaluate(&[0.3], 0).unwrap();
/// assert!((values.sum() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineBasis<T: Value = f64> {
    domain_range: DomainRange<T>,
    n_basis: usize,
    order: usize,
    breakpoints: Arc<[T]>,
}
impl<T: Value> BSplineBasis<T> {
    /// Creates a B-spline basis with `n_basis` functions of the given `order`, and uniformly
    /// spaced breakpoints.
    ///
    /// # Errors
    /// Returns an error if `order` is 0, `n_basis < order`, or the domain is not one-dimensional.
    pub fn new(domain_range: DomainRange<T>, n_basis: usize, order: usize) -> Result<Self> {
        if n_basis == 0 {
            return Err(Error::InvalidNumberOfBasis(n_basis));
        }

        if order == 0 {
            return Err(Error::InvalidParameter("order must be at least 1"));
        }

        if n_basis < order {
            return Err(Error::InvalidParameter(
                "n_basis must be at least the order",
            ));
        }

        domain_range.ensure_dim(1)?;
        let breakpoints = linspace(
            domain_range.start(),
            domain_range.end(),
            n_basis - order + 2,
        );
        Self::with_breakpoints(domain_range, order, &breakpoints)
    }

    /// Creates a cubic B-spline basis ([`DEFAULT_ORDER`]) with uniformly spaced breakpoints.
    ///
    /// # Errors
    /// Returns an error if `n_basis < 4`, or the domain is not one-dimensional.
    pub fn cubic(domain_range: DomainRange<T>, n_basis: usize) -> Result<Self> {
        Self::new(domain_range, n_basis, DEFAULT_ORDER)
    }

    /// Creates a B-spline basis of the given `order` over explicit breakpoints.
    ///
    /// The breakpoints must be strictly increasing, and start and end at the ends of the
    /// domain. The number of functions is `breakpoints.len() + order - 2`.
    ///
    /// # Errors
    /// Returns an error if the order is 0, or the breakpoints are invalid.
    pub fn with_breakpoints(
        domain_range: DomainRange<T>,
        order: usize,
        breakpoints: &[T],
    ) -> Result<Self> {
        if order == 0 {
            return Err(Error::InvalidParameter("order must be at least 1"));
        }

        domain_range.ensure_dim(1)?;
        if breakpoints.len() < 2 {
            return Err(Error::InvalidParameter(
                "at least 2 breakpoints are required",
            ));
        }

        if breakpoints
            .iter()
            .any(|b| !num_traits::float::FloatCore::is_finite(*b))
        {
            return Err(Error::InvalidParameter("breakpoints must be finite"));
        }

        if breakpoints.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidParameter(
                "breakpoints must be strictly increasing",
            ));
        }

        let tol = DomainRange::<T>::default_tolerance();
        let (first, last) = (breakpoints[0], breakpoints[breakpoints.len() - 1]);
        if !first.is_close(domain_range.start(), tol) || !last.is_close(domain_range.end(), tol) {
            return Err(Error::InvalidParameter("breakpoints must span the domain"));
        }

        // Snap the ends so the knot vector matches the domain exactly
        let mut breakpoints = breakpoints.to_vec();
        let end = breakpoints.len() - 1;
        breakpoints[0] = domain_range.start();
        breakpoints[end] = domain_range.end();
        if breakpoints.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidParameter(
                "breakpoints must be strictly increasing",
            ));
        }

        Ok(Self {
            n_basis: breakpoints.len() + order - 2,
            domain_range,
            order,
            breakpoints: breakpoints.into(),
        })
    }

    /// Order of the polynomial pieces (degree + 1).
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// The breakpoints, from the start to the end of the domain.
    #[must_use]
    pub fn breakpoints(&self) -> &[T] {
        &self.breakpoints
    }

    /// The clamped knot vector: the breakpoints with both ends repeated `order` times.
    ///
    /// Has `n_basis + order` entries.
    #[must_use]
    pub fn knots(&self) -> Vec<T> {
        let (a, b) = (self.domain_range.start(), self.domain_range.end());
        let interior = &self.breakpoints[1..self.breakpoints.len() - 1];

        let mut knots = Vec::with_capacity(self.n_basis + self.order);
        knots.extend(std::iter::repeat_n(a, self.order));
        knots.extend_from_slice(interior);
        knots.extend(std::iter::repeat_n(b, self.order));
        knots
    }

    /// Index `μ` of the knot interval `[t_μ, t_μ+1)` used to evaluate at `x`.
    ///
    /// The right end of the domain belongs to the last interval, and points outside the domain
    /// use the nearest boundary interval.
    fn span(&self, knots: &[T], x: T) -> usize {
        let (first, last) = (self.order - 1, self.n_basis - 1);
        let at_or_below = knots[first..=last].partition_point(|&t| t <= x);
        first + at_or_below.saturating_sub(1)
    }

    /// Values at `x` of the `derivative`-th derivative of every basis function.
    fn evaluate_point(&self, knots: &[T], x: T, derivative: usize, out: &mut [T]) {
        let k = self.order;
        if derivative >= k {
            out.fill(T::zero());
            return;
        }

        // Order 1 splines are interval indicators
        let mut values = vec![T::zero(); knots.len() - 1];
        values[self.span(knots, x)] = T::one();

        // Cox-de Boor up to order k - derivative
        for m in 2..=k - derivative {
            for i in 0..knots.len() - m {
                let left = ratio(x - knots[i], knots[i + m - 1] - knots[i]);
                let right = ratio(knots[i + m] - x, knots[i + m] - knots[i + 1]);
                values[i] = left * values[i] + right * values[i + 1];
            }
        }

        // Each remaining order differentiates once:
        // D B(i, m) = (m - 1) (B(i, m-1) / (t[i+m-1] - t[i]) - B(i+1, m-1) / (t[i+m] - t[i+1]))
        for m in k - derivative + 1..=k {
            let scale = T::from_positive_int(m - 1);
            for i in 0..knots.len() - m {
                let left = ratio(values[i], knots[i + m - 1] - knots[i]);
                let right = ratio(values[i + 1], knots[i + m] - knots[i + 1]);
                values[i] = scale * (left - right);
            }
        }

        out.copy_from_slice(&values[..self.n_basis]);
    }

    /// The basis with every breakpoint in `self` or `other`.
    fn merged_breakpoints(&self, other: &Self) -> Vec<T> {
        let mut merged: Vec<T> = self
            .breakpoints
            .iter()
            .chain(other.breakpoints.iter())
            .copied()
            .collect();
        merged.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let tol = DomainRange::<T>::default_tolerance();
        merged.dedup_by(|a, b| a.is_close(*b, tol));
        merged
    }

    /// Product rule for a B-spline basis and a non-constant basis of another kind.
    fn mixed_product(&self, other: &AnyBasis<T>) -> Result<AnyBasis<T>> {
        let order = (self.order + 2).min(MAX_MIXED_PRODUCT_ORDER);
        let n_basis = (self.n_basis + other.n_basis()).max(order + 1);

        tracing::debug!(
            other = other.kind(),
            n_basis,
            order,
            "b-spline product with another kind of basis"
        );
        Ok(Self::new(self.domain_range.clone(), n_basis, order)?.into())
    }
}
/// `num / den`, or 0 if `den` is 0 (the convention for repeated knots).
fn ratio<T: Value>(num: T, den: T) -> T {
    if den == T::zero() {
        T::zero()
    } else {
        num / den
    }
}

impl<T: Value> Basis<T> for BSplineBasis<T> {
    type Derivative = Self;

    fn domain_range(&self) -> &DomainRange<T> {
        &self.domain_range
    }

    fn n_basis(&self) -> usize {
        self.n_basis
    }

    fn evaluate_unchecked(&self, points: &[T], derivative: usize) -> DMatrix<T> {
        let knots = self.knots();
        let mut values = DMatrix::zeros(self.n_basis, points.len());
        let mut column = vec![T::zero(); self.n_basis];

        for (j, &x) in points.iter().enumerate() {
            self.evaluate_point(&knots, x, derivative, &mut column);
            values.column_mut(j).copy_from_slice(&column);
        }

        values
    }

    fn derivative(&self, coefficients: &DMatrix<T>, order: usize) -> Result<(Self, DMatrix<T>)> {
        self.check_coefficients(coefficients)?;

        let mut basis = self.clone();
        let mut coefs = coefficients.clone();
        for step in 0..order {
            if basis.order == 1 {
                // Piecewise constants: every further derivative is 0 away from the breakpoints
                tracing::debug!(
                    remaining = order - step,
                    "derivative of an order 1 b-spline basis, result is the zero function"
                );
                coefs.fill(T::zero());
                break;
            }

            // The knots of the order k-1 basis are the same, minus one copy of each end
            let knots = basis.knots();
            let k = basis.order;
            let scale = T::from_positive_int(k - 1);
            let derived = DMatrix::from_fn(coefs.nrows(), basis.n_basis - 1, |row, i| {
                let diff = coefs[(row, i + 1)] - coefs[(row, i)];
                scale * ratio(diff, knots[i + k] - knots[i + 1])
            });

            basis = Self::with_breakpoints(basis.domain_range.clone(), k - 1, &basis.breakpoints)?;
            coefs = derived;
        }

        Ok((basis, coefs))
    }

    /// Gauss-Legendre quadrature on every breakpoint interval.
    ///
    /// With `order` nodes per interval, the products of two pieces (degree `2·order - 2`)
    /// integrate exactly.
    fn gram_matrix(&self) -> DMatrix<T> {
        quadrature::numerical_gram_matrix(self, &self.breakpoints, self.order)
    }

    fn basis_of_product(&self, other: &AnyBasis<T>) -> Result<AnyBasis<T>> {
        self.domain_range.ensure_same(other.domain_range())?;

        match other {
            AnyBasis::BSpline(other) => {
                let breakpoints = self.merged_breakpoints(other);
                let order = (self.order + other.order - 1).min(MAX_PRODUCT_ORDER);
                Ok(Self::with_breakpoints(self.domain_range.clone(), order, &breakpoints)?.into())
            }

            AnyBasis::Constant(_) => Ok(self.clone().into()),

            _ => self.mixed_product(other),
        }
    }

    fn rbasis_of_product(&self, other: &AnyBasis<T>) -> Result<AnyBasis<T>> {
        self.mixed_product(other)
    }

    /// The breakpoints are mapped affinely onto the new domain.
    fn with_domain_range(&self, domain_range: DomainRange<T>) -> Result<Self> {
        let (a, b) = (self.domain_range.start(), self.domain_range.end());
        let (c, d) = (domain_range.start(), domain_range.end());
        let scale = (d - c) / (b - a);

        let breakpoints: Vec<T> = self
            .breakpoints
            .iter()
            .map(|&x| c + (x - a) * scale)
            .collect();
        Self::with_breakpoints(domain_range, self.order, &breakpoints)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::{
        assert_all_close, assert_close, assert_matrix_close,
        basis::MonomialBasis,
        test::basis_assertions::{
            assert_derivative_composes, assert_derivative_consistent, assert_evaluation,
            assert_gram_symmetric_psd,
        },
        Extrapolation,
    };

    fn unit() -> DomainRange {
        DomainRange::new(0.0, 1.0).unwrap()
    }

    #[test]
    fn test_bspline_construction() {
        let basis = BSplineBasis::new(unit(), 5, 3).unwrap();
        assert_eq!(basis.n_basis(), 5);
        assert_eq!(basis.order(), 3);
        assert_all_close!(basis.breakpoints(), [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0]);
        assert_all_close!(
            basis.knots(),
            [0.0, 0.0, 0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0, 1.0, 1.0]
        );

        let custom = BSplineBasis::with_breakpoints(unit(), 4, &[0.0, 0.2, 0.9, 1.0]).unwrap();
        assert_eq!(custom.n_basis(), 6);
        assert_eq!(custom.knots().len(), 10);

        let cubic = BSplineBasis::cubic(unit(), 6).unwrap();
        assert_eq!(cubic.order(), DEFAULT_ORDER);
        assert_eq!(cubic, BSplineBasis::new(unit(), 6, 4).unwrap());
        assert!(BSplineBasis::cubic(unit(), 3).is_err());
    }

    #[test]
    fn test_bspline_rejects_bad_parameters() {
        assert!(matches!(
            BSplineBasis::new(unit(), 0, 4),
            Err(Error::InvalidNumberOfBasis(0))
        ));
        assert!(matches!(
            BSplineBasis::new(unit(), 3, 0),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            BSplineBasis::new(unit(), 3, 4),
            Err(Error::InvalidParameter(_))
        ));

        for breakpoints in [
            &[0.0][..],
            &[0.0, 0.5, 0.5, 1.0][..],
            &[0.0, 0.7, 0.3, 1.0][..],
            &[0.1, 0.5, 1.0][..],
            &[0.0, 0.5, 2.0][..],
            &[0.0, f64::NAN, 1.0][..],
        ] {
            assert!(
                BSplineBasis::with_breakpoints(unit(), 4, breakpoints).is_err(),
                "{breakpoints:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_bspline_bernstein() {
        // A single interval with n_basis == order gives the Bernstein polynomials
        let basis = BSplineBasis::new(unit(), 4, 4).unwrap();
        let points = [0.0, 0.5, 1.0];

        assert_evaluation(
            &basis,
            &points,
            0,
            &[
                &[1.0, 0.125, 0.0],
                &[0.0, 0.375, 0.0],
                &[0.0, 0.375, 0.0],
                &[0.0, 0.125, 1.0],
            ],
            1e-14,
        );
        assert_evaluation(
            &basis,
            &points,
            1,
            &[
                &[-3.0, -0.75, 0.0],
                &[3.0, -0.75, 0.0],
                &[0.0, 0.75, -3.0],
                &[0.0, 0.75, 3.0],
            ],
            1e-14,
        );

        // ∫ Bᵢ Bⱼ = C(3,i) C(3,j) / (7 C(6,i+j))
        let gram = basis.gram_matrix();
        assert_close!(gram[(0, 0)], 1.0 / 7.0);
        assert_close!(gram[(0, 3)], 1.0 / 140.0);
        assert_close!(gram[(1, 2)], 9.0 / 140.0);
    }

    #[test]
    fn test_bspline_hat_functions() {
        let basis = BSplineBasis::new(unit(), 3, 2).unwrap();
        assert_evaluation(
            &basis,
            &[0.0, 0.25, 0.5, 1.0],
            0,
            &[
                &[1.0, 0.5, 0.0, 0.0],
                &[0.0, 0.5, 1.0, 0.0],
                &[0.0, 0.0, 0.0, 1.0],
            ],
            1e-15,
        );

        // Linear pieces extend past the ends when extrapolating
        let line = BSplineBasis::new(unit(), 2, 2).unwrap();
        let values = line.evaluate_with(&[2.0, -1.0], 0, Extrapolation::Allow).unwrap();
        assert_all_close!(values.column(0), [-1.0, 2.0]);
        assert_all_close!(values.column(1), [2.0, -1.0]);
        assert!(line.evaluate(&[2.0], 0).is_err());
    }

    #[test]
    fn test_bspline_order_one() {
        let basis = BSplineBasis::new(unit(), 4, 1).unwrap();
        assert_evaluation(
            &basis,
            &[0.0, 0.3, 0.5, 0.99, 1.0],
            0,
            &[
                &[1.0, 0.0, 0.0, 0.0, 0.0],
                &[0.0, 1.0, 0.0, 0.0, 0.0],
                &[0.0, 0.0, 1.0, 0.0, 0.0],
                &[0.0, 0.0, 0.0, 1.0, 1.0],
            ],
            0.0,
        );

        let coefs = DMatrix::from_row_slice(1, 4, &[1.0, 2.0, 3.0, 4.0]);
        let (d_basis, d) = basis.derivative(&coefs, 1).unwrap();
        assert_eq!(d_basis, basis);
        assert_eq!(d, DMatrix::zeros(1, 4));
    }

    #[test]
    fn test_bspline_partition_of_unity() {
        let basis = BSplineBasis::with_breakpoints(unit(), 4, &[0.0, 0.1, 0.15, 0.6, 1.0]).unwrap();
        let points = linspace(0.0, 1.0, 41);
        let values = basis.evaluate(&points, 0).unwrap();

        for (j, column) in values.column_iter().enumerate() {
            assert_close!(column.sum(), 1.0, "at t = {}", points[j]);
            assert!(column.iter().all(|v| *v >= -1e-15));
        }

        // Derivatives of a partition of unity sum to zero
        let slopes = basis.evaluate(&points, 1).unwrap();
        for column in slopes.column_iter() {
            assert_close!(column.sum(), 0.0, tol = 1e-10);
        }
    }

    #[test]
    fn test_bspline_derivative() {
        let basis = BSplineBasis::with_breakpoints(unit(), 4, &[0.0, 0.25, 0.4, 0.8, 1.0]).unwrap();
        let coefs = DMatrix::from_fn(3, basis.n_basis(), |i, j| {
            ((i + 1) * j * j) as f64 - 2.0 * i as f64
        });

        // Stay away from the breakpoints, where higher derivatives jump
        let points = linspace(0.01, 0.99, 23);
        for order in 0..6 {
            assert_derivative_consistent(&basis, &coefs, order, &points, 1e-10);
        }
        assert_derivative_composes(&basis, &coefs, &points, 1e-10);

        let (d_basis, d) = basis.derivative(&coefs, 1).unwrap();
        assert_eq!(d_basis.order(), 3);
        assert_eq!(d_basis.n_basis(), basis.n_basis() - 1);
        assert_eq!(d_basis.breakpoints(), basis.breakpoints());
        assert_eq!(d.shape(), (3, basis.n_basis() - 1));

        let (d_basis, d) = basis.derivative(&coefs, 7).unwrap();
        assert_eq!(d_basis.order(), 1);
        assert!(d.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_bspline_gram() {
        let basis = BSplineBasis::with_breakpoints(unit(), 3, &[0.0, 0.3, 0.5, 1.0]).unwrap();
        assert_gram_symmetric_psd(&basis, 1e-12);

        // Exact rule per interval, so more nodes change nothing
        let refined = quadrature::numerical_gram_matrix(&basis, basis.breakpoints(), 12);
        assert_matrix_close!(basis.gram_matrix(), refined);

        // Partition of unity: all entries add up to the length of the domain
        assert_close!(basis.gram_matrix().sum(), 1.0);

        // Compact support: functions more than `order` apart never overlap
        let wide = BSplineBasis::new(unit(), 8, 3).unwrap();
        let gram = wide.gram_matrix();
        assert_eq!(gram[(0, 5)], 0.0);
        assert!(gram[(0, 2)] > 0.0);
    }

    #[test]
    fn test_bspline_product() {
        let a = BSplineBasis::new(unit(), 5, 4).unwrap();
        let b = BSplineBasis::new(unit(), 4, 3).unwrap();

        match a.basis_of_product(&b.into()).unwrap() {
            AnyBasis::BSpline(product) => {
                assert_eq!(product.order(), 6);
                assert_all_close!(product.breakpoints(), [0.0, 0.5, 1.0]);
                assert_eq!(product.n_basis(), 7);
            }
            other => panic!("Expected a B-spline basis, got {other:?}"),
        }

        let c = BSplineBasis::new(unit(), 5, 3).unwrap();
        match a.basis_of_product(&c.into()).unwrap() {
            AnyBasis::BSpline(product) => {
                assert_all_close!(product.breakpoints(), [0.0, 1.0 / 3.0, 0.5, 2.0 / 3.0, 1.0]);
                assert_eq!(product.n_basis(), 9);
            }
            other => panic!("Expected a B-spline basis, got {other:?}"),
        }

        // High orders are capped
        let high = BSplineBasis::new(unit(), 15, 15).unwrap();
        let product = high.basis_of_product(&high.clone().into()).unwrap();
        assert!(matches!(product, AnyBasis::BSpline(ref p) if p.order() == 20));
    }

    #[test]
    fn test_bspline_mixed_product() {
        let spline = BSplineBasis::new(unit(), 5, 4).unwrap();
        let monomial: AnyBasis = MonomialBasis::new(unit(), 3).unwrap().into();

        let lhs = spline.basis_of_product(&monomial).unwrap();
        let rhs = monomial.basis_of_product(&spline.clone().into()).unwrap();
        assert_eq!(lhs, rhs);
        match lhs {
            AnyBasis::BSpline(product) => {
                assert_eq!(product.order(), 6);
                assert_eq!(product.n_basis(), 8);
            }
            other => panic!("Expected a B-spline basis, got {other:?}"),
        }

        let constant: AnyBasis = crate::basis::ConstantBasis::new(unit()).unwrap().into();
        assert_eq!(spline.basis_of_product(&constant).unwrap(), spline.clone().into());
        assert_eq!(constant.basis_of_product(&spline.clone().into()).unwrap(), spline.into());
    }

    #[test]
    fn test_bspline_with_domain_range() {
        let basis = BSplineBasis::with_breakpoints(unit(), 3, &[0.0, 0.25, 1.0]).unwrap();
        let moved = basis.with_domain_range(DomainRange::new(2.0, 6.0).unwrap()).unwrap();
        assert_all_close!(moved.breakpoints(), [2.0, 3.0, 6.0]);
        assert_eq!(moved.n_basis(), basis.n_basis());
        assert_eq!(moved.order(), 3);
    }
}
