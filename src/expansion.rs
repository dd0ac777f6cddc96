use nalgebra::DMatrix;

use crate::{
    basis::{AnyBasis, Basis},
    domain::Extrapolation,
    error::{Error, Result},
    quadrature,
    value::{linspace, Value},
    SampledFunctions,
};

/// Fewest Gauss-Legendre nodes per interval for inner products across different bases.
const MIN_QUADRATURE_NODES: usize = 12;

/// A set of functions represented as coefficients in a shared basis.
///
/// Row `i` of the coefficient matrix holds the coefficients of function `i`:
/// ```math
/// fᵢ(t) = Σ (C[i, j] * φ_j(t))
/// ```
///
/// # Type Parameters
/// - `B`: The basis (e.g., [`crate::basis::MonomialBasis`], [`crate::basis::AnyBasis`]).
/// - `T`: Numeric type for the coefficients, default is `f64`.
///
/// # Example
/// ```rust
/// use fdbasis::{basis::MonomialBasis, nalgebra::DMatrix, BasisExpansion, DomainRange};
///
/// let basis = MonomialBasis::new(DomainRange::<f64>::new(0.0, 2.0).unwrap(), 3).unwrap();
///
/// // f(t) = 1 + t², g(t) = 2t
/// let coefficients = DMatrix::from_row_slice(2, 3, &[1.0, 0.0, 1.0, 0.0, 2.0, 0.0]);
/// let functions = BasisExpansion::new(basis, coefficients).unwrap();
///
/// let values = functions.evaluate(&[1.0, 2.0]).unwrap();
/// assert_eq!(values[(0, 1)], 5.0);
/// assert_eq!(values[(1, 1)], 4.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BasisExpansion<B: Basis<T>, T: Value = f64> {
    basis: B,
    coefficients: DMatrix<T>,
}
impl<B: Basis<T>, T: Value> BasisExpansion<B, T> {
    /// Creates an expansion from a basis and a coefficient matrix of shape `(n_functions, n_basis)`.
    ///
    /// # Errors
    /// Returns [`Error::CoefficientShape`] if the matrix does not have `n_basis` columns.
    pub fn new(basis: B, coefficients: DMatrix<T>) -> Result<Self> {
        basis.check_coefficients(&coefficients)?;
        Ok(Self {
            basis,
            coefficients,
        })
    }

    /// Creates an expansion holding a single function.
    ///
    /// # Errors
    /// Returns [`Error::CoefficientShape`] if there is not one coefficient per basis function.
    pub fn from_coefficients(basis: B, coefficients: &[T]) -> Result<Self> {
        Self::new(basis, DMatrix::from_row_slice(1, coefficients.len(), coefficients))
    }

    /// The basis the functions are expressed in.
    #[must_use]
    pub fn basis(&self) -> &B {
        &self.basis
    }

    /// The coefficient matrix, one row per function.
    #[must_use]
    pub fn coefficients(&self) -> &DMatrix<T> {
        &self.coefficients
    }

    /// Number of functions in the expansion.
    #[must_use]
    pub fn n_functions(&self) -> usize {
        self.coefficients.nrows()
    }

    /// Decomposes the expansion into its basis and coefficients.
    #[must_use]
    pub fn into_inner(self) -> (B, DMatrix<T>) {
        (self.basis, self.coefficients)
    }

    /// Evaluates every function at every point.
    ///
    /// Returns a matrix of shape `(n_functions, points.len())`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfDomain`] if a point is outside the domain of the basis.
    pub fn evaluate(&self, points: &[T]) -> Result<DMatrix<T>> {
        self.evaluate_with(points, 0, Extrapolation::Reject)
    }

    /// Evaluates the `derivative`-th derivative of every function at every point.
    ///
    /// # Errors
    /// Returns [`Error::OutOfDomain`] if a point is outside the domain of the basis.
    pub fn evaluate_derivative(&self, points: &[T], derivative: usize) -> Result<DMatrix<T>> {
        self.evaluate_with(points, derivative, Extrapolation::Reject)
    }

    /// Evaluates the `derivative`-th derivative of every function, with an explicit
    /// [`Extrapolation`] policy.
    ///
    /// # Errors
    /// Returns an error if `extrapolation` is [`Extrapolation::Reject`] and a point is outside the domain.
    pub fn evaluate_with(
        &self,
        points: &[T],
        derivative: usize,
        extrapolation: Extrapolation,
    ) -> Result<DMatrix<T>> {
        if extrapolation == Extrapolation::Reject {
            self.basis.domain_range().check_points(points)?;
        }

        let values = self.basis_values(points, derivative);
        Ok(&self.coefficients * values)
    }

    /// Evaluates the basis, in parallel chunks of points if appropriate.
    fn basis_values(&self, points: &[T], derivative: usize) -> DMatrix<T> {
        #[cfg(not(feature = "parallel"))]
        let values = self.basis.evaluate_unchecked(points, derivative);

        #[cfg(feature = "parallel")]
        let values = {
            use rayon::prelude::*;
            const MIN_POINTS_TO_PARALLEL: usize = 50_000;

            if points.len() < MIN_POINTS_TO_PARALLEL {
                self.basis.evaluate_unchecked(points, derivative)
            } else {
                // Each thread evaluates a contiguous block of points, which become a block of columns
                let threads = rayon::current_num_threads();
                let chunk_size = (points.len() / threads).max(1);
                let blocks: Vec<DMatrix<T>> = points
                    .par_chunks(chunk_size)
                    .map(|chunk| self.basis.evaluate_unchecked(chunk, derivative))
                    .collect();

                let mut values = DMatrix::zeros(self.basis.n_basis(), points.len());
                let mut offset = 0;
                for block in blocks {
                    values.columns_mut(offset, block.ncols()).copy_from(&block);
                    offset += block.ncols();
                }
                values
            }
        };

        values
    }

    /// Differentiates every function `order` times.
    ///
    /// The result is expressed in the derivative basis chosen by [`Basis::derivative`].
    ///
    /// # Errors
    /// Returns an error if the derivative basis cannot be constructed.
    pub fn derivative(&self, order: usize) -> Result<BasisExpansion<B::Derivative, T>> {
        let (basis, coefficients) = self.basis.derivative(&self.coefficients, order)?;
        Ok(BasisExpansion {
            basis,
            coefficients,
        })
    }

    /// Computes the L² inner products `∫ fᵢ(t)·gⱼ(t) dt` between every function of `self`
    /// and every function of `other`.
    ///
    /// Returns a matrix of shape `(self.n_functions(), other.n_functions())`.
    ///
    /// When both expansions share the same basis this is `C₁ G C₂ᵀ`, with `G` the Gram matrix.
    /// Otherwise the products are integrated with Gauss-Legendre quadrature.
    ///
    /// # Errors
    /// Returns [`Error::IncompatibleDomain`] if the domains differ.
    pub fn inner_product_matrix<B2: Basis<T>>(
        &self,
        other: &BasisExpansion<B2, T>,
    ) -> Result<DMatrix<T>> {
        let domain = self.basis.domain_range();
        domain.ensure_same(other.basis.domain_range())?;

        let lhs: AnyBasis<T> = self.basis.clone().into();
        let rhs: AnyBasis<T> = other.basis.clone().into();
        if lhs == rhs {
            let gram = self.basis.gram_matrix();
            return Ok(&self.coefficients * gram * other.coefficients.transpose());
        }

        // Polynomial pieces of both bases integrate exactly with this many nodes; the
        // subdivisions take care of oscillating bases
        let n = self.basis.n_basis().max(other.basis.n_basis());
        let nodes = (n + 1).max(MIN_QUADRATURE_NODES);
        let breakpoints = quadrature_breakpoints(&lhs, &rhs, n);

        tracing::debug!(
            lhs = lhs.kind(),
            rhs = rhs.kind(),
            intervals = breakpoints.len() - 1,
            nodes,
            "inner product of different bases, using quadrature"
        );

        let rule = quadrature::gauss_legendre::<T>(nodes);
        let mut result = DMatrix::zeros(self.n_functions(), other.n_functions());
        for window in breakpoints.windows(2) {
            let mapped = quadrature::map_rule(&rule, window[0], window[1]);
            let points: Vec<T> = mapped.iter().map(|(x, _)| *x).collect();

            let f = &self.coefficients * self.basis.evaluate_unchecked(&points, 0);
            let mut g = &other.coefficients * other.basis.evaluate_unchecked(&points, 0);
            for (k, (_, w)) in mapped.iter().enumerate() {
                g.column_mut(k).scale_mut(*w);
            }

            result += f * g.transpose();
        }

        Ok(result)
    }

    /// Samples every function at the given points.
    ///
    /// # Errors
    /// Returns an error if the points are not strictly increasing or lie outside the domain.
    pub fn to_samples(&self, points: &[T]) -> Result<SampledFunctions<T>> {
        if points.is_empty() {
            return Err(Error::NoData);
        }

        let values = self.evaluate(points)?;
        SampledFunctions::new(
            points.to_vec(),
            values,
            self.basis.domain_range().clone(),
        )
    }
}

/// Integration intervals for the product of functions from two bases.
///
/// The breakpoints of any B-spline basis are kept so each interval only sees one polynomial
/// piece. The rest of the domain is split into `subdivisions` equal parts.
fn quadrature_breakpoints<T: Value>(
    lhs: &AnyBasis<T>,
    rhs: &AnyBasis<T>,
    subdivisions: usize,
) -> Vec<T> {
    let domain = lhs.domain_range();
    let mut breakpoints = linspace(domain.start(), domain.end(), subdivisions.max(1) + 1);
    for basis in [lhs, rhs] {
        if let AnyBasis::BSpline(spline) = basis {
            breakpoints.extend_from_slice(spline.breakpoints());
        }
    }

    breakpoints.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    breakpoints.dedup_by(|a, b| a.is_close(*b, T::epsilon()));
    breakpoints
}
