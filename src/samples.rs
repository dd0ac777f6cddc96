use nalgebra::{DMatrix, SVD};

use crate::{
    basis::Basis,
    domain::DomainRange,
    error::{Error, Result},
    value::Value,
    BasisExpansion,
};

/// A set of functions known by their values on a shared grid of sample points.
///
/// This is the discretized counterpart of [`BasisExpansion`]: row `i` of the data matrix holds
/// the values of function `i` at each sample point.
///
/// # Example
/// ```rust
/// use fdbasis::{basis::MonomialBasis, nalgebra::DMatrix, DomainRange, SampledFunctions};
///
/// let domain = DomainRange::<f64>::new(0.0, 2.0).unwrap();
/// let points = vec![0.0, 0.5, 1.0, 1.5, 2.0];
///
/// // f(t) = 3 - t
/// let data = DMatrix::from_row_slice(1, 5, &[3.0, 2.5, 2.0, 1.5, 1.0]);
/// let samples = SampledFunctions::new(points, data, domain.clone()).unwrap();
///
/// let basis = MonomialBasis::new(domain, 2).unwrap();
/// let functions = samples.to_basis(basis).unwrap();
/// assert!((functions.coefficients()[(0, 0)] - 3.0).abs() < 1e-12);
/// assert!((functions.coefficients()[(0, 1)] + 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SampledFunctions<T: Value = f64> {
    points: Vec<T>,
    data: DMatrix<T>,
    domain_range: DomainRange<T>,
}
impl<T: Value> SampledFunctions<T> {
    /// Creates sampled functions from sample points and a data matrix of shape
    /// `(n_samples, points.len())`.
    ///
    /// # Errors
    /// Returns an error if there are no points, the points are not strictly increasing or lie
    /// outside the domain, or the data does not have one column per point.
    pub fn new(points: Vec<T>, data: DMatrix<T>, domain_range: DomainRange<T>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::NoData);
        }

        if data.ncols() != points.len() {
            return Err(Error::SampleShape {
                expected: points.len(),
                found: data.ncols(),
            });
        }

        if points.windows(2).any(|w| w[0] >= w[1] || w[0].is_nan()) {
            return Err(Error::UnsortedSamplePoints);
        }

        domain_range.check_points(&points)?;
        Ok(Self {
            points,
            data,
            domain_range,
        })
    }

    /// Builds sampled functions from ragged `(args, values)` records.
    ///
    /// The sample points are the sorted union of every record's arguments, and the domain spans
    /// the smallest to the largest of them. A record with no value at some sample point gets a 0
    /// there.
    ///
    /// # Errors
    /// Returns an error if there are no records, a record has a different number of arguments
    /// and values, or all arguments are equal (the domain would be empty).
    ///
    /// # Example
    /// ```rust
    /// use fdbasis::SampledFunctions;
    ///
    /// let records = [
    ///     (vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]),
    ///     (vec![2.0, 4.0], vec![5.0, 7.0]),
    /// ];
    /// let samples = SampledFunctions::from_records(&records).unwrap();
    /// assert_eq!(samples.points(), &[1.0, 2.0, 3.0, 4.0]);
    /// assert_eq!(samples.data().row(1).iter().copied().collect::<Vec<_>>(), vec![0.0, 5.0, 0.0, 7.0]);
    /// ```
    pub fn from_records<A: AsRef<[T]>, V: AsRef<[T]>>(records: &[(A, V)]) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::NoData);
        }

        let mut points = Vec::new();
        for (args, values) in records {
            let (args, values) = (args.as_ref(), values.as_ref());
            if args.len() != values.len() {
                return Err(Error::SampleShape {
                    expected: args.len(),
                    found: values.len(),
                });
            }

            if args.iter().any(|a| !num_traits::float::FloatCore::is_finite(*a)) {
                return Err(Error::InvalidParameter("sample points must be finite"));
            }

            points.extend_from_slice(args);
        }

        points.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        points.dedup();
        let (Some(&start), Some(&end)) = (points.first(), points.last()) else {
            return Err(Error::NoData);
        };

        let mut data = DMatrix::zeros(records.len(), points.len());
        for (row, (args, values)) in records.iter().enumerate() {
            for (arg, value) in args.as_ref().iter().zip(values.as_ref()) {
                // Every argument is in the union, so the search always succeeds
                if let Ok(col) = points.binary_search_by(|p| {
                    p.partial_cmp(arg).unwrap_or(std::cmp::Ordering::Equal)
                }) {
                    data[(row, col)] = *value;
                }
            }
        }

        tracing::debug!(
            records = records.len(),
            points = points.len(),
            "merged ragged records onto a shared grid"
        );
        Self::new(points, data, DomainRange::new(start, end)?)
    }

    /// The sample points, strictly increasing.
    #[must_use]
    pub fn points(&self) -> &[T] {
        &self.points
    }

    /// The data matrix, one row per function and one column per sample point.
    #[must_use]
    pub fn data(&self) -> &DMatrix<T> {
        &self.data
    }

    /// The domain the functions are defined over.
    #[must_use]
    pub fn domain_range(&self) -> &DomainRange<T> {
        &self.domain_range
    }

    /// Number of functions.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    /// Number of sample points.
    #[must_use]
    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    /// Projects the functions onto a basis, by least squares on the sample points.
    ///
    /// Finds the coefficients `C` minimizing `‖C Φ - Y‖`, with `Φ` the basis evaluated at the
    /// sample points and `Y` the data, using the SVD of `Φᵀ`.
    ///
    /// # Errors
    /// Returns an error if the sample points lie outside the domain of the basis, there are
    /// fewer sample points than basis functions, or the system cannot be solved.
    pub fn to_basis<B: Basis<T>>(&self, basis: B) -> Result<BasisExpansion<B, T>> {
        let n_basis = basis.n_basis();
        if self.points.len() < n_basis {
            return Err(Error::Underdetermined {
                points: self.points.len(),
                n_basis,
            });
        }

        let design = basis.evaluate(&self.points, 0)?.transpose();
        let coefficients = Self::solve_least_squares(design, &self.data.transpose())?;

        tracing::debug!(
            n_samples = self.n_samples(),
            n_points = self.n_points(),
            n_basis,
            "projected samples onto basis"
        );
        BasisExpansion::new(basis, coefficients.transpose())
    }

    /// Solves `A X = B` in the least squares sense using SVD.
    fn solve_least_squares(a: DMatrix<T>, b: &DMatrix<T>) -> Result<DMatrix<T>> {
        let size = a.shape();

        // Calculate the singular value decomposition of the matrix
        let decomp = SVD::new_unordered(a, true, true);

        // Calculate epsilon value
        // ~= machine_epsilon * max(size) * max_singular
        let machine_epsilon = T::epsilon();
        let max_size = size.0.max(size.1);
        let sigma_max = decomp.singular_values.max();
        let epsilon = machine_epsilon * T::try_cast(max_size)? * sigma_max;

        let x = decomp.solve(b, epsilon).map_err(Error::Algebra)?;
        if x.iter().any(|c| c.is_nan()) {
            return Err(Error::Algebra("NaN in coefficients"));
        }

        Ok(x)
    }
}
