use nalgebra::DMatrix;

use crate::{
    basis::{default_basis_of_product, AnyBasis, Basis},
    domain::DomainRange,
    error::{Error, Result},
    quadrature,
    value::{IntClampedCast, Value},
};

/// Nodes per quadrature piece when the period does not match the domain.
const QUADRATURE_NODES: usize = 12;

/// Normalized Fourier basis for periodic functions.
///
/// With `ω = 2π / period`, the basis functions are:
/// ```text
/// 1/√2, sin(ωt), cos(ωt), sin(2ωt), cos(2ωt), …
/// ```
/// all divided by `√(period / 2)`.
///
/// Sines and cosines come in pairs, so `n_basis` is always odd; an even request is rounded up.
/// When the period equals the length of the domain the basis is orthonormal and its Gram
/// matrix is the identity.
///
/// # When to use
/// - Use for periodic data: seasonal patterns, angles, signals.
/// - Derivatives never leave the basis: they rotate each sine/cosine pair.
#[derive(Debug, Clone, PartialEq)]
pub struct FourierBasis<T: Value = f64> {
    domain_range: DomainRange<T>,
    n_basis: usize,
    period: T,
}
impl<T: Value> FourierBasis<T> {
    /// Creates a Fourier basis whose period is the length of the domain.
    ///
    /// # Errors
    /// Returns an error if `n_basis` is 0 or the domain is not one-dimensional.
    pub fn new(domain_range: DomainRange<T>, n_basis: usize) -> Result<Self> {
        let period = domain_range.length();
        Self::with_period(domain_range, n_basis, period)
    }

    /// Creates a Fourier basis with an explicit period.
    ///
    /// # Errors
    /// Returns an error if `n_basis` is 0, the period is not positive and finite,
    /// or the domain is not one-dimensional.
    pub fn with_period(domain_range: DomainRange<T>, n_basis: usize, period: T) -> Result<Self> {
        if n_basis == 0 {
            return Err(Error::InvalidNumberOfBasis(n_basis));
        }

        if !(num_traits::float::FloatCore::is_finite(period) && period > T::zero()) {
            return Err(Error::InvalidParameter(
                "period must be positive and finite",
            ));
        }

        domain_range.ensure_dim(1)?;
        let n_basis = if n_basis.is_multiple_of(2) {
            n_basis + 1
        } else {
            n_basis
        };

        Ok(Self {
            domain_range,
            n_basis,
            period,
        })
    }

    /// The period of the basis functions.
    #[must_use]
    pub fn period(&self) -> T {
        self.period
    }

    /// Angular frequency `ω = 2π / period`.
    fn omega(&self) -> T {
        T::two_pi() / self.period
    }

    /// Number of sine/cosine pairs.
    fn harmonics(&self) -> usize {
        (self.n_basis - 1) / 2
    }

    fn same_period(&self, other: &Self) -> bool {
        self.period
            .is_close(other.period, DomainRange::<T>::default_tolerance())
    }
}
impl<T: Value> Basis<T> for FourierBasis<T> {
    type Derivative = Self;

    fn domain_range(&self) -> &DomainRange<T> {
        &self.domain_range
    }

    fn n_basis(&self) -> usize {
        self.n_basis
    }

    fn evaluate_unchecked(&self, points: &[T], derivative: usize) -> DMatrix<T> {
        let omega = self.omega();
        let normalization = (self.period / T::two()).sqrt();

        // d^d/dt^d sin(x) = sin(x + dπ/2), and likewise for cos
        let phase = T::frac_pi_2() * T::from_positive_int(derivative % 4);
        let exponent = derivative.clamped_cast::<i32>();

        let mut values = DMatrix::zeros(self.n_basis, points.len());
        for (j, &t) in points.iter().enumerate() {
            if derivative == 0 {
                values[(0, j)] = T::one() / (T::two().sqrt() * normalization);
            }

            for k in 1..=self.harmonics() {
                let frequency = omega * T::from_positive_int(k);
                let scale = Value::powi(frequency, exponent) / normalization;
                let angle = frequency * t + phase;

                values[(2 * k - 1, j)] = scale * angle.sin();
                values[(2 * k, j)] = scale * angle.cos();
            }
        }

        values
    }

    fn derivative(&self, coefficients: &DMatrix<T>, order: usize) -> Result<(Self, DMatrix<T>)> {
        self.check_coefficients(coefficients)?;
        if order == 0 {
            return Ok((self.clone(), coefficients.clone()));
        }

        let omega = self.omega();
        let exponent = order.clamped_cast::<i32>();
        let mut derived = DMatrix::zeros(coefficients.nrows(), self.n_basis);

        // a·sin(θ) + b·cos(θ) differentiates to (kω)^order · (a·sin(θ + order·π/2) + b·cos(θ + order·π/2)),
        // which rotates the (a, b) pair a quarter turn per order
        for k in 1..=self.harmonics() {
            let factor = Value::powi(omega * T::from_positive_int(k), exponent);
            let (sin_idx, cos_idx) = (2 * k - 1, 2 * k);

            for row in 0..coefficients.nrows() {
                let a = coefficients[(row, sin_idx)];
                let b = coefficients[(row, cos_idx)];
                let (a, b) = match order % 4 {
                    0 => (a, b),
                    1 => (-b, a),
                    2 => (-a, -b),
                    _ => (b, -a),
                };

                derived[(row, sin_idx)] = factor * a;
                derived[(row, cos_idx)] = factor * b;
            }
        }

        Ok((self.clone(), derived))
    }

    fn gram_matrix(&self) -> DMatrix<T> {
        let length = self.domain_range.length();
        if length.is_close(self.period, DomainRange::<T>::default_tolerance()) {
            return DMatrix::identity(self.n_basis, self.n_basis);
        }

        // Not a whole period, so there is no orthogonality to exploit
        let periods = nalgebra::ComplexField::ceil(length / self.period)
            .as_usize()
            .unwrap_or(1)
            .max(1);
        let pieces = (self.n_basis * periods).max(2);
        let breakpoints = crate::value::linspace(
            self.domain_range.start(),
            self.domain_range.end(),
            pieces + 1,
        );

        tracing::debug!(
            n_basis = self.n_basis,
            pieces,
            "fourier period differs from the domain, using quadrature for the gram matrix"
        );
        quadrature::numerical_gram_matrix(self, &breakpoints, QUADRATURE_NODES)
    }

    fn basis_of_product(&self, other: &AnyBasis<T>) -> Result<AnyBasis<T>> {
        self.domain_range.ensure_same(other.domain_range())?;

        match other {
            AnyBasis::Fourier(other) if self.same_period(other) => {
                let n_basis = self.n_basis + other.n_basis - 1;
                Ok(Self::with_period(self.domain_range.clone(), n_basis, self.period)?.into())
            }

            _ => other.rbasis_of_product(&self.clone().into()),
        }
    }

    fn rbasis_of_product(&self, other: &AnyBasis<T>) -> Result<AnyBasis<T>> {
        default_basis_of_product(other, &self.clone().into())
    }

    /// The period is stretched along with the domain.
    fn with_domain_range(&self, domain_range: DomainRange<T>) -> Result<Self> {
        let period = self.period * domain_range.length() / self.domain_range.length();
        Self::with_period(domain_range, self.n_basis, period)
    }
}
