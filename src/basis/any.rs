use nalgebra::DMatrix;

use crate::{
    basis::{BSplineBasis, Basis, ConstantBasis, FourierBasis, MonomialBasis},
    domain::DomainRange,
    error::Result,
    value::Value,
};

/// One of the basis families provided by this crate.
///
/// Used wherever the kind of basis is only known at runtime, most notably as the result of
/// [`Basis::basis_of_product`] and [`Basis::derivative`] on an `AnyBasis`.
///
/// `AnyBasis` implements [`Basis`] itself by delegating to the wrapped basis.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyBasis<T: Value = f64> {
    /// See [`ConstantBasis`]
    Constant(ConstantBasis<T>),

    /// See [`MonomialBasis`]
    Monomial(MonomialBasis<T>),

    /// See [`FourierBasis`]
    Fourier(FourierBasis<T>),

    /// See [`BSplineBasis`]
    BSpline(BSplineBasis<T>),
}
impl<T: Value> AnyBasis<T> {
    /// Human-readable name of the basis family.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Constant(_) => "Constant",
            Self::Monomial(_) => "Monomial",
            Self::Fourier(_) => "Fourier",
            Self::BSpline(_) => "BSpline",
        }
    }
}

/// Calls the same method on whichever basis is wrapped.
macro_rules! delegate {
    ($self:expr, $b:ident => $body:expr) => {
        match $self {
            AnyBasis::Constant($b) => $body,
            AnyBasis::Monomial($b) => $body,
            AnyBasis::Fourier($b) => $body,
            AnyBasis::BSpline($b) => $body,
        }
    };
}

impl<T: Value> Basis<T> for AnyBasis<T> {
    type Derivative = Self;

    fn domain_range(&self) -> &DomainRange<T> {
        delegate!(self, b => b.domain_range())
    }

    fn n_basis(&self) -> usize {
        delegate!(self, b => b.n_basis())
    }

    fn evaluate_unchecked(&self, points: &[T], derivative: usize) -> DMatrix<T> {
        delegate!(self, b => b.evaluate_unchecked(points, derivative))
    }

    fn derivative(&self, coefficients: &DMatrix<T>, order: usize) -> Result<(Self, DMatrix<T>)> {
        delegate!(self, b => {
            let (basis, coefficients) = b.derivative(coefficients, order)?;
            Ok((basis.into(), coefficients))
        })
    }

    fn gram_matrix(&self) -> DMatrix<T> {
        delegate!(self, b => b.gram_matrix())
    }

    fn basis_of_product(&self, other: &AnyBasis<T>) -> Result<AnyBasis<T>> {
        delegate!(self, b => b.basis_of_product(other))
    }

    fn rbasis_of_product(&self, other: &AnyBasis<T>) -> Result<AnyBasis<T>> {
        delegate!(self, b => b.rbasis_of_product(other))
    }

    fn with_domain_range(&self, domain_range: DomainRange<T>) -> Result<Self> {
        delegate!(self, b => Ok(b.with_domain_range(domain_range)?.into()))
    }
}

impl<T: Value> From<ConstantBasis<T>> for AnyBasis<T> {
    fn from(basis: ConstantBasis<T>) -> Self {
        Self::Constant(basis)
    }
}
impl<T: Value> From<MonomialBasis<T>> for AnyBasis<T> {
    fn from(basis: MonomialBasis<T>) -> Self {
        Self::Monomial(basis)
    }
}
impl<T: Value> From<FourierBasis<T>> for AnyBasis<T> {
    fn from(basis: FourierBasis<T>) -> Self {
        Self::Fourier(basis)
    }
}
impl<T: Value> From<BSplineBasis<T>> for AnyBasis<T> {
    fn from(basis: BSplineBasis<T>) -> Self {
        Self::BSpline(basis)
    }
}
