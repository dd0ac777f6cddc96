//! # fdbasis
//! ## Functions as coefficients
//!
//! Functional data analysis treats every observation as a whole function: a temperature curve
//! over a year, a growth curve, a signal. The usual way to work with such functions is to pick
//! a finite family of basis functions and store each observation as a vector of coefficients.
//!
//! This crate provides that representation layer:
//! - Bases over a domain, which evaluate their functions and derivatives at any set of points
//! - Derivatives as a change of basis, so `D f` is again a set of coefficients
//! - Gram matrices of inner products, in closed form where one exists
//! - The basis needed to represent the product of two functions
//!
//! ```rust
//! use fdbasis::{basis::{Basis, MonomialBasis}, BasisExpansion, DomainRange};
//!
//! let domain = DomainRange::<f64>::new(0.0, 1.0).unwrap();
//! let basis = MonomialBasis::new(domain, 4).unwrap();
//!
//! // f(t) = 1 + 2t + 3t³
//! let coefficients = fdbasis::monomial!(3.0 t^3 + 2.0 t + 1.0);
//! let f = BasisExpansion::from_coefficients(basis, &coefficients).unwrap();
//!
//! // f'(t) = 2 + 9t², in the monomial basis of degree 2
//! let df = f.derivative(1).unwrap();
//! assert_eq!(df.basis().n_basis(), 3);
//! assert_eq!(df.coefficients().row(0).iter().copied().collect::<Vec<_>>(), vec![2.0, 0.0, 9.0]);
//!
//! // ∫ f(t)² dt, using the Gram matrix
//! let norm = f.inner_product_matrix(&f).unwrap();
//! assert!(norm[(0, 0)] > 0.0);
//! ```
//!
//! # Core Concepts
//! - A [`DomainRange`] is the interval the functions are defined over.
//!     - Evaluating outside of it is an error, unless [`Extrapolation::Allow`] is requested.
//! - A [`basis::Basis`] is a finite ordered family of functions `φ₀ … φₙ₋₁` over a domain.
//!     - [`basis::MonomialBasis`] is the simplest case `1, t, t², …`
//!     - [`basis::FourierBasis`] is the natural choice for periodic data.
//!     - [`basis::BSplineBasis`] gives local control and well conditioned Gram matrices.
//! - A [`BasisExpansion`] is a set of functions, as a coefficient matrix in one basis.
//! - [`SampledFunctions`] are functions known by their values on a grid of points.
//!     - [`SampledFunctions::to_basis`] projects them onto a basis by least squares.
//!
//! # Implementation Details
//!
//! This crate makes use of the `nalgebra` library for linear algebra operations. Decisions taken
//! along the way (degenerate derivatives, fallbacks to quadrature, product rules) are reported
//! through `tracing` at the `debug` level.
//!
//! Enable the `parallel` feature to evaluate large point sets with `rayon`.
//!
//! # Testing utilities
//!
//! This crate includes a set of testing utilities for checking bases and numeric results.
//! See [`test`].
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::needless_range_loop)] // The worst clippy lint
#![allow(clippy::cast_precision_loss)] // I don't care about this one
#![allow(clippy::similar_names)] //       Clippy does not get to decide what names are similar
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod test;

pub mod basis;
pub mod domain;
pub mod error;
pub mod quadrature;
pub mod value;

mod expansion;
mod samples;

pub use domain::{DomainRange, Extrapolation};
pub use expansion::BasisExpansion;
pub use samples::SampledFunctions;

pub use nalgebra;
