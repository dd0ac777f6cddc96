//! Testing utilities for bases and the functions they represent.
//!
//! # Features
//!
//! ## General Purpose Macros
//!
//! ### [`crate::monomial!`]
//!
//! DSL for writing monomial coefficient arrays. Great for building test functions!
//! ```rust
//! let coefs = fdbasis::monomial!(5 t^4 - 4 t^3 + 2.5);
//! assert_eq!(coefs, [2.5, 0.0, 0.0, -4.0, 5.0]);
//! ```
//!
//! ## Numeric assertions
//!
//! ### [`crate::assert_close`]
//! Asserts that two floating-point values are approximately equal within a tolerance, relative
//! to their magnitude. `assert_eq!` equivalent for floats.
//!
//! ### [`crate::assert_all_close`]
//! Element-wise [`crate::assert_close`] for anything with `len()` and `iter()`.
//!
//! ### [`crate::assert_matrix_close`]
//! Element-wise [`crate::assert_close`] for matrices, with a shape check first.
//!
//! ## Basis assertions
//! [`basis_assertions`] holds functions checking the properties every basis must have:
//! - Evaluation matches known values.
//! - The Gram matrix is symmetric and positive semi-definite, and matches quadrature.
//! - The derivative basis change agrees with evaluating derivatives directly, and composes.

#[doc(hidden)]
pub mod assertions;

/// Macro to build the coefficient array of a polynomial in the monomial basis.
///
/// Returns a `[f64; N]` where `N` is one more than the highest power, so it can be used
/// directly as a coefficient row for a [`crate::basis::MonomialBasis`] with `N` functions.
/// - Terms can be listed in any order
/// - Same-power terms are summed
/// - Missing terms are 0
///
/// The only major limitation is that it needs a space between the coefficient and the variable,
/// and that every term needs a coefficient:
/// - `20.0 t^3` is valid, but `20.0t^3` and `t^3` are not.
///
/// Syntax:
/// ```text
/// monomial!( [ [+]? <coef> [ t [ ^ <deg> ]? ]? ]+ )
/// ```
///
/// # Example
/// ```
/// # use fdbasis::monomial;
/// const F: [f64; 4] = monomial!(20.0 t^3 + 3.0 t^2 - 2.0 t + 4.0);
/// assert_eq!(F, [4.0, -2.0, 3.0, 20.0]);
///
/// let g = monomial!(1.0 t^2 + 1.0 t^2); // Same-power terms are summed
/// assert_eq!(g, [0.0, 0.0, 2.0]);
/// ```
#[macro_export]
macro_rules! monomial {
    ($( $(+)? $c0:literal $(t $( ^ $d0:literal )?)? )+) => { {
        const LEN: usize = {
            let mut degree = 0; $(
                let d2 = 1 $(+ 1 $(* $d0 as usize)?)?;
                if d2 > degree { degree = d2; }
            )+
            degree
        };

        const COEFS: [f64; LEN] = {
            let mut coefs = [0.0; LEN];
            // coef alone is degree 0, 1 if just t, or the power if specified
            $( coefs[ 0 $(+ 1 $(* $d0 as usize)?)? ] += $c0 as f64; )+
            coefs
        };

        COEFS
    }};
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    #[test]
    fn test_monomial_macro() {
        let f = monomial!(2.0 t^3 + 3.0 t^2 - 4.0 t + 5.0);
        assert_eq!(f, [5.0, -4.0, 3.0, 2.0]);

        let g = monomial!(7.0);
        assert_eq!(g, [7.0]);

        let h = monomial!(1.0 t^2 - 1.0 + 2.0 t^2);
        assert_eq!(h, [-1.0, 0.0, 3.0]);
    }
}
