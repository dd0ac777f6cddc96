//! Numeric comparison macros.
use crate::value::Value;

/// Tolerance used by the assertion macros when none is given.
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// Returns true if `a` and `b` agree within `tol`, relative to `max(1, |a|, |b|)`.
///
/// Used by the assertion macros so the numeric type is inferred from the arguments.
#[must_use]
pub fn check_close<T: Value>(a: T, b: T, tol: T) -> bool {
    a.is_close(b, tol)
}

/// Casts the default tolerance into the numeric type of `_like`.
#[must_use]
pub fn default_tolerance<T: Value>(_like: T) -> T {
    T::try_cast(DEFAULT_TOLERANCE).unwrap_or_else(|_| T::epsilon())
}

/// Asserts that two floating-point values are approximately equal.
///
/// This is useful for comparing computed values where exact equality is not expected due to rounding errors.
/// - The tolerance is relative to the magnitude of the values, and never stricter than absolute.
/// - Defaults to `1e-12`; pass `tol = <value>` to override it.
/// - `assert_eq!` equivalent for floats.
///
/// # Parameters
/// - `$a`: First value.
/// - `$b`: Second value.
/// - `tol`: *(optional)* Tolerance.
/// - `$msg`: *(optional)* Custom failure message, with `format!` arguments.
///
/// # Panics
/// Panics if `|a - b| > tol * max(1, |a|, |b|)`.
///
/// # Examples
/// ```
/// # use fdbasis::assert_close;
/// assert_close!(1.0 + 1e-16, 1.0, "Nearly equal");
/// assert_close!(100.0, 100.001, tol = 1e-4);
/// ```
#[macro_export]
macro_rules! assert_close {
    ($a:expr, $b:expr, tol = $tol:expr $(, $msg:literal $(, $args:expr)*)?) => { #[allow(clippy::float_cmp)] {
        #[allow(unused_mut, unused_assignments)] let mut msg = "Values not close".to_string();
        $( msg = format!($msg $(, $args)*); )?

        let (a, b) = ($a, $b);
        let tol = $tol;
        assert!(
            $crate::test::assertions::check_close(a, b, tol),
            "{msg}: {a:?} != {b:?} (tol {tol:?})"
        );
    }};

    ($a:expr, $b:expr $(, $msg:literal $(, $args:expr)*)?) => {{
        let a = $a;
        let tol = $crate::test::assertions::default_tolerance(a);
        $crate::assert_close!(a, $b, tol = tol $(, $msg $(, $args)*)?);
    }};
}

/// Asserts that two sequences of floating-point values are approximately equal element-wise.
///
/// - Works with anything exposing `len()` and `iter()`: slices, arrays, vectors, matrix views.
/// - Element-wise [`crate::assert_close`].
///
/// # Parameters
/// - `$src`: Source sequence.
/// - `$dst`: Destination sequence (same length as `$src`).
/// - `tol`: *(optional)* Tolerance.
/// - `$msg`: *(optional)* Custom failure message. Defaults to `"{len} elements"`.
///
/// # Panics
/// - If the lengths differ.
/// - If any pair of elements is not close.
///
/// # Examples
/// ```
/// # use fdbasis::assert_all_close;
/// let a = vec![1.0, 2.0, 3.0];
/// let b = vec![1.0 + 1e-16, 2.0, 3.0];
///
/// assert_all_close!(a, b); // OK
/// assert_all_close!(a, b, tol = 1e-6, "Vectors must match"); // Custom message
/// ```
#[macro_export]
macro_rules! assert_all_close {
    ($src:expr, $dst:expr, tol = $tol:expr $(, $msg:literal $(, $args:expr)*)?) => {{
        let (src, dst) = (&$src, &$dst);

        #[allow(unused_assignments, unused_mut)]
        let mut msg = format!("{} elements", src.len());
        $( msg = format!($msg $(, $args)*); )?

        assert_eq!(src.len(), dst.len(), "{msg} - length mismatch");
        for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
            $crate::assert_close!(*s, *d, tol = $tol, "{} - src[{}]", msg, i);
        }
    }};

    ($src:expr, $dst:expr $(, $msg:literal $(, $args:expr)*)?) => {
        $crate::assert_all_close!($src, $dst, tol = $crate::test::assertions::DEFAULT_TOLERANCE $(, $msg $(, $args)*)?)
    };
}

/// Asserts that two matrices have the same shape and are approximately equal element-wise.
///
/// On failure, both matrices are printed.
///
/// # Parameters
/// - `$a`, `$b`: The matrices.
/// - `tol`: *(optional)* Tolerance. Defaults to `1e-12`.
///
/// # Panics
/// Panics if the shapes differ or any pair of elements is not close.
///
/// # Examples
/// ```
/// # use fdbasis::{assert_matrix_close, nalgebra::DMatrix};
/// let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
/// assert_matrix_close!(a, a.clone() * (1.0 + 1e-15));
/// ```
#[macro_export]
macro_rules! assert_matrix_close {
    ($a:expr, $b:expr, tol = $tol:expr) => {{
        let (a, b) = (&$a, &$b);
        assert_eq!(a.shape(), b.shape(), "Matrix shapes differ");

        for i in 0..a.nrows() {
            for j in 0..a.ncols() {
                assert!(
                    $crate::test::assertions::check_close(a[(i, j)], b[(i, j)], $tol),
                    "[{i}, {j}]: {:?} != {:?}\nleft:{a}\nright:{b}",
                    a[(i, j)],
                    b[(i, j)]
                );
            }
        }
    }};

    ($a:expr, $b:expr) => {
        $crate::assert_matrix_close!($a, $b, tol = $crate::test::assertions::DEFAULT_TOLERANCE)
    };
}

#[cfg(test)]
mod tests {
    use nalgebra::DMatrix;

    #[test]
    fn test_assert_close_macro() {
        assert_close!(1.0 + 1e-16, 1.0, "Values should be close");
        assert_close!(1e9 + 1e-4, 1e9);
        assert_close!(1.0, 1.05, tol = 0.1);
        assert_close!(1.0, 1.05, tol = 0.1, "with {} args", 1);
    }

    #[test]
    #[should_panic(expected = "Values not close")]
    fn test_assert_close_fails() {
        assert_close!(1.0, 1.1);
    }

    #[test]
    fn test_assert_all_close_macro() {
        let a = [1.0, 2.0, 3.0];
        let b = [1.0 + 1e-16, 2.0, 3.0];
        assert_all_close!(a, b, "Vectors must match");
        assert_all_close!(a, [1.1, 2.0, 3.0], tol = 0.2);
    }

    #[test]
    #[should_panic(expected = "length mismatch")]
    fn test_assert_all_close_length() {
        assert_all_close!([1.0, 2.0], [1.0]);
    }

    #[test]
    fn test_assert_matrix_close_macro() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        assert_matrix_close!(a, a.clone());
        assert_matrix_close!(a, a.clone().add_scalar(1e-3), tol = 1e-2);
    }

    #[test]
    #[should_panic(expected = "shapes differ")]
    fn test_assert_matrix_close_shape() {
        assert_matrix_close!(DMatrix::<f64>::zeros(2, 2), DMatrix::<f64>::zeros(2, 3));
    }
}
