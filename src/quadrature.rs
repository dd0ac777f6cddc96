//! Gauss-Legendre quadrature.
//!
//! Used by bases whose inner products have no closed form. An `n`-node rule is exact for
//! polynomials up to degree `2n - 1`, so piecewise-polynomial bases integrate exactly when
//! the rule is applied once per polynomial piece.
use nalgebra::DMatrix;

use crate::{basis::Basis, value::Value};

const MAX_NEWTON_ITERATIONS: usize = 100;

/// Returns the `(node, weight)` pairs of the `n`-point Gauss-Legendre rule on `[-1, 1]`.
///
/// Nodes are the roots of the Legendre polynomial `Pₙ`, found by Newton iteration from the
/// Chebyshev-like initial guess `cos(π (i - ¼) / (n + ½))`. They are returned in increasing order.
///
/// # Example
/// ```rust
/// use fdbasis::quadrature::gauss_legendre;
///
/// let rule = gauss_legendre::<f64>(2);
/// assert!((rule[0].0 + 1.0 / 3f64.sqrt()).abs() < 1e-14);
/// assert!((rule[0].1 - 1.0).abs() < 1e-14);
/// ```
#[must_use]
pub fn gauss_legendre<T: Value>(n: usize) -> Vec<(T, T)> {
    let mut rule = Vec::with_capacity(n);
    let n_t = T::from_positive_int(n);
    let half = T::one() / T::two();
    let quarter = half * half;
    let tolerance = T::epsilon() * T::from_positive_int(4);

    for i in (1..=n).rev() {
        let mut x = (T::pi() * (T::from_positive_int(i) - quarter) / (n_t + half)).cos();
        let mut derivative = T::one();

        for _ in 0..MAX_NEWTON_ITERATIONS {
            let (p, dp) = legendre_with_derivative(n, x);
            derivative = dp;

            let step = p / dp;
            x -= step;
            if Value::abs(step) <= tolerance {
                break;
            }
        }

        // Refresh P'ₙ at the converged node for the weight
        let (_, dp) = legendre_with_derivative(n, x);
        if num_traits::float::FloatCore::is_finite(dp) {
            derivative = dp;
        }

        let weight = T::two() / ((T::one() - x * x) * derivative * derivative);
        rule.push((x, weight));
    }

    rule
}

/// Evaluates `Pₙ(x)` and `P'ₙ(x)` with the three-term recurrence.
fn legendre_with_derivative<T: Value>(n: usize, x: T) -> (T, T) {
    let mut p_prev = T::zero();
    let mut p = T::one();
    for j in 1..=n {
        let j_t = T::from_positive_int(j);
        let p_next = ((T::two() * j_t - T::one()) * x * p - (j_t - T::one()) * p_prev) / j_t;
        p_prev = p;
        p = p_next;
    }

    let n_t = T::from_positive_int(n);
    let dp = n_t * (x * p - p_prev) / (x * x - T::one());
    (p, dp)
}

/// Maps a rule on `[-1, 1]` onto `[a, b]`, scaling the weights accordingly.
#[must_use]
pub fn map_rule<T: Value>(rule: &[(T, T)], a: T, b: T) -> Vec<(T, T)> {
    let half = (b - a) / T::two();
    let mid = (a + b) / T::two();
    rule.iter()
        .map(|&(x, w)| (mid + half * x, w * half))
        .collect()
}

/// Integrates `f` over `[a, b]` with an `nodes`-point Gauss-Legendre rule.
#[must_use]
pub fn integrate<T: Value, F: Fn(T) -> T>(f: F, a: T, b: T, nodes: usize) -> T {
    map_rule(&gauss_legendre(nodes), a, b)
        .into_iter()
        .fold(T::zero(), |acc, (x, w)| acc + w * f(x))
}

/// Builds a Gram matrix numerically.
///
/// The rule with `nodes` points is applied on every interval between consecutive
/// `breakpoints`. Zero-width intervals are skipped. The result is `(n_basis, n_basis)` and
/// symmetric by construction.
#[must_use]
pub fn numerical_gram_matrix<B: Basis<T>, T: Value>(
    basis: &B,
    breakpoints: &[T],
    nodes: usize,
) -> DMatrix<T> {
    let n = basis.n_basis();
    let rule = gauss_legendre::<T>(nodes);
    let mut gram = DMatrix::<T>::zeros(n, n);

    for window in breakpoints.windows(2) {
        let (a, b) = (window[0], window[1]);
        if b <= a {
            continue;
        }

        let mapped = map_rule(&rule, a, b);
        let points: Vec<T> = mapped.iter().map(|(x, _)| *x).collect();
        let values = basis.evaluate_unchecked(&points, 0);

        for i in 0..n {
            for j in i..n {
                let mut sum = T::zero();
                for (k, (_, w)) in mapped.iter().enumerate() {
                    sum += values[(i, k)] * values[(j, k)] * *w;
                }
                gram[(i, j)] += sum;
            }
        }
    }

    for i in 0..n {
        for j in 0..i {
            gram[(i, j)] = gram[(j, i)];
        }
    }

    tracing::trace!(
        n_basis = n,
        intervals = breakpoints.len().saturating_sub(1),
        nodes,
        "numerical gram matrix built"
    );
    gram
}
