//! Dekker's method: a hybrid bisection/secant root-finder.
//!
//! Combines the guaranteed convergence of bisection with the speed of the
//! secant method: on each iteration both a bisection midpoint and a secant
//! extrapolation are computed, and the secant estimate is accepted only
//! when it falls strictly between the current best estimate and the
//! midpoint. This keeps the method from ever doing worse than bisection
//! while usually converging much faster on well-behaved functions.
//!
//! Dekker, T. J. (1969), "Finding a zero by means of successive linear
//! interpolation", in Dejon, B.; Henrici, P. (eds.), *Constructive Aspects
//! of the Fundamental Theorem of Algebra*, London: Wiley-Interscience.

use crate::error::Error;

const DEFAULT_MAX_IT: u32 = 33;

/// Finds a root of `f` bracketed by `x0` and `x1`, returning `(best,
/// counterpoint)` such that `|best - counterpoint| <= tol`.
///
/// `x0` and `x1` must strictly bracket a sign change of `f`; otherwise
/// this returns [`Error::NonBracketingInterval`]. Gives up with
/// [`Error::MaxIterationsExceeded`] after `max_it` iterations (default 33,
/// use [`dekker`] for that default or [`dekker_with_max_it`] to override).
pub fn dekker(f: impl Fn(f64) -> f64, x0: f64, x1: f64, tol: f64) -> Result<(f64, f64), Error> {
    dekker_with_max_it(f, x0, x1, tol, DEFAULT_MAX_IT)
}

/// As [`dekker`], but with an explicit iteration cap.
pub fn dekker_with_max_it(
    f: impl Fn(f64) -> f64,
    x0: f64,
    x1: f64,
    tol: f64,
    max_it: u32,
) -> Result<(f64, f64), Error> {
    let tol = tol.abs();
    let fx0 = f(x0);
    let fx1 = f(x1);

    if fx0 * fx1 >= 0.0 {
        return Err(Error::NonBracketingInterval { x0, fx0, x1, fx1 });
    }

    let (mut b_j, mut fb_j) = if fx0.abs() < fx1.abs() { (x0, fx0) } else { (x1, fx1) };
    let (mut b_i, mut fb_i) = if fx0.abs() < fx1.abs() { (x1, fx1) } else { (x0, fx0) };
    let (mut a_j, mut fa_j) = (b_i, fb_i);

    for _ in 0..max_it {
        let m = 0.5 * (a_j + b_j);
        let s = if fb_i != fb_j {
            b_j - fb_j * (b_j - b_i) / (fb_j - fb_i)
        } else {
            m
        };

        // accept the secant estimate only when it lies strictly between the
        // current best estimate and the bisection midpoint; else bisect.
        let b_k = if b_j.min(m) < s && s < b_j.max(m) { s } else { m };

        let fb_k = f(b_k);

        let (a_k, fa_k) = if fa_j * fb_k < 0.0 { (a_j, fa_j) } else { (b_j, fb_j) };

        let (a_k, fa_k, b_k, fb_k) = if fa_k.abs() < fb_k.abs() {
            (b_k, fb_k, a_k, fa_k)
        } else {
            (a_k, fa_k, b_k, fb_k)
        };

        if (b_k - a_k).abs() < tol {
            return Ok((b_k, a_k));
        }

        (a_j, fa_j) = (a_k, fa_k);
        (b_i, fb_i) = (b_j, fb_j);
        (b_j, fb_j) = (b_k, fb_k);
    }

    Err(Error::MaxIterationsExceeded { max_it, tol })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn finds_root_of_quadratic() {
        let (x, _) = dekker(|x| x * x - 1.0, 0.5, 1.5, 1e-9).unwrap();
        assert_abs_diff_eq!(x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn finds_root_of_cubic() {
        let (x, _) = dekker(|x| x * x * x - 2.0 * x - 5.0, 2.0, 3.0, 1e-10).unwrap();
        assert_abs_diff_eq!(x, 2.0945514815423265, epsilon = 1e-8);
    }

    #[test]
    fn rejects_non_bracketing_interval() {
        let err = dekker(|x| x * x + 1.0, -1.0, 1.0, 1e-6).unwrap_err();
        assert!(matches!(err, Error::NonBracketingInterval { .. }));
    }

    #[test]
    fn reports_max_iterations() {
        // a function oscillating too wildly for the cap to resolve at a
        // vanishingly small tolerance relative to its scale.
        let err = dekker_with_max_it(|x| (1.0 / x).sin(), 0.01, 10.0, 1e-300, 5).unwrap_err();
        assert!(matches!(err, Error::MaxIterationsExceeded { .. }));
    }
}
