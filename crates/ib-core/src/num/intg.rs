//! Adaptive quadrature of a univariate function over a finite interval,
//! after Kahan's HP-34C algorithm.
//!
//! The interval `[l, u]` is rescaled to `[-1, 1]`, then a further
//! substitution `u = 1.5v - 0.5v^3` is applied so that sample points never
//! fall on the endpoints (where an integrand may be singular). Each pass
//! doubles the number of interior nodes and reuses every previously
//! computed value; convergence is declared after three consecutive passes
//! whose increment is within tolerance.
//!
//! Kahan, W. M. (1980), "Handheld Calculator Evaluates Integrals",
//! Hewlett-Packard Journal, Vol. 31 No. 8.

/// Integrates `f` over `[l, u]` to (roughly) relative tolerance `tol`.
///
/// Returns `(integral, error_estimate)`, where the error estimate is the
/// change in the integral's value between the last two passes.
pub fn intg(f: impl Fn(f64) -> f64, l: f64, u: f64, tol: f64) -> (f64, f64) {
    let a = (u - l) / 2.0;
    let b = (u + l) / 2.0;
    let tol = tol.abs();

    let mut k: u32 = 1;
    let mut integral = 0.0_f64;
    let mut delta = 0.0_f64;
    let mut converged_streak = 0u32;

    while converged_streak < 3 {
        let mut d_integral = 0.0;
        let mut i = 1i64;
        let count = 1i64 << k;
        while i < count {
            let v = -1.0 + 2f64.powi(1 - k as i32) * i as f64;
            let uu = 1.5 * v - 0.5 * v * v * v;
            d_integral += f(a * uu + b) * (1.0 - v * v);
            i += 2;
        }
        d_integral *= 1.5 * a * 2f64.powi(1 - k as i32);

        let next = integral * 0.5 + d_integral;
        delta = (next - integral).abs();
        integral = next;
        k += 1;

        if delta < tol * (integral.abs() + tol) {
            converged_streak += 1;
        } else {
            converged_streak = 0;
        }
    }

    (integral, delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn integrates_constant() {
        let (i, _) = intg(|_| 2.0, 0.0, 3.0, 1e-9);
        assert_abs_diff_eq!(i, 6.0, epsilon = 1e-6);
    }

    #[test]
    fn integrates_quadratic() {
        let (i, _) = intg(|x| x * x, 0.0, 1.0, 1e-9);
        assert_abs_diff_eq!(i, 1.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn integrates_sine_over_half_period() {
        let (i, _) = intg(|x| x.sin(), 0.0, std::f64::consts::PI, 1e-9);
        assert_abs_diff_eq!(i, 2.0, epsilon = 1e-6);
    }
}
