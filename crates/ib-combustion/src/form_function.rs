//! Form functions: the map from linear burnup depth `Z` to volumetric
//! burnup fraction `psi(Z)`.
//!
//! Pre-fracture, `psi` is an exact third-order polynomial derived from the
//! grain's aspect ratios. Multi-perforated grains fracture at `Z = 1` into
//! "slivers" that continue to burn out to `Z = Z_k > 1`; their post-
//! fracture behavior is approximated with a second-order polynomial fit to
//! match both the fracture-point and burnout-point volumetric fractions.
//!
//! Subscripts follow M. E. Serebryakov's convention, still in use in the
//! Soviet-sphere interior ballistics literature: `k` ("komplett") marks
//! complete combustion, `s` ("schiefer"/"splitter", sliver) marks the
//! fracture point.

use std::f64::consts::PI;

use ib_core::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The seven tabulated multi-perforated grain shapes.
///
/// Each variant carries the constants `(A, B, C, b_factors, a_factors,
/// rho_ratio)` used to derive a [`FormFunction`] from an arch width,
/// perforation diameter and height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MultiPerfShape {
    SevenPerfCylinder,
    SevenPerfRosette,
    FourteenPerfRosette,
    NineteenPerfRosette,
    NineteenPerfCylinder,
    NineteenPerfHexagon,
    NineteenPerfRoundedHexagon,
}

struct ShapeConstants {
    desc: &'static str,
    n: f64,
    a: f64,
    b: f64,
    c: f64,
    b_factors: (f64, f64),
    a_factors: (f64, f64),
    rho_ratio: f64,
}

impl MultiPerfShape {
    fn constants(self) -> ShapeConstants {
        let sqrt3 = 3f64.sqrt();
        match self {
            MultiPerfShape::SevenPerfCylinder => ShapeConstants {
                desc: "cylinder",
                n: 7.0,
                a: 1.0,
                b: 7.0,
                c: 0.0,
                b_factors: (3.0, 8.0),
                a_factors: (0.0, 0.0),
                rho_ratio: 0.2956,
            },
            MultiPerfShape::SevenPerfRosette => ShapeConstants {
                desc: "rosette",
                n: 7.0,
                a: 2.0,
                b: 8.0,
                c: 12.0 * sqrt3 / PI,
                b_factors: (1.0, 4.0),
                a_factors: (1.0, 2.0),
                rho_ratio: 0.1547,
            },
            MultiPerfShape::FourteenPerfRosette => ShapeConstants {
                desc: "rosette",
                n: 14.0,
                a: 8.0 / 3.0,
                b: 47.0 / 3.0,
                c: 26.0 * sqrt3 / PI,
                b_factors: (1.0, 4.0),
                a_factors: (1.0, 2.0),
                rho_ratio: 0.1547,
            },
            MultiPerfShape::NineteenPerfRosette => ShapeConstants {
                desc: "rosette",
                n: 19.0,
                a: 3.0,
                b: 21.0,
                c: 36.0 * sqrt3 / PI,
                b_factors: (1.0, 4.0),
                a_factors: (1.0, 2.0),
                rho_ratio: 0.1547,
            },
            MultiPerfShape::NineteenPerfCylinder => ShapeConstants {
                desc: "cylinder",
                n: 19.0,
                a: 1.0,
                b: 19.0,
                c: 0.0,
                b_factors: (5.0, 12.0),
                a_factors: (0.0, 0.0),
                rho_ratio: 0.3559,
            },
            MultiPerfShape::NineteenPerfHexagon => ShapeConstants {
                desc: "hexagon",
                n: 19.0,
                a: 18.0 / PI,
                b: 19.0,
                c: 18.0 * (3.0 * sqrt3 - 1.0) / PI,
                b_factors: (1.0, 2.0),
                a_factors: (1.0, 2.0),
                rho_ratio: 0.1864,
            },
            MultiPerfShape::NineteenPerfRoundedHexagon => ShapeConstants {
                desc: "rounded hexagon",
                n: 19.0,
                a: sqrt3 + 12.0 / PI,
                b: 19.0,
                c: 3.0 - sqrt3 + 12.0 * (4.0 * sqrt3 - 1.0) / PI,
                b_factors: (1.0, 2.0),
                a_factors: (1.0, 2.0),
                rho_ratio: 0.1977,
            },
        }
    }

    /// Human readable description, e.g. "19-perforated hexagon".
    pub fn describe(self) -> String {
        let c = self.constants();
        format!("{}-perforated {}", c.n as u32, c.desc)
    }
}

/// Maps linear burnup depth `Z` to volumetric burnup fraction `psi(Z)`.
///
/// Pre-fracture (`Z` in `[0, 1]`): `psi(Z) = chi*Z*(1 + lambda*Z + mu*Z^2)`.
/// Post-fracture (`Z` in `(1, Z_k]`, only when `Z_k > 1`):
/// `psi(Z) = chi_s*Z*(1 + lambda_s*Z)`, fit so that `psi` is continuous at
/// `Z = 1` and `psi(Z_k) = 1`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FormFunction {
    pub name: String,
    pub description: String,
    pub chi: f64,
    pub lambda: f64,
    pub mu: f64,
    pub z_k: f64,
    chi_s: f64,
    lambda_s: f64,
    /// Half arch-width, in meters, if this form function was built from a
    /// geometric constructor. `None` when unavailable, in which case the
    /// arch-derived burn-rate helpers on `Charge` are unusable.
    pub e_1: Option<f64>,
}

impl FormFunction {
    fn new(name: String, description: String, chi: f64, lambda: f64, mu: f64, z_k: f64, e_1: Option<f64>) -> Self {
        let psi_1 = chi * (1.0 + lambda + mu);
        let (chi_s, lambda_s) = if z_k > 1.0 {
            let chi_s = (1.0 - psi_1 * z_k * z_k) / (z_k - z_k * z_k);
            let lambda_s = psi_1 / chi_s - 1.0;
            (chi_s, lambda_s)
        } else {
            (0.0, 0.0)
        };
        FormFunction { name, description, chi, lambda, mu, z_k, chi_s, lambda_s, e_1 }
    }

    /// Volumetric burnup fraction at the point of fracture, `psi(1)`.
    pub fn psi_s(&self) -> f64 {
        self.chi * (1.0 + self.lambda + self.mu)
    }

    /// `chi` of the post-fracture polynomial; `0.0` when `Z_k == 1`.
    pub fn chi_s(&self) -> f64 {
        self.chi_s
    }

    /// `lambda` of the post-fracture polynomial; `0.0` when `Z_k == 1`.
    pub fn lambda_s(&self) -> f64 {
        self.lambda_s
    }

    /// Evaluates `psi(Z)`. Fails with [`Error::DomainError`] if `Z` is
    /// outside `[0, Z_k]`.
    pub fn psi(&self, z: f64) -> Result<f64, Error> {
        if (0.0..=1.0).contains(&z) {
            Ok(self.chi * z * (1.0 + self.lambda * z + self.mu * z * z))
        } else if z > 1.0 && z <= self.z_k {
            Ok(self.chi_s * z * (1.0 + self.lambda_s * z))
        } else {
            Err(Error::DomainError { z, z_k: self.z_k })
        }
    }

    /// `psi(Z) / chi` pre-fracture, `psi(Z) / chi_s` post-fracture: the
    /// burnup fraction normalized to its leading coefficient.
    pub fn sigma(&self, z: f64) -> Result<f64, Error> {
        if (0.0..=1.0).contains(&z) {
            Ok(self.psi(z)? / self.chi)
        } else if z > 1.0 && z <= self.z_k {
            Ok(self.psi(z)? / self.chi_s)
        } else {
            Err(Error::DomainError { z, z_k: self.z_k })
        }
    }

    /// Form function for a right square prism (stick/tape/flake), right
    /// (possibly elliptic) cylinder, or (possibly oblong) sphere.
    ///
    /// `length`, `width`, `height` are interpreted per the shape actually
    /// intended: for a prism, its three edges; for a cylinder, the two
    /// axes of its ends plus its height; for a sphere, the three axes of
    /// an ellipsoid. No particular order is required; the three values
    /// are sorted ascending internally.
    pub fn non_perf(length: f64, width: f64, height: f64) -> FormFunction {
        let mut v = [length, width, height];
        v.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let (e_1, b, c) = (0.5 * v[0], 0.5 * v[1], 0.5 * v[2]);
        let alpha = e_1 / b;
        let beta = e_1 / c;
        let chi = 1.0 + alpha + beta;
        FormFunction::new(
            "grain".to_string(),
            format!("{:.1} x {:.1} x {:.1} mm", e_1 * 2.0, b * 2.0, c * 2.0),
            chi,
            -(alpha + beta + alpha * beta) / chi,
            alpha * beta / chi,
            1.0,
            Some(e_1),
        )
    }

    /// Form function for a right hollow cylinder ("tubular" grain):
    /// `non_perf` with one aspect ratio taken to zero (infinite width).
    pub fn single_perf(arch_width: f64, height: f64) -> FormFunction {
        let e_1 = 0.5 * arch_width;
        let c = 0.5 * height;
        let beta = e_1 / c;
        FormFunction::new(
            "tube".to_string(),
            format!("{:.1} / 1 - {:.1} mm", e_1 * 2.0, c * 2.0),
            1.0 + beta,
            -beta / (1.0 + beta),
            0.0,
            1.0,
            Some(e_1),
        )
    }

    /// Form function for a multiple-perforated grain of the given `shape`.
    ///
    /// `arch_width` is the distance between perforation centers minus the
    /// perforation diameter; `perforation_diameter` and `height` as named.
    /// Fails with [`Error::RegressiveCombustion`] if the resulting grain
    /// would combust with decreasing surface area over most of its life
    /// (short, fat multi-perf grains).
    pub fn multi_perf(
        arch_width: f64,
        perforation_diameter: f64,
        height: f64,
        shape: MultiPerfShape,
    ) -> Result<FormFunction, Error> {
        let d_0 = perforation_diameter;
        let e_1 = 0.5 * arch_width;
        let c = 0.5 * height;
        let beta = e_1 / c;
        let rho_base = e_1 + 0.5 * d_0;

        let sc = shape.constants();
        let b = sc.b_factors.0 * d_0 + sc.b_factors.1 * e_1;
        let a = sc.a_factors.0 * d_0 + sc.a_factors.1 * e_1;
        let rho = sc.rho_ratio * rho_base;

        let pi_ = (sc.a * b + sc.b * d_0) / (2.0 * c);
        let q = (sc.c * a * a + sc.a * b * b - sc.b * d_0 * d_0) / (2.0 * c).powi(2);

        let lambda = beta * (sc.n - 1.0 - 2.0 * pi_) / (q + 2.0 * pi_);
        if lambda < 0.0 {
            return Err(Error::RegressiveCombustion);
        }

        let chi = beta * (q + 2.0 * pi_) / q;
        let mu = beta * beta * (1.0 - sc.n) / (q + 2.0 * pi_);
        let z_k = (e_1 + rho) / e_1;

        Ok(FormFunction::new(
            format!("{} perf {}", sc.n as u32, sc.desc),
            format!("{:.1} / {} (d = {:.1}) - {:.1} mm", e_1 * 2.0, sc.n as u32, d_0, c * 2.0),
            chi,
            lambda,
            mu,
            z_k,
            Some(e_1),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn single_perf_boundary_conditions() {
        let ff = FormFunction::single_perf(1.8e-3, 0.26);
        assert_abs_diff_eq!(ff.psi(0.0).unwrap(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ff.psi(1.0).unwrap(), 1.0, epsilon = 1e-9);
        assert_eq!(ff.z_k, 1.0);
    }

    #[test]
    fn non_perf_boundary_conditions() {
        let ff = FormFunction::non_perf(10e-3, 10e-3, 10e-3);
        assert_abs_diff_eq!(ff.psi(0.0).unwrap(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ff.psi(1.0).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn psi_out_of_domain_errors() {
        let ff = FormFunction::single_perf(1.8e-3, 0.26);
        let err = ff.psi(1.5).unwrap_err();
        assert!(matches!(err, Error::DomainError { .. }));
    }

    #[test]
    fn multi_perf_continuous_at_fracture_and_burnout() {
        let ff = FormFunction::multi_perf(5.5 * 2e-3, 2e-3, 1.0, MultiPerfShape::SevenPerfCylinder).unwrap();
        assert!(ff.z_k > 1.0);
        let psi_1 = ff.psi(1.0).unwrap();
        assert_abs_diff_eq!(psi_1, ff.psi_s(), epsilon = 1e-9);
        assert_abs_diff_eq!(ff.psi(ff.z_k).unwrap(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn psi_monotone_nondecreasing() {
        let ff = FormFunction::multi_perf(5.5 * 2e-3, 2e-3, 1.0, MultiPerfShape::NineteenPerfRosette).unwrap();
        let mut prev = 0.0;
        for i in 0..=200 {
            let z = ff.z_k * (i as f64) / 200.0;
            let psi = ff.psi(z).unwrap();
            assert!(psi + 1e-9 >= prev, "psi not monotone at Z={z}: {psi} < {prev}");
            assert!((-1e-9..=1.0 + 1e-9).contains(&psi));
            prev = psi;
        }
    }

    #[test]
    fn regressive_short_multi_perf_is_rejected() {
        // an implausibly squat 7-perf grain with a huge arch relative to its
        // height combusts regressively.
        let result = FormFunction::multi_perf(50e-3, 1e-3, 1e-3, MultiPerfShape::SevenPerfCylinder);
        assert!(matches!(result, Err(Error::RegressiveCombustion)));
    }
}
