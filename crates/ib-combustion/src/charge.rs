//! Propellants and the charges built from them.

use ib_core::{Error, AMBIENT_PRESSURE};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::form_function::FormFunction;

/// A propellant's thermochemical and burn-rate properties, independent of
/// any particular grain geometry.
///
/// Conforms to the Nobel-Abel equation of state `P(v - alpha) = RT` and
/// Saint Robert's (Vieille's) burn rate law `u = a * P^n`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Propellant {
    pub name: String,
    pub description: String,
    /// `a` in Saint Robert's law, in m/s/Pa^n. `None` when the propellant
    /// is tabulated only by its charges' `reduced_burnrate`.
    pub burn_rate_coefficient: Option<f64>,
    /// Bulk density, kg/m^3. Modern propellants cluster near 1600.
    pub density: f64,
    /// Propellant force, in J/kg: the work done by a kilogram of
    /// propellant gas expanding isentropically from its isochoric
    /// adiabatic flame temperature to absolute zero.
    pub force: f64,
    /// `n` in Saint Robert's law, dimensionless.
    pub pressure_exponent: f64,
    /// Covolume `alpha`, in m^3/kg.
    pub covolume: f64,
    /// Heat capacity ratio of the combustion product gas. Typically
    /// 1.2-1.25 at the elevated temperatures involved.
    pub adiabatic_index: f64,
}

impl Default for Propellant {
    fn default() -> Self {
        Propellant {
            name: String::new(),
            description: String::new(),
            burn_rate_coefficient: None,
            density: 1600.0,
            force: 1.0,
            pressure_exponent: 0.82,
            covolume: 1e-3,
            adiabatic_index: 1.2,
        }
    }
}

impl Propellant {
    /// `adiabatic_index - 1`.
    pub fn theta(&self) -> f64 {
        self.adiabatic_index - 1.0
    }
}

/// A propellant cut to a particular grain geometry, with a burn rate
/// expressed relative to that geometry's arch width.
///
/// Composes a [`Propellant`] with a [`FormFunction`] rather than
/// subclassing it: a charge's thermochemistry and its geometry are
/// independent axes, and a given propellant is commonly cut into several
/// charge designs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Charge {
    pub name: String,
    pub description: String,
    pub propellant: Propellant,
    pub form_function: FormFunction,
    /// `a / e`: burn rate coefficient divided by the form function's half
    /// arch-width, in s^-1 Pa^-n.
    pub reduced_burnrate: f64,
}

impl Charge {
    /// Builds a charge directly from its constituent parts.
    ///
    /// If `reduced_burnrate` is `Some`, it is used as given. Otherwise it
    /// is derived from `propellant.burn_rate_coefficient` and
    /// `form_function.e_1`; if either is unavailable, this fails with
    /// [`Error::UnderspecifiedBurnRate`].
    pub fn new(
        name: Option<String>,
        description: Option<String>,
        propellant: Propellant,
        form_function: FormFunction,
        reduced_burnrate: Option<f64>,
    ) -> Result<Charge, Error> {
        let reduced_burnrate = match reduced_burnrate {
            Some(r) => r,
            None => match (form_function.e_1, propellant.burn_rate_coefficient) {
                (Some(e_1), Some(coeff)) => coeff / e_1,
                _ => return Err(Error::UnderspecifiedBurnRate),
            },
        };

        let name = name.unwrap_or_else(|| format!("{} {}", propellant.name, form_function.name));
        let description = description.unwrap_or_else(|| form_function.description.clone());

        Ok(Charge { name, description, propellant, form_function, reduced_burnrate })
    }

    /// As [`Charge::new`], deriving name/description from the propellant
    /// and form function and taking `reduced_burnrate` as given (the
    /// common constructor; the Vieille-law derivation happens here too,
    /// so passing `None` works exactly as in [`Charge::new`]).
    pub fn from_propellant(
        propellant: Propellant,
        form_function: FormFunction,
        reduced_burnrate: Option<f64>,
    ) -> Result<Charge, Error> {
        Charge::new(None, None, propellant, form_function, reduced_burnrate)
    }

    /// `2 * burn_rate_coefficient / arch_width`: the reduced burn rate
    /// implied by a burn rate coefficient and an arch width, without
    /// needing a constructed [`FormFunction`].
    ///
    /// Tabulating burn rate this way (by coefficient and arch width,
    /// rather than directly by `a/e`) is particularly common in Western
    /// and recent Chinese sources.
    pub fn reduced_from_arch_and_coefficient(arch_width: f64, burn_rate_coefficient: f64) -> f64 {
        2.0 * burn_rate_coefficient / arch_width
    }

    /// Recovers a burn rate coefficient `a` from this charge's
    /// `reduced_burnrate` and an arch width. If `arch_width` is not
    /// supplied, `2 * form_function.e_1` is used; fails with
    /// [`Error::MissingArch`] if neither is available.
    pub fn coefficient_from_arch(&self, arch_width: Option<f64>) -> Result<f64, Error> {
        let arch_width = match arch_width {
            Some(w) => w,
            None => 2.0 * self.form_function.e_1.ok_or(Error::MissingArch)?,
        };
        Ok(0.5 * self.reduced_burnrate * arch_width)
    }

    /// `form_function.Z_k`.
    pub fn z_k(&self) -> f64 {
        self.form_function.z_k
    }

    /// `adiabatic_index - 1` of the underlying propellant.
    pub fn theta(&self) -> f64 {
        self.propellant.theta()
    }

    /// `psi(Z)`, delegated to the form function.
    pub fn psi(&self, z: f64) -> Result<f64, Error> {
        self.form_function.psi(z)
    }

    /// `dZ/dt = reduced_burnrate * max(P, P_ambient)^pressure_exponent`:
    /// Vieille's burn rate law, clamped below at ambient pressure so that
    /// combustion does not reverse when local pressure dips below it.
    pub fn dzdt(&self, pressure: f64) -> f64 {
        self.reduced_burnrate * pressure.max(AMBIENT_PRESSURE).powf(self.propellant.pressure_exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_function::{FormFunction, MultiPerfShape};
    use approx::assert_abs_diff_eq;

    fn sample_propellant() -> Propellant {
        Propellant {
            name: "M1".to_string(),
            force: 950_000.0,
            burn_rate_coefficient: Some(6.25e-10),
            ..Propellant::default()
        }
    }

    #[test]
    fn derives_reduced_burnrate_from_arch_and_coefficient() {
        let ff = FormFunction::single_perf(1.8e-3, 0.26);
        let charge = Charge::from_propellant(sample_propellant(), ff, None).unwrap();
        assert_abs_diff_eq!(charge.reduced_burnrate, 6.25e-10 / 0.9e-3, epsilon = 1e-20);
    }

    #[test]
    fn underspecified_burn_rate_is_rejected() {
        let ff = FormFunction::single_perf(1.8e-3, 0.26);
        let mut propellant = sample_propellant();
        propellant.burn_rate_coefficient = None;
        let err = Charge::from_propellant(propellant, ff, None).unwrap_err();
        assert!(matches!(err, Error::UnderspecifiedBurnRate));
    }

    #[test]
    fn explicit_reduced_burnrate_is_honored_regardless_of_arch() {
        let ff = FormFunction::multi_perf(5.5 * 2e-3, 2e-3, 1.0, MultiPerfShape::SevenPerfCylinder).unwrap();
        let charge = Charge::from_propellant(sample_propellant(), ff, Some(7e-10)).unwrap();
        assert_abs_diff_eq!(charge.reduced_burnrate, 7e-10, epsilon = 1e-20);
    }

    #[test]
    fn dzdt_clamps_below_ambient_pressure() {
        let ff = FormFunction::single_perf(1.8e-3, 0.26);
        let charge = Charge::from_propellant(sample_propellant(), ff, None).unwrap();
        assert_abs_diff_eq!(charge.dzdt(0.0), charge.dzdt(AMBIENT_PRESSURE), epsilon = 1e-30);
    }

    #[test]
    fn coefficient_round_trips_through_arch_helpers() {
        let arch_width = 1.8e-3;
        let coeff = 6.25e-10;
        let reduced = Charge::reduced_from_arch_and_coefficient(arch_width, coeff);
        let ff = FormFunction::single_perf(arch_width, 0.26);
        let charge = Charge::from_propellant(sample_propellant(), ff, Some(reduced)).unwrap();
        assert_abs_diff_eq!(charge.coefficient_from_arch(None).unwrap(), coeff, epsilon = 1e-18);
    }
}
