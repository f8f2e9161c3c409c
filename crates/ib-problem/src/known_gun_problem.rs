//! The simplest inverse problem: gun geometry and charge loading are both
//! already fixed, and only the reduced burn rate is unknown.

use ib_core::Error;
use ib_gun::{Gun, PressureTarget};

use crate::base_problem::BaseProblem;

/// A [`BaseProblem`] with `chamber_volume` and each charge's mass already
/// decided; [`Self::get_gun_at_pressure`] solves only for reduced burn
/// rate.
#[derive(Clone, Debug)]
pub struct KnownGunProblem {
    pub base: BaseProblem,
    pub chamber_volume: f64,
    pub charge_masses: Vec<f64>,
}

impl KnownGunProblem {
    pub fn new(base: BaseProblem, chamber_volume: f64, charge_masses: Vec<f64>) -> Result<Self, Error> {
        if charge_masses.len() != base.propellants.len() {
            return Err(Error::DimensionMismatch { expected: base.propellants.len(), got: charge_masses.len() });
        }
        Ok(KnownGunProblem { base, chamber_volume, charge_masses })
    }

    /// As [`Self::new`], for the common case of a single charge.
    pub fn single_charge(base: BaseProblem, chamber_volume: f64, charge_mass: f64) -> Result<Self, Error> {
        KnownGunProblem::new(base, chamber_volume, vec![charge_mass])
    }

    /// Builds the gun at the given per-charge reduced burn rates.
    pub fn get_gun(&self, reduced_burnrates: &[f64]) -> Result<Gun, Error> {
        self.base.get_gun(self.chamber_volume, &self.charge_masses, reduced_burnrates)
    }

    /// Solves for the common reduced burn rate (scaled by
    /// `reduced_burnrate_ratios`) that makes this gun's peak pressure
    /// match `pressure_target`.
    pub fn get_gun_at_pressure(
        &self,
        pressure_target: PressureTarget,
        reduced_burnrate_ratios: &[f64],
    ) -> Result<Gun, Error> {
        self.base.get_gun_at_pressure(pressure_target, self.chamber_volume, &self.charge_masses, reduced_burnrate_ratios)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ib_combustion::{FormFunction, Propellant};

    fn sample_base() -> BaseProblem {
        let propellant = Propellant {
            name: "M1".to_string(),
            force: 950_000.0,
            burn_rate_coefficient: Some(6.25e-10),
            adiabatic_index: 1.25,
            ..Propellant::default()
        };
        let form_function = FormFunction::single_perf(1.8e-3, 0.26);
        BaseProblem::new(
            "test".to_string(),
            String::new(),
            String::new(),
            vec![propellant],
            vec![form_function],
            std::f64::consts::PI * 0.01 * 0.01,
            1.0,
            3.0,
            None,
            None,
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn rejects_mismatched_charge_masses() {
        let err = KnownGunProblem::new(sample_base(), 1e-3, vec![0.1, 0.1]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn solves_reduced_burn_rate_for_peak_pressure() {
        let problem = KnownGunProblem::single_charge(sample_base(), 1e-3, 0.2).unwrap();
        let target = PressureTarget::average_pressure(300e6);
        let gun = problem.get_gun_at_pressure(target, &[1.0]).unwrap();
        assert!(gun.charges[0].0.reduced_burnrate > 0.0);
    }
}
