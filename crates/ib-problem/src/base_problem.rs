//! Shared configuration and gun-building logic used by every problem
//! variant: a gun description with one unknown left to solve for.

use std::rc::Rc;

use ib_combustion::{Charge, FormFunction, Propellant};
use ib_core::{Error, DEFAULT_ACC, DEFAULT_GUN_LOSS_FRACTION, DEFAULT_GUN_START_PRESSURE, DEFAULT_STEPS, REDUCED_BURN_RATE_INITIAL_GUESS};
use ib_gun::{Gun, Marker, PressureTarget};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything about a gun design that is fixed regardless of which
/// parameter (chamber volume, charge mass, reduced burn rate, bore
/// length) is being solved for.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BaseProblem {
    pub name: String,
    pub description: String,
    pub family: String,
    pub propellants: Vec<Propellant>,
    pub form_functions: Vec<FormFunction>,
    pub cross_section: f64,
    pub shot_mass: f64,
    pub travel: f64,
    pub loss_fraction: f64,
    pub start_pressure: f64,
    pub acc: f64,
    pub n_intg: usize,
}

impl BaseProblem {
    /// Fails with [`Error::DimensionMismatch`] if `propellants` and
    /// `form_functions` are not the same (nonzero) length: each charge
    /// needs exactly one of each.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        description: String,
        family: String,
        propellants: Vec<Propellant>,
        form_functions: Vec<FormFunction>,
        cross_section: f64,
        shot_mass: f64,
        travel: f64,
        loss_fraction: Option<f64>,
        start_pressure: Option<f64>,
        acc: Option<f64>,
        n_intg: Option<usize>,
    ) -> Result<BaseProblem, Error> {
        if propellants.is_empty() || propellants.len() != form_functions.len() {
            return Err(Error::DimensionMismatch { expected: propellants.len(), got: form_functions.len() });
        }
        Ok(BaseProblem {
            name,
            description,
            family,
            propellants,
            form_functions,
            cross_section,
            shot_mass,
            travel,
            loss_fraction: loss_fraction.unwrap_or(DEFAULT_GUN_LOSS_FRACTION),
            start_pressure: start_pressure.unwrap_or(DEFAULT_GUN_START_PRESSURE),
            acc: acc.unwrap_or(DEFAULT_ACC),
            n_intg: n_intg.unwrap_or(DEFAULT_STEPS),
        })
    }

    /// Builds the gun implied by a chamber volume, per-charge masses, and
    /// per-charge reduced burn rates.
    pub fn get_gun(&self, chamber_volume: f64, charge_masses: &[f64], reduced_burnrates: &[f64]) -> Result<Gun, Error> {
        if charge_masses.len() != self.propellants.len() {
            return Err(Error::DimensionMismatch { expected: self.propellants.len(), got: charge_masses.len() });
        }
        if reduced_burnrates.len() != self.propellants.len() {
            return Err(Error::DimensionMismatch { expected: self.propellants.len(), got: reduced_burnrates.len() });
        }

        let mut charges = Vec::with_capacity(self.propellants.len());
        for ((propellant, form_function), &rbr) in self.propellants.iter().zip(&self.form_functions).zip(reduced_burnrates) {
            let charge = Charge::from_propellant(propellant.clone(), form_function.clone(), Some(rbr))?;
            charges.push(charge);
        }
        let charges = charges.into_iter().zip(charge_masses.iter().copied()).collect();

        Gun::new(
            self.name.clone(),
            self.description.clone(),
            self.family.clone(),
            self.cross_section,
            self.shot_mass,
            charges,
            chamber_volume,
            Some(self.loss_fraction),
            Some(self.start_pressure),
            Some(self.travel),
        )
    }

    /// Solves for the common reduced burn rate (scaled by
    /// `reduced_burnrate_ratios` across charges) that makes the gun's
    /// peak pressure match `pressure_target`.
    ///
    /// Fails with [`Error::PressureUnachievable`] if `pressure_target`
    /// exceeds what the bomb state can ever reach, or
    /// [`Error::PressureBelowStart`] if it is at or below the pressure
    /// needed to start the projectile moving.
    pub fn get_gun_at_pressure(
        &self,
        pressure_target: PressureTarget,
        chamber_volume: f64,
        charge_masses: &[f64],
        reduced_burnrate_ratios: &[f64],
    ) -> Result<Gun, Error> {
        let main_charge_index = charge_masses
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(i, _)| i)
            .expect("charge_masses is non-empty");

        let normalized_ratios: Vec<f64> =
            reduced_burnrate_ratios.iter().map(|r| r / reduced_burnrate_ratios[main_charge_index]).collect();

        let get_burnrates = |main_rbr: f64| -> Vec<f64> { normalized_ratios.iter().map(|nrbr| nrbr * main_rbr).collect() };

        let unitary_gun = Rc::new(self.get_gun(chamber_volume, charge_masses, &get_burnrates(1.0))?);

        let bomb_pressure_diff = pressure_target.get_difference(&Gun::get_bomb_state(&unitary_gun))?;
        if bomb_pressure_diff < 0.0 {
            return Err(Error::PressureUnachievable {
                target: pressure_target.value,
                bomb_pressure: pressure_target.value - bomb_pressure_diff,
            });
        }

        let start_state = Gun::get_start_state(&unitary_gun, self.n_intg, self.acc)?;
        let start_pressure_diff = pressure_target.get_difference(&start_state)?;
        if start_pressure_diff > 0.0 {
            return Err(Error::PressureBelowStart {
                target: pressure_target.value,
                start_pressure: pressure_target.value - start_pressure_diff,
            });
        }

        let f = |reduced_burnrate: f64| -> Result<f64, Error> {
            let test_gun = Rc::new(self.get_gun(chamber_volume, charge_masses, &get_burnrates(reduced_burnrate))?);
            let states = Gun::to_burnout(&test_gun, self.n_intg, self.acc, f64::INFINITY, self.travel)?;
            let peak = states.get_state_by_marker(Marker::PeakPressure).expect("to_burnout always marks peak pressure");
            pressure_target.get_difference(peak)
        };

        let mut est = REDUCED_BURN_RATE_INITIAL_GUESS;
        let mut est_prime = REDUCED_BURN_RATE_INITIAL_GUESS;
        let mut f_est = f(est)?;
        let mut f_est_prime = f_est;

        while f_est * f_est_prime >= 0.0 {
            if f_est > 0.0 {
                (est, est_prime) = (est / 10.0, est);
            } else if f_est == 0.0 {
                (est, est_prime) = (est / 10.0, est * 10.0);
            } else {
                (est, est_prime) = (est * 10.0, est);
            }
            f_est_prime = f_est;
            f_est = f(est)?;
        }

        while (est - est_prime).abs() > self.acc * est.min(est_prime) {
            let tol = est.min(est_prime) * self.acc;
            let (a, b) = ib_core::num::dekker(|x| f(x).expect("burn rate search stays within psi's domain"), est, est_prime, tol)?;
            (est, est_prime) = (a, b);
        }

        self.get_gun(chamber_volume, charge_masses, &get_burnrates(est))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_problem(travel: f64) -> BaseProblem {
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
            travel,
            None,
            None,
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn get_gun_rejects_mismatched_charge_masses() {
        let problem = sample_problem(3.0);
        let err = problem.get_gun(1e-3, &[0.1, 0.1], &[1e-9]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn get_gun_builds_a_valid_gun() {
        let problem = sample_problem(3.0);
        let gun = problem.get_gun(1e-3, &[0.2], &[6.25e-10 / 0.9e-3]).unwrap();
        assert_abs_diff_eq(gun.gross_charge_mass(), 0.2);
    }

    fn assert_abs_diff_eq(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn get_gun_at_pressure_solves_for_target_peak_pressure() {
        let problem = sample_problem(3.0);
        let target = PressureTarget::average_pressure(300e6);
        let gun = problem.get_gun_at_pressure(target, 1e-3, &[0.2], &[1.0]).unwrap();
        let gun = Rc::new(gun);
        let states = Gun::to_burnout(&gun, problem.n_intg, problem.acc, f64::INFINITY, f64::INFINITY).unwrap();
        let peak = states.get_state_by_marker(Marker::PeakPressure).unwrap();
        let achieved = peak.average_pressure().unwrap();
        assert!(
            (achieved - 300e6).abs() < 300e6 * problem.acc * 10.0,
            "achieved peak pressure {achieved} too far from target 300e6"
        );
    }
}
