//! The `Design` family: a thin outer loop over [`FixedChargeProblem`]/
//! [`FixedVolumeProblem`] that additionally solves for bore length, given
//! a muzzle velocity target.
//!
//! A `Problem` takes bore length as a given and solves for one of reduced
//! burn rate, charge mass, or chamber volume. A `Design` wraps a `Problem`
//! builder and searches over bore length itself, picking at each trial
//! length the velocity-optimal gun (`get_limiting_guns_at_pressure`'s
//! middle result) and checking whether it reaches the velocity target.

use std::rc::Rc;

use ib_core::num::dekker;
use ib_core::Error;
use ib_core::{DEFAULT_ACC, DEFAULT_GUN_LOSS_FRACTION, DEFAULT_GUN_START_PRESSURE, DEFAULT_STEPS};
use ib_gun::{Gun, PressureTarget};

use crate::base_problem::BaseProblem;
use crate::fixed_charge_problem::FixedChargeProblem;
use crate::fixed_volume_problem::FixedVolumeProblem;

/// Fields shared by every `Design` variant: everything a [`BaseProblem`]
/// needs except `travel`, which is the quantity being solved for, plus
/// the pressure target the inner `Problem` searches will hold fixed.
#[derive(Clone, Debug)]
pub struct BaseDesign {
    pub name: String,
    pub description: String,
    pub family: String,
    pub propellants: Vec<ib_combustion::Propellant>,
    pub form_functions: Vec<ib_combustion::FormFunction>,
    pub cross_section: f64,
    pub shot_mass: f64,
    pub loss_fraction: f64,
    pub start_pressure: f64,
    pub pressure_target: PressureTarget,
    pub acc: f64,
    pub n_intg: usize,
}

impl BaseDesign {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        description: String,
        family: String,
        propellants: Vec<ib_combustion::Propellant>,
        form_functions: Vec<ib_combustion::FormFunction>,
        cross_section: f64,
        shot_mass: f64,
        pressure_target: PressureTarget,
        loss_fraction: Option<f64>,
        start_pressure: Option<f64>,
        acc: Option<f64>,
        n_intg: Option<usize>,
    ) -> Self {
        BaseDesign {
            name,
            description,
            family,
            propellants,
            form_functions,
            cross_section,
            shot_mass,
            pressure_target,
            loss_fraction: loss_fraction.unwrap_or(DEFAULT_GUN_LOSS_FRACTION),
            start_pressure: start_pressure.unwrap_or(DEFAULT_GUN_START_PRESSURE),
            acc: acc.unwrap_or(DEFAULT_ACC),
            n_intg: n_intg.unwrap_or(DEFAULT_STEPS),
        }
    }

    /// Caliber: the bore diameter implied by `cross_section`, assuming a
    /// circular bore (`sqrt(4 * cross_section / pi)`).
    pub fn caliber(&self) -> f64 {
        (4.0 * self.cross_section / std::f64::consts::PI).sqrt()
    }

    fn set_up_problem(&self, travel: f64) -> Result<BaseProblem, Error> {
        BaseProblem::new(
            self.name.clone(),
            self.description.clone(),
            self.family.clone(),
            self.propellants.clone(),
            self.form_functions.clone(),
            self.cross_section,
            self.shot_mass,
            travel,
            Some(self.loss_fraction),
            Some(self.start_pressure),
            Some(self.acc),
            Some(self.n_intg),
        )
    }
}

/// Searches over bore length `L` in `[0, max_calibers * caliber]` for the
/// length at which `opt_gun_for_travel(L)`'s muzzle velocity equals
/// `velocity_target`.
///
/// Shared by [`FixedChargeDesign`] and [`FixedVolumeDesign`]: both reduce
/// to "pick the velocity-optimal gun at this travel, see how its muzzle
/// velocity compares to the target", differing only in which `Problem`
/// variant builds that gun. Fails with [`Error::VelocityUnachievable`] if
/// even `max_calibers` calibers of travel falls short.
fn get_optimal_gun_with_opt_func(
    opt_gun_for_travel: impl Fn(f64) -> Result<Gun, Error>,
    velocity_target: f64,
    n_intg: usize,
    acc: f64,
    caliber: f64,
    max_calibers: u32,
) -> Result<Gun, Error> {
    let fmv = |travel: f64| -> Result<f64, Error> {
        let gun = Rc::new(opt_gun_for_travel(travel)?);
        let states = Gun::to_travel(&gun, Some(travel), n_intg, acc)?;
        Ok(states.muzzle_velocity().expect("to_travel always marks Muzzle") - velocity_target)
    };

    let max_travel = max_calibers as f64 * caliber;
    if fmv(max_travel)? < 0.0 {
        return Err(Error::VelocityUnachievable { target: velocity_target, max_calibers });
    }

    let mut counterpoint = max_travel * 0.5;
    while fmv(counterpoint)? >= 0.0 {
        counterpoint *= 0.5;
    }

    let (travel, _) =
        dekker(|x| fmv(x).expect("travel search stays within the forward integrator's domain"), counterpoint, max_travel, counterpoint * acc)?;

    opt_gun_for_travel(travel)
}

/// A [`BaseDesign`] with charge mass already decided: solves for the
/// bore length at which the chamber-volume-optimal gun reaches
/// `velocity_target`.
#[derive(Clone, Debug)]
pub struct FixedChargeDesign {
    pub base: BaseDesign,
    pub charge_masses: Vec<f64>,
}

impl FixedChargeDesign {
    pub fn new(base: BaseDesign, charge_masses: Vec<f64>) -> Self {
        FixedChargeDesign { base, charge_masses }
    }

    pub fn single_charge(base: BaseDesign, charge_mass: f64) -> Self {
        FixedChargeDesign { base, charge_masses: vec![charge_mass] }
    }

    fn set_up_problem(&self, travel: f64) -> Result<FixedChargeProblem, Error> {
        FixedChargeProblem::new(self.base.set_up_problem(travel)?, self.charge_masses.clone())
    }

    /// Solves for bore length, then chamber volume, then reduced burn
    /// rate: the gun whose velocity-optimal chamber volume, at the
    /// resulting bore length, hits both `self.base.pressure_target` and
    /// `velocity_target`.
    pub fn get_optimal_gun(
        &self,
        velocity_target: f64,
        reduced_burnrate_ratios: &[f64],
        max_calibers: u32,
    ) -> Result<Gun, Error> {
        let f = |travel: f64| -> Result<Gun, Error> {
            let (_, gun_opt, _) =
                self.set_up_problem(travel)?.get_limiting_guns_at_pressure(self.base.pressure_target, reduced_burnrate_ratios)?;
            Ok(gun_opt)
        };

        get_optimal_gun_with_opt_func(f, velocity_target, self.base.n_intg, self.base.acc, self.base.caliber(), max_calibers)
    }
}

/// A [`BaseDesign`] with chamber volume already decided: solves for the
/// bore length at which the charge-mass-optimal gun reaches
/// `velocity_target`.
#[derive(Clone, Debug)]
pub struct FixedVolumeDesign {
    pub base: BaseDesign,
    pub chamber_volume: f64,
}

impl FixedVolumeDesign {
    pub fn new(base: BaseDesign, chamber_volume: f64) -> Self {
        FixedVolumeDesign { base, chamber_volume }
    }

    fn set_up_problem(&self, travel: f64) -> Result<FixedVolumeProblem, Error> {
        Ok(FixedVolumeProblem::new(self.base.set_up_problem(travel)?, self.chamber_volume))
    }

    /// As [`FixedChargeDesign::get_optimal_gun`], searching chamber
    /// charge-mass instead of chamber volume at each trial bore length.
    ///
    /// `pressure_target` is taken explicitly here rather than from
    /// `self.base.pressure_target`, mirroring the asymmetry between the
    /// two `Design` variants in `original_source` (`FixedVolumeDesign`
    /// accepts it as a call-site parameter; `FixedChargeDesign` does not).
    pub fn get_optimal_gun(
        &self,
        velocity_target: f64,
        pressure_target: PressureTarget,
        reduced_burnrate_ratios: &[f64],
        charge_mass_ratios: &[f64],
        max_calibers: u32,
    ) -> Result<Gun, Error> {
        let f = |travel: f64| -> Result<Gun, Error> {
            let (_, gun_opt, _) = self.set_up_problem(travel)?.get_limiting_guns_at_pressure(
                pressure_target,
                charge_mass_ratios,
                reduced_burnrate_ratios,
            )?;
            Ok(gun_opt)
        };

        get_optimal_gun_with_opt_func(f, velocity_target, self.base.n_intg, self.base.acc, self.base.caliber(), max_calibers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ib_combustion::{FormFunction, Propellant};

    fn sample_propellant() -> Propellant {
        Propellant {
            name: "M1".to_string(),
            force: 950_000.0,
            burn_rate_coefficient: Some(6.25e-10),
            adiabatic_index: 1.25,
            ..Propellant::default()
        }
    }

    fn sample_base_design() -> BaseDesign {
        BaseDesign::new(
            "test".to_string(),
            String::new(),
            String::new(),
            vec![sample_propellant()],
            vec![FormFunction::single_perf(1.8e-3, 0.26)],
            std::f64::consts::PI * 0.01 * 0.01,
            1.0,
            PressureTarget::average_pressure(300e6),
            None,
            None,
            None,
            None,
        )
    }

    #[test]
    fn caliber_matches_bore_diameter() {
        let design = sample_base_design();
        assert!((design.caliber() - 0.02).abs() < 1e-9);
    }

    #[test]
    fn fixed_charge_design_solves_a_feasible_velocity_target() {
        let design = FixedChargeDesign::single_charge(sample_base_design(), 0.2);
        let gun = design.get_optimal_gun(500.0, &[1.0], 200).unwrap();
        let gun = Rc::new(gun);
        let states = Gun::to_travel(&gun, None, 10, 1e-3).unwrap();
        assert!((states.muzzle_velocity().unwrap() - 500.0).abs() < 500.0 * 1e-2);
    }

    #[test]
    fn fixed_charge_design_rejects_unachievable_velocity() {
        let design = FixedChargeDesign::single_charge(sample_base_design(), 0.2);
        let err = design.get_optimal_gun(1.0e5, &[1.0], 10).unwrap_err();
        assert!(matches!(err, Error::VelocityUnachievable { .. }));
    }
}
