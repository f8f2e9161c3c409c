//! Given a fixed charge loading, solve for chamber volume (and, nested
//! inside that, reduced burn rate) to hit a pressure and/or velocity
//! target.

use std::rc::Rc;

use ib_core::num::{dekker, gss_max};
use ib_core::Error;
use ib_gun::{Gun, Marker, PressureTarget};

use crate::base_problem::BaseProblem;

/// A [`BaseProblem`] with each charge's mass already decided; chamber
/// volume (and, beneath it, reduced burn rate) is the free parameter.
#[derive(Clone, Debug)]
pub struct FixedChargeProblem {
    pub base: BaseProblem,
    pub charge_masses: Vec<f64>,
}

impl FixedChargeProblem {
    pub fn new(base: BaseProblem, charge_masses: Vec<f64>) -> Result<Self, Error> {
        if charge_masses.len() != base.propellants.len() {
            return Err(Error::DimensionMismatch { expected: base.propellants.len(), got: charge_masses.len() });
        }
        Ok(FixedChargeProblem { base, charge_masses })
    }

    pub fn single_charge(base: BaseProblem, charge_mass: f64) -> Result<Self, Error> {
        FixedChargeProblem::new(base, vec![charge_mass])
    }

    pub fn get_gun(&self, chamber_volume: f64, reduced_burnrates: &[f64]) -> Result<Gun, Error> {
        self.base.get_gun(chamber_volume, &self.charge_masses, reduced_burnrates)
    }

    /// The chamber volume at which the charges' solid volume alone fills
    /// it exactly (zero free gas volume): an absolute physical lower bound
    /// on chamber volume, independent of pressure target.
    pub fn chamber_min_volume(&self) -> f64 {
        self.charge_masses.iter().zip(&self.base.propellants).map(|(mass, p)| mass / p.density).sum()
    }

    pub fn get_gun_at_pressure(
        &self,
        pressure_target: PressureTarget,
        chamber_volume: f64,
        reduced_burnrate_ratios: &[f64],
    ) -> Result<Gun, Error> {
        self.base.get_gun_at_pressure(pressure_target, chamber_volume, &self.charge_masses, reduced_burnrate_ratios)
    }

    /// The feasible range of chamber volume for this charge loading and
    /// `pressure_target`.
    ///
    /// The lower limit is where `bomb_free_fraction` drops to `acc`
    /// (below it the charge cannot even physically fit, unburnt, in the
    /// chamber). The upper limit is where bomb-state pressure equals
    /// `(1 + acc) * pressure_target` (above it, even an infinitely fast
    /// burn rate falls short of the target, since bomb pressure is an
    /// upper bound on any trajectory's peak).
    pub fn get_chamber_volume_limits(&self, pressure_target: PressureTarget) -> Result<(f64, f64), Error> {
        let ones = vec![1.0; self.base.propellants.len()];
        let chamber_min_volume = self.chamber_min_volume();
        let acc = self.base.acc;

        let f_ff = |chamber_volume: f64| -> Result<f64, Error> {
            let gun = self.get_gun(chamber_volume, &ones)?;
            Ok(gun.bomb_free_fraction() - acc)
        };

        let mut bound = chamber_min_volume;
        while f_ff(bound)? <= 0.0 {
            bound *= 2.0;
        }
        let (a, b) = dekker(|x| f_ff(x).expect("bomb_free_fraction is total"), chamber_min_volume, bound, chamber_min_volume * acc)?;
        let lower_limit = a.max(b);

        let safe_target = pressure_target * (1.0 + acc);
        let f_p = |chamber_volume: f64| -> Result<f64, Error> {
            let gun = Rc::new(self.get_gun(chamber_volume, &ones)?);
            safe_target.get_difference(&Gun::get_bomb_state(&gun))
        };

        while f_p(bound)? >= 0.0 {
            bound *= 2.0;
        }
        let (a, b) = dekker(|x| f_p(x).expect("bomb pressure is total"), lower_limit, bound, chamber_min_volume * acc)?;
        let upper_limit = a.min(b);

        Ok((lower_limit, upper_limit))
    }

    /// Solves the reduced burn rate for the gun of the given
    /// `chamber_volume` to reach `pressure_target`, after validating that
    /// `chamber_volume` falls inside [`Self::get_chamber_volume_limits`].
    pub fn solve_reduced_burn_rate_for_volume_at_pressure(
        &self,
        chamber_volume: f64,
        pressure_target: PressureTarget,
        reduced_burnrate_ratios: &[f64],
    ) -> Result<Gun, Error> {
        let (lower, upper) = self.get_chamber_volume_limits(pressure_target)?;
        if chamber_volume < lower || chamber_volume > upper {
            return Err(Error::ChamberVolumeOutOfRange { requested: chamber_volume, lower, upper });
        }
        self.get_gun_at_pressure(pressure_target, chamber_volume, reduced_burnrate_ratios)
    }

    /// Three guns satisfying `pressure_target`, at chamber volume `V_min`,
    /// the volume maximizing muzzle velocity `V_opt`, and `V_max`.
    pub fn get_limiting_guns_at_pressure(
        &self,
        pressure_target: PressureTarget,
        reduced_burnrate_ratios: &[f64],
    ) -> Result<(Gun, Gun, Gun), Error> {
        let (vol_min, vol_max) = self.get_chamber_volume_limits(pressure_target)?;

        let get_gun_with_volume = |chamber_volume: f64| -> Result<Gun, Error> {
            self.get_gun_at_pressure(pressure_target, chamber_volume, reduced_burnrate_ratios)
        };

        let f = |chamber_volume: f64| -> Result<f64, Error> {
            let gun = Rc::new(get_gun_with_volume(chamber_volume)?);
            let states = Gun::to_travel(&gun, Some(self.base.travel), self.base.n_intg, self.base.acc)?;
            Ok(states.muzzle_velocity().expect("to_travel always marks Muzzle"))
        };

        let (a, b) = gss_max(
            |x| f(x).expect("muzzle velocity is total within the chamber-volume limits"),
            vol_min,
            vol_max,
            self.chamber_min_volume() * self.base.acc,
        );
        let vol_opt = 0.5 * (a + b);

        Ok((get_gun_with_volume(vol_min)?, get_gun_with_volume(vol_opt)?, get_gun_with_volume(vol_max)?))
    }

    /// Finds chamber volumes (one on each side of the velocity-optimal
    /// volume) whose guns satisfy both `pressure_target` and
    /// `velocity_target`. Either branch is `None` if `velocity_target`
    /// falls outside that branch's achievable range.
    pub fn solve_chamber_volume_at_pressure_for_velocity(
        &self,
        pressure_target: PressureTarget,
        velocity_target: f64,
        reduced_burnrate_ratios: &[f64],
    ) -> Result<(Option<Gun>, Option<Gun>), Error> {
        let (gun_vol_min, gun_opt, gun_vol_max) =
            self.get_limiting_guns_at_pressure(pressure_target, reduced_burnrate_ratios)?;

        let get_mv = |gun: &Gun| -> Result<f64, Error> {
            let gun = Rc::new(gun.clone());
            let states = Gun::to_travel(&gun, None, self.base.n_intg, self.base.acc)?;
            Ok(states.muzzle_velocity().expect("to_travel always marks Muzzle"))
        };

        let v_vol_min = get_mv(&gun_vol_min)?;
        let v_vol_max = get_mv(&gun_vol_max)?;
        let v_opt = get_mv(&gun_opt)?;

        let vol_min = gun_vol_min.chamber_volume;
        let vol_max = gun_vol_max.chamber_volume;
        let vol_opt = gun_opt.chamber_volume;

        let f = |chamber_volume: f64| -> Result<Gun, Error> {
            self.get_gun_at_pressure(pressure_target, chamber_volume, reduced_burnrate_ratios)
        };

        let g = |vol_i: f64, vol_j: f64, v_i: f64, v_j: f64| -> Result<Option<Gun>, Error> {
            if v_i.min(v_j) <= velocity_target && velocity_target <= v_i.max(v_j) {
                let tol = self.base.acc * self.chamber_min_volume();
                let (chamber_volume, _) = dekker(
                    |x| get_mv(&f(x).expect("in-bracket chamber volume is feasible")).expect("in-bracket gun is integrable")
                        - velocity_target,
                    vol_i,
                    vol_j,
                    tol,
                )?;
                Ok(Some(f(chamber_volume)?))
            } else {
                Ok(None)
            }
        };

        Ok((g(vol_min, vol_opt, v_vol_min, v_opt)?, g(vol_opt, vol_max, v_opt, v_vol_max)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ib_combustion::{FormFunction, Propellant};

    fn sample_base(travel: f64) -> BaseProblem {
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
    fn chamber_min_volume_matches_solid_volume() {
        let problem = FixedChargeProblem::single_charge(sample_base(3.0), 0.2).unwrap();
        assert_relative_eq!(problem.chamber_min_volume(), 0.2 / 1600.0, max_relative = 1e-9);
    }

    #[test]
    fn chamber_volume_limits_bracket_the_minimum() {
        let problem = FixedChargeProblem::single_charge(sample_base(3.0), 0.2).unwrap();
        let target = PressureTarget::average_pressure(300e6);
        let (lower, upper) = problem.get_chamber_volume_limits(target).unwrap();
        assert!(lower > problem.chamber_min_volume());
        assert!(upper > lower);
    }

    #[test]
    fn out_of_range_chamber_volume_is_rejected() {
        let problem = FixedChargeProblem::single_charge(sample_base(3.0), 0.2).unwrap();
        let target = PressureTarget::average_pressure(300e6);
        let err = problem.solve_reduced_burn_rate_for_volume_at_pressure(1e-9, target, &[1.0]).unwrap_err();
        assert!(matches!(err, Error::ChamberVolumeOutOfRange { .. }));
    }

    #[test]
    fn limiting_guns_all_hit_the_pressure_target() {
        let problem = FixedChargeProblem::single_charge(sample_base(3.0), 0.2).unwrap();
        let target = PressureTarget::average_pressure(300e6);
        let (gun_min, gun_opt, gun_max) = problem.get_limiting_guns_at_pressure(target, &[1.0]).unwrap();
        for gun in [gun_min, gun_opt, gun_max] {
            let gun = Rc::new(gun);
            let states = Gun::to_burnout(&gun, problem.base.n_intg, problem.base.acc, f64::INFINITY, f64::INFINITY).unwrap();
            let peak = states.get_state_by_marker(Marker::PeakPressure).unwrap();
            assert_relative_eq!(peak.average_pressure().unwrap(), 300e6, max_relative = 1e-2);
        }
    }
}
