//! Given a fixed chamber volume, solve for charge mass (and, nested
//! inside that, reduced burn rate) to hit a pressure and/or velocity
//! target.

use std::rc::Rc;

use ib_core::num::{dekker, gss_max};
use ib_core::Error;
use ib_gun::{Gun, Marker, PressureTarget};

use crate::base_problem::BaseProblem;

/// A [`BaseProblem`] with chamber volume already decided; total charge
/// mass (distributed across charges by a fixed ratio) is the free
/// parameter.
#[derive(Clone, Debug)]
pub struct FixedVolumeProblem {
    pub base: BaseProblem,
    pub chamber_volume: f64,
}

impl FixedVolumeProblem {
    pub fn new(base: BaseProblem, chamber_volume: f64) -> Self {
        FixedVolumeProblem { base, chamber_volume }
    }

    /// The total charge mass at which the chamber is exactly filled with
    /// unburnt propellant (zero free gas volume), for charges split
    /// according to `charge_mass_ratios`.
    pub fn get_fill_mass(&self, charge_mass_ratios: &[f64]) -> f64 {
        let ratio_sum: f64 = charge_mass_ratios.iter().sum();
        let solid_volume_per_unit: f64 =
            charge_mass_ratios.iter().zip(&self.base.propellants).map(|(r, p)| r / p.density).sum();
        let average_density = ratio_sum / solid_volume_per_unit;
        self.chamber_volume * average_density
    }

    /// Distributes `total_charge_mass` across charges proportionally to
    /// `charge_mass_ratios`.
    pub fn get_charge_masses(&self, total_charge_mass: f64, charge_mass_ratios: &[f64]) -> Result<Vec<f64>, Error> {
        if charge_mass_ratios.len() != self.base.propellants.len() {
            return Err(Error::DimensionMismatch {
                expected: self.base.propellants.len(),
                got: charge_mass_ratios.len(),
            });
        }
        let ratio_sum: f64 = charge_mass_ratios.iter().sum();
        Ok(charge_mass_ratios.iter().map(|r| r / ratio_sum * total_charge_mass).collect())
    }

    pub fn get_gun(&self, charge_masses: &[f64], reduced_burnrates: &[f64]) -> Result<Gun, Error> {
        self.base.get_gun(self.chamber_volume, charge_masses, reduced_burnrates)
    }

    pub fn get_gun_at_pressure(
        &self,
        pressure_target: PressureTarget,
        charge_masses: &[f64],
        reduced_burnrate_ratios: &[f64],
    ) -> Result<Gun, Error> {
        self.base.get_gun_at_pressure(pressure_target, self.chamber_volume, charge_masses, reduced_burnrate_ratios)
    }

    /// The feasible range of total charge mass for this chamber volume
    /// and `pressure_target`.
    ///
    /// Upper limit: where `bomb_free_fraction` drops to `acc` (more
    /// charge than that cannot physically fit unburnt in the chamber).
    /// Lower limit: where bomb-state pressure equals `(1 + acc) *
    /// pressure_target` (less charge than that cannot reach the target
    /// even with an infinitely fast burn rate).
    pub fn get_charge_mass_limits(
        &self,
        pressure_target: PressureTarget,
        charge_mass_ratios: &[f64],
    ) -> Result<(f64, f64), Error> {
        let acc = self.base.acc;
        let chamber_fill_mass = self.get_fill_mass(charge_mass_ratios);

        let f_ff = |total_charge_mass: f64| -> Result<f64, Error> {
            let masses = self.get_charge_masses(total_charge_mass, charge_mass_ratios)?;
            let ones = vec![1.0; self.base.propellants.len()];
            let gun = self.get_gun(&masses, &ones)?;
            Ok(gun.bomb_free_fraction() - acc)
        };

        let (a, b) = dekker(|x| f_ff(x).expect("bomb_free_fraction is total"), 0.0, chamber_fill_mass, chamber_fill_mass * acc)?;
        let upper_limit = a.min(b);

        let safe_target = pressure_target * (1.0 + acc);
        let f_p = |total_charge_mass: f64| -> Result<f64, Error> {
            let masses = self.get_charge_masses(total_charge_mass, charge_mass_ratios)?;
            let ones = vec![1.0; self.base.propellants.len()];
            let gun = Rc::new(self.get_gun(&masses, &ones)?);
            safe_target.get_difference(&Gun::get_bomb_state(&gun))
        };

        let (a, b) = dekker(|x| f_p(x).expect("bomb pressure is total"), 0.0, upper_limit, chamber_fill_mass * acc)?;
        let lower_limit = a.max(b);

        Ok((lower_limit, upper_limit))
    }

    /// Solves the reduced burn rate for a gun loaded with `charge_masses`
    /// to reach `pressure_target`, after validating their sum falls
    /// inside [`Self::get_charge_mass_limits`].
    pub fn solve_reduced_burn_rate_for_charge_at_pressure(
        &self,
        pressure_target: PressureTarget,
        charge_masses: &[f64],
        reduced_burnrate_ratios: &[f64],
    ) -> Result<Gun, Error> {
        let (lower, upper) = self.get_charge_mass_limits(pressure_target, charge_masses)?;
        let total: f64 = charge_masses.iter().sum();
        if total < lower || total > upper {
            return Err(Error::ChargeMassOutOfRange { requested: total, lower, upper });
        }
        self.get_gun_at_pressure(pressure_target, charge_masses, reduced_burnrate_ratios)
    }

    /// Three guns satisfying `pressure_target`, at total charge mass
    /// `m_min`, the mass maximizing muzzle velocity `m_opt`, and `m_max`.
    pub fn get_limiting_guns_at_pressure(
        &self,
        pressure_target: PressureTarget,
        charge_mass_ratios: &[f64],
        reduced_burnrate_ratios: &[f64],
    ) -> Result<(Gun, Gun, Gun), Error> {
        let (mass_min, mass_max) = self.get_charge_mass_limits(pressure_target, charge_mass_ratios)?;

        let get_gun_with_charge_mass = |total_charge_mass: f64| -> Result<Gun, Error> {
            let masses = self.get_charge_masses(total_charge_mass, charge_mass_ratios)?;
            self.get_gun_at_pressure(pressure_target, &masses, reduced_burnrate_ratios)
        };

        let f = |total_charge_mass: f64| -> Result<f64, Error> {
            let gun = Rc::new(get_gun_with_charge_mass(total_charge_mass)?);
            let states = Gun::to_travel(&gun, Some(self.base.travel), self.base.n_intg, self.base.acc)?;
            Ok(states.muzzle_velocity().expect("to_travel always marks Muzzle"))
        };

        let chamber_fill_mass = self.get_fill_mass(charge_mass_ratios);
        let (a, b) = gss_max(
            |x| f(x).expect("muzzle velocity is total within the charge-mass limits"),
            mass_min,
            mass_max,
            chamber_fill_mass * self.base.acc,
        );
        let mass_opt = 0.5 * (a + b);

        Ok((
            get_gun_with_charge_mass(mass_min)?,
            get_gun_with_charge_mass(mass_opt)?,
            get_gun_with_charge_mass(mass_max)?,
        ))
    }

    /// Finds total charge masses (one on each side of the velocity-optimal
    /// mass) whose guns satisfy both `pressure_target` and
    /// `velocity_target`. Either branch is `None` if `velocity_target`
    /// falls outside that branch's achievable range.
    pub fn solve_charge_mass_at_pressure_for_velocity(
        &self,
        pressure_target: PressureTarget,
        velocity_target: f64,
        charge_mass_ratios: &[f64],
        reduced_burnrate_ratios: &[f64],
    ) -> Result<(Option<Gun>, Option<Gun>), Error> {
        let (gun_mass_min, gun_opt, gun_mass_max) =
            self.get_limiting_guns_at_pressure(pressure_target, charge_mass_ratios, reduced_burnrate_ratios)?;

        let mass_min = gun_mass_min.gross_charge_mass();
        let mass_max = gun_mass_max.gross_charge_mass();
        let mass_opt = gun_opt.gross_charge_mass();

        let get_mv = |gun: &Gun| -> Result<f64, Error> {
            let gun = Rc::new(gun.clone());
            let states = Gun::to_travel(&gun, Some(self.base.travel), self.base.n_intg, self.base.acc)?;
            Ok(states.muzzle_velocity().expect("to_travel always marks Muzzle"))
        };

        let v_mass_min = get_mv(&gun_mass_min)?;
        let v_mass_max = get_mv(&gun_mass_max)?;
        let v_opt = get_mv(&gun_opt)?;

        let chamber_fill_mass = self.get_fill_mass(charge_mass_ratios);

        let f = |charge_mass: f64| -> Result<Gun, Error> {
            let masses = self.get_charge_masses(charge_mass, charge_mass_ratios)?;
            self.get_gun_at_pressure(pressure_target, &masses, reduced_burnrate_ratios)
        };

        let g = |mass_i: f64, mass_j: f64, v_i: f64, v_j: f64| -> Result<Option<Gun>, Error> {
            if v_i.min(v_j) <= velocity_target && velocity_target <= v_i.max(v_j) {
                let tol = self.base.acc * chamber_fill_mass;
                let (charge_mass, _) = dekker(
                    |x| get_mv(&f(x).expect("in-bracket charge mass is feasible")).expect("in-bracket gun is integrable")
                        - velocity_target,
                    mass_i,
                    mass_j,
                    tol,
                )?;
                Ok(Some(f(charge_mass)?))
            } else {
                Ok(None)
            }
        };

        Ok((g(mass_min, mass_opt, v_mass_min, v_opt)?, g(mass_opt, mass_max, v_opt, v_mass_max)?))
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
    fn charge_masses_split_proportionally() {
        let problem = FixedVolumeProblem::new(sample_base(3.0), 1e-3);
        let masses = problem.get_charge_masses(1.0, &[1.0, 3.0]).unwrap();
        assert_relative_eq!(masses[0], 0.25, max_relative = 1e-9);
        assert_relative_eq!(masses[1], 0.75, max_relative = 1e-9);
    }

    #[test]
    fn charge_mass_limits_bracket_a_sane_range() {
        let problem = FixedVolumeProblem::new(sample_base(3.0), 1e-3);
        let target = PressureTarget::average_pressure(300e6);
        let (lower, upper) = problem.get_charge_mass_limits(target, &[1.0]).unwrap();
        assert!(lower > 0.0);
        assert!(upper > lower);
        assert!(upper < problem.get_fill_mass(&[1.0]));
    }

    #[test]
    fn out_of_range_charge_mass_is_rejected() {
        let problem = FixedVolumeProblem::new(sample_base(3.0), 1e-3);
        let target = PressureTarget::average_pressure(300e6);
        let err = problem.solve_reduced_burn_rate_for_charge_at_pressure(target, &[1e-6], &[1.0]).unwrap_err();
        assert!(matches!(err, Error::ChargeMassOutOfRange { .. }));
    }

    #[test]
    fn limiting_guns_all_hit_the_pressure_target() {
        let problem = FixedVolumeProblem::new(sample_base(3.0), 1e-3);
        let target = PressureTarget::average_pressure(300e6);
        let (gun_min, gun_opt, gun_max) = problem.get_limiting_guns_at_pressure(target, &[1.0], &[1.0]).unwrap();
        for gun in [gun_min, gun_opt, gun_max] {
            let gun = Rc::new(gun);
            let states = Gun::to_burnout(&gun, problem.base.n_intg, problem.base.acc, f64::INFINITY, f64::INFINITY).unwrap();
            let peak = states.get_state_by_marker(Marker::PeakPressure).unwrap();
            assert_relative_eq!(peak.average_pressure().unwrap(), 300e6, max_relative = 1e-2);
        }
    }
}
