//! Bore geometry and charge loading, and the forward interior-ballistic
//! integrator built on top of them.

use std::rc::Rc;

use ib_combustion::Charge;
use ib_core::{Error, DEFAULT_ACC, DEFAULT_GUN_LOSS_FRACTION, DEFAULT_GUN_START_PRESSURE, DEFAULT_STEPS, MAX_DT};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::marker::Marker;
use crate::state::{State, StateList, StateVector};

/// Physical description of a gun and its charge loading.
///
/// Charge-invariant bore geometry (cross-section, shot mass, chamber
/// volume) is held alongside a list of `(Charge, mass)` pairs: a gun may
/// be loaded with several distinct propellants fired together, each
/// contributing its own mass to the charge.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gun {
    pub name: String,
    pub description: String,
    pub family: String,
    /// Bore cross-sectional area, m^2.
    pub cross_section: f64,
    /// Projectile mass, kg.
    pub shot_mass: f64,
    /// Each propellant charge loaded, paired with its mass in kg.
    pub charges: Vec<(Charge, f64)>,
    /// Chamber volume, m^3.
    pub chamber_volume: f64,
    /// Fractional loss to friction, heat, and rotating-band engraving,
    /// expressed as a fraction of the shot's kinetic energy.
    pub loss_fraction: f64,
    /// Pressure at which the projectile begins to move, Pa.
    pub start_pressure: f64,
    /// Bore travel to the muzzle, m, if this gun has a fixed known
    /// length. `None` for guns whose length is itself a design unknown.
    pub travel: Option<f64>,
}

impl Gun {
    /// Builds a gun from its full charge list. Fails with
    /// [`Error::DimensionMismatch`] if `charges` is empty.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        description: String,
        family: String,
        cross_section: f64,
        shot_mass: f64,
        charges: Vec<(Charge, f64)>,
        chamber_volume: f64,
        loss_fraction: Option<f64>,
        start_pressure: Option<f64>,
        travel: Option<f64>,
    ) -> Result<Gun, Error> {
        if charges.is_empty() {
            return Err(Error::DimensionMismatch { expected: 1, got: 0 });
        }
        Ok(Gun {
            name,
            description,
            family,
            cross_section,
            shot_mass,
            charges,
            chamber_volume,
            loss_fraction: loss_fraction.unwrap_or(DEFAULT_GUN_LOSS_FRACTION),
            start_pressure: start_pressure.unwrap_or(DEFAULT_GUN_START_PRESSURE),
            travel,
        })
    }

    /// As [`Gun::new`], for the common case of a single propellant charge.
    #[allow(clippy::too_many_arguments)]
    pub fn single_charge(
        name: String,
        description: String,
        family: String,
        cross_section: f64,
        shot_mass: f64,
        charge: Charge,
        charge_mass: f64,
        chamber_volume: f64,
        loss_fraction: Option<f64>,
        start_pressure: Option<f64>,
        travel: Option<f64>,
    ) -> Result<Gun, Error> {
        Gun::new(
            name,
            description,
            family,
            cross_section,
            shot_mass,
            vec![(charge, charge_mass)],
            chamber_volume,
            loss_fraction,
            start_pressure,
            travel,
        )
    }

    /// Equivalent column length of the chamber: `chamber_volume /
    /// cross_section`.
    pub fn l_0(&self) -> f64 {
        self.chamber_volume / self.cross_section
    }

    /// Sum of every charge's mass.
    pub fn gross_charge_mass(&self) -> f64 {
        self.charges.iter().map(|(_, mass)| mass).sum()
    }

    /// `gross_charge_mass / chamber_volume`: the gun's loading density.
    pub fn delta(&self) -> f64 {
        self.gross_charge_mass() / self.chamber_volume
    }

    /// Sum of each charge's solid volume (`mass / density`).
    pub fn charge_volume(&self) -> f64 {
        self.charges.iter().map(|(charge, mass)| mass / charge.propellant.density).sum()
    }

    /// `1 + loss_fraction + gross_charge_mass / (3 * shot_mass)`: the
    /// effective mass multiplier in the shot's equation of motion,
    /// accounting for both losses and the propellant gas's own inertia
    /// (via Resal's approximation, a third of the charge mass moving at
    /// the shot's velocity).
    pub fn phi(&self) -> f64 {
        1.0 + self.loss_fraction + self.gross_charge_mass() / (3.0 * self.shot_mass)
    }

    /// `1 + loss_fraction`, excluding the propellant-gas-inertia term of
    /// [`Self::phi`].
    pub fn phi_1(&self) -> f64 {
        1.0 + self.loss_fraction
    }

    /// Fraction of the chamber volume not occupied by unburnt propellant's
    /// own covolume, at full combustion.
    pub fn bomb_free_fraction(&self) -> f64 {
        let occupied: f64 = self.charges.iter().map(|(charge, mass)| charge.propellant.covolume * mass).sum();
        1.0 - occupied / self.chamber_volume
    }

    /// The mixed combustion gas's `adiabatic_index - 1`, taken from
    /// whichever charge contributes the most mass.
    pub fn theta(&self) -> f64 {
        let (charge, _) = self
            .charges
            .iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .expect("Gun::new guarantees at least one charge");
        charge.theta()
    }

    /// The velocity the shot would reach given infinite bore length: the
    /// limit as all propellant energy converts to shot kinetic energy.
    pub fn asymptotic_velocity(&self) -> f64 {
        let energy: f64 = self.charges.iter().map(|(charge, mass)| charge.propellant.force * mass).sum();
        (2.0 * energy / (self.theta() * self.phi() * self.shot_mass)).sqrt()
    }

    /// `(velocity / asymptotic_velocity)^2`.
    pub fn get_thermal_efficiency(&self, velocity: f64) -> f64 {
        (velocity / self.asymptotic_velocity()).powi(2)
    }

    /// Thermal efficiency scaled down by [`Self::phi`], accounting for
    /// losses and gas inertia not imparted to the shot.
    pub fn get_ballistic_efficiency(&self, velocity: f64) -> f64 {
        self.get_thermal_efficiency(velocity) / self.phi()
    }

    /// Ratio of realized shot kinetic energy to the work the peak average
    /// pressure could have done over the same travel.
    pub fn get_piezoelectric_efficiency(&self, travel: f64, velocity: f64, peak_average_pressure: f64) -> f64 {
        (0.5 * self.phi() * self.shot_mass * velocity * velocity) / (self.cross_section * travel * peak_average_pressure)
    }

    /// Total chemical energy released by `psis` fraction of each charge,
    /// net of the shot's kinetic energy at `v`.
    pub fn gas_energy(&self, psis: &[f64], v: f64) -> f64 {
        let mut g_e = -0.5 * self.theta() * self.phi() * self.shot_mass * v * v;
        for ((charge, mass), psi) in self.charges.iter().zip(psis) {
            g_e += charge.propellant.force * mass * psi;
        }
        g_e
    }

    /// Fraction of the chamber's length occupied by unburnt propellant
    /// and dissolved covolume, at burnup fractions `psis`.
    pub fn incompressible_fraction(&self, psis: &[f64]) -> f64 {
        let mut fraction = 0.0;
        for ((charge, mass), psi) in self.charges.iter().zip(psis) {
            let delta = mass / self.chamber_volume;
            fraction += delta / charge.propellant.density * (1.0 - psi) + charge.propellant.covolume * delta * psi;
        }
        fraction
    }

    /// The state corresponding to full combustion with the projectile
    /// held fixed (a closed bomb): the maximum pressure achievable under
    /// this loading, regardless of burn rate.
    pub fn get_bomb_state(gun: &Rc<Gun>) -> State {
        let z_ks = gun.charges.iter().map(|(charge, _)| charge.z_k()).collect();
        State::new(gun.clone(), StateVector::new(0.0, 0.0, 0.0, z_ks), Marker::Bomb, true)
    }

    /// The velocity the shot would reach at `travel`, computed in closed
    /// form from the post-burnout adiabatic expansion law rather than by
    /// further integration.
    pub fn get_velocity_post_burnout(&self, burnout_state: &State, travel: f64) -> f64 {
        let (l_k, v_k) = (burnout_state.travel(), burnout_state.velocity());
        let ones = vec![1.0; self.charges.len()];
        let l_1 = self.l_0() * (1.0 - self.incompressible_fraction(&ones));
        let v_j = self.asymptotic_velocity();
        let theta = self.theta();

        (1.0 - (1.0 - (v_k / v_j).powi(2)) / ((l_1 + travel) / (l_1 + l_k)).powf(theta)).sqrt() * v_j
    }

    /// The bore travel at which the shot would reach `velocity`, the
    /// inverse of [`Self::get_velocity_post_burnout`].
    pub fn get_travel_post_burnout(&self, burnout_state: &State, velocity: f64) -> f64 {
        let (l_k, v_k) = (burnout_state.travel(), burnout_state.velocity());
        let ones = vec![1.0; self.charges.len()];
        let l_1 = self.l_0() * (1.0 - self.incompressible_fraction(&ones));
        let v_j = self.asymptotic_velocity();
        let theta = self.theta();

        (l_1 + l_k) * ((1.0 - (velocity / v_j).powi(2)) / (1.0 - (v_k / v_j).powi(2))).powf(-1.0 / theta) - l_1
    }

    /// The time-wise derivative of the state vector: `dZ/dt` per charge,
    /// plus `dl/dt = v` and `dv/dt = S*P/(phi*m)` once the shot has
    /// started (both zero before shot start, since pressure alone cannot
    /// yet move the shot).
    fn dt(gun: &Rc<Gun>, state: &State) -> Result<StateVector, Error> {
        let p = state.average_pressure()?;
        let dzs: Vec<f64> = gun.charges.iter().map(|(charge, _)| charge.dzdt(p)).collect();
        let (travel, velocity) = if state.is_started {
            (state.velocity(), gun.cross_section * p / (gun.phi() * gun.shot_mass))
        } else {
            (0.0, 0.0)
        };
        Ok(StateVector::new(1.0, travel, velocity, dzs))
    }

    /// The travel-wise derivative: `d/dl = d/dt * dt/dl = d/dt / v`.
    fn dl(gun: &Rc<Gun>, state: &State) -> Result<StateVector, Error> {
        let v = state.velocity();
        Ok(Gun::dt(gun, state)? / v)
    }

    /// The velocity-wise derivative: `d/dv = d/dt * dt/dv = d/dt /
    /// (dv/dt)`.
    fn dv(gun: &Rc<Gun>, state: &State) -> Result<StateVector, Error> {
        let d = Gun::dt(gun, state)?;
        let dv_dt = d.velocity;
        Ok(d / dv_dt)
    }

    fn propagate_rk4(
        gun: &Rc<Gun>,
        state: &State,
        df: impl Fn(&Rc<Gun>, &State) -> Result<StateVector, Error>,
        increment: impl Fn(&State, &StateVector, f64, Marker) -> State,
        dx: f64,
        marker: Marker,
    ) -> Result<State, Error> {
        let k1 = df(gun, state)?;
        let s2 = increment(state, &(&k1 * (0.5 * dx)), 0.5 * dx, Marker::Intermediate);
        let k2 = df(gun, &s2)?;
        let s3 = increment(state, &(&k2 * (0.5 * dx)), 0.5 * dx, Marker::Intermediate);
        let k3 = df(gun, &s3)?;
        let s4 = increment(state, &(&k3 * dx), dx, Marker::Intermediate);
        let k4 = df(gun, &s4)?;

        let total = (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dx / 6.0);
        Ok(increment(state, &total, dx, marker))
    }

    /// Advances `state` by time step `dt` using classical fourth-order
    /// Runge-Kutta, with time as the independent variable.
    pub fn propagate_rk4_in_time(gun: &Rc<Gun>, state: &State, dt: f64, marker: Marker) -> Result<State, Error> {
        Gun::propagate_rk4(gun, state, Gun::dt, State::increment_time, dt, marker)
    }

    /// As [`Self::propagate_rk4_in_time`], with bore travel as the
    /// independent variable.
    pub fn propagate_rk4_in_travel(gun: &Rc<Gun>, state: &State, dl: f64, marker: Marker) -> Result<State, Error> {
        Gun::propagate_rk4(gun, state, Gun::dl, State::increment_travel, dl, marker)
    }

    /// As [`Self::propagate_rk4_in_time`], with shot velocity as the
    /// independent variable.
    pub fn propagate_rk4_in_velocity(gun: &Rc<Gun>, state: &State, dv: f64, marker: Marker) -> Result<State, Error> {
        Gun::propagate_rk4(gun, state, Gun::dv, State::increment_velocity, dv, marker)
    }

    /// Integrates from ignition to shot start (the point at which
    /// pressure overcomes [`Self::start_pressure`] and the projectile
    /// begins to move).
    ///
    /// Fails with [`Error::CannotStart`] if the gun's bomb-state pressure
    /// never reaches `start_pressure`, regardless of burn rate.
    pub fn to_start(gun: &Rc<Gun>, n_intg: usize, acc: f64) -> Result<StateList, Error> {
        let bomb_pressure = Gun::get_bomb_state(gun)
            .average_pressure()
            .expect("the bomb state's burnup fractions are always within psi's domain");
        if bomb_pressure < gun.start_pressure {
            return Err(Error::CannotStart { bomb_pressure, start_pressure: gun.start_pressure });
        }

        let initial_state = State::new(
            gun.clone(),
            StateVector::new(0.0, 0.0, 0.0, vec![0.0; gun.charges.len()]),
            Marker::Ignition,
            false,
        );

        let mut delta_t = MAX_DT;
        let mut rough_ttb = 0.0_f64;
        let mut states = StateList::new();
        let mut s_now = initial_state.clone();
        let mut s_next = initial_state.clone();

        while states.len() < n_intg {
            if rough_ttb > 0.0 {
                delta_t = rough_ttb / n_intg as f64;
            }
            s_next = initial_state.clone();
            states = StateList::new();
            states.push(s_next.clone());

            while s_next.average_pressure()? < gun.start_pressure {
                s_now = s_next.clone();
                states.push(s_now.clone());
                s_next = Gun::propagate_rk4_in_time(gun, &s_now, delta_t, Marker::Step)?;
            }

            rough_ttb = s_next.time();
        }

        let state_at_time = |time: f64| -> State {
            Gun::propagate_rk4_in_time(gun, &s_now, time - s_now.time(), Marker::Intermediate)
                .expect("propagation within the shot-start bracket stays within psi's domain")
        };

        let (start_time, _) = ib_core::num::dekker(
            |t| {
                state_at_time(t)
                    .average_pressure()
                    .expect("propagation within the shot-start bracket stays within psi's domain")
                    - gun.start_pressure
            },
            s_now.time(),
            s_next.time(),
            rough_ttb * acc,
        )?;

        let s_start = Gun::propagate_rk4_in_time(gun, &s_now, start_time - s_now.time(), Marker::Start)?;
        states.push(s_start);

        Ok(states)
    }

    /// The `Start`-marked state from [`Self::to_start`].
    pub fn get_start_state(gun: &Rc<Gun>, n_intg: usize, acc: f64) -> Result<State, Error> {
        let states = Gun::to_start(gun, n_intg, acc)?;
        Ok(states.get_state_by_marker(Marker::Start).expect("to_start always appends a Start state").clone())
    }

    /// Integrates projectile motion from shot start up to propellant
    /// burnout (or an abort condition), marking the peak-pressure point
    /// along the way.
    ///
    /// The adaptive step size is first seeded from [`MAX_DT`], then
    /// refined: each pass's total elapsed time informs a step size for
    /// the next pass, repeated until at least `n_intg` steps have been
    /// taken. The final burnout or abort point is then bracketed and
    /// resolved to `acc` times the approximate total time via
    /// [`ib_core::num::dekker`].
    pub fn to_burnout(
        gun: &Rc<Gun>,
        n_intg: usize,
        acc: f64,
        abort_velocity: f64,
        abort_travel: f64,
    ) -> Result<StateList, Error> {
        let start_state = Gun::get_start_state(gun, n_intg, acc)?;
        let z_c0s = start_state.burnup_fractions().to_vec();

        let abort = |s: &State| s.travel() > abort_travel || s.velocity() > abort_velocity;

        let mut states = StateList::new();
        let mut delta_t = MAX_DT;
        let mut rough_ttb = 0.0_f64;
        let mut s_now = start_state.clone();
        let mut s_next = start_state;

        while states.len() < n_intg {
            if rough_ttb > 0.0 {
                delta_t = rough_ttb / n_intg as f64;
            }
            states = StateList::new();
            s_next = State::new(gun.clone(), StateVector::new(0.0, 0.0, 0.0, z_c0s.clone()), Marker::Start, true);

            while !(s_next.is_burnout() || abort(&s_next)) {
                s_now = s_next.clone();
                states.push(s_now.clone());
                s_next = Gun::propagate_rk4_in_time(gun, &s_now, delta_t, Marker::Step)?;
            }

            rough_ttb = s_next.time();
        }

        let time_end = |time: f64| -> f64 {
            let s = Gun::propagate_rk4_in_time(gun, &s_now, time - s_now.time(), Marker::Intermediate)
                .expect("propagation within the burnout bracket stays within psi's domain");
            if s.is_burnout() || abort(&s) {
                -1.0
            } else {
                1.0
            }
        };

        let (a, b) = ib_core::num::dekker(time_end, s_now.time(), s_next.time(), rough_ttb * acc)?;
        let end_time = a.max(b);

        let s_end = Gun::propagate_rk4_in_time(gun, &s_now, end_time - s_now.time(), Marker::Intermediate)?;

        if abort(&s_end) {
            // abort takes priority over burnout when both are reached in the same step.
        } else if s_end.is_burnout() {
            states.push(State::remark(&s_end, Marker::Burnout));
        }

        Gun::mark_max_pressure(gun, states, acc)
    }

    /// Integrates up to `travel` (or the gun's own bore length, if
    /// `travel` is not given): by time-wise ODE up to burnout, then by a
    /// single travel-wise RK4 step to the muzzle.
    ///
    /// Fails with [`Error::MissingTravel`] if neither `travel` nor the
    /// gun's own [`Self::travel`] is set.
    pub fn to_travel(gun: &Rc<Gun>, travel: Option<f64>, n_intg: usize, acc: f64) -> Result<StateList, Error> {
        let travel = travel.filter(|&t| t != 0.0).or(gun.travel).filter(|&t| t != 0.0).ok_or(Error::MissingTravel)?;

        let mut states = Gun::to_burnout(gun, n_intg, acc, f64::INFINITY, travel)?;
        let mut state = states.latest().expect("to_burnout always returns a non-empty trajectory").clone();

        if states.has_state_with_marker(Marker::Burnout) {
            let burnout_state = states.get_state_by_marker(Marker::Burnout).expect("just checked").clone();

            let v_muzzle = gun.get_velocity_post_burnout(&burnout_state, travel);
            let v_burnout = burnout_state.velocity();
            let v_average = (v_muzzle + v_burnout) * 0.5;
            let ttm_est = (travel - burnout_state.travel()) / v_average;

            let span = states.latest().unwrap().time() - states.earliest().unwrap().time();
            let dt = (span / states.len() as f64).max(ttm_est / n_intg as f64);

            let mut next_state = Gun::propagate_rk4_in_time(gun, &state, dt, Marker::Step)?;
            while next_state.travel() < travel {
                state = next_state.clone();
                states.push(state.clone());
                next_state = Gun::propagate_rk4_in_time(gun, &state, dt, Marker::Step)?;
            }
        }

        states.push(Gun::propagate_rk4_in_travel(gun, &state, travel - state.travel(), Marker::Muzzle)?);

        Gun::mark_max_pressure(gun, states, acc)
    }

    /// Locates the peak-pressure point in `states` via golden-section
    /// search and inserts it, keeping the list sorted by time.
    ///
    /// A no-op if `states` already carries a [`Marker::PeakPressure`]
    /// point (so repeated calls across `to_burnout`/`to_travel` are
    /// idempotent).
    pub fn mark_max_pressure(gun: &Rc<Gun>, mut states: StateList, acc: f64) -> Result<StateList, Error> {
        if states.iter().any(|s| s.marker == Marker::PeakPressure) {
            return Ok(states);
        }

        let total_time =
            states.latest().expect("non-empty trajectory").time() - states.earliest().expect("non-empty trajectory").time();

        let mut pressures = Vec::with_capacity(states.len());
        for s in states.iter() {
            pressures.push(s.average_pressure()?);
        }
        let j = pressures
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(i, _)| i)
            .expect("non-empty trajectory");

        let i = j.saturating_sub(1);
        let k = (j + 1).min(states.len() - 1);

        let s_i = states[i].clone();
        let s_j = states[j].clone();
        let s_k = states[k].clone();

        let time_pressure = |time: f64| -> f64 {
            let step = if time < s_j.time() {
                Gun::propagate_rk4_in_time(gun, &s_i, time - s_i.time(), Marker::Intermediate)
            } else {
                Gun::propagate_rk4_in_time(gun, &s_j, time - s_j.time(), Marker::Intermediate)
            };
            step.expect("propagation within the peak-pressure bracket stays within psi's domain")
                .average_pressure()
                .expect("propagation within the peak-pressure bracket stays within psi's domain")
        };

        let (a, b) = ib_core::num::gss_max(time_pressure, s_i.time(), s_k.time(), acc * total_time);
        let time_p_max = 0.5 * (a + b);

        let s_p_max = Gun::propagate_rk4_in_time(gun, &s_j, time_p_max - s_j.time(), Marker::PeakPressure)?;
        states.insort(s_p_max);

        Ok(states)
    }
}

impl Default for Gun {
    fn default() -> Self {
        Gun {
            name: String::new(),
            description: String::new(),
            family: String::new(),
            cross_section: 0.0,
            shot_mass: 0.0,
            charges: Vec::new(),
            chamber_volume: 0.0,
            loss_fraction: DEFAULT_GUN_LOSS_FRACTION,
            start_pressure: DEFAULT_GUN_START_PRESSURE,
            travel: None,
        }
    }
}

/// Uses the workspace defaults for `n_intg`/`acc` ([`DEFAULT_STEPS`],
/// [`DEFAULT_ACC`]) when the caller does not need finer control.
pub fn to_start_default(gun: &Rc<Gun>) -> Result<StateList, Error> {
    Gun::to_start(gun, DEFAULT_STEPS, DEFAULT_ACC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ib_combustion::{FormFunction, Propellant};

    fn sample_gun() -> Rc<Gun> {
        let propellant = Propellant {
            name: "M1".to_string(),
            force: 950_000.0,
            burn_rate_coefficient: Some(6.25e-10),
            adiabatic_index: 1.25,
            ..Propellant::default()
        };
        let form_function = FormFunction::single_perf(1.8e-3, 0.26);
        let charge = Charge::from_propellant(propellant, form_function, None).unwrap();

        Rc::new(
            Gun::single_charge(
                "test gun".to_string(),
                String::new(),
                String::new(),
                std::f64::consts::PI * 0.01 * 0.01,
                1.0,
                charge,
                0.2,
                1e-3,
                None,
                None,
                Some(3.0),
            )
            .unwrap(),
        )
    }

    #[test]
    fn bomb_state_marks_full_burnup() {
        let gun = sample_gun();
        let bomb = Gun::get_bomb_state(&gun);
        assert_eq!(bomb.marker, Marker::Bomb);
        for (z, (_, z_k)) in bomb.burnup_fractions().iter().zip(gun.charges.iter().map(|(c, _)| (c, c.z_k()))) {
            assert_abs_diff_eq!(*z, z_k, epsilon = 1e-12);
        }
    }

    #[test]
    fn to_start_produces_increasing_pressure_up_to_start_pressure() {
        let gun = sample_gun();
        let states = Gun::to_start(&gun, 10, 1e-3).unwrap();
        let start = states.get_state_by_marker(Marker::Start).unwrap();
        assert_abs_diff_eq!(start.average_pressure().unwrap(), gun.start_pressure, epsilon = gun.start_pressure * 1e-3);
    }

    #[test]
    fn to_burnout_reaches_full_combustion() {
        let gun = sample_gun();
        let states = Gun::to_burnout(&gun, 10, 1e-3, f64::INFINITY, f64::INFINITY).unwrap();
        assert!(states.has_state_with_marker(Marker::Burnout));
        assert!(states.has_state_with_marker(Marker::PeakPressure));
    }

    #[test]
    fn to_travel_reaches_requested_muzzle_travel() {
        let gun = sample_gun();
        let states = Gun::to_travel(&gun, Some(3.0), 10, 1e-3).unwrap();
        let muzzle = states.get_state_by_marker(Marker::Muzzle).unwrap();
        assert_abs_diff_eq!(muzzle.travel(), 3.0, epsilon = 1e-6);
        assert!(muzzle.velocity() > 0.0);
    }

    #[test]
    fn to_travel_without_any_travel_is_rejected() {
        let mut gun = (*sample_gun()).clone();
        gun.travel = None;
        let gun = Rc::new(gun);
        let err = Gun::to_travel(&gun, None, 10, 1e-3).unwrap_err();
        assert!(matches!(err, Error::MissingTravel));
    }

    #[test]
    fn mark_max_pressure_is_idempotent() {
        let gun = sample_gun();
        let states = Gun::to_burnout(&gun, 10, 1e-3, f64::INFINITY, f64::INFINITY).unwrap();
        let n_before = states.len();
        let states_again = Gun::mark_max_pressure(&gun, states, 1e-3).unwrap();
        assert_eq!(states_again.len(), n_before);
    }

    #[test]
    fn gun_with_no_charges_is_rejected() {
        let err = Gun::new(
            String::new(),
            String::new(),
            String::new(),
            1e-4,
            1.0,
            Vec::new(),
            1e-3,
            None,
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }
}
