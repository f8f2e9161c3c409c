//! A point in the interior-ballistic system of equations, and lists of
//! such points forming a trajectory.

use std::cell::OnceCell;
use std::ops::{Add, Div, Mul};
use std::rc::Rc;

use ib_core::Error;

use crate::gun::Gun;
use crate::marker::Marker;

/// The four coordinates integrated by the forward solver: time, shot
/// travel, shot velocity, and each charge's linear burnup depth `Z`.
///
/// Supports the arithmetic (`+`, scalar `*`, scalar `/`) the RK4
/// integrator needs to form weighted combinations of derivative
/// estimates.
#[derive(Clone, Debug, PartialEq)]
pub struct StateVector {
    pub time: f64,
    pub travel: f64,
    pub velocity: f64,
    pub burnup_fractions: Vec<f64>,
}

impl StateVector {
    pub fn new(time: f64, travel: f64, velocity: f64, burnup_fractions: Vec<f64>) -> Self {
        StateVector { time, travel, velocity, burnup_fractions }
    }
}

impl Mul<f64> for StateVector {
    type Output = StateVector;
    fn mul(self, scalar: f64) -> StateVector {
        StateVector {
            time: self.time * scalar,
            travel: self.travel * scalar,
            velocity: self.velocity * scalar,
            burnup_fractions: self.burnup_fractions.iter().map(|z| z * scalar).collect(),
        }
    }
}

impl Mul<f64> for &StateVector {
    type Output = StateVector;
    fn mul(self, scalar: f64) -> StateVector {
        self.clone() * scalar
    }
}

impl Add for StateVector {
    type Output = StateVector;
    fn add(self, other: StateVector) -> StateVector {
        StateVector {
            time: self.time + other.time,
            travel: self.travel + other.travel,
            velocity: self.velocity + other.velocity,
            burnup_fractions: self
                .burnup_fractions
                .iter()
                .zip(other.burnup_fractions.iter())
                .map(|(a, b)| a + b)
                .collect(),
        }
    }
}

impl Div<f64> for StateVector {
    type Output = StateVector;
    fn div(self, scalar: f64) -> StateVector {
        self * (1.0 / scalar)
    }
}

/// A particular point in a trajectory: a [`StateVector`], the gun it was
/// computed for, and a [`Marker`] recording its significance.
///
/// `average_pressure` is expensive enough (it evaluates every charge's
/// form function) to be worth memoizing; since a `State` is otherwise
/// immutable, the cache is populated at most once.
#[derive(Clone, Debug)]
pub struct State {
    pub gun: Rc<Gun>,
    pub sv: StateVector,
    pub marker: Marker,
    pub is_started: bool,
    average_pressure_cache: OnceCell<f64>,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.sv.time == other.sv.time
    }
}
impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.sv.time.partial_cmp(&other.sv.time)
    }
}

impl State {
    pub fn new(gun: Rc<Gun>, sv: StateVector, marker: Marker, is_started: bool) -> Self {
        State { gun, sv, marker, is_started, average_pressure_cache: OnceCell::new() }
    }

    pub fn time(&self) -> f64 {
        self.sv.time
    }

    pub fn travel(&self) -> f64 {
        self.sv.travel
    }

    pub fn velocity(&self) -> f64 {
        self.sv.velocity
    }

    pub fn burnup_fractions(&self) -> &[f64] {
        &self.sv.burnup_fractions
    }

    /// Builds a new `State` sharing this one's coordinates but carrying a
    /// different marker; used to retroactively label a point (e.g. as
    /// [`Marker::Burnout`]) once its significance is known.
    pub fn remark(old_state: &State, new_marker: Marker) -> State {
        State::new(old_state.gun.clone(), old_state.sv.clone(), new_marker, old_state.is_started)
    }

    /// `psi(Z)` for each charge, with `Z` clamped to `[0, Z_k]` before
    /// evaluation: burnup fractions can overshoot `Z_k` slightly between
    /// integration steps, and the grain is simply spent beyond that
    /// point.
    pub fn volume_burnup_fractions(&self) -> Result<Vec<f64>, Error> {
        self.gun
            .charges
            .iter()
            .zip(self.burnup_fractions())
            .map(|((charge, _mass), &z)| charge.psi(z.clamp(0.0, charge.z_k())))
            .collect()
    }

    /// The charge-mass-weighted average of [`Self::volume_burnup_fractions`].
    pub fn gross_volume_burnup_fraction(&self) -> Result<f64, Error> {
        let psis = self.volume_burnup_fractions()?;
        let weighted: f64 =
            self.gun.charges.iter().zip(psis.iter()).map(|((_, mass), psi)| mass * psi).sum();
        Ok(weighted / self.gun.gross_charge_mass())
    }

    /// The length-averaged pressure in the equivalent gun, under the
    /// Lagrange gradient of 0-dimensional interior ballistics.
    ///
    /// The equivalent gun is formed by stretching the chamber volume of
    /// the actual gun into a section of uniform cross-section throughout;
    /// the error of this treatment is usually insignificant for
    /// conventional firearms (though more of a concern in light gas
    /// guns). Returns `+inf` if the equivalent column of unburnt
    /// propellant would occupy negative length (a loading that cannot
    /// physically exist).
    pub fn average_pressure(&self) -> Result<f64, Error> {
        if let Some(p) = self.average_pressure_cache.get() {
            return Ok(*p);
        }
        let psis = self.volume_burnup_fractions()?;
        let l_psi = self.gun.l_0() * (1.0 - self.gun.incompressible_fraction(&psis));
        let p = if l_psi <= 0.0 {
            f64::INFINITY
        } else {
            self.gun.gas_energy(&psis, self.velocity()) / (self.gun.cross_section * (l_psi + self.travel()))
        };
        Ok(*self.average_pressure_cache.get_or_init(|| p))
    }

    /// The shot-base pressure in the equivalent gun.
    pub fn shot_pressure(&self) -> Result<f64, Error> {
        let p_bar = self.average_pressure()?;
        Ok(p_bar / (1.0 + self.gun.gross_charge_mass() / (3.0 * self.gun.shot_mass * (1.0 + self.gun.loss_fraction))))
    }

    /// The breech-face pressure in the equivalent gun.
    pub fn breech_pressure(&self) -> Result<f64, Error> {
        let p_s = self.shot_pressure()?;
        Ok(p_s * (1.0 + self.gun.gross_charge_mass() / (2.0 * self.gun.shot_mass * (1.0 + self.gun.loss_fraction))))
    }

    /// Whether every charge has burnt past its `Z_k`.
    pub fn is_burnout(&self) -> bool {
        self.gun.charges.iter().zip(self.burnup_fractions()).all(|((charge, _), &z)| z > charge.z_k())
    }

    fn increment(&self, d: &StateVector, time: f64, travel: f64, velocity: f64, marker: Marker) -> State {
        let burnup_fractions =
            self.burnup_fractions().iter().zip(d.burnup_fractions.iter()).map(|(v, w)| v + w).collect();
        State::new(
            self.gun.clone(),
            StateVector::new(time, travel, velocity, burnup_fractions),
            marker,
            self.is_started,
        )
    }

    /// Advances by a time-wise RK4 increment `d` over step `dt`.
    pub fn increment_time(&self, d: &StateVector, dt: f64, marker: Marker) -> State {
        self.increment(d, self.time() + dt, self.travel() + d.travel, self.velocity() + d.velocity, marker)
    }

    /// Advances by a travel-wise RK4 increment `d` over step `dl`.
    pub fn increment_travel(&self, d: &StateVector, dl: f64, marker: Marker) -> State {
        self.increment(d, self.time() + d.time, self.travel() + dl, self.velocity() + d.velocity, marker)
    }

    /// Advances by a velocity-wise RK4 increment `d` over step `dv`.
    pub fn increment_velocity(&self, d: &StateVector, dv: f64, marker: Marker) -> State {
        self.increment(d, self.time() + d.time, self.travel() + d.travel, self.velocity() + dv, marker)
    }
}

/// An ordered trajectory of [`State`]s, sorted by time, with lookups by
/// [`Marker`].
#[derive(Clone, Debug, Default)]
pub struct StateList {
    states: Vec<State>,
}

impl StateList {
    pub fn new() -> Self {
        StateList { states: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, State> {
        self.states.iter()
    }

    pub fn push(&mut self, state: State) {
        self.states.push(state);
    }

    /// Inserts `state` at the position that keeps the list sorted by
    /// time.
    pub fn insort(&mut self, state: State) {
        let pos = self.states.partition_point(|s| s.time() <= state.time());
        self.states.insert(pos, state);
    }

    pub fn first(&self) -> Option<&State> {
        self.states.first()
    }

    pub fn last(&self) -> Option<&State> {
        self.states.last()
    }

    /// The state with the latest time; the Python original used `max()`
    /// over `State.__lt__`, which compares by time.
    pub fn latest(&self) -> Option<&State> {
        self.states.iter().max_by(|a, b| a.time().partial_cmp(&b.time()).unwrap())
    }

    pub fn earliest(&self) -> Option<&State> {
        self.states.iter().min_by(|a, b| a.time().partial_cmp(&b.time()).unwrap())
    }

    pub fn get_state_by_marker(&self, marker: Marker) -> Option<&State> {
        self.states.iter().find(|s| s.marker == marker)
    }

    pub fn has_state_with_marker(&self, marker: Marker) -> bool {
        self.get_state_by_marker(marker).is_some()
    }

    pub fn muzzle_velocity(&self) -> Option<f64> {
        self.get_state_by_marker(Marker::Muzzle).map(State::velocity)
    }

    pub fn travel(&self) -> Option<f64> {
        self.get_state_by_marker(Marker::Muzzle).map(State::travel)
    }

    pub fn burnout_point(&self) -> Option<f64> {
        self.get_state_by_marker(Marker::Burnout).map(State::travel)
    }

    pub fn peak_shot_pressure(&self) -> Option<Result<f64, Error>> {
        self.get_state_by_marker(Marker::PeakPressure).map(State::shot_pressure)
    }

    pub fn peak_average_pressure(&self) -> Option<Result<f64, Error>> {
        self.get_state_by_marker(Marker::PeakPressure).map(State::average_pressure)
    }
}

impl IntoIterator for StateList {
    type Item = State;
    type IntoIter = std::vec::IntoIter<State>;
    fn into_iter(self) -> Self::IntoIter {
        self.states.into_iter()
    }
}

impl<'a> IntoIterator for &'a StateList {
    type Item = &'a State;
    type IntoIter = std::slice::Iter<'a, State>;
    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}

impl std::ops::Index<usize> for StateList {
    type Output = State;
    fn index(&self, i: usize) -> &State {
        &self.states[i]
    }
}
