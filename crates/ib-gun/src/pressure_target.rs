//! A pressure value tagged with where in the gun it is measured.

use std::ops::{Div, Mul};

use ib_core::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::state::State;

/// Which of [`State::breech_pressure`], [`State::average_pressure`] or
/// [`State::shot_pressure`] a [`PressureTarget`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PressureKind {
    Breech,
    Average,
    Shot,
}

/// A pressure value together with the location it is specified at.
///
/// Solvers throughout `ib-problem` are parameterized by a `PressureTarget`
/// rather than a bare `f64`: maximum chamber (breech) pressure, mean bore
/// (average) pressure, and shot-base pressure are all common design
/// constraints and must not be conflated.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PressureTarget {
    pub value: f64,
    pub target: PressureKind,
}

impl PressureTarget {
    pub fn breech_pressure(value: f64) -> Self {
        PressureTarget { value, target: PressureKind::Breech }
    }

    pub fn average_pressure(value: f64) -> Self {
        PressureTarget { value, target: PressureKind::Average }
    }

    pub fn shot_pressure(value: f64) -> Self {
        PressureTarget { value, target: PressureKind::Shot }
    }

    /// Reads off the pressure this target refers to from `state`.
    pub fn retrieve_from(&self, state: &State) -> Result<f64, Error> {
        match self.target {
            PressureKind::Breech => state.breech_pressure(),
            PressureKind::Average => state.average_pressure(),
            PressureKind::Shot => state.shot_pressure(),
        }
    }

    /// `self.retrieve_from(state) - self.value`.
    pub fn get_difference(&self, state: &State) -> Result<f64, Error> {
        Ok(self.retrieve_from(state)? - self.value)
    }

    pub fn describe(&self) -> String {
        let label = match self.target {
            PressureKind::Breech => "breech pressure",
            PressureKind::Average => "average pressure",
            PressureKind::Shot => "shot pressure",
        };
        format!("{label} {:.3} MPa", self.value * 1e-6)
    }
}

impl Mul<f64> for PressureTarget {
    type Output = PressureTarget;
    fn mul(self, scalar: f64) -> PressureTarget {
        PressureTarget { value: self.value * scalar, target: self.target }
    }
}

impl Div<f64> for PressureTarget {
    type Output = PressureTarget;
    fn div(self, scalar: f64) -> PressureTarget {
        self * (1.0 / scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_formats_megapascals() {
        let pt = PressureTarget::breech_pressure(350e6);
        assert_eq!(pt.describe(), "breech pressure 350.000 MPa");
    }

    #[test]
    fn scaling_preserves_target_kind() {
        let pt = PressureTarget::shot_pressure(100e6) * 1.1;
        assert_eq!(pt.target, PressureKind::Shot);
        assert!((pt.value - 110e6).abs() < 1.0);
    }
}
