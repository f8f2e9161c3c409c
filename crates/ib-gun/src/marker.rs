//! Tags attached to a [`State`](crate::State) marking what it represents.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What significance, if any, a particular [`State`](crate::State) holds
/// in a trajectory.
///
/// `Fracture` and `Adiabat` are carried over from the wider interior
/// ballistics literature for completeness but are not produced by any
/// routine in this workspace: multi-perforated grain fracture is folded
/// into the ordinary form-function evaluation rather than marked as a
/// discrete trajectory point, and no adiabatic-flame-only state is ever
/// constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Marker {
    Ignition,
    Start,
    PeakPressure,
    Fracture,
    Burnout,
    Muzzle,
    Intermediate,
    Step,
    Bomb,
    Adiabat,
}

impl Marker {
    /// A short human-readable label, mirroring the original tool's plain
    /// tabulated output.
    pub fn label(self) -> &'static str {
        match self {
            Marker::Ignition => "ignition",
            Marker::Start => "shot start",
            Marker::PeakPressure => "max pressure",
            Marker::Fracture => "fracture",
            Marker::Burnout => "burnout",
            Marker::Muzzle => "muzzle",
            Marker::Intermediate => "x",
            Marker::Step => "...",
            Marker::Bomb => "bomb",
            Marker::Adiabat => "adiabat",
        }
    }
}
