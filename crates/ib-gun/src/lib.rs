//! Gun geometry, the forward interior-ballistics integrator, state
//! trajectories and pressure targets.

#![forbid(unsafe_code)]

pub mod gun;
pub mod marker;
pub mod pressure_target;
pub mod state;

pub use gun::Gun;
pub use marker::Marker;
pub use pressure_target::PressureTarget;
pub use state::{State, StateList, StateVector};
