//! Propellant thermochemistry, grain-geometry form functions, and charges
//! (propellant + geometry + burn rate) for the interior ballistics
//! workspace.

#![forbid(unsafe_code)]

pub mod charge;
pub mod form_function;

pub use charge::{Charge, Propellant};
pub use form_function::{FormFunction, MultiPerfShape};
