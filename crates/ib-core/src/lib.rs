//! Shared numerics, constants and error type for the interior ballistics
//! workspace.
//!
//! This crate has no notion of guns, charges or propellants; it only knows
//! about univariate root-finding, extremum-finding and quadrature, plus the
//! handful of physical constants that are shared across every other crate
//! in the workspace.

#![forbid(unsafe_code)]

pub mod error;
pub mod num;

pub use error::Error;

/// Initial and maximum time step the forward integrator will seed its
/// adaptive stepping with, in seconds.
pub const MAX_DT: f64 = 1e-2;

/// Default start-of-shot resistance pressure, in Pa.
pub const DEFAULT_GUN_START_PRESSURE: f64 = 30e6;

/// Default secondary-work loss fraction.
pub const DEFAULT_GUN_LOSS_FRACTION: f64 = 0.05;

/// Pressure floor used by [`ib_combustion`](https://docs.rs/ib-combustion)'s
/// `Charge::dzdt` to keep the combustion ODE from stalling at zero pressure.
pub const AMBIENT_PRESSURE: f64 = 101_325.0;

/// Starting guess for reduced burn rate in the bracketing search of
/// `get_gun_at_pressure`.
pub const REDUCED_BURN_RATE_INITIAL_GUESS: f64 = 1.0;

/// Default relative accuracy used throughout the numerical routines.
pub const DEFAULT_ACC: f64 = 1e-3;

/// Default minimum number of integration steps for a trajectory phase.
pub const DEFAULT_STEPS: usize = 10;
