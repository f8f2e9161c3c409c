//! Inverse design solvers: given a desired performance envelope (peak
//! pressure, muzzle velocity), solve for the gun design parameter left
//! unknown — reduced burn rate, chamber volume, charge mass, or bore
//! length — composed on top of [`ib_gun`]'s forward integrator.

#![forbid(unsafe_code)]

pub mod base_problem;
pub mod design;
pub mod fixed_charge_problem;
pub mod fixed_volume_problem;
pub mod known_gun_problem;

pub use base_problem::BaseProblem;
pub use design::{BaseDesign, FixedChargeDesign, FixedVolumeDesign};
pub use fixed_charge_problem::FixedChargeProblem;
pub use fixed_volume_problem::FixedVolumeProblem;
pub use known_gun_problem::KnownGunProblem;

pub use ib_gun::PressureTarget;
