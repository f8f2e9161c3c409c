//! The workspace-wide error type.
//!
//! Every fallible public function in this workspace returns
//! `Result<T, Error>`. Variants are grouped, per spec, into domain errors
//! (bad inputs), feasibility errors (physics forbids the request) and
//! convergence errors (a numerical routine gave up). Each variant's
//! [`Display`](std::fmt::Display) impl names the bound that was violated
//! and the valid range, where one exists, so callers can surface it
//! directly.

use thiserror::Error;

/// The error type shared by every crate in the interior ballistics
/// workspace.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    // -- domain errors: bad inputs -----------------------------------------
    /// A multi-perforated [`FormFunction`](https://docs.rs/ib-combustion) would combust
    /// regressively (surface area decreasing over most of its life); such
    /// grains are not modeled.
    #[error("short multi-perforated grain would combust regressively (computed lambda < 0)")]
    RegressiveCombustion,

    /// `psi(Z)` was evaluated outside its domain `[0, Z_k]`.
    #[error("psi(Z) is defined on [0, {z_k}], but was called with Z = {z}")]
    DomainError { z: f64, z_k: f64 },

    /// A [`FormFunction`](https://docs.rs/ib-combustion) has no `e_1` (half arch-width)
    /// recorded, so arch-derived burn rate helpers have nothing to act on.
    #[error("form function has no recorded arch width (e_1); supply reduced_burnrate directly")]
    MissingArch,

    /// A `reduced_burnrate` could not be derived because neither it nor
    /// both `burn_rate_coefficient` and `e_1` were supplied.
    #[error(
        "reduced_burnrate must be supplied directly, or derived from a non-null \
         burn_rate_coefficient and form_function.e_1"
    )]
    UnderspecifiedBurnRate,

    /// Vectors that are supposed to walk in lock-step (propellants,
    /// form functions, charge masses, burn-rate ratios) had mismatched
    /// lengths.
    #[error("dimension mismatch: expected {expected} entries, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A bracket passed to [`dekker`](crate::num::dekker) did not straddle a
    /// sign change.
    #[error("Dekker's method requires a strictly sign-changing bracket: f({x0})={fx0}, f({x1})={fx1}")]
    NonBracketingInterval { x0: f64, fx0: f64, x1: f64, fx1: f64 },

    /// `Gun::to_travel` was called with no travel argument, and the gun
    /// itself carries no default bore length either.
    #[error("travel must be supplied either as an argument or set on the gun")]
    MissingTravel,

    // -- feasibility errors: physics forbids the request --------------------
    /// The gun's bomb-state pressure is below its start pressure, so the
    /// projectile can never be started.
    #[error(
        "projectile cannot be started: bomb-state pressure {bomb_pressure:e} Pa is below \
         start pressure {start_pressure:e} Pa"
    )]
    CannotStart { bomb_pressure: f64, start_pressure: f64 },

    /// The requested peak pressure exceeds what the gun's bomb state can
    /// ever develop, regardless of burn rate.
    #[error(
        "target pressure {target:e} Pa exceeds the maximum achievable bomb-state pressure \
         {bomb_pressure:e} Pa for this loading"
    )]
    PressureUnachievable { target: f64, bomb_pressure: f64 },

    /// The requested peak pressure is at or below the shot-start pressure,
    /// so it is reached (if at all) before the projectile moves.
    #[error(
        "target pressure {target:e} Pa does not exceed the shot-start pressure {start_pressure:e} Pa"
    )]
    PressureBelowStart { target: f64, start_pressure: f64 },

    /// A requested chamber volume falls outside the feasible range for
    /// this charge loading.
    #[error(
        "chamber volume {requested:e} m^3 outside feasible range [{lower:e}, {upper:e}] m^3"
    )]
    ChamberVolumeOutOfRange { requested: f64, lower: f64, upper: f64 },

    /// A requested charge mass falls outside the feasible range for this
    /// chamber volume.
    #[error("charge mass {requested:e} kg outside feasible range [{lower:e}, {upper:e}] kg")]
    ChargeMassOutOfRange { requested: f64, lower: f64, upper: f64 },

    /// No bore length out to `max_calibers` calibers achieves the target
    /// velocity.
    #[error("velocity target {target:.1} m/s is not achievable within {max_calibers} calibers")]
    VelocityUnachievable { target: f64, max_calibers: u32 },

    // -- convergence errors ---------------------------------------------
    /// A root-finder or extremum-finder exhausted its iteration cap.
    #[error("maximum iterations ({max_it}) exceeded without converging to tolerance {tol:e}")]
    MaxIterationsExceeded { max_it: u32, tol: f64 },

    /// The secant step of Dekker's method stalled (numerically degenerate
    /// bracket).
    #[error("secant estimate stalled: bracket collapsed to a single point before convergence")]
    SecantStalled,
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;
