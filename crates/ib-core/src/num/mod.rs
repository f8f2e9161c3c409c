//! A small collection of univariate numerical routines: a root-finder, an
//! extremum-finder, and an adaptive quadrature rule.

mod dekker;
mod gss;
mod intg;

pub use dekker::dekker;
pub use gss::{gss_max, gss_min};
pub use intg::intg;
