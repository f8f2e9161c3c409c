//! End-to-end smoke test: build a gun from scratch, fire it, and check
//! the trajectory looks like a gun being fired. Repurposed from the
//! workspace's prior point-mass flight smoke test for the new domain.

use std::rc::Rc;

use ib_combustion::{FormFunction, Propellant};
use ib_gun::{Gun, Marker};
use ib_problem::{BaseProblem, KnownGunProblem, PressureTarget};

#[test]
fn fires_a_known_gun_and_reaches_the_muzzle() {
    let propellant = Propellant {
        name: "M1".to_string(),
        force: 950_000.0,
        burn_rate_coefficient: Some(6.25e-10),
        adiabatic_index: 1.25,
        ..Propellant::default()
    };
    let form_function = FormFunction::single_perf(1.8e-3, 0.26);

    let base = BaseProblem::new(
        "155mm smoke test".to_string(),
        String::new(),
        "howitzer".to_string(),
        vec![propellant],
        vec![form_function],
        std::f64::consts::PI * 0.0776 * 0.0776,
        43.0,
        5.0,
        None,
        None,
        None,
        None,
    )
    .unwrap();

    let problem = KnownGunProblem::single_charge(base, 0.02, 10.0).unwrap();
    let target = PressureTarget::average_pressure(300e6);
    let gun = problem.get_gun_at_pressure(target, &[1.0]).unwrap();

    let gun = Rc::new(gun);
    let states = Gun::to_travel(&gun, None, 10, 1e-3).unwrap();

    // Advances from shot start through peak pressure to the muzzle.
    assert!(states.has_state_with_marker(Marker::Start));
    assert!(states.has_state_with_marker(Marker::PeakPressure));
    assert!(states.has_state_with_marker(Marker::Muzzle));

    let peak = states.get_state_by_marker(Marker::PeakPressure).unwrap();
    assert!((peak.average_pressure().unwrap() - 300e6).abs() / 300e6 < 1e-2);

    let muzzle_velocity = states.muzzle_velocity().unwrap();
    assert!(muzzle_velocity.is_finite() && muzzle_velocity > 0.0);

    // Pressure should rise to its peak and fall off before the muzzle.
    let last = states.last().unwrap();
    assert!(last.average_pressure().unwrap() < peak.average_pressure().unwrap());
}
