//! End-to-end checks of the analytic solver against worlds from `mdpsim`.

use float_eq::assert_float_eq;
use mdprl::analytic::{self, calculate_v_pi, policy_reward, policy_transition};
use mdprl::policy;
use mdpsim::presets;
use mdpsim::Simulator;

/// The uniform-policy values of the Sutton & Barto 5x5 world, as published
/// (figure 3.2, March 2018 edition), rounded to one decimal.
const SB35_V: [f64; 25] = [
    3.3, 8.8, 4.4, 5.3, 1.5, 1.5, 3.0, 2.3, 1.9, 0.5, 0.1, 0.7, 0.7, 0.4, -0.4, -1.0, -0.4, -0.4,
    -0.6, -1.2, -1.9, -1.3, -1.2, -1.4, -2.0,
];

#[test]
fn reproduces_the_published_5x5_values() {
    let world = presets::sutton_barto_35(-1.0).unwrap();
    let pi = policy::uniform_random(world.n_states(), world.n_actions());
    let v = analytic::evaluate(world.mdp(), pi.view()).unwrap();

    assert_eq!(v.len(), 25);
    for (s, (&got, &expected)) in v.iter().zip(SB35_V.iter()).enumerate() {
        let rounded = (got * 10.0).round() / 10.0;
        assert_float_eq!(rounded, expected, abs <= 1e-12, "state {}", s);
    }
}

#[test]
fn two_state_world_solves_in_closed_form() {
    let mdp = presets::two_state().unwrap();
    let pi = policy::uniform_random(2, 2);
    let v = analytic::evaluate(&mdp, pi.view()).unwrap();

    // State 1 is worthless and absorbing; state 0 earns an expected 7.5 per
    // visit and revisits itself with probability 0.25.
    assert_float_eq!(v[1], 0.0, abs <= 1e-12);
    assert_float_eq!(v[0], 7.5 / (1.0 - 0.9 * 0.25), rmax <= 1e-12);
}

#[test]
fn solution_satisfies_the_bellman_system_tightly() {
    let (world, _) = presets::four_rooms(0.8, 0.99, 0).unwrap();
    let model = world.mdp().model();
    let pi = policy::uniform_random(world.n_states(), world.n_actions());

    let v = calculate_v_pi(model.p(), model.r(), pi.view(), 0.99).unwrap();
    let p_pi = policy_transition(model.p(), pi.view()).unwrap();
    let r_pi = policy_reward(model.r(), pi.view()).unwrap();
    let rhs = &r_pi + &(p_pi.dot(&v) * 0.99);

    for s in 0..world.n_states() {
        assert_float_eq!(v[s], rhs[s], abs <= 1e-8, rmax <= 1e-8, "state {}", s);
    }
}
