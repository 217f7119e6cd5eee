//! Worlds described as data: specs deserialize from JSON and build the same
//! simulators the code-level constructors do.

use float_eq::assert_float_eq;
use mdpsim::Simulator;
use mdpsim::chainworld::{build_chain, ChainSpec, LEFT, RIGHT};
use mdpsim::gridworld::{build_grid_world, GridSpec};

const THREE_STATE_CHAIN: &str = r#"{
    "n_states": 3,
    "p_success": 0.9,
    "rewards": [[1, 0, 5.0]],
    "start": [0.0, 0.0, 1.0],
    "terminal_states": [0],
    "gamma": 0.9,
    "seed": 1337
}"#;

#[test]
fn chain_spec_loads_from_json() {
    let spec: ChainSpec = serde_json::from_str(THREE_STATE_CHAIN).unwrap();
    assert_eq!(spec.rewards, vec![(1, LEFT, 5.0)]);

    let mdp = build_chain(&spec).unwrap();
    let p = mdp.model().p();
    assert_eq!(p.slice(ndarray::s![1, LEFT, ..]).to_vec(), vec![0.9, 0.1, 0.0]);
    assert_eq!(
        p.slice(ndarray::s![1, RIGHT, ..]).to_vec(),
        vec![0.0, 0.1, 0.9]
    );
    assert_float_eq!(mdp.model().r()[[1, LEFT]], 5.0, abs <= 0.0);
    assert_eq!(mdp.gamma(), 0.9);
}

const WALLED_GRID: &str = r#"{
    "size": 4,
    "p_success": 1.0,
    "rewards": [[[3, 3], 1.0]],
    "terminal": true,
    "walls": [[[1, 1], [2, 1]]],
    "start": [0, 0],
    "gamma": 0.95,
    "seed": 7
}"#;

#[test]
fn grid_spec_loads_from_json() {
    let spec: GridSpec = serde_json::from_str(WALLED_GRID).unwrap();
    let world = build_grid_world(&spec).unwrap();

    assert_eq!(world.size(), 4);
    assert!(world.has_absorbing_state());
    assert_eq!(world.n_states(), 17);
    assert_eq!(world.position(), (0, 0));

    let p = world.mdp().model().p();
    // Both wall cells are sealed off.
    for wall in [4 + 1, 2 * 4 + 1] {
        for s in 0..17 {
            for a in 0..4 {
                if s != wall {
                    assert_float_eq!(p[[s, a, wall]], 0.0, abs <= 0.0);
                }
            }
        }
    }
    // The goal cell pays out and terminates.
    let r = world.mdp().model().r();
    assert_eq!(r.row(15).to_vec(), vec![1.0; 4]);
    assert!(world.mdp().terminal_states().contains(&15));
}

#[test]
fn json_and_code_specs_agree() {
    let from_json: ChainSpec = serde_json::from_str(THREE_STATE_CHAIN).unwrap();
    let from_code = ChainSpec {
        n_states: 3,
        p_success: 0.9,
        rewards: vec![(1, LEFT, 5.0)],
        start: vec![0.0, 0.0, 1.0],
        terminal_states: vec![0],
        gamma: 0.9,
        seed: 1337,
    };
    assert_eq!(from_json, from_code);
}
