//! Linear chain worlds with two actions.

use std::collections::BTreeSet;

use ndarray::{Array1, Array2, Array3};
use serde::{Deserialize, Serialize};

use crate::engine::Mdp;
use crate::error::MdpError;

/// Action indices in a chain world.
pub const LEFT: usize = 0;
pub const RIGHT: usize = 1;
const N_ACTIONS: usize = 2;

/// Declarative description of a chain world.
///
/// `rewards` entries are `(state, action, reward)`; `start` is the initial
/// state distribution and must have one entry per state. Actions slip with
/// probability `1 - p_success`, in which case the agent stays put; walking
/// off either end of the chain is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSpec {
    pub n_states: usize,
    pub p_success: f64,
    pub rewards: Vec<(usize, usize, f64)>,
    pub start: Vec<f64>,
    pub terminal_states: Vec<usize>,
    pub gamma: f64,
    pub seed: u64,
}

/// Builds the simulator for `spec`.
pub fn build_chain(spec: &ChainSpec) -> Result<Mdp, MdpError> {
    if !(0.0..=1.0).contains(&spec.p_success) {
        return Err(MdpError::InvalidProbability {
            value: spec.p_success,
        });
    }
    let n = spec.n_states;
    let p_fail = 1.0 - spec.p_success;
    let terminals: BTreeSet<usize> = spec.terminal_states.iter().copied().collect();

    let mut p = Array3::zeros((n, N_ACTIONS, n));
    for s in 0..n {
        if terminals.contains(&s) {
            for a in 0..N_ACTIONS {
                p[[s, a, s]] = 1.0;
            }
            continue;
        }
        if s == 0 {
            p[[s, LEFT, s]] = 1.0;
        } else {
            p[[s, LEFT, s - 1]] = spec.p_success;
            p[[s, LEFT, s]] = p_fail;
        }
        if s == n - 1 {
            p[[s, RIGHT, s]] = 1.0;
        } else {
            p[[s, RIGHT, s + 1]] = spec.p_success;
            p[[s, RIGHT, s]] = p_fail;
        }
    }

    let mut r = Array2::zeros((n, N_ACTIONS));
    for &(state, action, reward) in &spec.rewards {
        if state >= n {
            return Err(MdpError::IndexOutOfBounds {
                index: state,
                size: n,
            });
        }
        if action >= N_ACTIONS {
            return Err(MdpError::InvalidAction {
                action,
                n_actions: N_ACTIONS,
            });
        }
        r[[state, action]] = reward;
    }

    Mdp::new(
        p,
        r,
        spec.gamma,
        Array1::from_vec(spec.start.clone()),
        terminals,
        spec.seed,
    )
}
