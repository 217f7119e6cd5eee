//! Transition and reward matrix generation for rectangular grids.

use itertools::iproduct;
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::MdpError;

/// Number of movement actions in a grid world.
pub const N_ACTIONS: usize = 4;

/// The four movement actions. `Up` decreases the row index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
}

impl Action {
    pub const ALL: [Action; N_ACTIONS] = [Action::Left, Action::Right, Action::Up, Action::Down];

    pub fn index(self) -> usize {
        match self {
            Action::Left => 0,
            Action::Right => 1,
            Action::Up => 2,
            Action::Down => 3,
        }
    }
}

impl TryFrom<usize> for Action {
    type Error = MdpError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Action::ALL.get(value).copied().ok_or(MdpError::InvalidAction {
            action: value,
            n_actions: N_ACTIONS,
        })
    }
}

/// Whether taking `action` from `state` moves anywhere (i.e. does not walk
/// into the edge of a `size x size` grid).
pub fn can_take_action(action: Action, state: usize, size: usize) -> bool {
    let (row, col) = (state / size, state % size);
    match action {
        Action::Left => col > 0,
        Action::Right => col + 1 < size,
        Action::Up => row > 0,
        Action::Down => row + 1 < size,
    }
}

/// Actions from `state` that actually move the agent.
pub fn possible_actions(state: usize, size: usize) -> Vec<Action> {
    Action::ALL
        .into_iter()
        .filter(|&a| can_take_action(a, state, size))
        .collect()
}

/// The state reached by taking `action` from `state`; edge bumps stay put.
pub fn state_after_action(action: Action, state: usize, size: usize) -> usize {
    if !can_take_action(action, state, size) {
        return state;
    }
    match action {
        Action::Left => state - 1,
        Action::Right => state + 1,
        Action::Up => state - size,
        Action::Down => state + size,
    }
}

pub(crate) fn flat_index(pos: (usize, usize), size: usize) -> Result<usize, MdpError> {
    let (row, col) = pos;
    if row >= size {
        return Err(MdpError::IndexOutOfBounds {
            index: row,
            size,
        });
    }
    if col >= size {
        return Err(MdpError::IndexOutOfBounds {
            index: col,
            size,
        });
    }
    Ok(row * size + col)
}

/// Builds the transition tensor of a `size x size` grid where actions succeed
/// with probability `p_success` and the leftover mass slips uniformly over
/// the other feasible moves. Walking into an edge is a no-op.
///
/// If `terminal_states` is non-empty, one extra trailing state is appended:
/// a single shared absorbing state that every terminal cell transitions to
/// (and that transitions to itself) under every action.
pub fn build_simple_grid(
    size: usize,
    terminal_states: &[(usize, usize)],
    p_success: f64,
) -> Result<Array3<f64>, MdpError> {
    if !(0.0..=1.0).contains(&p_success) {
        return Err(MdpError::InvalidProbability { value: p_success });
    }
    let has_absorbing = !terminal_states.is_empty();
    let n_states = size * size + usize::from(has_absorbing);
    let terminals = terminal_states
        .iter()
        .map(|&pos| flat_index(pos, size))
        .collect::<Result<BTreeSet<_>, _>>()?;

    let p_fail = 1.0 - p_success;
    let mut p = Array3::zeros((n_states, N_ACTIONS, n_states));
    for (state, action) in iproduct!(0..n_states, Action::ALL) {
        let a = action.index();
        if terminals.contains(&state) || (has_absorbing && state == n_states - 1) {
            // Terminal cells fall into the shared absorbing state, which in
            // turn only loops onto itself.
            p[[state, a, n_states - 1]] = 1.0;
        } else if can_take_action(action, state, size) {
            let mut others = possible_actions(state, size);
            others.retain(|&o| o != action);
            p[[state, a, state_after_action(action, state, size)]] = p_success;
            for other in &others {
                p[[state, a, state_after_action(*other, state, size)]] =
                    p_fail / others.len() as f64;
            }
        } else {
            // Bumping the edge: stay put with p_success, slip elsewhere.
            let others = possible_actions(state, size);
            p[[state, a, state]] = p_success;
            for other in &others {
                p[[state, a, state_after_action(*other, state, size)]] =
                    p_fail / others.len() as f64;
            }
        }
    }
    Ok(p)
}

/// Builds an `n_states x 4` reward matrix where every action taken *from* a
/// listed cell yields that cell's reward.
pub fn create_reward_matrix(
    n_states: usize,
    size: usize,
    rewards: &[((usize, usize), f64)],
) -> Result<Array2<f64>, MdpError> {
    let mut r = Array2::zeros((n_states, N_ACTIONS));
    for &(pos, value) in rewards {
        let state = flat_index(pos, size)?;
        r.row_mut(state).fill(value);
    }
    Ok(r)
}
