//! Rectangular grid worlds on top of the base engine.

mod build;
mod builder;
pub mod textmap;

pub use build::{
    build_simple_grid, can_take_action, create_reward_matrix, possible_actions,
    state_after_action, Action, N_ACTIONS,
};
pub use builder::TransitionMatrixBuilder;

use std::collections::BTreeSet;

use ndarray::{s, Array1, Array2, Array3, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::engine::{Mdp, Simulator, Step};
use crate::error::MdpError;

use build::flat_index;

/// Declarative description of a grid world.
///
/// `rewards` lists `((row, col), value)` cells; when `terminal` is set those
/// cells also end the episode (through the shared absorbing state). `walls`
/// holds straight segments, endpoints included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub size: usize,
    pub p_success: f64,
    pub rewards: Vec<((usize, usize), f64)>,
    pub terminal: bool,
    pub walls: Vec<((usize, usize), (usize, usize))>,
    pub start: (usize, usize),
    pub gamma: f64,
    pub seed: u64,
}

/// Builds the [`GridWorld`] described by `spec`.
pub fn build_grid_world(spec: &GridSpec) -> Result<GridWorld, MdpError> {
    let terminal_cells: Vec<(usize, usize)> = if spec.terminal {
        spec.rewards.iter().map(|&(pos, _)| pos).collect()
    } else {
        Vec::new()
    };

    let mut builder = TransitionMatrixBuilder::new(spec.size, !terminal_cells.is_empty());
    builder.add_grid(&terminal_cells, spec.p_success)?;
    let mut wall_cells = Vec::new();
    for &(start, end) in &spec.walls {
        builder.add_wall_between(start, end)?;
        wall_cells.extend(segment_cells(start, end));
    }
    let n_states = builder.n_states();
    let p = builder.into_p();

    let r = create_reward_matrix(n_states, spec.size, &spec.rewards)?;
    let p0 = codec::to_onehot(flat_index(spec.start, spec.size)?, n_states)?;

    Ok(
        GridWorld::new(p, r, spec.gamma, p0, &terminal_cells, spec.size, spec.seed)?
            .with_walls(wall_cells),
    )
}

fn segment_cells(start: (usize, usize), end: (usize, usize)) -> Vec<(usize, usize)> {
    if start.0 == end.0 {
        let (lo, hi) = (start.1.min(end.1), start.1.max(end.1));
        (lo..=hi).map(|col| (start.0, col)).collect()
    } else {
        let (lo, hi) = (start.0.min(end.0), start.0.max(end.0));
        (lo..=hi).map(|row| (row, start.1)).collect()
    }
}

/// An [`Mdp`] over a `size x size` grid, with a human-readable `(row, col)`
/// view of the flat one-hot state.
///
/// When terminal cells exist the underlying state space carries one extra
/// trailing index: the shared absorbing state every terminal cell falls
/// into. The coordinate view excludes that slot; the flat one-hot state is
/// the source of truth and the coordinates are recomputed from it after
/// every transition.
#[derive(Debug, Clone)]
pub struct GridWorld {
    mdp: Mdp,
    size: usize,
    has_absorbing_state: bool,
    walls: BTreeSet<(usize, usize)>,
    position: (usize, usize),
}

impl GridWorld {
    /// Builds a grid world from raw matrices, with terminal states given as
    /// `(row, col)` cells.
    pub fn new(
        p: Array3<f64>,
        r: Array2<f64>,
        gamma: f64,
        p0: Array1<f64>,
        terminal_states: &[(usize, usize)],
        size: usize,
        seed: u64,
    ) -> Result<Self, MdpError> {
        let flat = terminal_states
            .iter()
            .map(|&pos| flat_index(pos, size))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Self::with_flat_terminals(p, r, gamma, p0, flat, size, seed)
    }

    /// Builds a grid world whose terminal states are already flat indices.
    pub fn with_flat_terminals(
        p: Array3<f64>,
        r: Array2<f64>,
        gamma: f64,
        p0: Array1<f64>,
        terminal_states: BTreeSet<usize>,
        size: usize,
        seed: u64,
    ) -> Result<Self, MdpError> {
        let has_absorbing_state = !terminal_states.is_empty();
        let mdp = Mdp::new(p, r, gamma, p0, terminal_states, seed)?;
        let mut world = Self {
            mdp,
            size,
            has_absorbing_state,
            walls: BTreeSet::new(),
            position: (0, 0),
        };
        world.position = world.unflatten(world.mdp.current_state());
        Ok(world)
    }

    /// Records wall cells for rendering. Purely cosmetic; the transition
    /// tensor is what actually enforces walls.
    pub fn with_walls(mut self, walls: impl IntoIterator<Item = (usize, usize)>) -> Self {
        self.walls = walls.into_iter().collect();
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn has_absorbing_state(&self) -> bool {
        self.has_absorbing_state
    }

    /// The `(row, col)` view of the current state.
    pub fn position(&self) -> (usize, usize) {
        self.position
    }

    pub fn mdp(&self) -> &Mdp {
        &self.mdp
    }

    /// One-hot encoding of the cell at `(row, col)`.
    pub fn flatten(&self, pos: (usize, usize)) -> Result<Array1<f64>, MdpError> {
        codec::to_onehot(flat_index(pos, self.size)?, self.mdp.n_states())
    }

    /// Decodes a one-hot state back to `(row, col)`, ignoring the absorbing
    /// slot. An agent sitting in the absorbing state decodes to `(0, 0)`.
    pub fn unflatten(&self, onehot: ArrayView1<'_, f64>) -> (usize, usize) {
        let grid = if self.has_absorbing_state {
            onehot.slice_move(s![..-1])
        } else {
            onehot
        };
        let index = codec::to_index(grid);
        (index / self.size, index % self.size)
    }

    /// Force-moves the agent to the cell at `(row, col)`, clearing any
    /// finished-episode flag.
    pub fn set_position(&mut self, pos: (usize, usize)) -> Result<Array1<f64>, MdpError> {
        self.set_state(flat_index(pos, self.size)?)
    }

    /// ASCII view of the grid: `A` agent, `#` wall, `.` floor. The agent
    /// marker is omitted while it sits in the absorbing state.
    pub fn render(&self) -> String {
        let absorbed =
            self.has_absorbing_state && self.mdp.current_index() == self.mdp.n_states() - 1;
        let mut out = String::with_capacity(self.size * (self.size + 1));
        for row in 0..self.size {
            if row > 0 {
                out.push('\n');
            }
            for col in 0..self.size {
                if !absorbed && (row, col) == self.position {
                    out.push('A');
                } else if self.walls.contains(&(row, col)) {
                    out.push('#');
                } else {
                    out.push('.');
                }
            }
        }
        out
    }
}

impl Simulator for GridWorld {
    fn n_states(&self) -> usize {
        self.mdp.n_states()
    }

    fn n_actions(&self) -> usize {
        self.mdp.n_actions()
    }

    fn reset(&mut self) -> Array1<f64> {
        let state = self.mdp.reset();
        self.position = self.unflatten(state.view());
        state
    }

    fn step(&mut self, action: usize) -> Result<Step, MdpError> {
        let step = self.mdp.step(action)?;
        self.position = self.unflatten(step.observation.view());
        Ok(step)
    }

    fn set_state(&mut self, index: usize) -> Result<Array1<f64>, MdpError> {
        let state = self.mdp.set_state(index)?;
        self.position = self.unflatten(state.view());
        Ok(state)
    }

    fn reseed(&mut self, seed: u64) {
        self.mdp.reseed(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn deterministic_world(terminals: &[(usize, usize)]) -> GridWorld {
        let size = 3;
        let p = build_simple_grid(size, terminals, 1.0).unwrap();
        let n = p.dim().0;
        let r = create_reward_matrix(n, size, &[((2, 2), 1.0)]).unwrap();
        let mut p0 = Array1::zeros(n);
        p0[0] = 1.0;
        GridWorld::new(p, r, 0.9, p0, terminals, size, 7).unwrap()
    }

    #[test]
    fn coordinates_track_the_flat_state() {
        let mut world = deterministic_world(&[]);
        assert_eq!(world.position(), (0, 0));

        world.step(Action::Right.index()).unwrap();
        assert_eq!(world.position(), (0, 1));
        world.step(Action::Down.index()).unwrap();
        assert_eq!(world.position(), (1, 1));
        world.step(Action::Up.index()).unwrap();
        assert_eq!(world.position(), (0, 1));
    }

    #[test]
    fn flatten_unflatten_roundtrip_excludes_absorbing_slot() {
        let world = deterministic_world(&[(2, 2)]);
        assert!(world.has_absorbing_state());
        assert_eq!(world.n_states(), 10);
        for row in 0..3 {
            for col in 0..3 {
                let onehot = world.flatten((row, col)).unwrap();
                assert_eq!(onehot.len(), 10);
                assert_eq!(world.unflatten(onehot.view()), (row, col));
            }
        }
    }

    #[test]
    fn set_position_rejects_out_of_grid_cells() {
        let mut world = deterministic_world(&[]);
        assert!(world.set_position((3, 0)).is_err());
        world.set_position((2, 1)).unwrap();
        assert_eq!(world.position(), (2, 1));
    }

    #[test]
    fn render_marks_agent_and_walls() {
        let mut world = deterministic_world(&[]).with_walls([(2, 0)]);
        world.set_position((1, 1)).unwrap();
        insta::assert_snapshot!(world.render(), @r"
        ...
        .A.
        #..
        ");
    }
}
