//! Incremental construction of grid transition tensors with walls.

use itertools::iproduct;
use ndarray::{s, Array3};
use tracing::debug;

use crate::error::MdpError;
use crate::model::STOCHASTIC_TOLERANCE;

use super::build::{build_simple_grid, flat_index, N_ACTIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Empty,
    GridAdded,
    WallsAdded,
}

/// Builds a grid-world transition tensor in enforced order: the grid first,
/// then any number of walls. Re-adding a grid, or adding one after the
/// tensor has been modified, fails without touching the builder's state.
#[derive(Debug, Clone)]
pub struct TransitionMatrixBuilder {
    grid_size: usize,
    has_terminal_state: bool,
    n_states: usize,
    p: Array3<f64>,
    stage: Stage,
}

impl TransitionMatrixBuilder {
    pub fn new(grid_size: usize, has_terminal_state: bool) -> Self {
        let n_states = grid_size * grid_size + usize::from(has_terminal_state);
        Self {
            grid_size,
            has_terminal_state,
            n_states,
            p: Array3::zeros((n_states, N_ACTIONS, n_states)),
            stage: Stage::Empty,
        }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Fills in the free-grid dynamics. Must be the first mutation.
    pub fn add_grid(
        &mut self,
        terminal_states: &[(usize, usize)],
        p_success: f64,
    ) -> Result<(), MdpError> {
        match self.stage {
            Stage::Empty => {}
            Stage::GridAdded => return Err(MdpError::GridAlreadyAdded),
            Stage::WallsAdded => return Err(MdpError::GridAfterMutation),
        }
        if self.has_terminal_state && terminal_states.is_empty() {
            return Err(MdpError::NoTerminalStates);
        }
        self.p = build_simple_grid(self.grid_size, terminal_states, p_success)?;
        // The absorbing slot only exists when terminal states were supplied.
        self.n_states = self.p.dim().0;
        self.stage = Stage::GridAdded;
        debug!(size = self.grid_size, p_success, "grid added");
        Ok(())
    }

    /// Carves a wall out of the cell at `pos`.
    ///
    /// Afterwards no state can transition into the wall cell (the mass that
    /// used to is redirected onto staying put) and every action taken from
    /// the wall cell leads back to it.
    pub fn add_wall_at(&mut self, pos: (usize, usize)) -> Result<(), MdpError> {
        if self.stage == Stage::Empty {
            return Err(MdpError::WallBeforeGrid);
        }
        let target = flat_index(pos, self.grid_size)?;

        // Redirect all inbound probability mass onto self-transitions.
        for (state, action) in iproduct!(0..self.n_states, 0..N_ACTIONS) {
            let mass = self.p[[state, action, target]];
            if state != target && mass != 0.0 {
                self.p[[state, action, target]] = 0.0;
                self.p[[state, action, state]] += mass;
            }
        }

        // The wall cell itself becomes fully absorbing.
        for action in 0..N_ACTIONS {
            let mut row = self.p.slice_mut(s![target, action, ..]);
            row.fill(0.0);
            row[target] = 1.0;
        }

        // Renormalize every row and re-check the invariants.
        for (state, action) in iproduct!(0..self.n_states, 0..N_ACTIONS) {
            let mut row = self.p.slice_mut(s![state, action, ..]);
            let sum = row.sum();
            row /= sum;
            if (row.sum() - 1.0).abs() > STOCHASTIC_TOLERANCE {
                return Err(MdpError::NotStochastic {
                    state,
                    action,
                    sum,
                });
            }
        }
        for action in 0..N_ACTIONS {
            if (self.p[[target, action, target]] - 1.0).abs() > STOCHASTIC_TOLERANCE {
                return Err(MdpError::NonAbsorbingTerminal { state: target });
            }
        }

        self.stage = Stage::WallsAdded;
        debug!(row = pos.0, col = pos.1, "wall added");
        Ok(())
    }

    /// Draws a straight wall between two endpoints sharing a row or column,
    /// endpoints included.
    pub fn add_wall_between(
        &mut self,
        start: (usize, usize),
        end: (usize, usize),
    ) -> Result<(), MdpError> {
        if start.0 != end.0 && start.1 != end.1 {
            return Err(MdpError::WallNotAligned { start, end });
        }
        // Bounds-check both endpoints before mutating anything.
        flat_index(start, self.grid_size)?;
        flat_index(end, self.grid_size)?;

        if start.0 == end.0 {
            let row = start.0;
            let (lo, hi) = (start.1.min(end.1), start.1.max(end.1));
            for col in lo..=hi {
                self.add_wall_at((row, col))?;
            }
        } else {
            let col = start.1;
            let (lo, hi) = (start.0.min(end.0), start.0.max(end.0));
            for row in lo..=hi {
                self.add_wall_at((row, col))?;
            }
        }
        Ok(())
    }

    /// A copy of the tensor built so far.
    pub fn p(&self) -> Array3<f64> {
        self.p.clone()
    }

    /// Consumes the builder, yielding the finished tensor.
    pub fn into_p(self) -> Array3<f64> {
        self.p
    }
}
