//! Validated transition and reward matrices.

use std::collections::BTreeSet;

use itertools::iproduct;
use ndarray::{s, Array2, Array3, ArrayView1, ArrayView2, ArrayView3};

use crate::error::MdpError;

/// Tolerance for "sums to 1" checks on probability rows.
pub const STOCHASTIC_TOLERANCE: f64 = 1e-8;

/// An immutable transition tensor `P` (`S x A x S`) paired with an expected
/// reward matrix `R` (`S x A`).
///
/// Construction through [`TransitionModel::new`] checks shape consistency,
/// row stochasticity and that every declared terminal state deterministically
/// enters an absorbing sink. The model is never mutated afterwards; builders
/// work on raw arrays and hand off here once done.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionModel {
    p: Array3<f64>,
    r: Array2<f64>,
}

impl TransitionModel {
    pub fn new(
        p: Array3<f64>,
        r: Array2<f64>,
        terminal_states: &BTreeSet<usize>,
    ) -> Result<Self, MdpError> {
        let (n_states, n_actions, n_to) = p.dim();
        if n_states != n_to {
            return Err(MdpError::NonSquareTransitions {
                n_from: n_states,
                n_to,
            });
        }
        if r.dim() != (n_states, n_actions) {
            return Err(MdpError::RewardShapeMismatch {
                expected: (n_states, n_actions),
                got: r.dim(),
            });
        }
        for (state, action) in iproduct!(0..n_states, 0..n_actions) {
            let row = p.slice(s![state, action, ..]);
            let sum = row.sum();
            if (sum - 1.0).abs() > STOCHASTIC_TOLERANCE
                || row.iter().any(|&mass| mass < -STOCHASTIC_TOLERANCE)
            {
                return Err(MdpError::NotStochastic { state, action, sum });
            }
        }
        // A terminal state must deterministically feed an absorbing sink
        // under every action: itself in the plain case, or the shared
        // trailing absorbing state in grid worlds.
        for &state in terminal_states {
            if state >= n_states {
                return Err(MdpError::IndexOutOfBounds {
                    index: state,
                    size: n_states,
                });
            }
            let sink = p
                .slice(s![state, 0, ..])
                .iter()
                .position(|&mass| (mass - 1.0).abs() <= STOCHASTIC_TOLERANCE)
                .ok_or(MdpError::NonAbsorbingTerminal { state })?;
            for action in 0..n_actions {
                if (p[[state, action, sink]] - 1.0).abs() > STOCHASTIC_TOLERANCE
                    || (p[[sink, action, sink]] - 1.0).abs() > STOCHASTIC_TOLERANCE
                {
                    return Err(MdpError::NonAbsorbingTerminal { state });
                }
            }
        }
        Ok(Self { p, r })
    }

    /// Builds a model without any validation.
    ///
    /// For callers that have already checked their arrays, or that knowingly
    /// construct a non-stochastic tensor for experimentation.
    pub fn new_unchecked(p: Array3<f64>, r: Array2<f64>) -> Self {
        Self { p, r }
    }

    pub fn n_states(&self) -> usize {
        self.p.dim().0
    }

    pub fn n_actions(&self) -> usize {
        self.p.dim().1
    }

    pub fn p(&self) -> ArrayView3<'_, f64> {
        self.p.view()
    }

    pub fn r(&self) -> ArrayView2<'_, f64> {
        self.r.view()
    }

    /// The next-state distribution for taking `action` in `state`.
    pub fn transition_row(&self, state: usize, action: usize) -> ArrayView1<'_, f64> {
        self.p.slice(s![state, action, ..])
    }

    pub fn reward(&self, state: usize, action: usize) -> f64 {
        self.r[[state, action]]
    }
}
