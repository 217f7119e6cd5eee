//! Closed-form solutions of the Bellman evaluation equations.
//!
//! The computation is kept as four named steps rather than one fused
//! expression: `P_pi` and `R_pi` are the policy-averaged dynamics, `Phi`
//! is the successor representation, and `V` falls out of `Phi * R_pi`.
//! Each intermediate is useful on its own (`Phi` in particular, as the
//! expected discounted visitation counts).

use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayView3, Axis};
use tracing::debug;

use mdpsim::Mdp;

use crate::error::SolveError;

/// `P_pi[s, t] = sum_a pi[s, a] * P[s, a, t]`.
pub fn policy_transition(
    p: ArrayView3<'_, f64>,
    pi: ArrayView2<'_, f64>,
) -> Result<Array2<f64>, SolveError> {
    let (n_s, n_a, n_t) = p.dim();
    if n_s != n_t {
        return Err(SolveError::TransitionShape { got: p.dim() });
    }
    if pi.dim() != (n_s, n_a) {
        return Err(SolveError::PolicyShape {
            expected: (n_s, n_a),
            got: pi.dim(),
        });
    }

    let mut p_pi = Array2::zeros((n_s, n_s));
    for (a, p_a) in p.axis_iter(Axis(1)).enumerate() {
        // Scale the rows of P[., a, .] by pi[., a] and accumulate.
        let weights = pi.column(a).insert_axis(Axis(1));
        p_pi += &(&p_a * &weights);
    }
    Ok(p_pi)
}

/// `R_pi[s] = sum_a pi[s, a] * R[s, a]`.
pub fn policy_reward(
    r: ArrayView2<'_, f64>,
    pi: ArrayView2<'_, f64>,
) -> Result<Array1<f64>, SolveError> {
    if pi.dim() != r.dim() {
        return Err(SolveError::PolicyShape {
            expected: r.dim(),
            got: pi.dim(),
        });
    }
    Ok((&r * &pi).sum_axis(Axis(1)))
}

/// The successor representation `Phi = (I - gamma * P_pi)^{-1}`.
///
/// Fails when the matrix is singular, which happens for `gamma = 1` on a
/// chain whose absorbing structure does not cancel the unit eigenvalue.
pub fn successor_representation(
    p_pi: ArrayView2<'_, f64>,
    gamma: f64,
) -> Result<Array2<f64>, SolveError> {
    let (n, n_t) = p_pi.dim();
    if n != n_t {
        return Err(SolveError::StateCountMismatch {
            expected: n,
            got: n_t,
        });
    }

    let mut m = DMatrix::from_fn(n, n, |i, j| -gamma * p_pi[[i, j]]);
    for i in 0..n {
        m[(i, i)] += 1.0;
    }
    let inverse = m
        .try_inverse()
        .ok_or(SolveError::SingularMatrix { gamma })?;
    Ok(Array2::from_shape_fn((n, n), |(i, j)| inverse[(i, j)]))
}

/// `V[s] = sum_t Phi[s, t] * R_pi[t]`.
pub fn value_from_successor(
    phi: ArrayView2<'_, f64>,
    r_pi: ArrayView1<'_, f64>,
) -> Result<Array1<f64>, SolveError> {
    if phi.dim().1 != r_pi.len() {
        return Err(SolveError::StateCountMismatch {
            expected: phi.dim().1,
            got: r_pi.len(),
        });
    }
    Ok(phi.dot(&r_pi))
}

/// The state-value vector of `pi`: `V = (I - gamma * P_pi)^{-1} R_pi`.
///
/// This is an exact linear solve, not an iterative approximation. Policy
/// rows are not validated; pass row-stochastic `pi` for meaningful values.
pub fn calculate_v_pi(
    p: ArrayView3<'_, f64>,
    r: ArrayView2<'_, f64>,
    pi: ArrayView2<'_, f64>,
    gamma: f64,
) -> Result<Array1<f64>, SolveError> {
    debug!(states = p.dim().0, actions = p.dim().1, gamma, "solving V_pi");
    let p_pi = policy_transition(p, pi)?;
    let r_pi = policy_reward(r, pi)?;
    let phi = successor_representation(p_pi.view(), gamma)?;
    value_from_successor(phi.view(), r_pi.view())
}

/// [`calculate_v_pi`] against a simulator's own model and discount factor.
pub fn evaluate(mdp: &Mdp, pi: ArrayView2<'_, f64>) -> Result<Array1<f64>, SolveError> {
    let model = mdp.model();
    calculate_v_pi(model.p(), model.r(), pi, mdp.gamma())
}
