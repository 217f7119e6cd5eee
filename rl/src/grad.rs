//! Exact gradients of the value function with respect to the policy.
//!
//! Differentiating the linear solve `V = (I - gamma * P_pi)^{-1} R_pi`
//! directly gives, for each policy entry,
//!
//! ```text
//! dV[t] / dpi[s, a] = Phi[t, s] * (R[s, a] + gamma * P[s, a, .] . V)
//! ```
//!
//! so the gradient reuses the same four intermediates as the value
//! computation itself and costs one extra matrix product. No automatic
//! differentiation is involved: the gradients are exact, not approximated.

use itertools::iproduct;
use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};

use crate::analytic::{
    policy_reward, policy_transition, successor_representation, value_from_successor,
};
use crate::error::SolveError;

/// `q[s, a] = R[s, a] + gamma * sum_u P[s, a, u] * V[u]`, shared by both
/// gradient shapes.
fn action_values(
    p: ArrayView3<'_, f64>,
    r: ArrayView2<'_, f64>,
    v: &Array1<f64>,
    gamma: f64,
) -> Array2<f64> {
    let mut q = r.to_owned();
    for (a, p_a) in p.axis_iter(Axis(1)).enumerate() {
        let backup = p_a.dot(v);
        q.column_mut(a).scaled_add(gamma, &backup);
    }
    q
}

/// The full gradient tensor `G[t, s, a] = dV[t] / dpi[s, a]`.
pub fn value_gradient(
    p: ArrayView3<'_, f64>,
    r: ArrayView2<'_, f64>,
    pi: ArrayView2<'_, f64>,
    gamma: f64,
) -> Result<Array3<f64>, SolveError> {
    let p_pi = policy_transition(p, pi)?;
    let r_pi = policy_reward(r, pi)?;
    let phi = successor_representation(p_pi.view(), gamma)?;
    let v = value_from_successor(phi.view(), r_pi.view())?;
    let q = action_values(p, r, &v, gamma);

    let (n_s, n_a, _) = p.dim();
    let mut g = Array3::zeros((n_s, n_s, n_a));
    for (t, s, a) in iproduct!(0..n_s, 0..n_s, 0..n_a) {
        g[[t, s, a]] = phi[[t, s]] * q[[s, a]];
    }
    Ok(g)
}

/// The gradient of the scalar objective `w . V` with respect to `pi`.
///
/// Equivalent to contracting [`value_gradient`] with `w` over its first
/// axis, without materializing the full tensor.
pub fn weighted_value_gradient(
    p: ArrayView3<'_, f64>,
    r: ArrayView2<'_, f64>,
    pi: ArrayView2<'_, f64>,
    gamma: f64,
    w: ArrayView1<'_, f64>,
) -> Result<Array2<f64>, SolveError> {
    let p_pi = policy_transition(p, pi)?;
    if w.len() != p_pi.dim().0 {
        return Err(SolveError::StateCountMismatch {
            expected: p_pi.dim().0,
            got: w.len(),
        });
    }
    let r_pi = policy_reward(r, pi)?;
    let phi = successor_representation(p_pi.view(), gamma)?;
    let v = value_from_successor(phi.view(), r_pi.view())?;
    let q = action_values(p, r, &v, gamma);

    // Occupancy of each state under w: (w^T Phi)[s].
    let occupancy = phi.t().dot(&w);
    let (n_s, n_a) = q.dim();
    let mut g = Array2::zeros((n_s, n_a));
    for (s, a) in iproduct!(0..n_s, 0..n_a) {
        g[[s, a]] = occupancy[s] * q[[s, a]];
    }
    Ok(g)
}
