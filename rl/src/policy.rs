//! Helpers for building policy matrices.

use ndarray::Array2;

use crate::error::SolveError;

/// The uniform random policy: every action equally likely in every state.
pub fn uniform_random(n_states: usize, n_actions: usize) -> Array2<f64> {
    Array2::from_elem((n_states, n_actions), 1.0 / n_actions as f64)
}

/// A deterministic policy taking `actions[s]` in state `s`.
pub fn deterministic(actions: &[usize], n_actions: usize) -> Result<Array2<f64>, SolveError> {
    let mut pi = Array2::zeros((actions.len(), n_actions));
    for (state, &action) in actions.iter().enumerate() {
        if action >= n_actions {
            return Err(SolveError::BadPolicyEntry { state, action });
        }
        pi[[state, action]] = 1.0;
    }
    Ok(pi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_rows_sum_to_one() {
        let pi = uniform_random(3, 4);
        for row in pi.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn deterministic_is_one_hot_per_state() {
        let pi = deterministic(&[2, 0], 3).unwrap();
        assert_eq!(pi.row(0).to_vec(), vec![0.0, 0.0, 1.0]);
        assert_eq!(pi.row(1).to_vec(), vec![1.0, 0.0, 0.0]);
        assert_eq!(
            deterministic(&[3], 3).unwrap_err(),
            SolveError::BadPolicyEntry {
                state: 0,
                action: 3,
            }
        );
    }
}
