use thiserror::Error;

/// Errors surfaced by the analytic solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("transition tensor is not square over states: got shape {got:?}")]
    TransitionShape { got: (usize, usize, usize) },

    #[error("policy matrix has shape {got:?}, expected {expected:?}")]
    PolicyShape {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("reward matrix has shape {got:?}, expected {expected:?}")]
    RewardShape {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("operand has {got} states, expected {expected}")]
    StateCountMismatch { expected: usize, got: usize },

    #[error("I - gamma * P_pi is singular for gamma = {gamma}; the Bellman system has no unique solution")]
    SingularMatrix { gamma: f64 },

    #[error("policy entry ({state}, {action}) is out of range")]
    BadPolicyEntry { state: usize, action: usize },
}
