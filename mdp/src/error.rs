use thiserror::Error;

/// Errors surfaced by model validation, simulation and world construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MdpError {
    #[error("transition tensor is not square over states: {n_from} from-states vs {n_to} to-states")]
    NonSquareTransitions { n_from: usize, n_to: usize },

    #[error("reward matrix has shape {got:?}, expected {expected:?}")]
    RewardShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("transition row P[{state}, {action}, ..] sums to {sum}, not 1")]
    NotStochastic {
        state: usize,
        action: usize,
        sum: f64,
    },

    #[error("terminal state {state} is not absorbing")]
    NonAbsorbingTerminal { state: usize },

    #[error("initial-state distribution has length {got}, expected {expected}")]
    InitialDistributionLength { expected: usize, got: usize },

    #[error("initial-state distribution sums to {sum}, not 1")]
    InitialDistributionMass { sum: f64 },

    #[error("discount factor {gamma} is outside [0, 1]")]
    InvalidDiscount { gamma: f64 },

    #[error("probability {value} is outside [0, 1]")]
    InvalidProbability { value: f64 },

    #[error("index {index} out of bounds for size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("invalid action {action}: must be an integer in [0, {n_actions})")]
    InvalidAction { action: usize, n_actions: usize },

    #[error("the episode has terminated; call reset() to start a new one")]
    EpisodeDone,

    #[error("cannot sample from a degenerate probability row")]
    DegenerateDistribution,

    #[error("grid has already been added")]
    GridAlreadyAdded,

    #[error("transition matrix has already been modified; adding a grid now is invalid")]
    GridAfterMutation,

    #[error("a grid must be added before walls can be inserted")]
    WallBeforeGrid,

    #[error("builder expects terminal states but none were supplied")]
    NoTerminalStates,

    #[error("wall endpoints {start:?} and {end:?} do not share a row or column")]
    WallNotAligned {
        start: (usize, usize),
        end: (usize, usize),
    },

    #[error("map is not square: row {row} has length {got}, expected {expected}")]
    RaggedMap {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("duplicate start marker at ({row}, {col})")]
    DuplicateStart { row: usize, col: usize },

    #[error("duplicate goal marker at ({row}, {col})")]
    DuplicateGoal { row: usize, col: usize },

    #[error("map has no start marker")]
    MissingStart,

    #[error("map has no goal marker")]
    MissingGoal,

    #[error("unknown character {ch:?} at ({row}, {col}) in grid map")]
    UnknownMapChar { ch: char, row: usize, col: usize },
}
