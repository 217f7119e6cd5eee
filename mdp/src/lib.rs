//! Construction and simulation of discrete, finite Markov Decision Processes.
//!
//! An MDP here is the usual `(P, R, gamma, p0)` tuple over integer state and
//! action spaces: a stochastic transition tensor `P` of shape `S x A x S`, an
//! expected-reward matrix `R` of shape `S x A`, a discount factor and an
//! initial-state distribution. [`Mdp`] simulates episodes against a validated
//! model with the familiar `reset()` / `step(action)` loop; grid and chain
//! world builders produce the matrices for common tabular benchmarks.
//!
//! States cross the public boundary as one-hot vectors; [`codec`] converts
//! between those and plain integer indices.

pub mod chainworld;
pub mod codec;
pub mod engine;
pub mod error;
pub mod gridworld;
pub mod gym;
pub mod model;
pub mod presets;

pub use engine::{Mdp, Simulator, Step, StepInfo};
pub use error::MdpError;
pub use model::TransitionModel;
