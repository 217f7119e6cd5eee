//! A thin adapter presenting simulators through the common discrete
//! environment interface: integer observations, `reset()` and a
//! `(state, reward, done, info)` step tuple.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::engine::{Simulator, StepInfo};
use crate::error::MdpError;

/// A [`crate::engine::Step`] with the observation decoded to a plain index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexStep {
    pub observation: usize,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

/// Wraps any [`Simulator`] as a discrete-action environment whose
/// observations are integer state indices instead of one-hot vectors.
///
/// The conversion is lossless in both directions; the wrapped simulator
/// remains the source of truth. The adapter keeps its own RNG for action
/// sampling so that exploratory rollouts do not disturb the environment's
/// transition stream.
#[derive(Debug, Clone)]
pub struct DiscreteEnv<S> {
    sim: S,
    rng: StdRng,
}

impl<S: Simulator> DiscreteEnv<S> {
    pub fn new(sim: S, seed: u64) -> Self {
        Self {
            sim,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn observation_space(&self) -> usize {
        self.sim.n_states()
    }

    pub fn action_space(&self) -> usize {
        self.sim.n_actions()
    }

    /// A uniformly random action index.
    pub fn sample_action(&mut self) -> usize {
        self.rng.gen_range(0..self.sim.n_actions())
    }

    /// Starts a new episode, optionally reseeding the simulator first.
    pub fn reset(&mut self, seed: Option<u64>) -> usize {
        if let Some(seed) = seed {
            self.sim.reseed(seed);
        }
        codec::to_index(self.sim.reset().view())
    }

    pub fn step(&mut self, action: usize) -> Result<IndexStep, MdpError> {
        let step = self.sim.step(action)?;
        Ok(IndexStep {
            observation: codec::to_index(step.observation.view()),
            reward: step.reward,
            done: step.done,
            info: step.info,
        })
    }

    pub fn inner(&self) -> &S {
        &self.sim
    }

    pub fn into_inner(self) -> S {
        self.sim
    }
}
