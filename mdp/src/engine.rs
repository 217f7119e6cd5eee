//! The MDP simulation engine.

use std::collections::BTreeSet;

use ndarray::{Array1, Array2, Array3, ArrayView1};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::codec;
use crate::error::MdpError;
use crate::model::{TransitionModel, STOCHASTIC_TOLERANCE};

/// Auxiliary data returned with every step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    pub gamma: f64,
}

/// The `(state, reward, done, info)` tuple produced by [`Simulator::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// One-hot encoding of the state after the transition.
    pub observation: Array1<f64>,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

/// The capability set shared by every discrete simulator in this crate.
pub trait Simulator {
    fn n_states(&self) -> usize;

    fn n_actions(&self) -> usize;

    /// Samples a fresh starting state and clears the done flag.
    fn reset(&mut self) -> Array1<f64>;

    fn step(&mut self, action: usize) -> Result<Step, MdpError>;

    /// Force-sets the current state, for testing and debugging.
    fn set_state(&mut self, index: usize) -> Result<Array1<f64>, MdpError>;

    /// Replaces the simulator's random source with one seeded from `seed`.
    fn reseed(&mut self, seed: u64);
}

/// A seeded simulator for a finite MDP.
///
/// Episodes run `reset()` then repeated `step(action)` until a step reports
/// `done`. Entering a terminal state does not end the episode immediately:
/// the reward for the transition into it is delivered on that step, and the
/// done flag is raised on the following one. Stepping again after that is an
/// error.
///
/// Each instance owns its random source; every stochastic draw (the initial
/// state included) goes through it, so equal seeds give equal episodes. One
/// instance must not be shared across threads mid-episode; parallel rollouts
/// want one engine per worker with independent seeds.
#[derive(Debug, Clone)]
pub struct Mdp {
    model: TransitionModel,
    gamma: f64,
    p0: Array1<f64>,
    p0_dist: WeightedIndex<f64>,
    terminal_states: BTreeSet<usize>,
    rng: StdRng,
    current_state: Array1<f64>,
    done: bool,
}

impl Mdp {
    pub fn new(
        p: Array3<f64>,
        r: Array2<f64>,
        gamma: f64,
        p0: Array1<f64>,
        terminal_states: BTreeSet<usize>,
        seed: u64,
    ) -> Result<Self, MdpError> {
        let model = TransitionModel::new(p, r, &terminal_states)?;
        Self::from_model(model, gamma, p0, terminal_states, seed)
    }

    /// Like [`Mdp::new`] but for a model that has already been validated.
    pub fn from_model(
        model: TransitionModel,
        gamma: f64,
        p0: Array1<f64>,
        terminal_states: BTreeSet<usize>,
        seed: u64,
    ) -> Result<Self, MdpError> {
        if !(0.0..=1.0).contains(&gamma) {
            return Err(MdpError::InvalidDiscount { gamma });
        }
        if p0.len() != model.n_states() {
            return Err(MdpError::InitialDistributionLength {
                expected: model.n_states(),
                got: p0.len(),
            });
        }
        let mass = p0.sum();
        if (mass - 1.0).abs() > STOCHASTIC_TOLERANCE {
            return Err(MdpError::InitialDistributionMass { sum: mass });
        }
        let p0_dist = WeightedIndex::new(p0.iter().copied())
            .map_err(|_| MdpError::DegenerateDistribution)?;
        let n_states = model.n_states();
        let mut mdp = Self {
            model,
            gamma,
            p0,
            p0_dist,
            terminal_states,
            rng: StdRng::seed_from_u64(seed),
            current_state: Array1::zeros(n_states),
            done: false,
        };
        mdp.reset();
        Ok(mdp)
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn p0(&self) -> ArrayView1<'_, f64> {
        self.p0.view()
    }

    pub fn terminal_states(&self) -> &BTreeSet<usize> {
        &self.terminal_states
    }

    pub fn model(&self) -> &TransitionModel {
        &self.model
    }

    /// One-hot view of the current state.
    pub fn current_state(&self) -> ArrayView1<'_, f64> {
        self.current_state.view()
    }

    /// Integer index of the current state.
    pub fn current_index(&self) -> usize {
        codec::to_index(self.current_state.view())
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    fn draw(rng: &mut StdRng, weights: ArrayView1<'_, f64>) -> Result<usize, MdpError> {
        let dist = WeightedIndex::new(weights.iter().copied())
            .map_err(|_| MdpError::DegenerateDistribution)?;
        Ok(dist.sample(rng))
    }
}

impl Simulator for Mdp {
    fn n_states(&self) -> usize {
        self.model.n_states()
    }

    fn n_actions(&self) -> usize {
        self.model.n_actions()
    }

    fn reset(&mut self) -> Array1<f64> {
        let index = self.p0_dist.sample(&mut self.rng);
        trace!(index, "episode reset");
        // index comes from a distribution of length n_states, so the encode
        // cannot fail.
        self.current_state =
            codec::to_onehot(index, self.model.n_states()).expect("p0 index within state space");
        self.done = false;
        self.current_state.clone()
    }

    fn step(&mut self, action: usize) -> Result<Step, MdpError> {
        if self.done {
            return Err(MdpError::EpisodeDone);
        }
        if action >= self.model.n_actions() {
            return Err(MdpError::InvalidAction {
                action,
                n_actions: self.model.n_actions(),
            });
        }

        let current = self.current_index();
        // Termination is reported one step after entering a terminal state,
        // so the reward for the transition into it is delivered first.
        if self.terminal_states.contains(&current) {
            self.done = true;
        }

        let next = Self::draw(&mut self.rng, self.model.transition_row(current, action))?;
        let reward = self.model.reward(current, action);
        self.current_state = codec::to_onehot(next, self.model.n_states())?;

        Ok(Step {
            observation: self.current_state.clone(),
            reward,
            done: self.done,
            info: StepInfo { gamma: self.gamma },
        })
    }

    fn set_state(&mut self, index: usize) -> Result<Array1<f64>, MdpError> {
        self.current_state = codec::to_onehot(index, self.model.n_states())?;
        self.done = false;
        Ok(self.current_state.clone())
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use ndarray::{array, Array2};

    /// Two states, two actions. Left keeps you in place from state 0, Right
    /// moves to state 1 with a +5 reward. State 1 is terminal and absorbing.
    fn two_state_terminal() -> Mdp {
        let p = array![[[1.0, 0.0], [0.0, 1.0]], [[0.0, 1.0], [0.0, 1.0]]];
        let r = array![[0.0, 5.0], [0.0, 0.0]];
        let p0 = array![1.0, 0.0];
        Mdp::new(p, r, 0.9, p0, BTreeSet::from([1]), 1337).unwrap()
    }

    #[test]
    fn termination_is_reported_one_step_late() {
        let mut mdp = two_state_terminal();
        assert_eq!(mdp.current_state().to_vec(), vec![1.0, 0.0]);

        let step = mdp.step(0).unwrap();
        assert_eq!(step.observation.to_vec(), vec![1.0, 0.0]);
        assert_float_eq!(step.reward, 0.0, abs <= 0.0);
        assert!(!step.done);

        let step = mdp.step(1).unwrap();
        assert_eq!(step.observation.to_vec(), vec![0.0, 1.0]);
        assert_float_eq!(step.reward, 5.0, abs <= 0.0);
        assert!(!step.done);

        // Inside the terminal state now; this step flags done without moving.
        let step = mdp.step(1).unwrap();
        assert_eq!(step.observation.to_vec(), vec![0.0, 1.0]);
        assert_float_eq!(step.reward, 0.0, abs <= 0.0);
        assert!(step.done);

        assert_eq!(mdp.step(0), Err(MdpError::EpisodeDone));
    }

    #[test]
    fn reset_clears_done_and_resamples_from_p0() {
        let mut mdp = two_state_terminal();
        mdp.step(1).unwrap();
        mdp.step(1).unwrap();
        assert!(mdp.is_done());

        let state = mdp.reset();
        assert!(!mdp.is_done());
        assert_eq!(state.to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn step_rejects_invalid_action() {
        let mut mdp = two_state_terminal();
        assert_eq!(
            mdp.step(2),
            Err(MdpError::InvalidAction {
                action: 2,
                n_actions: 2,
            })
        );
        // The failed call must not have touched the episode.
        assert_eq!(mdp.current_index(), 0);
        assert!(!mdp.is_done());
    }

    #[test]
    fn set_state_clears_done() {
        let mut mdp = two_state_terminal();
        mdp.step(1).unwrap();
        mdp.step(1).unwrap();
        let state = mdp.set_state(0).unwrap();
        assert_eq!(state.to_vec(), vec![1.0, 0.0]);
        assert!(!mdp.is_done());
        assert!(mdp.set_state(7).is_err());
    }

    #[test]
    fn rejects_bad_initial_distribution() {
        let p = array![[[1.0, 0.0], [0.0, 1.0]], [[0.0, 1.0], [0.0, 1.0]]];
        let r = Array2::zeros((2, 2));
        let err = Mdp::new(
            p.clone(),
            r.clone(),
            0.9,
            array![0.5, 0.2],
            BTreeSet::new(),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, MdpError::InitialDistributionMass { .. }));

        let err = Mdp::new(p, r, 0.9, array![1.0], BTreeSet::new(), 0).unwrap_err();
        assert_eq!(
            err,
            MdpError::InitialDistributionLength {
                expected: 2,
                got: 1,
            }
        );
    }

    #[test]
    fn equal_seeds_give_equal_episodes() {
        let p = array![
            [[0.5, 0.25, 0.25], [0.1, 0.8, 0.1]],
            [[0.3, 0.4, 0.3], [0.25, 0.5, 0.25]],
            [[0.2, 0.2, 0.6], [0.4, 0.4, 0.2]]
        ];
        let r = Array2::zeros((3, 2));
        let p0 = array![0.2, 0.3, 0.5];
        let build = || {
            Mdp::new(
                p.clone(),
                r.clone(),
                0.9,
                p0.clone(),
                BTreeSet::new(),
                2718,
            )
            .unwrap()
        };
        let mut a = build();
        let mut b = build();
        for i in 0..50 {
            let action = i % 2;
            assert_eq!(a.step(action).unwrap(), b.step(action).unwrap());
        }
    }
}
