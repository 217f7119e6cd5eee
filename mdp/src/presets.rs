//! Ready-made worlds from the tabular RL literature.

use itertools::iproduct;
use ndarray::{s, Array1, Array2, Array3};

use crate::engine::Mdp;
use crate::error::MdpError;
use crate::gridworld::textmap;
use crate::gridworld::{
    build_simple_grid, can_take_action, create_reward_matrix, Action, GridWorld, N_ACTIONS,
};

/// Default seed for the preset worlds.
pub const DEFAULT_SEED: u64 = 1337;

/// The 5x5 gridworld of Sutton & Barto example 3.5.
///
/// Moves are deterministic. Every action from cell 1 teleports to cell 21
/// with reward +10, every action from cell 3 teleports to cell 13 with
/// reward +5, and any action that would walk off the grid stays put and
/// yields `bump_reward` (the book uses -1; it is a parameter here because
/// published variants disagree on it). The episode never terminates and the
/// start distribution is uniform.
pub fn sutton_barto_35(bump_reward: f64) -> Result<GridWorld, MdpError> {
    let size = 5;
    let n = size * size;
    let mut p = build_simple_grid(size, &[], 1.0)?;

    // Teleport cells: A = (0,1) -> A' = (4,1), B = (0,3) -> B' = (2,3).
    p.slice_mut(s![1, .., ..]).fill(0.0);
    p.slice_mut(s![1, .., 21]).fill(1.0);
    p.slice_mut(s![3, .., ..]).fill(0.0);
    p.slice_mut(s![3, .., 13]).fill(1.0);

    let mut r = Array2::zeros((n, N_ACTIONS));
    for (state, action) in iproduct!(0..n, Action::ALL) {
        if !can_take_action(action, state, size) {
            r[[state, action.index()]] = bump_reward;
        }
    }
    r.row_mut(1).fill(10.0);
    r.row_mut(3).fill(5.0);

    let p0 = Array1::from_elem(n, 1.0 / n as f64);
    GridWorld::new(p, r, 0.9, p0, &[], size, DEFAULT_SEED)
}

/// The episodic `size x size` gridworld of Sutton & Barto example 4.1.
///
/// Undiscounted; every transition is worth -1 except those leaving the two
/// terminal corners, and the agent starts uniformly over the non-terminal
/// cells.
pub fn sutton_barto_41(size: usize) -> Result<GridWorld, MdpError> {
    let terminals = [(0, 0), (size - 1, size - 1)];
    let p = build_simple_grid(size, &terminals, 1.0)?;
    let n = p.dim().0;

    let mut r = create_reward_matrix(n, size, &[((0, 0), 1.0), ((size - 1, size - 1), 1.0)])?;
    r.mapv_inplace(|x| x - 1.0);
    r.row_mut(n - 1).fill(0.0);

    let mut p0 = Array1::ones(n);
    p0[0] = 0.0;
    p0[size * size - 1] = 0.0;
    p0[n - 1] = 0.0;
    p0 /= (n - 3) as f64;

    GridWorld::new(p, r, 1.0, p0, &terminals, size, DEFAULT_SEED)
}

/// A two-state, two-action MDP small enough to check by hand.
///
/// From state 0, action 0 is a fair coin between staying and moving (reward
/// 5) and action 1 deterministically moves to state 1 (reward 10). State 1
/// only loops onto itself.
pub fn two_state() -> Result<Mdp, MdpError> {
    let mut p = Array3::zeros((2, 2, 2));
    p[[0, 0, 0]] = 0.5;
    p[[0, 0, 1]] = 0.5;
    p[[0, 1, 1]] = 1.0;
    p[[1, 0, 1]] = 1.0;
    p[[1, 1, 1]] = 1.0;

    let mut r = Array2::zeros((2, 2));
    r[[0, 0]] = 5.0;
    r[[0, 1]] = 10.0;

    let p0 = Array1::from_vec(vec![0.5, 0.5]);
    Mdp::new(p, r, 0.9, p0, Default::default(), DEFAULT_SEED)
}

const FOUR_ROOMS: [&str; 11] = [
    "###########",
    "#    #    #",
    "# s  #    #",
    "#    #    #",
    "#         #",
    "#### ##  ##",
    "#    #    #",
    "#    #    #",
    "#      g  #",
    "#    #    #",
    "###########",
];

/// A four-rooms style 11x11 map, parsed through the text-map loader.
///
/// Returns the world plus its wall cells.
pub fn four_rooms(
    p_success: f64,
    gamma: f64,
    seed: u64,
) -> Result<(GridWorld, Vec<(usize, usize)>), MdpError> {
    textmap::from_char_matrix(&textmap::char_matrix(FOUR_ROOMS), p_success, gamma, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Simulator;
    use float_eq::assert_float_eq;

    #[test]
    fn example_35_teleports_and_bumps() {
        let world = sutton_barto_35(-1.0).unwrap();
        let model = world.mdp().model();
        let p = model.p();

        for a in 0..N_ACTIONS {
            assert_float_eq!(p[[1, a, 21]], 1.0, abs <= 0.0);
            assert_float_eq!(p[[3, a, 13]], 1.0, abs <= 0.0);
            assert_float_eq!(model.r()[[1, a]], 10.0, abs <= 0.0);
            assert_float_eq!(model.r()[[3, a]], 5.0, abs <= 0.0);
        }
        // Top-left corner: bumping up or left costs the bump reward.
        assert_float_eq!(model.r()[[0, Action::Up.index()]], -1.0, abs <= 0.0);
        assert_float_eq!(model.r()[[0, Action::Left.index()]], -1.0, abs <= 0.0);
        assert_float_eq!(model.r()[[0, Action::Right.index()]], 0.0, abs <= 0.0);
    }

    #[test]
    fn example_35_walkthrough() {
        let mut world = sutton_barto_35(-1.0).unwrap();
        world.set_position((0, 0)).unwrap();

        let step = world.step(Action::Up.index()).unwrap();
        assert!(!step.done);
        assert_float_eq!(step.reward, -1.0, abs <= 0.0);
        assert_eq!(world.position(), (0, 0));

        let step = world.step(Action::Right.index()).unwrap();
        assert!(!step.done);
        assert_float_eq!(step.reward, 0.0, abs <= 0.0);
        assert_eq!(world.position(), (0, 1));

        // Cell (0,1) is the teleporting A cell.
        let step = world.step(Action::Right.index()).unwrap();
        assert!(!step.done);
        assert_float_eq!(step.reward, 10.0, abs <= 0.0);
        assert_eq!(world.position(), (4, 1));
    }

    #[test]
    fn example_41_rewards_and_start_distribution() {
        let world = sutton_barto_41(4).unwrap();
        let model = world.mdp().model();
        assert_eq!(world.n_states(), 17);

        // Terminal corners: 0 reward out, everything else costs -1.
        assert_eq!(model.r().row(0).to_vec(), vec![0.0; 4]);
        assert_eq!(model.r().row(15).to_vec(), vec![0.0; 4]);
        assert_eq!(model.r().row(5).to_vec(), vec![-1.0; 4]);
        assert_eq!(model.r().row(16).to_vec(), vec![0.0; 4]);

        let p0 = world.mdp().p0();
        assert_float_eq!(p0.sum(), 1.0, abs <= 1e-12);
        assert_float_eq!(p0[0], 0.0, abs <= 0.0);
        assert_float_eq!(p0[15], 0.0, abs <= 0.0);
        assert_float_eq!(p0[16], 0.0, abs <= 0.0);
        assert_float_eq!(p0[3], 1.0 / 14.0, abs <= 1e-12);
    }

    #[test]
    fn two_state_step_is_deterministic_for_action_one() {
        let mut mdp = two_state().unwrap();
        mdp.set_state(0).unwrap();
        let step = mdp.step(1).unwrap();
        assert_eq!(step.observation.to_vec(), vec![0.0, 1.0]);
        assert_float_eq!(step.reward, 10.0, abs <= 0.0);
        assert!(!step.done);
        assert_float_eq!(step.info.gamma, 0.9, abs <= 0.0);
    }

    #[test]
    fn four_rooms_parses() {
        let (world, walls) = four_rooms(0.9, 0.99, 42).unwrap();
        assert_eq!(world.size(), 11);
        assert_eq!(world.position(), (2, 2));
        assert!(walls.len() > 40);
    }
}
