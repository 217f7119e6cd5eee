//! Loading grid worlds from textual maps.
//!
//! A map is a square block of characters: `#` wall, `s` the single start
//! cell, `g` the single goal cell (worth +1 and terminal), space for open
//! floor. Anything else is a parse error.

use ndarray::Array1;
use tracing::debug;

use crate::codec;
use crate::error::MdpError;

use super::build::{create_reward_matrix, flat_index};
use super::builder::TransitionMatrixBuilder;
use super::GridWorld;

/// Splits raw lines into a character matrix, dropping line terminators.
pub fn char_matrix<S: AsRef<str>>(lines: impl IntoIterator<Item = S>) -> Vec<Vec<char>> {
    lines
        .into_iter()
        .map(|line| line.as_ref().trim_end_matches(['\n', '\r']).chars().collect())
        .collect()
}

#[derive(Debug)]
struct ParsedMap {
    size: usize,
    walls: Vec<(usize, usize)>,
    start: (usize, usize),
    goal: (usize, usize),
}

fn parse(map: &[Vec<char>]) -> Result<ParsedMap, MdpError> {
    let size = map.len();
    for (row, line) in map.iter().enumerate() {
        if line.len() != size {
            return Err(MdpError::RaggedMap {
                row,
                expected: size,
                got: line.len(),
            });
        }
    }

    let mut walls = Vec::new();
    let mut start = None;
    let mut goal = None;
    for (row, line) in map.iter().enumerate() {
        for (col, &ch) in line.iter().enumerate() {
            match ch {
                '#' => walls.push((row, col)),
                's' => {
                    if start.is_some() {
                        return Err(MdpError::DuplicateStart { row, col });
                    }
                    start = Some((row, col));
                }
                'g' => {
                    if goal.is_some() {
                        return Err(MdpError::DuplicateGoal { row, col });
                    }
                    goal = Some((row, col));
                }
                ' ' => {}
                _ => return Err(MdpError::UnknownMapChar { ch, row, col }),
            }
        }
    }

    Ok(ParsedMap {
        size,
        walls,
        start: start.ok_or(MdpError::MissingStart)?,
        goal: goal.ok_or(MdpError::MissingGoal)?,
    })
}

/// Builds a [`GridWorld`] from a parsed character matrix.
///
/// Returns the world together with the wall cell list, in scan order.
pub fn from_char_matrix(
    map: &[Vec<char>],
    p_success: f64,
    gamma: f64,
    seed: u64,
) -> Result<(GridWorld, Vec<(usize, usize)>), MdpError> {
    let parsed = parse(map)?;
    debug!(
        size = parsed.size,
        walls = parsed.walls.len(),
        "building grid world from text map"
    );

    let mut builder = TransitionMatrixBuilder::new(parsed.size, true);
    builder.add_grid(&[parsed.goal], p_success)?;
    for &wall in &parsed.walls {
        builder.add_wall_at(wall)?;
    }
    let n_states = builder.n_states();
    let p = builder.into_p();

    let r = create_reward_matrix(n_states, parsed.size, &[(parsed.goal, 1.0)])?;
    let p0: Array1<f64> = codec::to_onehot(flat_index(parsed.start, parsed.size)?, n_states)?;

    let world = GridWorld::new(p, r, gamma, p0, &[parsed.goal], parsed.size, seed)?
        .with_walls(parsed.walls.iter().copied());
    Ok((world, parsed.walls))
}
