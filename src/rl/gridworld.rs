//! The N×N grid world of Sutton & Barto, Example 4.1.
//!
//! States are `(row, col)` cells. The top-left and bottom-right corners are
//! terminal. Every action moves one cell in a fixed direction; a move that
//! would leave the grid leaves that coordinate where it was.

use crate::error::{Error, Result};
use std::fmt::{Display, Formatter};

/// A cell of the grid, addressed as `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridState {
    pub row: usize,
    pub col: usize,
}

impl GridState {
    /// The cell at `row`, `col`.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for GridState {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl Display for GridState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The four moves available in every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
}

impl Action {
    /// Every action, in a fixed order.
    pub const ALL: [Action; 4] = [Action::Left, Action::Right, Action::Up, Action::Down];

    /// Row and column displacement of the move.
    pub const fn displacement(self) -> (isize, isize) {
        match self {
            Action::Left => (0, -1),
            Action::Right => (0, 1),
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
        }
    }
}

/// Static structure of a finite MDP over grid cells.
///
/// Implementations must define `transition_probability` for every state,
/// terminal ones included, and for each `(state, action)` the probabilities
/// over all states must sum to 1. `reachable_states` must contain every
/// state with non-zero probability under some action.
pub trait Environment {
    /// Side length of the grid.
    fn size(&self) -> usize;

    /// All cells, in row-major order.
    fn states(&self) -> Vec<GridState> {
        let n = self.size();
        (0..n)
            .flat_map(|row| (0..n).map(move |col| GridState::new(row, col)))
            .collect()
    }

    /// Absorbing states whose value is fixed at zero.
    fn terminal_states(&self) -> Vec<GridState>;

    /// Returns true for absorbing states.
    fn is_terminal(&self, state: GridState) -> bool {
        self.terminal_states().contains(&state)
    }

    /// All states minus the terminal ones, in row-major order.
    fn non_terminal_states(&self) -> Vec<GridState> {
        let terminal = self.terminal_states();
        self.states()
            .into_iter()
            .filter(|s| !terminal.contains(s))
            .collect()
    }

    /// P(next_state | state, action).
    fn transition_probability(&self, state: GridState, action: Action, next_state: GridState)
        -> f64;

    /// Distinct successors of `state` over all actions.
    fn reachable_states(&self, state: GridState) -> Vec<GridState>;
}

/// Deterministic N×N grid with terminal corners `(0, 0)` and `(N-1, N-1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridWorld {
    size: usize,
}

impl GridWorld {
    /// Grid size used by the textbook example.
    pub const DEFAULT_SIZE: usize = 4;

    /// Creates an `size`×`size` grid world.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGridSize`] when `size < 2`, since the two
    /// terminal corners would coincide.
    pub fn new(size: usize) -> Result<Self> {
        if size < 2 {
            return Err(Error::InvalidGridSize { size });
        }
        Ok(Self { size })
    }

    /// Returns true when `state` lies on the grid.
    pub fn contains(&self, state: GridState) -> bool {
        state.row < self.size && state.col < self.size
    }

    /// The cell reached by taking `action` in `state`.
    ///
    /// Each axis is clamped to `[0, N-1]` independently.
    pub fn step(&self, state: GridState, action: Action) -> GridState {
        let (dr, dc) = action.displacement();
        GridState::new(
            clamp_axis(state.row, dr, self.size),
            clamp_axis(state.col, dc, self.size),
        )
    }
}

impl Default for GridWorld {
    fn default() -> Self {
        Self {
            size: Self::DEFAULT_SIZE,
        }
    }
}

impl Environment for GridWorld {
    fn size(&self) -> usize {
        self.size
    }

    fn terminal_states(&self) -> Vec<GridState> {
        vec![
            GridState::new(0, 0),
            GridState::new(self.size - 1, self.size - 1),
        ]
    }

    fn is_terminal(&self, state: GridState) -> bool {
        let last = self.size - 1;
        (state.row == 0 && state.col == 0) || (state.row == last && state.col == last)
    }

    fn transition_probability(
        &self,
        state: GridState,
        action: Action,
        next_state: GridState,
    ) -> f64 {
        if self.step(state, action) == next_state {
            1.0
        } else {
            0.0
        }
    }

    fn reachable_states(&self, state: GridState) -> Vec<GridState> {
        let mut reachable = Vec::with_capacity(Action::ALL.len());
        for action in Action::ALL {
            let next = self.step(state, action);
            if !reachable.contains(&next) {
                reachable.push(next);
            }
        }
        reachable
    }
}

fn clamp_axis(coord: usize, delta: isize, size: usize) -> usize {
    let moved = coord as isize + delta;
    moved.clamp(0, size as isize - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_rejects_grids_without_two_corners() {
        assert_eq!(GridWorld::new(0), Err(Error::InvalidGridSize { size: 0 }));
        assert_eq!(GridWorld::new(1), Err(Error::InvalidGridSize { size: 1 }));
        assert!(GridWorld::new(2).is_ok());
    }

    #[test]
    fn test_state_sets() {
        let env = GridWorld::default();
        assert_eq!(env.states().len(), 16);
        assert_eq!(
            env.terminal_states(),
            vec![GridState::new(0, 0), GridState::new(3, 3)]
        );

        let non_terminal = env.non_terminal_states();
        assert_eq!(non_terminal.len(), 14);
        assert!(non_terminal.iter().all(|s| !env.is_terminal(*s)));
        assert!(env
            .terminal_states()
            .iter()
            .all(|t| env.states().contains(t)));
    }

    #[test]
    fn test_states_are_row_major() {
        let env = GridWorld::new(3).unwrap();
        let states = env.states();
        assert_eq!(states[0], GridState::new(0, 0));
        assert_eq!(states[1], GridState::new(0, 1));
        assert_eq!(states[3], GridState::new(1, 0));
        assert_eq!(states[8], GridState::new(2, 2));
    }

    #[test]
    fn test_step_clamps_at_edges() {
        let env = GridWorld::default();
        let corner = GridState::new(0, 3);
        assert_eq!(env.step(corner, Action::Up), corner);
        assert_eq!(env.step(corner, Action::Right), corner);
        assert_eq!(env.step(corner, Action::Left), GridState::new(0, 2));
        assert_eq!(env.step(corner, Action::Down), GridState::new(1, 3));

        let inner = GridState::new(1, 2);
        assert_eq!(env.step(inner, Action::Up), GridState::new(0, 2));
        assert_eq!(env.step(inner, Action::Left), GridState::new(1, 1));
    }

    #[test]
    fn test_transition_probabilities_sum_to_one() {
        // Terminal states included: the model is total.
        let env = GridWorld::default();
        for s in env.states() {
            for a in Action::ALL {
                let total: f64 = env
                    .states()
                    .into_iter()
                    .map(|next| env.transition_probability(s, a, next))
                    .sum();
                assert_relative_eq!(total, 1.0);
            }
        }
    }

    #[test]
    fn test_reachable_states_are_deduplicated() {
        let env = GridWorld::default();
        assert_eq!(
            env.reachable_states(GridState::new(0, 0)),
            vec![GridState::new(0, 0), GridState::new(0, 1), GridState::new(1, 0)]
        );
        assert_eq!(env.reachable_states(GridState::new(1, 1)).len(), 4);
        assert_eq!(env.reachable_states(GridState::new(0, 1)).len(), 4);
    }

    #[test]
    fn test_reachable_states_stay_on_grid() {
        let mut rng = StdRng::seed_from_u64(41);
        for _ in 0..200 {
            let n = rng.gen_range(2..12);
            let env = GridWorld::new(n).unwrap();
            let s = GridState::new(rng.gen_range(0..n), rng.gen_range(0..n));
            let reachable = env.reachable_states(s);

            assert!(!reachable.is_empty() && reachable.len() <= 4);
            assert!(reachable.iter().all(|next| env.contains(*next)));
            for a in Action::ALL {
                assert!(reachable.contains(&env.step(s, a)));
            }
        }
    }

    #[test]
    fn test_smallest_grid_has_distinct_corners() {
        let env = GridWorld::new(2).unwrap();
        assert_eq!(
            env.non_terminal_states(),
            vec![GridState::new(0, 1), GridState::new(1, 0)]
        );
    }
}
