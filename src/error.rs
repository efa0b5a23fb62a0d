//! Error types shared by the grid world model and the evaluation driver.

use thiserror::Error;

/// Errors produced while building or evaluating a grid world MDP.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The grid is too small to hold two distinct terminal corners.
    #[error("grid size must be at least 2, got {size}")]
    InvalidGridSize { size: usize },

    /// Discount factor outside of [0, 1].
    #[error("discount factor must lie in [0, 1], got {gamma}")]
    InvalidDiscount { gamma: f64 },

    /// Convergence threshold that is not strictly positive.
    #[error("convergence threshold must be positive and finite, got {theta}")]
    InvalidThreshold { theta: f64 },

    /// A state that does not lie on the grid.
    #[error("state ({row}, {col}) is outside a {size}x{size} grid")]
    StateOutOfBounds { row: usize, col: usize, size: usize },

    /// A value table whose shape does not match the grid it is used with.
    #[error("value table is {actual}x{actual} but the grid is {expected}x{expected}")]
    SizeMismatch { expected: usize, actual: usize },

    /// The sweep cap was reached before the value function settled.
    #[error("policy evaluation did not converge after {sweeps} sweeps (delta = {delta})")]
    NotConverged { sweeps: usize, delta: f64 },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        let err = Error::InvalidGridSize { size: 1 };
        assert_eq!(err.to_string(), "grid size must be at least 2, got 1");

        let err = Error::StateOutOfBounds {
            row: 4,
            col: 0,
            size: 4,
        };
        assert_eq!(err.to_string(), "state (4, 0) is outside a 4x4 grid");
    }
}
