//! Iterative policy evaluation on the grid world of Sutton & Barto,
//! Example 4.1.
//!
//! ```
//! use gridworld_eval::{evaluate_policy, EvaluationConfig, GridWorld, UniformRandomPolicy};
//!
//! let env = GridWorld::default();
//! let result = evaluate_policy(&env, &UniformRandomPolicy::new(), EvaluationConfig::default())?;
//! println!("{}", result.values);
//! # Ok::<(), gridworld_eval::Error>(())
//! ```

pub mod error;
pub mod rl;

pub use error::{Error, Result};
pub use rl::{
    evaluate_policy, Action, DeterministicPolicy, Environment, Evaluation, EvaluationConfig,
    GridState, GridWorld, Policy, PolicyEvaluator, UniformRandomPolicy, ValueFunction, MAX_DECIMALS,
    STEP_REWARD,
};
