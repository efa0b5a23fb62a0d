//! Iterative policy evaluation (Sutton & Barto 2018, §4.1).
//!
//! Repeatedly applies the Bellman expectation update
//!
//! ```text
//! V(s) <- Σ_a π(a|s) Σ_s' p(s'|s,a) [ r + γ V(s') ]
//! ```
//!
//! to every non-terminal state until the largest change in one sweep is at
//! most `theta`. Updates are made in place: a state updated earlier in a
//! sweep is seen with its new value by the states after it.

use crate::error::{Error, Result};
use crate::rl::gridworld::{Action, Environment, GridState};
use crate::rl::policy::Policy;
use log::{debug, info, warn};
use ndarray::Array2;
use std::fmt::{Display, Formatter};

/// Reward received on every transition.
pub const STEP_REWARD: f64 = -1.0;

/// Largest number of decimal places used when rounding or printing values.
pub const MAX_DECIMALS: usize = 15;

/// Parameters of the evaluation loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationConfig {
    /// Discount factor, in [0, 1].
    pub gamma: f64,
    /// Stop once a sweep changes no value by more than this.
    pub theta: f64,
    /// Give up after this many sweeps. `None` sweeps until convergence.
    pub max_sweeps: Option<usize>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            theta: 1e-4,
            max_sweeps: None,
        }
    }
}

impl EvaluationConfig {
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = Some(max_sweeps);
        self
    }

    /// Checks that the loop is well defined.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDiscount`] if `gamma` is outside [0, 1], and
    /// [`Error::InvalidThreshold`] if `theta` is not a positive finite number.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(Error::InvalidDiscount { gamma: self.gamma });
        }
        if !self.theta.is_finite() || self.theta <= 0.0 {
            return Err(Error::InvalidThreshold { theta: self.theta });
        }
        Ok(())
    }
}

/// State values over an N×N grid, stored as `values[[row, col]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueFunction {
    values: Array2<f64>,
}

impl ValueFunction {
    /// All-zero values for a `size`×`size` grid.
    pub fn zeros(size: usize) -> Self {
        Self {
            values: Array2::zeros((size, size)),
        }
    }

    pub fn size(&self) -> usize {
        self.values.nrows()
    }

    /// Value of `state`.
    ///
    /// # Panics
    ///
    /// Panics if `state` is outside the grid; see [`ValueFunction::try_get`].
    pub fn get(&self, state: GridState) -> f64 {
        self.values[[state.row, state.col]]
    }

    /// Value of `state`, or an error if it is not on the grid.
    pub fn try_get(&self, state: GridState) -> Result<f64> {
        self.values
            .get([state.row, state.col])
            .copied()
            .ok_or(Error::StateOutOfBounds {
                row: state.row,
                col: state.col,
                size: self.size(),
            })
    }

    fn set(&mut self, state: GridState, value: f64) {
        self.values[[state.row, state.col]] = value;
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn into_array(self) -> Array2<f64> {
        self.values
    }

    /// Values rounded to `decimals` places, capped at [`MAX_DECIMALS`].
    pub fn rounded(&self, decimals: usize) -> Array2<f64> {
        self.values.mapv(|v| round_to(v, decimals))
    }

    /// Renders the grid one bracketed row per line, columns right-aligned.
    ///
    /// `decimals` is capped at [`MAX_DECIMALS`].
    pub fn to_grid_string(&self, decimals: usize) -> String {
        let decimals = decimals.min(MAX_DECIMALS);
        let cells: Vec<String> = self
            .values
            .iter()
            .map(|&v| format!("{:.*}", decimals, round_to(v, decimals)))
            .collect();
        let width = cells.iter().map(String::len).max().unwrap_or(0);

        let n = self.size();
        let mut out = String::new();
        for row in 0..n {
            if row > 0 {
                out.push('\n');
            }
            out.push('[');
            for col in 0..n {
                if col > 0 {
                    out.push(' ');
                }
                out.push_str(&format!("{:>width$}", cells[row * n + col], width = width));
            }
            out.push(']');
        }
        out
    }
}

impl Display for ValueFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_grid_string(1))
    }
}

fn round_to(value: f64, decimals: usize) -> f64 {
    // 10^15 keeps the scaled value finite for any f64 grid value worth printing.
    let scale = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    let rounded = (value * scale).round() / scale;
    // Avoid printing "-0.0".
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Outcome of a converged evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub values: ValueFunction,
    /// Number of completed sweeps.
    pub sweeps: usize,
    /// Largest change during the last sweep.
    pub delta: f64,
}

/// Evaluates a fixed policy on an environment model.
pub struct PolicyEvaluator<'a, E: ?Sized, P: ?Sized> {
    env: &'a E,
    policy: &'a P,
    config: EvaluationConfig,
}

impl<'a, E, P> PolicyEvaluator<'a, E, P>
where
    E: Environment + ?Sized,
    P: Policy + ?Sized,
{
    /// # Errors
    ///
    /// Fails if `config` does not pass [`EvaluationConfig::validate`].
    pub fn new(env: &'a E, policy: &'a P, config: EvaluationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            env,
            policy,
            config,
        })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Expected return of taking `action` in `state` and then following the
    /// values in `values`:
    /// `Σ_s' p(s'|s,a) [ r + γ V(s') ]`.
    ///
    /// # Errors
    ///
    /// [`Error::SizeMismatch`] if `values` does not cover the grid, and
    /// [`Error::StateOutOfBounds`] if `state` is not on it.
    pub fn action_value(
        &self,
        values: &ValueFunction,
        state: GridState,
        action: Action,
    ) -> Result<f64> {
        self.check_state(values, state)?;
        let reachable = self.env.reachable_states(state);
        Ok(self.backup(values, state, action, &reachable))
    }

    /// Bellman expectation of `state` under the policy:
    /// `Σ_a π(a|s) Σ_s' p(s'|s,a) [ r + γ V(s') ]`.
    ///
    /// # Errors
    ///
    /// Same as [`PolicyEvaluator::action_value`].
    pub fn expected_value(&self, values: &ValueFunction, state: GridState) -> Result<f64> {
        self.check_state(values, state)?;
        Ok(self.expectation(values, state))
    }

    fn expectation(&self, values: &ValueFunction, state: GridState) -> f64 {
        let reachable = self.env.reachable_states(state);
        Action::ALL
            .iter()
            .map(|&a| self.policy.probability(a, state) * self.backup(values, state, a, &reachable))
            .sum()
    }

    fn backup(
        &self,
        values: &ValueFunction,
        state: GridState,
        action: Action,
        reachable: &[GridState],
    ) -> f64 {
        reachable
            .iter()
            .map(|&next| {
                self.env.transition_probability(state, action, next)
                    * (STEP_REWARD + self.config.gamma * values.get(next))
            })
            .sum()
    }

    /// Runs one in-place sweep over the non-terminal states and returns the
    /// largest absolute change.
    ///
    /// # Errors
    ///
    /// [`Error::SizeMismatch`] if `values` does not cover the grid.
    pub fn sweep(&self, values: &mut ValueFunction) -> Result<f64> {
        self.check_size(values)?;
        Ok(self.sweep_states(&self.env.non_terminal_states(), values))
    }

    /// Sweeps from all-zero values until `delta <= theta`.
    ///
    /// # Errors
    ///
    /// [`Error::NotConverged`] if `max_sweeps` is set and reached first.
    pub fn evaluate(&self) -> Result<Evaluation> {
        let states = self.env.non_terminal_states();
        let mut values = ValueFunction::zeros(self.env.size());
        let mut delta = f64::INFINITY;
        let mut sweeps = 0;

        while delta > self.config.theta {
            if let Some(max) = self.config.max_sweeps {
                if sweeps >= max {
                    warn!("policy evaluation stopped after {sweeps} sweeps, delta = {delta:e}");
                    return Err(Error::NotConverged { sweeps, delta });
                }
            }
            delta = self.sweep_states(&states, &mut values);
            sweeps += 1;
            debug!("sweep {sweeps}: delta = {delta:e}");
        }

        info!(
            "policy evaluation converged on a {n}x{n} grid after {sweeps} sweeps (delta = {delta:e})",
            n = self.env.size()
        );
        Ok(Evaluation {
            values,
            sweeps,
            delta,
        })
    }

    fn sweep_states(&self, states: &[GridState], values: &mut ValueFunction) -> f64 {
        let mut delta = 0.0_f64;
        for &s in states {
            let old = values.get(s);
            let new = self.expectation(values, s);
            values.set(s, new);
            delta = delta.max((old - new).abs());
        }
        delta
    }

    fn check_state(&self, values: &ValueFunction, state: GridState) -> Result<()> {
        self.check_size(values)?;
        values.try_get(state).map(|_| ())
    }

    fn check_size(&self, values: &ValueFunction) -> Result<()> {
        if values.size() != self.env.size() {
            return Err(Error::SizeMismatch {
                expected: self.env.size(),
                actual: values.size(),
            });
        }
        Ok(())
    }
}

/// Evaluates `policy` on `env` to convergence.
///
/// # Examples
///
/// ```
/// use gridworld_eval::{evaluate_policy, EvaluationConfig, GridState, GridWorld, UniformRandomPolicy};
///
/// let env = GridWorld::new(4).unwrap();
/// let policy = UniformRandomPolicy::new();
/// let result = evaluate_policy(&env, &policy, EvaluationConfig::default()).unwrap();
///
/// assert_eq!(result.values.get(GridState::new(0, 0)), 0.0);
/// assert!((result.values.get(GridState::new(0, 1)) + 14.0).abs() < 0.05);
/// ```
pub fn evaluate_policy<E, P>(env: &E, policy: &P, config: EvaluationConfig) -> Result<Evaluation>
where
    E: Environment + ?Sized,
    P: Policy + ?Sized,
{
    PolicyEvaluator::new(env, policy, config)?.evaluate()
}
