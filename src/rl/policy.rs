//! Action-selection policies for the grid world.

use crate::rl::gridworld::{Action, Environment, GridState};
use std::collections::HashMap;

/// A stochastic policy π(a | s).
///
/// For every state the probabilities over [`Action::ALL`] must sum to 1.
/// This is a contract on implementors; the evaluation driver does not check it.
pub trait Policy {
    /// Probability of choosing `action` in `state`.
    fn probability(&self, action: Action, state: GridState) -> f64;
}

/// Chooses each of the four actions with equal probability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniformRandomPolicy;

impl UniformRandomPolicy {
    /// The equiprobable policy, π(a | s) = 1/4.
    pub fn new() -> Self {
        Self
    }
}

impl Policy for UniformRandomPolicy {
    fn probability(&self, _action: Action, _state: GridState) -> f64 {
        1.0 / Action::ALL.len() as f64
    }
}

/// Always takes one action per state.
///
/// States without an explicit entry use `default_action`.
#[derive(Debug, Clone)]
pub struct DeterministicPolicy {
    actions: HashMap<GridState, Action>,
    default_action: Action,
}

impl DeterministicPolicy {
    /// A policy taking `default_action` everywhere.
    pub fn new(default_action: Action) -> Self {
        Self {
            actions: HashMap::new(),
            default_action,
        }
    }

    /// Builds a policy from an arbitrary state → action rule over `states`.
    pub fn from_fn<I, F>(states: I, default_action: Action, mut rule: F) -> Self
    where
        I: IntoIterator<Item = GridState>,
        F: FnMut(GridState) -> Action,
    {
        let actions = states.into_iter().map(|s| (s, rule(s))).collect();
        Self {
            actions,
            default_action,
        }
    }

    /// Moves left along the row, then up column 0, reaching the `(0, 0)`
    /// corner from every state of `env`.
    pub fn toward_origin<E: Environment + ?Sized>(env: &E) -> Self {
        Self::from_fn(env.states(), Action::Up, |s| {
            if s.col > 0 {
                Action::Left
            } else {
                Action::Up
            }
        })
    }

    /// Overrides the action taken in `state`.
    pub fn set_action(&mut self, state: GridState, action: Action) {
        self.actions.insert(state, action);
    }

    /// The action taken in `state`.
    pub fn action(&self, state: GridState) -> Action {
        *self.actions.get(&state).unwrap_or(&self.default_action)
    }
}

impl Policy for DeterministicPolicy {
    fn probability(&self, action: Action, state: GridState) -> f64 {
        if self.action(state) == action {
            1.0
        } else {
            0.0
        }
    }
}
