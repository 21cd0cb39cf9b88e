//! Action selection

use rand::seq::SliceRandom;
use rand::Rng;

use smartcab_core::Action;

use crate::state::StateKey;
use crate::table::Knowledge;

/// How the policy arrived at its action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Exploit,
    Explore,
}

/// Epsilon-gated greedy policy.
///
/// Exploitation is only eligible for states the random branch has already
/// explored. For those, the greedy action is taken when a uniform draw falls
/// below `epsilon`. Every other case picks uniformly from all four actions and
/// marks the state as explored.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpsilonGreedy;

impl EpsilonGreedy {
    pub fn select<R: Rng>(
        &self,
        knowledge: &mut Knowledge,
        state: StateKey,
        epsilon: f64,
        rng: &mut R,
    ) -> (Action, Choice) {
        if rng.gen::<f64>() < epsilon && knowledge.is_visited(&state) {
            (knowledge.table.best_action(state), Choice::Exploit)
        } else {
            let action = *Action::ALL.choose(rng).unwrap_or(&Action::Stay);
            knowledge.mark_visited(state);
            (action, Choice::Explore)
        }
    }
}
