//! Value-table update rule

use serde::{Deserialize, Serialize};

use smartcab_core::{Action, Result, Reward, SmartcabError};

use crate::state::StateKey;
use crate::table::ValueTable;

/// A single step (s, a, r, s', done)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: StateKey,
    pub action: Action,
    pub reward: Reward,
    pub next_state: StateKey,
    pub done: bool,
}

impl Transition {
    pub fn new(
        state: StateKey,
        action: Action,
        reward: Reward,
        next_state: StateKey,
        done: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            done,
        }
    }
}

/// Blended temporal-difference update.
///
/// `Q(s,a) <- Q(s,a) + alpha * (r + gamma * max_a' Q(s',a') - Q(s,a))`
///
/// With `alpha = 1` and `gamma = 0` this is a plain overwrite with the last
/// reward, which is the default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningUpdate {
    pub learning_rate: f64,
    pub discount_factor: f64,
}

impl LearningUpdate {
    pub fn new(learning_rate: f64, discount_factor: f64) -> Result<Self> {
        let update = Self {
            learning_rate,
            discount_factor,
        };
        update.validate()?;
        Ok(update)
    }

    /// Plain overwrite: the stored value becomes the last reward
    pub fn overwrite() -> Self {
        Self {
            learning_rate: 1.0,
            discount_factor: 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.learning_rate) {
            return Err(SmartcabError::Config(format!(
                "learning_rate must be within [0, 1], got {}",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(SmartcabError::Config(format!(
                "discount_factor must be within [0, 1], got {}",
                self.discount_factor
            )));
        }
        Ok(())
    }

    /// Target the estimate is pulled toward. Terminal steps do not bootstrap.
    pub fn target(&self, table: &mut ValueTable, transition: &Transition) -> f64 {
        if transition.done || self.discount_factor == 0.0 {
            transition.reward
        } else {
            transition.reward + self.discount_factor * table.max_value(transition.next_state)
        }
    }

    /// Apply `transition` to the table and return the new estimate
    pub fn apply(&self, table: &mut ValueTable, transition: &Transition) -> f64 {
        let target = self.target(table, transition);
        let current = table.get(transition.state, transition.action);
        let updated = current + self.learning_rate * (target - current);
        table.set(transition.state, transition.action, updated);
        updated
    }
}

impl Default for LearningUpdate {
    fn default() -> Self {
        Self::overwrite()
    }
}
