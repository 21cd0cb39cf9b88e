//! Value table and accumulated agent knowledge

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use smartcab_core::Action;

use crate::state::StateKey;

/// Optimistic starting estimate for every (state, action) pair
pub const DEFAULT_INITIAL_VALUE: f64 = 1.0;

/// Estimates for the four actions of one state, indexed by [`Action::index`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionValues([f64; Action::COUNT]);

impl ActionValues {
    pub fn filled(value: f64) -> Self {
        Self([value; Action::COUNT])
    }

    pub fn get(&self, action: Action) -> f64 {
        self.0[action.index()]
    }

    pub fn set(&mut self, action: Action, value: f64) {
        self.0[action.index()] = value;
    }

    /// Highest-valued action; ties go to the earliest in canonical order
    pub fn best_action(&self) -> Action {
        let mut best = Action::ALL[0];
        for action in Action::ALL.into_iter().skip(1) {
            if self.get(action) > self.get(best) {
                best = action;
            }
        }
        best
    }

    pub fn max_value(&self) -> f64 {
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Action, f64)> + '_ {
        Action::ALL.into_iter().map(|action| (action, self.get(action)))
    }

    /// Named view used by exporters: `{"left": .., "right": .., ..}`
    pub fn to_map(&self) -> BTreeMap<Action, f64> {
        self.iter().collect()
    }
}

/// Tabular memory mapping each visited state to its action estimates.
///
/// Rows are created whole: once a state is touched all four actions have an
/// entry. Rows are never removed.
#[derive(Debug, Clone)]
pub struct ValueTable {
    rows: HashMap<StateKey, ActionValues>,
    initial_value: f64,
}

impl ValueTable {
    pub fn new(initial_value: f64) -> Self {
        Self {
            rows: HashMap::new(),
            initial_value,
        }
    }

    pub fn initial_value(&self) -> f64 {
        self.initial_value
    }

    /// Insert the default row for `state` if absent. Idempotent.
    pub fn ensure_initialized(&mut self, state: StateKey) -> &mut ActionValues {
        let initial = self.initial_value;
        self.rows
            .entry(state)
            .or_insert_with(|| ActionValues::filled(initial))
    }

    /// Read-only accessor; `None` for states never touched
    pub fn lookup(&self, state: &StateKey, action: Action) -> Option<f64> {
        self.rows.get(state).map(|row| row.get(action))
    }

    /// Initialising read: populates the row on first touch, then returns
    /// the estimate for `action`.
    pub fn get(&mut self, state: StateKey, action: Action) -> f64 {
        self.ensure_initialized(state).get(action)
    }

    pub fn set(&mut self, state: StateKey, action: Action, value: f64) {
        self.ensure_initialized(state).set(action, value);
    }

    pub fn row(&self, state: &StateKey) -> Option<&ActionValues> {
        self.rows.get(state)
    }

    /// Greedy action for `state`, initialising the row if needed
    pub fn best_action(&mut self, state: StateKey) -> Action {
        self.ensure_initialized(state).best_action()
    }

    /// Largest estimate for `state`, initialising the row if needed
    pub fn max_value(&mut self, state: StateKey) -> f64 {
        self.ensure_initialized(state).max_value()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &ActionValues)> {
        self.rows.iter()
    }

    /// Rows ordered by state key, for stable output
    pub fn sorted_rows(&self) -> Vec<(StateKey, ActionValues)> {
        let mut rows: Vec<_> = self.rows.iter().map(|(k, v)| (*k, *v)).collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    /// Overwrite estimates from a snapshot. Missing actions get the initial value.
    pub fn merge_snapshot(&mut self, snapshot: &TableSnapshot) {
        for (state, values) in &snapshot.rows {
            let row = self.ensure_initialized(*state);
            for (action, value) in values {
                row.set(*action, *value);
            }
        }
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            rows: self
                .rows
                .iter()
                .map(|(state, row)| (*state, row.to_map()))
                .collect(),
        }
    }
}

impl Default for ValueTable {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_VALUE)
    }
}

/// Serialisable dump of a value table: state -> {action: value}
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableSnapshot {
    pub rows: BTreeMap<StateKey, BTreeMap<Action, f64>>,
}

/// Everything the agent has learned across trials.
///
/// Owned by the driver and lent to the agent for each step, so several
/// agents (or a fresh agent in a later run) can share one body of knowledge.
#[derive(Debug, Clone, Default)]
pub struct Knowledge {
    pub table: ValueTable,
    visited: HashSet<StateKey>,
}

impl Knowledge {
    pub fn new(initial_value: f64) -> Self {
        Self {
            table: ValueTable::new(initial_value),
            visited: HashSet::new(),
        }
    }

    /// Whether the random branch of the policy has explored `state`
    pub fn is_visited(&self, state: &StateKey) -> bool {
        self.visited.contains(state)
    }

    /// Returns true when the state was not previously marked
    pub fn mark_visited(&mut self, state: StateKey) -> bool {
        self.visited.insert(state)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Seed from a snapshot. Imported states count as visited so the policy
    /// may exploit them immediately.
    pub fn warm_start(&mut self, snapshot: &TableSnapshot) {
        self.table.merge_snapshot(snapshot);
        self.visited.extend(snapshot.rows.keys().copied());
    }
}
