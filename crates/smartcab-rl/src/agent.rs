//! Learning agent - drives one vehicle through trials and learns from rewards

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use smartcab_core::{Action, Environment, Location, Result, Reward, RoutePlanner};

use crate::export::{NullSink, TableSink};
use crate::learning::{LearningUpdate, Transition};
use crate::policy::{Choice, EpsilonGreedy};
use crate::schedule::ExplorationSchedule;
use crate::state::StateKey;
use crate::table::{Knowledge, DEFAULT_INITIAL_VALUE};

/// Learning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Estimate assigned to every action of a newly touched state
    pub initial_value: f64,

    /// Blend coefficient (alpha). 1.0 overwrites with the new target.
    pub learning_rate: f64,

    /// Weight of the next state's best estimate (gamma)
    pub discount_factor: f64,

    pub exploration: ExplorationSchedule,

    /// Seed for the policy's random draws; entropy when unset
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            initial_value: DEFAULT_INITIAL_VALUE,
            learning_rate: 1.0,
            discount_factor: 0.0,
            exploration: ExplorationSchedule::default(),
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        self.update_rule().validate()?;
        self.exploration.validate()
    }

    pub fn update_rule(&self) -> LearningUpdate {
        LearningUpdate {
            learning_rate: self.learning_rate,
            discount_factor: self.discount_factor,
        }
    }
}

/// What happened during one call to [`LearningAgent::update`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepOutcome {
    pub t: u64,
    pub deadline: i32,
    pub state: StateKey,
    pub action: Action,
    pub exploited: bool,
    pub reward: Reward,
    pub value: f64,
}

/// Agent statistics
#[derive(Debug, Clone, Serialize)]
pub struct AgentStats {
    pub trials: u32,
    pub total_steps: u64,
    pub total_reward: f64,
    pub net_reward: f64,
    pub epsilon: f64,
    pub table_size: usize,
    pub visited_states: usize,
}

/// The learning vehicle.
///
/// Holds only per-run bookkeeping. Learned state lives in [`Knowledge`],
/// which the driver owns and lends to every `reset` and `update`.
pub struct LearningAgent<P: RoutePlanner> {
    planner: P,
    policy: EpsilonGreedy,
    learner: LearningUpdate,
    schedule: ExplorationSchedule,
    sink: Box<dyn TableSink>,
    rng: StdRng,
    epsilon: f64,
    trial: u32,
    net_reward: f64,
    total_reward: f64,
    total_steps: u64,
}

impl<P: RoutePlanner> LearningAgent<P> {
    pub fn new(planner: P, config: &AgentConfig) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            planner,
            policy: EpsilonGreedy,
            learner: config.update_rule(),
            schedule: config.exploration.clone(),
            sink: Box::new(NullSink),
            rng,
            epsilon: 0.0,
            trial: 0,
            net_reward: 0.0,
            total_reward: 0.0,
            total_steps: 0,
        })
    }

    /// Export the table through `sink` at every trial start
    pub fn with_sink(mut self, sink: Box<dyn TableSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Start a new trial toward `destination`.
    ///
    /// Replans, clears the net reward, fixes epsilon for the trial, and exports
    /// the table. Export failures are logged and do not stop the run.
    pub fn reset(&mut self, knowledge: &Knowledge, destination: Location) {
        self.planner.route_to(destination);
        self.net_reward = 0.0;
        self.trial += 1;
        self.epsilon = self.schedule.epsilon(self.trial);

        if let Err(e) = self.sink.export(self.trial, &knowledge.table) {
            warn!("Failed to export value table at trial {}: {}", self.trial, e);
        }

        info!(
            "Trial {} started: destination {}, epsilon {:.3}, {} states known",
            self.trial,
            destination,
            self.epsilon,
            knowledge.table.len()
        );
    }

    /// Run one timestep: sense, choose, act, learn
    pub fn update<E: Environment>(
        &mut self,
        knowledge: &mut Knowledge,
        env: &mut E,
        t: u64,
    ) -> StepOutcome {
        let waypoint = self.planner.next_waypoint(env.pose());
        let percept = env.sense();
        let deadline = env.deadline();
        let state = StateKey::encode(&percept, waypoint);

        let (action, choice) = self
            .policy
            .select(knowledge, state, self.epsilon, &mut self.rng);

        let reward = env.act(action);
        self.net_reward += reward;
        self.total_reward += reward;
        self.total_steps += 1;

        let next_state = StateKey::encode(&env.sense(), self.planner.next_waypoint(env.pose()));
        let transition = Transition::new(state, action, reward, next_state, env.is_done());
        let value = self.learner.apply(&mut knowledge.table, &transition);

        debug!(
            "t={} deadline={} state={} action={} ({:?}) reward={} value={:.3}",
            t, deadline, state, action, choice, reward, value
        );

        StepOutcome {
            t,
            deadline,
            state,
            action,
            exploited: choice == Choice::Exploit,
            reward,
            value,
        }
    }

    pub fn net_reward(&self) -> f64 {
        self.net_reward
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Override epsilon for the rest of the current trial
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }

    pub fn trial(&self) -> u32 {
        self.trial
    }

    pub fn stats(&self, knowledge: &Knowledge) -> AgentStats {
        AgentStats {
            trials: self.trial,
            total_steps: self.total_steps,
            total_reward: self.total_reward,
            net_reward: self.net_reward,
            epsilon: self.epsilon,
            table_size: knowledge.table.len(),
            visited_states: knowledge.visited_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use smartcab_core::{Heading, Light, Percept, Pose};

    /// Single-intersection stand-in with scripted rewards
    struct ScriptedEnv {
        percept: Percept,
        reward: Reward,
        deadline: i32,
        acted: Vec<Action>,
    }

    impl ScriptedEnv {
        fn new(reward: Reward) -> Self {
            Self {
                percept: Percept {
                    light: Light::Green,
                    ..Percept::default()
                },
                reward,
                deadline: 20,
                acted: Vec::new(),
            }
        }
    }

    impl Environment for ScriptedEnv {
        fn sense(&self) -> Percept {
            self.percept
        }

        fn pose(&self) -> Pose {
            Pose {
                location: Location::new(1, 1),
                heading: Heading::EAST,
            }
        }

        fn deadline(&self) -> i32 {
            self.deadline
        }

        fn act(&mut self, action: Action) -> Reward {
            self.acted.push(action);
            self.deadline -= 1;
            self.reward
        }

        fn is_done(&self) -> bool {
            false
        }
    }

    struct FixedPlanner(Action);

    impl RoutePlanner for FixedPlanner {
        fn route_to(&mut self, _destination: Location) {}

        fn next_waypoint(&self, _pose: Pose) -> Action {
            self.0
        }
    }

    fn config() -> AgentConfig {
        AgentConfig {
            seed: Some(42),
            ..AgentConfig::default()
        }
    }

    #[test]
    fn test_reset_zeroes_net_reward_each_time() {
        let mut agent = LearningAgent::new(FixedPlanner(Action::Forward), &config()).unwrap();
        let mut knowledge = Knowledge::default();
        let mut env = ScriptedEnv::new(2.0);

        agent.reset(&knowledge, Location::new(3, 3));
        agent.update(&mut knowledge, &mut env, 0);
        agent.update(&mut knowledge, &mut env, 1);
        assert_eq!(agent.net_reward(), 4.0);

        agent.reset(&knowledge, Location::new(4, 4));
        assert_eq!(agent.net_reward(), 0.0);
        agent.reset(&knowledge, Location::new(5, 5));
        assert_eq!(agent.net_reward(), 0.0);
        assert_eq!(agent.trial(), 3);
    }

    #[test]
    fn test_update_overwrites_with_reward() {
        let mut agent = LearningAgent::new(FixedPlanner(Action::Forward), &config()).unwrap();
        let mut knowledge = Knowledge::default();
        let mut env = ScriptedEnv::new(-1.0);

        agent.reset(&knowledge, Location::new(3, 3));
        let outcome = agent.update(&mut knowledge, &mut env, 0);

        assert_eq!(outcome.reward, -1.0);
        assert_eq!(knowledge.table.get(outcome.state, outcome.action), -1.0);
        for action in Action::ALL.into_iter().filter(|a| *a != outcome.action) {
            assert_eq!(knowledge.table.get(outcome.state, action), 1.0);
        }
    }

    #[test]
    fn test_update_encodes_state_from_percept_and_waypoint() {
        let mut agent = LearningAgent::new(FixedPlanner(Action::Forward), &config()).unwrap();
        let mut knowledge = Knowledge::default();
        let mut env = ScriptedEnv::new(0.0);

        agent.reset(&knowledge, Location::new(3, 3));
        let outcome = agent.update(&mut knowledge, &mut env, 0);

        assert_eq!(
            outcome.state.to_string(),
            "oncoming:none,left:none,light:green,waypoint:forward"
        );
        assert_eq!(env.acted, vec![outcome.action]);
        assert_eq!(outcome.deadline, 20);
    }

    #[test]
    fn test_first_visit_explores() {
        let mut agent = LearningAgent::new(FixedPlanner(Action::Left), &config()).unwrap();
        let mut knowledge = Knowledge::default();
        let mut env = ScriptedEnv::new(0.0);

        agent.reset(&knowledge, Location::new(3, 3));
        agent.set_epsilon(1.0);
        let outcome = agent.update(&mut knowledge, &mut env, 0);

        assert!(!outcome.exploited);
        assert!(knowledge.is_visited(&outcome.state));
    }

    /// Counts exports through a shared handle so the test can observe them
    struct CountingSink(Arc<Mutex<Vec<u32>>>);

    impl TableSink for CountingSink {
        fn export(&mut self, trial: u32, _table: &crate::table::ValueTable) -> Result<()> {
            self.0.lock().unwrap().push(trial);
            Ok(())
        }
    }

    #[test]
    fn test_reset_exports_table() {
        let trials = Arc::new(Mutex::new(Vec::new()));
        let mut agent = LearningAgent::new(FixedPlanner(Action::Left), &config())
            .unwrap()
            .with_sink(Box::new(CountingSink(Arc::clone(&trials))));
        let knowledge = Knowledge::default();

        agent.reset(&knowledge, Location::new(2, 2));
        agent.reset(&knowledge, Location::new(2, 3));

        assert_eq!(*trials.lock().unwrap(), vec![1, 2]);
    }

    struct FailingSink;

    impl TableSink for FailingSink {
        fn export(&mut self, _trial: u32, _table: &crate::table::ValueTable) -> Result<()> {
            Err(smartcab_core::SmartcabError::Export("disk full".to_string()))
        }
    }

    #[test]
    fn test_export_failure_is_not_fatal() {
        let mut agent = LearningAgent::new(FixedPlanner(Action::Forward), &config())
            .unwrap()
            .with_sink(Box::new(FailingSink));
        let mut knowledge = Knowledge::default();
        let mut env = ScriptedEnv::new(2.0);

        agent.reset(&knowledge, Location::new(2, 2));
        agent.update(&mut knowledge, &mut env, 0);
        agent.reset(&knowledge, Location::new(2, 2));

        assert_eq!(agent.trial(), 2);
        assert_eq!(agent.net_reward(), 0.0);
    }

    #[test]
    fn test_epsilon_follows_schedule() {
        let cfg = AgentConfig {
            exploration: ExplorationSchedule::Reciprocal { scale: 1.0 },
            ..config()
        };
        let mut agent = LearningAgent::new(FixedPlanner(Action::Left), &cfg).unwrap();
        let knowledge = Knowledge::default();

        assert_eq!(agent.epsilon(), 0.0);

        agent.reset(&knowledge, Location::new(2, 2));
        assert_eq!(agent.epsilon(), 0.0);
        agent.reset(&knowledge, Location::new(2, 2));
        assert_eq!(agent.epsilon(), 0.5);
        agent.reset(&knowledge, Location::new(2, 2));
        agent.reset(&knowledge, Location::new(2, 2));
        assert_eq!(agent.epsilon(), 0.75);
    }

    #[test]
    fn test_epsilon_unset_until_first_reset() {
        let cfg = AgentConfig {
            exploration: ExplorationSchedule::Constant { rate: 0.0 },
            ..config()
        };
        let mut agent = LearningAgent::new(FixedPlanner(Action::Left), &cfg).unwrap();

        // The schedule is only consulted once a trial starts.
        assert_eq!(agent.epsilon(), 0.0);
        agent.reset(&Knowledge::default(), Location::new(2, 2));
        assert_eq!(agent.epsilon(), 1.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = AgentConfig {
            learning_rate: 2.0,
            ..config()
        };
        assert!(LearningAgent::new(FixedPlanner(Action::Left), &cfg).is_err());
    }

    #[test]
    fn test_stats() {
        let mut agent = LearningAgent::new(FixedPlanner(Action::Forward), &config()).unwrap();
        let mut knowledge = Knowledge::default();
        let mut env = ScriptedEnv::new(0.5);

        agent.reset(&knowledge, Location::new(3, 3));
        for t in 0..4 {
            agent.update(&mut knowledge, &mut env, t);
        }

        let stats = agent.stats(&knowledge);
        assert_eq!(stats.trials, 1);
        assert_eq!(stats.total_steps, 4);
        assert_eq!(stats.total_reward, 2.0);
        assert_eq!(stats.net_reward, 2.0);
        assert_eq!(stats.table_size, 1);
        assert_eq!(stats.visited_states, 1);
    }
}
