//! Trial loop - resets the world, steps the agent, collects results

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use smartcab_core::Environment;
use smartcab_rl::{AgentStats, Knowledge, LearningAgent, StepOutcome};

use crate::planner::GridRoutePlanner;
use crate::world::World;

/// Number of trailing trials used for the recent success rate
const RECENT_WINDOW: usize = 10;

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub trials: u32,
    /// Pause between timesteps, for watching logs in real time
    pub update_delay_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: 100,
            update_delay_ms: 0,
        }
    }
}

/// Result of one trial
#[derive(Debug, Clone, Serialize)]
pub struct TrialReport {
    pub trial: u32,
    pub reached: bool,
    pub steps: u64,
    pub net_reward: f64,
    pub deadline_remaining: i32,
    pub epsilon: f64,
}

/// Result of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub trials: u32,
    pub successes: u32,
    pub failures: u32,
    pub success_rate: f64,
    pub mean_net_reward: f64,
    pub recent_success_rate: f64,
    pub agent: AgentStats,
    pub reports: Vec<TrialReport>,
}

impl RunSummary {
    fn from_reports(reports: Vec<TrialReport>, agent: AgentStats) -> Self {
        let trials = u32::try_from(reports.len()).unwrap_or(u32::MAX);
        let successes = u32::try_from(reports.iter().filter(|r| r.reached).count()).unwrap_or(0);

        let rate = |slice: &[TrialReport]| {
            if slice.is_empty() {
                0.0
            } else {
                slice.iter().filter(|r| r.reached).count() as f64 / slice.len() as f64
            }
        };
        let recent = &reports[reports.len().saturating_sub(RECENT_WINDOW)..];

        Self {
            trials,
            successes,
            failures: trials - successes,
            success_rate: rate(&reports),
            mean_net_reward: if reports.is_empty() {
                0.0
            } else {
                reports.iter().map(|r| r.net_reward).sum::<f64>() / reports.len() as f64
            },
            recent_success_rate: rate(recent),
            agent,
            reports,
        }
    }
}

/// Drives the learning agent through trials in a [`World`]
pub struct Simulator {
    world: World,
    agent: LearningAgent<GridRoutePlanner>,
    knowledge: Knowledge,
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(
        world: World,
        agent: LearningAgent<GridRoutePlanner>,
        knowledge: Knowledge,
        config: SimulationConfig,
    ) -> Self {
        Self {
            world,
            agent,
            knowledge,
            config,
        }
    }

    /// Run the configured number of trials
    pub async fn run(&mut self) -> RunSummary {
        let mut reports = Vec::with_capacity(self.config.trials as usize);

        for _ in 0..self.config.trials {
            let report = self.run_trial().await;
            info!(
                "Trial {} {}: {} steps, net reward {:.1}, deadline left {}",
                report.trial,
                if report.reached { "reached destination" } else { "failed" },
                report.steps,
                report.net_reward,
                report.deadline_remaining
            );
            reports.push(report);
        }

        let summary = RunSummary::from_reports(reports, self.agent.stats(&self.knowledge));
        info!(
            "Run complete: {}/{} trials succeeded ({:.0}%), {} states learned",
            summary.successes,
            summary.trials,
            summary.success_rate * 100.0,
            summary.agent.table_size
        );
        summary
    }

    /// Run one trial to completion
    pub async fn run_trial(&mut self) -> TrialReport {
        self.begin_trial();

        let delay = Duration::from_millis(self.config.update_delay_ms);
        while self.step().is_some() {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        let trip = self.world.trip();
        TrialReport {
            trial: self.agent.trial(),
            reached: trip.reached,
            steps: trip.t,
            net_reward: self.agent.net_reward(),
            deadline_remaining: trip.deadline,
            epsilon: self.agent.epsilon(),
        }
    }

    /// Reset the world and hand the new destination to the agent
    pub fn begin_trial(&mut self) {
        let destination = self.world.reset();
        self.agent.reset(&self.knowledge, destination);
    }

    /// Advance one timestep. `None` once the trial has finished.
    pub fn step(&mut self) -> Option<StepOutcome> {
        if self.world.is_done() {
            return None;
        }

        self.world.update_lights();
        self.world.update_dummies();
        let t = self.world.t();
        let outcome = self.agent.update(&mut self.knowledge, &mut self.world, t);
        self.world.end_step();

        Some(outcome)
    }

    pub fn knowledge(&self) -> &Knowledge {
        &self.knowledge
    }

    pub fn agent(&self) -> &LearningAgent<GridRoutePlanner> {
        &self.agent
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Hand back the learned knowledge, e.g. to continue in a new simulator
    pub fn into_knowledge(self) -> Knowledge {
        self.knowledge
    }
}
