//! Collaborator traits the learning agent drives
//!
//! The world and the route planner live outside the learner. These traits
//! are the whole contract between them: everything the agent needs to know
//! about the grid comes through `sense`, `pose`, and `act`.

use crate::types::{Action, Location, Percept, Pose};

/// Scalar reward returned by the world for an attempted action
pub type Reward = f64;

/// The grid world as seen by its primary (learning) vehicle
pub trait Environment {
    /// Traffic and light conditions at the primary vehicle's intersection
    fn sense(&self) -> Percept;

    /// Current position and heading of the primary vehicle
    fn pose(&self) -> Pose;

    /// Remaining steps before the trial deadline. May go negative when the
    /// deadline is not enforced.
    fn deadline(&self) -> i32;

    /// Attempt `action`; the world judges legality and returns the reward
    fn act(&mut self, action: Action) -> Reward;

    /// Whether the current trial has finished
    fn is_done(&self) -> bool;
}

/// Turn-by-turn routing toward a destination
pub trait RoutePlanner {
    /// Plan toward `destination`. Called at the start of every trial.
    fn route_to(&mut self, destination: Location);

    /// The single next move from `pose`, or [`Action::Stay`] once arrived
    fn next_waypoint(&self, pose: Pose) -> Action;
}
