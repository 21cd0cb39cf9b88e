//! Grid world: intersections, traffic lights, and vehicles
//!
//! Vehicles share intersections on a wrapping grid. Each intersection has a
//! light that alternates between north/south green and east/west green. The
//! world judges every attempted move and pays out rewards; the primary vehicle
//! is the one the learner drives.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use smartcab_core::{
    Action, Environment, Heading, Light, Location, Percept, Pose, Result, Reward, SmartcabError,
};

use crate::planner::waypoint_toward;

/// Reward for a legal move that follows the planner
pub const REWARD_ON_ROUTE: Reward = 2.0;
/// Reward for a legal move that departs from the planner
pub const REWARD_OFF_ROUTE: Reward = -0.5;
/// Reward for staying put
pub const REWARD_IDLE: Reward = 0.0;
/// Reward for an illegal move
pub const REWARD_VIOLATION: Reward = -1.0;
/// Bonus for arriving before the deadline
pub const REWARD_ARRIVAL: Reward = 10.0;

/// World configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Intersections along the east/west axis
    pub width: i32,
    /// Intersections along the north/south axis
    pub height: i32,
    /// Number of randomly driving vehicles besides the primary one
    pub num_dummies: usize,
    /// Candidate light periods, one drawn per intersection
    pub light_periods: Vec<u32>,
    /// End the trial when the deadline runs out
    pub enforce_deadline: bool,
    /// Deadline = trip distance * multiplier
    pub deadline_multiplier: u32,
    /// Minimum Manhattan distance between start and destination
    pub min_trip_distance: u32,
    /// Trials end unconditionally once the deadline falls to this value
    pub hard_time_limit: i32,
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 8,
            height: 6,
            num_dummies: 3,
            light_periods: vec![3, 4, 5],
            enforce_deadline: true,
            deadline_multiplier: 5,
            min_trip_distance: 4,
            hard_time_limit: -100,
            seed: None,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width < 1 || self.height < 1 {
            return Err(SmartcabError::Config(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.light_periods.is_empty() || self.light_periods.contains(&0) {
            return Err(SmartcabError::Config(
                "light_periods must be non-empty and positive".to_string(),
            ));
        }
        let widest = (self.width - 1 + self.height - 1).unsigned_abs();
        if self.min_trip_distance > widest {
            return Err(SmartcabError::Config(format!(
                "min_trip_distance {} exceeds the largest distance on a {}x{} grid",
                self.min_trip_distance, self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Light at one intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficLight {
    /// true: north/south traffic has green
    pub north_south_green: bool,
    pub period: u32,
    last_updated: u64,
}

impl TrafficLight {
    pub fn new(north_south_green: bool, period: u32) -> Self {
        Self {
            north_south_green,
            period,
            last_updated: 0,
        }
    }

    pub fn update(&mut self, t: u64) {
        if t.saturating_sub(self.last_updated) >= u64::from(self.period) {
            self.north_south_green = !self.north_south_green;
            self.last_updated = t;
        }
    }

    pub fn reset(&mut self) {
        self.last_updated = 0;
    }

    /// Color seen by a vehicle travelling along `heading`
    pub fn color_for(&self, heading: Heading) -> Light {
        let along_open_axis = if self.north_south_green {
            heading.dy != 0
        } else {
            heading.dx != 0
        };
        if along_open_axis {
            Light::Green
        } else {
            Light::Red
        }
    }
}

/// A vehicle that wanders on random waypoints and obeys the rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DummyVehicle {
    pub pose: Pose,
    pub intent: Action,
}

/// The learner's vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryVehicle {
    pub pose: Pose,
    pub destination: Location,
    pub deadline: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VehicleId {
    Primary,
    Dummy(usize),
}

/// Outcome of a finished or running trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TripState {
    pub reached: bool,
    pub done: bool,
    pub t: u64,
    pub deadline: i32,
}

pub struct World {
    config: WorldConfig,
    rng: StdRng,
    lights: HashMap<Location, TrafficLight>,
    dummies: Vec<DummyVehicle>,
    primary: PrimaryVehicle,
    t: u64,
    done: bool,
    reached: bool,
}

impl World {
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut lights = HashMap::new();
        for x in 1..=config.width {
            for y in 1..=config.height {
                let period = *config.light_periods.choose(&mut rng).unwrap_or(&3);
                lights.insert(Location::new(x, y), TrafficLight::new(rng.gen(), period));
            }
        }

        let origin = Pose {
            location: Location::new(1, 1),
            heading: Heading::EAST,
        };

        Ok(Self {
            config,
            rng,
            lights,
            dummies: Vec::new(),
            primary: PrimaryVehicle {
                pose: origin,
                destination: origin.location,
                deadline: 0,
            },
            t: 0,
            done: false,
            reached: false,
        })
    }

    /// Start a new trial: place the primary vehicle and the dummies, reset the
    /// clock and lights. Returns the new destination.
    pub fn reset(&mut self) -> Location {
        self.t = 0;
        self.done = false;
        self.reached = false;
        for light in self.lights.values_mut() {
            light.reset();
        }

        let (start, destination) = loop {
            let start = self.random_location();
            let destination = self.random_location();
            if start.manhattan(destination) >= self.config.min_trip_distance {
                break (start, destination);
            }
        };
        let heading = self.random_heading();
        let distance = start.manhattan(destination);
        let deadline =
            i32::try_from(distance * self.config.deadline_multiplier).unwrap_or(i32::MAX);

        self.primary = PrimaryVehicle {
            pose: Pose {
                location: start,
                heading,
            },
            destination,
            deadline,
        };

        self.dummies.clear();
        for _ in 0..self.config.num_dummies {
            let pose = Pose {
                location: self.random_location(),
                heading: self.random_heading(),
            };
            let intent = self.random_intent();
            self.dummies.push(DummyVehicle { pose, intent });
        }

        debug!(
            "World reset: start {} heading {}, destination {}, deadline {}",
            start, heading, destination, deadline
        );
        destination
    }

    /// Advance every light by one tick
    pub fn update_lights(&mut self) {
        let t = self.t;
        for light in self.lights.values_mut() {
            light.update(t);
        }
    }

    /// Let every dummy vehicle take its move
    pub fn update_dummies(&mut self) {
        for i in 0..self.dummies.len() {
            let percept = self.sense_for(VehicleId::Dummy(i));
            let intent = self.dummies[i].intent;

            let allowed = match intent {
                Action::Right => !(percept.light == Light::Red && percept.left == Action::Forward),
                Action::Forward => percept.light.is_green(),
                Action::Left => {
                    percept.light.is_green()
                        && !matches!(percept.oncoming, Action::Forward | Action::Right)
                }
                Action::Stay => true,
            };

            let action = if allowed {
                let next = self.random_intent();
                self.dummies[i].intent = next;
                intent
            } else {
                Action::Stay
            };
            self.act_for(VehicleId::Dummy(i), action, percept);
        }
    }

    /// Close out a timestep: advance the clock and enforce the deadline
    pub fn end_step(&mut self) {
        self.t += 1;
        let deadline = self.primary.deadline;
        if deadline <= self.config.hard_time_limit
            || (self.config.enforce_deadline && deadline <= 0)
        {
            self.done = true;
        }
        self.primary.deadline = deadline - 1;
    }

    pub fn t(&self) -> u64 {
        self.t
    }

    pub fn trip(&self) -> TripState {
        TripState {
            reached: self.reached,
            done: self.done,
            t: self.t,
            deadline: self.primary.deadline,
        }
    }

    pub fn primary(&self) -> &PrimaryVehicle {
        &self.primary
    }

    pub fn dummies(&self) -> &[DummyVehicle] {
        &self.dummies
    }

    /// Place the primary vehicle directly, bypassing the random draw
    pub fn place_primary(&mut self, pose: Pose, destination: Location, deadline: i32) {
        self.primary = PrimaryVehicle {
            pose,
            destination,
            deadline,
        };
        self.done = false;
        self.reached = false;
    }

    pub fn place_dummy(&mut self, pose: Pose, intent: Action) {
        self.dummies.push(DummyVehicle { pose, intent });
    }

    pub fn set_light(&mut self, location: Location, north_south_green: bool) {
        if let Some(light) = self.lights.get_mut(&location) {
            light.north_south_green = north_south_green;
        }
    }

    fn pose_of(&self, id: VehicleId) -> Pose {
        match id {
            VehicleId::Primary => self.primary.pose,
            VehicleId::Dummy(i) => self.dummies[i].pose,
        }
    }

    fn intent_of(&self, id: VehicleId) -> Action {
        match id {
            VehicleId::Primary => waypoint_toward(self.primary.pose, self.primary.destination),
            VehicleId::Dummy(i) => self.dummies[i].intent,
        }
    }

    fn vehicles(&self) -> impl Iterator<Item = VehicleId> {
        std::iter::once(VehicleId::Primary).chain((0..self.dummies.len()).map(VehicleId::Dummy))
    }

    fn sense_for(&self, id: VehicleId) -> Percept {
        let Pose { location, heading } = self.pose_of(id);
        let light = self
            .lights
            .get(&location)
            .map_or(Light::Red, |l| l.color_for(heading));

        let mut percept = Percept {
            light,
            ..Percept::default()
        };

        for other in self.vehicles().filter(|other| *other != id) {
            let other_pose = self.pose_of(other);
            if other_pose.location != location || other_pose.heading == heading {
                continue;
            }
            let intent = self.intent_of(other);

            if heading.is_opposite(other_pose.heading) {
                if percept.oncoming != Action::Left {
                    percept.oncoming = intent;
                }
            } else if heading.sees_from_right(other_pose.heading) {
                if percept.right != Action::Forward && percept.right != Action::Left {
                    percept.right = intent;
                }
            } else if percept.left != Action::Forward {
                percept.left = intent;
            }
        }

        percept
    }

    fn act_for(&mut self, id: VehicleId, action: Action, percept: Percept) -> Reward {
        let pose = self.pose_of(id);
        let planned = self.intent_of(id);

        let heading = match action {
            Action::Forward if percept.light.is_green() => Some(pose.heading),
            Action::Left
                if percept.light.is_green()
                    && matches!(percept.oncoming, Action::Stay | Action::Left) =>
            {
                Some(pose.heading.left())
            }
            Action::Right if percept.light.is_green() || percept.left != Action::Forward => {
                Some(pose.heading.right())
            }
            Action::Stay => Some(pose.heading),
            _ => None,
        };

        let mut reward = match heading {
            None => REWARD_VIOLATION,
            Some(_) if action == Action::Stay => REWARD_IDLE,
            Some(heading) => {
                let moved = Pose {
                    location: self.wrap(Location::new(
                        pose.location.x + heading.dx,
                        pose.location.y + heading.dy,
                    )),
                    heading,
                };
                self.set_pose(id, moved);
                if action == planned {
                    REWARD_ON_ROUTE
                } else {
                    REWARD_OFF_ROUTE
                }
            }
        };

        if id == VehicleId::Primary && self.primary.pose.location == self.primary.destination {
            if self.primary.deadline >= 0 {
                reward += REWARD_ARRIVAL;
            }
            self.reached = true;
            self.done = true;
        }

        reward
    }

    fn set_pose(&mut self, id: VehicleId, pose: Pose) {
        match id {
            VehicleId::Primary => self.primary.pose = pose,
            VehicleId::Dummy(i) => self.dummies[i].pose = pose,
        }
    }

    fn wrap(&self, location: Location) -> Location {
        Location::new(
            (location.x - 1).rem_euclid(self.config.width) + 1,
            (location.y - 1).rem_euclid(self.config.height) + 1,
        )
    }

    fn random_location(&mut self) -> Location {
        Location::new(
            self.rng.gen_range(1..=self.config.width),
            self.rng.gen_range(1..=self.config.height),
        )
    }

    fn random_heading(&mut self) -> Heading {
        *Heading::ALL.choose(&mut self.rng).unwrap_or(&Heading::EAST)
    }

    fn random_intent(&mut self) -> Action {
        *[Action::Forward, Action::Left, Action::Right]
            .choose(&mut self.rng)
            .unwrap_or(&Action::Forward)
    }
}

impl Environment for World {
    fn sense(&self) -> Percept {
        self.sense_for(VehicleId::Primary)
    }

    fn pose(&self) -> Pose {
        self.primary.pose
    }

    fn deadline(&self) -> i32 {
        self.primary.deadline
    }

    fn act(&mut self, action: Action) -> Reward {
        let percept = self.sense_for(VehicleId::Primary);
        self.act_for(VehicleId::Primary, action, percept)
    }

    fn is_done(&self) -> bool {
        self.done
    }
}
