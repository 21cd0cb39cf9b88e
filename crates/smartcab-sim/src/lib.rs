//! smartcab Sim - The world the learning agent drives in
//!
//! This crate provides a wrapping grid of signalled intersections with
//! random background traffic, a route planner, and the trial loop that
//! drives a [`smartcab_rl::LearningAgent`] through it.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::float_cmp)]
#![allow(clippy::module_name_repetitions)]

pub mod planner;
pub mod simulator;
pub mod world;

pub use planner::{waypoint_toward, GridRoutePlanner};
pub use simulator::{RunSummary, SimulationConfig, Simulator, TrialReport};
pub use world::{TrafficLight, World, WorldConfig};
