//! smartcab RL - Tabular learning for the smartcab driving agent
//!
//! This crate provides the state encoder, value table, exploration policy,
//! and update rule, tied together by [`LearningAgent`].

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod export;
pub mod learning;
pub mod policy;
pub mod schedule;
pub mod state;
pub mod table;

pub use agent::{AgentConfig, AgentStats, LearningAgent, StepOutcome};
pub use export::{ExportConfig, ExportFormat, TableSink};
pub use learning::{LearningUpdate, Transition};
pub use policy::{Choice, EpsilonGreedy};
pub use schedule::ExplorationSchedule;
pub use state::StateKey;
pub use table::{ActionValues, Knowledge, TableSnapshot, ValueTable};
