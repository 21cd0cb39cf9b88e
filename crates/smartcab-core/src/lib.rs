//! smartcab Core - Shared vocabulary for the smartcab workspace
//!
//! This crate provides the grid types, the percept reported by the world,
//! and the traits the learning agent uses to talk to its environment.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Result, SmartcabError};
pub use traits::{Environment, Reward, RoutePlanner};
pub use types::*;
