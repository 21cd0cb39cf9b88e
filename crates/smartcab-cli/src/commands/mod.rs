//! CLI command modules

pub mod config;
pub mod run;
pub mod table;
