//! CLI commands

pub mod counter;
pub mod stats;
pub mod user;
