//! CLI command implementations

pub mod config_management;
mod race;

pub use race::*;
