//! onceholder - thread-safe lazy singleton holder
//!
//! A holder constructs exactly one value on first request and hands the same
//! `Arc` to every later caller. Reads after construction take no lock; the
//! first construction goes through a double-checked critical section.
//!
//! # Features
//! - **cli**: the `onceholder` demo binary (default)
//!
//! # Architecture
//! - `holder`: generic `LazyHolder<T>`, slow-path statistics and events
//! - `instance`: `SingletonInstance` and its `InstanceHolder`
//! - `global`: the process-wide `InstanceHolder`
//! - `race`: concurrent first-access race used by the CLI
//! - `config`: static configuration (TOML + environment)
//! - `system`: logging initialization

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod global;
pub mod holder;
pub mod instance;
pub mod race;
pub mod system;

pub use holder::{HolderEvent, LazyHolder, StatsSnapshot};
pub use instance::{InstanceHolder, PayloadPolicy, SingletonInstance};
