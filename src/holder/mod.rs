//! Lazy single-instance holders
//!
//! - `lazy`: the generic double-checked `LazyHolder<T>`
//! - `stats`: slow-path counters
//! - `events`: slow-path events and the observer hook

pub mod events;
pub mod lazy;
pub mod stats;

pub use events::{HolderEvent, HolderObserver};
pub use lazy::LazyHolder;
pub use stats::{HolderStats, StatsSnapshot};
