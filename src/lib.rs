//! Page Timer - A persisted stopwatch for tracking time spent on a page
//!
//! This library provides a start/pause/reset/commit timer per context key
//! whose state survives restarts by being written through to a local store.

pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{EngineDeps, TimerEngine};
pub use error::StoreError;
pub use services::{Clock, Commit, PersistenceStore, Scheduler};
pub use state::{CommitRoundingPolicy, PauseDisplayPolicy, TimerConfig, TimerPhase, TimerSnapshot, TimerStore};
pub use utils::format_time;
