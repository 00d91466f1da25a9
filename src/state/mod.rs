//! Timer state module
//!
//! This module contains the persisted snapshot model, the derived phase and
//! view types, and the engine policies.

pub mod policy;
pub mod snapshot;
pub mod timer_state;

// Re-export main types
pub use policy::{CommitRoundingPolicy, PauseDisplayPolicy, TimerConfig};
pub use snapshot::{TimerSnapshot, TimerStore};
pub use timer_state::{TimerPhase, TimerView};
