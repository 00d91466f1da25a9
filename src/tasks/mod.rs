//! Background tasks module
//!
//! This module contains the watch loop that keeps a timer ticking on screen.

pub mod watch;

// Re-export main functions
pub use watch::{watch_task, WatchCommand};
