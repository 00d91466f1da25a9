//! Utility functions module
//!
//! This module contains time formatting and signal handling helpers.

pub mod signals;
pub mod time_format;

// Re-export main functions
pub use signals::shutdown_signal;
pub use time_format::{format_time, ZERO_DISPLAY};
