//! Timer phase and the view published to subscribers

use serde::{Deserialize, Serialize};

use crate::utils::ZERO_DISPLAY;

/// Phase of a timer, derived from its snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Stopped,
    Running,
    Paused,
}

impl TimerPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Paused => "paused",
        }
    }
}

impl std::fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// What a view needs to render the timer widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerView {
    pub phase: TimerPhase,
    pub shown: bool,
    pub display_text: String,
    pub elapsed_seconds: u64,
}

impl TimerView {
    /// View of a stopped, hidden timer
    pub fn new() -> Self {
        Self {
            phase: TimerPhase::Stopped,
            shown: false,
            display_text: ZERO_DISPLAY.to_string(),
            elapsed_seconds: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }
}

impl Default for TimerView {
    fn default() -> Self {
        Self::new()
    }
}
