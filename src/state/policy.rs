//! Behavior choices that differ between timer deployments

use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::utils::format_time;

/// What the elapsed time reads while a timer is paused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PauseDisplayPolicy {
    /// Elapsed time stops at the pause instant until the timer is resumed
    #[default]
    Freeze,
    /// Elapsed time keeps counting from the run start while paused.
    ///
    /// Resuming still drops the pause from the run, but a commit made while
    /// paused includes the time spent paused.
    ContinueFromStart,
}

/// How elapsed time is rounded before it is committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CommitRoundingPolicy {
    /// Round up to the next whole minute and drop the seconds ("3m")
    #[default]
    RoundUpToMinute,
    /// Commit the elapsed time as displayed ("2m 5s")
    Exact,
}

impl CommitRoundingPolicy {
    /// Seconds to commit for the given elapsed time
    pub fn round(self, elapsed_seconds: u64) -> u64 {
        match self {
            Self::RoundUpToMinute => elapsed_seconds.div_ceil(60) * 60,
            Self::Exact => elapsed_seconds,
        }
    }

    /// Text handed to the commit recipient for the given elapsed time
    pub fn render(self, elapsed_seconds: u64) -> String {
        match self {
            Self::RoundUpToMinute => format_time(self.round(elapsed_seconds), false),
            Self::Exact => format_time(elapsed_seconds, true),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub pause_display: PauseDisplayPolicy,
    pub commit_rounding: CommitRoundingPolicy,
    /// Cadence of the display refresh while running
    pub tick_interval: Duration,
}

impl TimerConfig {
    pub fn new(pause_display: PauseDisplayPolicy, commit_rounding: CommitRoundingPolicy) -> Self {
        Self {
            pause_display,
            commit_rounding,
            ..Self::default()
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            pause_display: PauseDisplayPolicy::default(),
            commit_rounding: CommitRoundingPolicy::default(),
            tick_interval: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_up_to_minute() {
        let policy = CommitRoundingPolicy::RoundUpToMinute;
        assert_eq!(policy.round(0), 0);
        assert_eq!(policy.round(1), 60);
        assert_eq!(policy.round(120), 120);
        assert_eq!(policy.round(125), 180);
        assert_eq!(policy.render(125), "3m");
        assert_eq!(policy.render(3599), "1h 0m");
    }

    #[test]
    fn test_exact_commit() {
        let policy = CommitRoundingPolicy::Exact;
        assert_eq!(policy.round(125), 125);
        assert_eq!(policy.render(125), "2m 5s");
    }

    #[test]
    fn test_defaults() {
        let config = TimerConfig::default();
        assert_eq!(config.pause_display, PauseDisplayPolicy::Freeze);
        assert_eq!(config.commit_rounding, CommitRoundingPolicy::RoundUpToMinute);
        assert_eq!(config.tick_interval, Duration::from_secs(1));
    }
}
