//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    services::default_store_path,
    state::{CommitRoundingPolicy, PauseDisplayPolicy, TimerConfig},
};

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "page-timer")]
#[command(about = "A persisted per-page stopwatch for tracking time spent on issues")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Context key of the timer, usually the page URL
    #[arg(short, long, global = true)]
    pub key: Option<String>,

    /// Path of the timer store file
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// What elapsed time reads while paused
    #[arg(long, value_enum, default_value_t = PauseDisplayPolicy::Freeze, global = true)]
    pub pause_display: PauseDisplayPolicy,

    /// How elapsed time is rounded when committed
    #[arg(long, value_enum, default_value_t = CommitRoundingPolicy::RoundUpToMinute, global = true)]
    pub commit_rounding: CommitRoundingPolicy,

    /// Text printed before committed time
    #[arg(long, default_value = "/spend", global = true)]
    pub commit_prefix: String,

    /// Print responses as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Timer actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show the timer state
    Status,
    /// Start or resume the timer
    Start,
    /// Pause the timer
    Pause,
    /// Pause when running, otherwise start
    Toggle,
    /// Reset the timer to zero
    Reset,
    /// Commit the elapsed time and reset the timer
    Commit,
    /// Expand the timer widget
    Show,
    /// Collapse the timer widget
    Hide,
    /// Expand or collapse the timer widget
    ToggleVisibility,
    /// List every stored timer
    List,
    /// Keep the timer on screen, ticking every second and reading commands from stdin
    Watch,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Store path, falling back to the user's data directory
    pub fn store_path(&self) -> PathBuf {
        self.store.clone().unwrap_or_else(default_store_path)
    }

    /// Engine configuration selected on the command line
    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig::new(self.pause_display, self.commit_rounding)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["page-timer", "--key", "page", "status"]).unwrap();
        assert_eq!(config.key.as_deref(), Some("page"));
        assert_eq!(config.command, Command::Status);
        assert_eq!(config.timer_config(), TimerConfig::default());
        assert_eq!(config.commit_prefix, "/spend");
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_policies_from_flags() {
        let config = Config::try_parse_from([
            "page-timer",
            "commit",
            "--key",
            "page",
            "--pause-display",
            "continue-from-start",
            "--commit-rounding",
            "exact",
            "-v",
        ])
        .unwrap();

        assert_eq!(config.command, Command::Commit);
        assert_eq!(config.pause_display, PauseDisplayPolicy::ContinueFromStart);
        assert_eq!(config.commit_rounding, CommitRoundingPolicy::Exact);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_store_override() {
        let config =
            Config::try_parse_from(["page-timer", "--store", "/tmp/t.json", "list"]).unwrap();
        assert_eq!(config.store_path(), PathBuf::from("/tmp/t.json"));
        assert_eq!(config.command, Command::List);
    }
}
