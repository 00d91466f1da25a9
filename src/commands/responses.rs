//! Command response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    engine::TimerEngine,
    services::Commit,
    state::{TimerPhase, TimerSnapshot},
};

/// State of one timer as reported to the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub key: String,
    pub state: TimerPhase,
    pub shown: bool,
    pub elapsed_seconds: u64,
    pub display_text: String,
    pub started_at: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

impl StatusResponse {
    pub fn from_engine(engine: &TimerEngine) -> Self {
        let snapshot = engine.snapshot();
        Self {
            key: engine.context_key().to_string(),
            state: engine.phase(),
            shown: engine.is_shown(),
            elapsed_seconds: engine.elapsed_seconds(),
            display_text: engine.current_display_text().to_string(),
            started_at: snapshot.started_at,
            paused_at: snapshot.paused_at,
            timestamp: engine.now(),
        }
    }

    /// One line summary, e.g. `running  1m 5s  https://...`
    pub fn line(&self) -> String {
        let visibility = if self.shown { "" } else { " (hidden)" };
        format!("{:<8} {:<12} {}{}", self.state, self.display_text, self.key, visibility)
    }
}

/// Result of a commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitResponse {
    pub committed: Option<Commit>,
    pub status: StatusResponse,
}

/// Stored timer as listed from the store, without recomputation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEntry {
    pub key: String,
    pub state: TimerPhase,
    pub shown: bool,
    pub display_text: String,
}

impl ListEntry {
    pub fn new(key: &str, snapshot: &TimerSnapshot) -> Self {
        Self {
            key: key.to_string(),
            state: snapshot.phase(),
            shown: snapshot.shown,
            display_text: snapshot.display_text.clone(),
        }
    }

    pub fn line(&self) -> String {
        let visibility = if self.shown { "" } else { " (hidden)" };
        format!("{:<8} {:<12} {}{}", self.state, self.display_text, self.key, visibility)
    }
}
