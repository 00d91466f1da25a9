//! Handing committed time to its recipient

use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Elapsed time finalized by a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Elapsed time at the moment of the commit
    pub elapsed_seconds: u64,
    /// Elapsed time after the rounding policy was applied
    pub committed_seconds: u64,
    /// Rendered committed time, e.g. "3m" or "2m 5s"
    pub text: String,
}

/// Recipient of committed time. Its success or failure is its own concern.
pub type CommitCallback = Box<dyn FnMut(&Commit) + Send>;

/// Commit callback that prints `"{prefix} {text}"` on stdout, e.g. `/spend 3m`
pub fn stdout_commit(prefix: String) -> CommitCallback {
    Box::new(move |commit: &Commit| {
        let line = quick_action(&prefix, commit);
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line) {
            warn!("Failed to write commit: {}", e);
        }
    })
}

/// Render a commit as a quick action line
pub fn quick_action(prefix: &str, commit: &Commit) -> String {
    if prefix.is_empty() {
        commit.text.clone()
    } else {
        format!("{} {}", prefix, commit.text)
    }
}
