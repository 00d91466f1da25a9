//! Command handlers

use std::io::Write;

use anyhow::Context;
use serde::Serialize;
use tracing::debug;

use crate::{
    config::{Command, Config},
    engine::TimerEngine,
    services::PersistenceStore,
};
use super::responses::{CommitResponse, ListEntry, StatusResponse};

/// Apply a one-shot command to the engine and report the result
pub fn handle_command(
    config: &Config,
    engine: &mut TimerEngine,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    debug!("Handling {:?} for {}", config.command, engine.context_key());

    match config.command {
        Command::Status => {}
        Command::Start => engine.start(),
        Command::Pause => engine.pause(),
        Command::Toggle => engine.toggle(),
        Command::Reset => {
            engine.stop(false);
        }
        Command::Commit => return commit_handler(config, engine, out),
        Command::Show => engine.show(),
        Command::Hide => engine.hide(),
        Command::ToggleVisibility => engine.toggle_visibility(),
        Command::List | Command::Watch => {
            anyhow::bail!("{:?} is not a timer action", config.command)
        }
    }

    status_handler(config, engine, out)
}

/// Report the timer state
pub fn status_handler(
    config: &Config,
    engine: &TimerEngine,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let status = StatusResponse::from_engine(engine);
    if config.json {
        write_json(out, &status)
    } else {
        writeln!(out, "{}", status.line()).context("Failed to write status")
    }
}

/// Commit the elapsed time and reset.
///
/// The commit callback prints the quick action in text mode; JSON mode
/// reports the commit inside the response instead.
pub fn commit_handler(
    config: &Config,
    engine: &mut TimerEngine,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let committed = engine.stop(true);

    if config.json {
        let response = CommitResponse {
            committed,
            status: StatusResponse::from_engine(engine),
        };
        write_json(out, &response)
    } else {
        if committed.is_none() {
            writeln!(out, "Nothing to commit").context("Failed to write commit")?;
        }
        status_handler(config, engine, out)
    }
}

/// List every timer in the store
pub fn list_handler(
    config: &Config,
    store: &dyn PersistenceStore,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let timers = store.load();
    let mut entries: Vec<ListEntry> = timers
        .iter()
        .map(|(key, snapshot)| ListEntry::new(key, snapshot))
        .collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    if config.json {
        return write_json(out, &entries);
    }

    if entries.is_empty() {
        writeln!(out, "No timers stored").context("Failed to write list")?;
    }
    for entry in &entries {
        writeln!(out, "{}", entry.line()).context("Failed to write list")?;
    }
    Ok(())
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("Failed to serialize response")?;
    writeln!(out).context("Failed to write response")
}
