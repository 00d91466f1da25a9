//! Command line front end
//!
//! Builds a timer engine for the requested context key and dispatches the
//! parsed command to its handler.

pub mod handlers;
pub mod responses;

use anyhow::Context;

use crate::{
    config::{Command, Config},
    engine::{EngineDeps, TimerEngine},
    services::{stdout_commit, JsonFileStore, SystemClock, TokioScheduler},
    tasks::watch_task,
};
use handlers::*;

/// Run the parsed command against the configured store
pub async fn run(config: Config) -> anyhow::Result<()> {
    let store = JsonFileStore::new(config.store_path());

    if config.command == Command::List {
        return list_handler(&config, &store, &mut std::io::stdout().lock());
    }

    let key = config
        .key
        .clone()
        .context("--key is required for this command")?;

    let (scheduler, ticks) = TokioScheduler::new();
    let mut deps = EngineDeps::new(store, SystemClock, scheduler);
    // JSON output reports commits in the response; watch always prints them
    if !config.json || config.command == Command::Watch {
        deps = deps.with_commit(stdout_commit(config.commit_prefix.clone()));
    }
    let mut engine = TimerEngine::load(key, deps, config.timer_config());

    match config.command {
        Command::Watch => watch_task(engine, ticks).await,
        _ => handle_command(&config, &mut engine, &mut std::io::stdout().lock()),
    }
}
