//! Command handlers against an in-memory store

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::Value;

use page_timer::{
    commands::handlers::{handle_command, list_handler},
    config::Config,
    services::{ManualClock, ManualScheduler, MemoryStore},
    EngineDeps, TimerEngine,
};

const KEY: &str = "issue-42";

fn config(args: &[&str]) -> Config {
    let mut argv = vec!["page-timer", "--key", KEY];
    argv.extend_from_slice(args);
    Config::try_parse_from(argv).unwrap()
}

fn engine(store: &MemoryStore, clock: &ManualClock, config: &Config) -> TimerEngine {
    let deps = EngineDeps::new(store.clone(), clock.clone(), ManualScheduler::new());
    TimerEngine::load(KEY, deps, config.timer_config())
}

fn run(store: &MemoryStore, clock: &ManualClock, args: &[&str]) -> String {
    let config = config(args);
    let mut engine = engine(store, clock, &config);
    let mut out = Vec::new();
    handle_command(&config, &mut engine, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn clock() -> ManualClock {
    ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
}

#[test]
fn start_pause_status_across_invocations() {
    let store = MemoryStore::new();
    let clock = clock();

    let out = run(&store, &clock, &["start"]);
    assert!(out.starts_with("running"), "{}", out);

    clock.advance(Duration::from_secs(65));
    let out = run(&store, &clock, &["pause"]);
    assert!(out.contains("1m 5s"), "{}", out);
    assert!(out.starts_with("paused"), "{}", out);

    clock.advance(Duration::from_secs(600));
    let out = run(&store, &clock, &["status"]);
    assert!(out.contains("1m 5s"), "{}", out);
}

#[test]
fn json_commit_reports_rounded_time() {
    let store = MemoryStore::new();
    let clock = clock();

    run(&store, &clock, &["start"]);
    clock.advance(Duration::from_secs(125));
    let out = run(&store, &clock, &["--json", "commit"]);

    let response: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(response["committed"]["text"], "3m");
    assert_eq!(response["committed"]["elapsed_seconds"], 125);
    assert_eq!(response["status"]["state"], "stopped");
    assert_eq!(response["status"]["display_text"], "0m 0s");
}

#[test]
fn json_commit_exact() {
    let store = MemoryStore::new();
    let clock = clock();

    run(&store, &clock, &["start"]);
    clock.advance(Duration::from_secs(125));
    let out = run(&store, &clock, &["--json", "--commit-rounding", "exact", "commit"]);

    let response: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(response["committed"]["text"], "2m 5s");
    assert_eq!(response["committed"]["committed_seconds"], 125);
}

#[test]
fn status_timestamp_follows_engine_clock() {
    let store = MemoryStore::new();
    let clock = clock();
    clock.advance(Duration::from_secs(42));

    let out = run(&store, &clock, &["--json", "status"]);
    let response: Value = serde_json::from_str(&out).unwrap();
    let timestamp: DateTime<Utc> = serde_json::from_value(response["timestamp"].clone()).unwrap();

    assert_eq!(timestamp, Utc.timestamp_opt(1_700_000_042, 0).unwrap());
}

#[test]
fn commit_with_nothing_on_the_timer() {
    let store = MemoryStore::new();
    let out = run(&store, &clock(), &["commit"]);
    assert!(out.starts_with("Nothing to commit"), "{}", out);
}

#[test]
fn visibility_commands() {
    let store = MemoryStore::new();
    let clock = clock();

    let out = run(&store, &clock, &["toggle-visibility"]);
    assert!(!out.contains("(hidden)"), "{}", out);

    let out = run(&store, &clock, &["hide"]);
    assert!(out.contains("(hidden)"), "{}", out);
}

#[test]
fn list_shows_every_timer() {
    let store = MemoryStore::with_raw(
        r#"{
            "b-page": { "shown": true, "running": false, "outputText": "0m 0s" },
            "a-page": { "shown": false, "running": true, "startedAt": 1700000000000, "outputText": "5m 0s" }
        }"#,
    );
    let config = Config::try_parse_from(["page-timer", "--json", "list"]).unwrap();

    let mut out = Vec::new();
    list_handler(&config, &store, &mut out).unwrap();

    let entries: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(entries[0]["key"], "a-page");
    assert_eq!(entries[0]["state"], "running");
    assert_eq!(entries[1]["key"], "b-page");
    assert_eq!(entries[1]["shown"], true);
}
