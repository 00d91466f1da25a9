//! Timer state machine for one page context
//!
//! A [`TimerEngine`] owns the snapshot stored under its context key. Every
//! state change is written through to the [`PersistenceStore`] and published
//! to view subscribers. While running, the engine holds exactly one periodic
//! tick from its [`Scheduler`].

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{
    services::{Clock, Commit, CommitCallback, PersistenceStore, Scheduler, TickToken},
    state::{PauseDisplayPolicy, TimerConfig, TimerPhase, TimerSnapshot, TimerView},
    utils::{format_time, ZERO_DISPLAY},
};

/// Collaborators injected into a [`TimerEngine`]
pub struct EngineDeps {
    pub store: Box<dyn PersistenceStore>,
    pub clock: Box<dyn Clock>,
    pub scheduler: Box<dyn Scheduler>,
    pub commit: Option<CommitCallback>,
}

impl EngineDeps {
    pub fn new(
        store: impl PersistenceStore + 'static,
        clock: impl Clock + 'static,
        scheduler: impl Scheduler + 'static,
    ) -> Self {
        Self {
            store: Box::new(store),
            clock: Box::new(clock),
            scheduler: Box::new(scheduler),
            commit: None,
        }
    }

    pub fn with_commit(mut self, commit: CommitCallback) -> Self {
        self.commit = Some(commit);
        self
    }
}

/// Stopwatch for a single context key
pub struct TimerEngine {
    key: String,
    config: TimerConfig,
    store: Box<dyn PersistenceStore>,
    clock: Box<dyn Clock>,
    scheduler: Box<dyn Scheduler>,
    commit: Option<CommitCallback>,
    snapshot: TimerSnapshot,
    tick: Option<TickToken>,
    view_tx: watch::Sender<TimerView>,
}

impl TimerEngine {
    /// Restore the timer stored under `key`.
    ///
    /// Missing or malformed data yields a stopped, hidden timer. A timer
    /// that was running when saved resumes running, ticking included.
    pub fn load(key: impl Into<String>, deps: EngineDeps, config: TimerConfig) -> Self {
        let key = key.into();
        let EngineDeps {
            store,
            clock,
            scheduler,
            commit,
        } = deps;

        let mut snapshot = store.load().get(&key).cloned().unwrap_or_default();
        snapshot.normalize(clock.now());
        debug!("Loaded timer {} in phase {}", key, snapshot.phase());

        let (view_tx, _) = watch::channel(TimerView::new());
        let mut engine = Self {
            key,
            config,
            store,
            clock,
            scheduler,
            commit,
            snapshot,
            tick: None,
            view_tx,
        };

        if engine.snapshot.running {
            // Re-entering start keeps the saved start instant, so no time is lost
            engine.start();
        } else {
            engine.publish();
        }

        engine
    }

    /// Start or resume accumulating time
    pub fn start(&mut self) {
        let now = self.clock.now();
        let started_at = *self.snapshot.started_at.get_or_insert(now);

        if let Some(paused_at) = self.snapshot.paused_at.take() {
            let run_so_far = paused_at
                .signed_duration_since(started_at)
                .max(TimeDelta::zero());
            match now.checked_sub_signed(run_so_far) {
                Some(resumed_from) => {
                    self.snapshot.started_at = Some(resumed_from);
                    info!("Resumed timer {} after {}s", self.key, run_so_far.num_seconds());
                }
                None => {
                    warn!("Paused run of timer {} is out of range, restarting from zero", self.key);
                    self.snapshot.started_at = Some(now);
                }
            }
        } else if !self.snapshot.running {
            info!("Started timer {}", self.key);
        }

        self.snapshot.running = true;
        self.restart_tick();
        self.tick();
        self.persist();
    }

    /// Stop accumulating time, keeping what has been accumulated
    pub fn pause(&mut self) {
        if self.phase() != TimerPhase::Running {
            debug!("Ignoring pause of {} timer {}", self.phase(), self.key);
            return;
        }

        self.snapshot.running = false;
        self.snapshot.paused_at = Some(self.clock.now());
        self.cancel_tick();
        self.tick();
        info!("Paused timer {} at {}", self.key, self.snapshot.display_text);

        self.persist();
    }

    /// Reset the timer to zero.
    ///
    /// With `commit` set and time on the timer, the rounded elapsed time is
    /// handed to the commit callback before anything is cleared, and returned.
    pub fn stop(&mut self, commit: bool) -> Option<Commit> {
        let committed = if commit { self.commit_elapsed() } else { None };

        self.cancel_tick();
        self.snapshot.zero();
        self.publish();
        info!("Reset timer {}", self.key);

        self.persist();
        committed
    }

    fn commit_elapsed(&mut self) -> Option<Commit> {
        if self.phase() == TimerPhase::Stopped {
            debug!("Nothing to commit for stopped timer {}", self.key);
            return None;
        }

        let elapsed_seconds = self.elapsed_seconds();
        let policy = self.config.commit_rounding;
        let committed = Commit {
            elapsed_seconds,
            committed_seconds: policy.round(elapsed_seconds),
            text: policy.render(elapsed_seconds),
        };
        info!("Committing {} for timer {}", committed.text, self.key);

        if let Some(callback) = self.commit.as_mut() {
            callback(&committed);
        }
        Some(committed)
    }

    /// Start when paused or stopped, pause when running
    pub fn toggle(&mut self) {
        if self.is_running() {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Recompute the display text and notify subscribers
    pub fn tick(&mut self) {
        self.snapshot.display_text = match self.phase() {
            TimerPhase::Stopped => ZERO_DISPLAY.to_string(),
            _ => format_time(self.elapsed_seconds(), true),
        };
        self.publish();
    }

    /// Handle a tick delivered by the scheduler.
    ///
    /// Ticks from a cancelled schedule are ignored. Returns whether the
    /// tick was applied.
    pub fn handle_tick(&mut self, token: TickToken) -> bool {
        if self.tick != Some(token) {
            debug!("Ignoring stale tick {}", token.id());
            return false;
        }
        self.tick();
        true
    }

    pub fn show(&mut self) {
        self.set_shown(true);
    }

    pub fn hide(&mut self) {
        self.set_shown(false);
    }

    pub fn toggle_visibility(&mut self) {
        self.set_shown(!self.snapshot.shown);
    }

    fn set_shown(&mut self, shown: bool) {
        self.snapshot.shown = shown;
        debug!("Timer {} {}", self.key, if shown { "shown" } else { "hidden" });
        self.publish();
        self.persist();
    }

    /// Whole seconds accumulated across running intervals
    pub fn elapsed_seconds(&self) -> u64 {
        let Some(started_at) = self.snapshot.started_at else {
            return 0;
        };

        let until = match (self.snapshot.paused_at, self.config.pause_display) {
            (Some(paused_at), PauseDisplayPolicy::Freeze) if !self.snapshot.running => paused_at,
            _ => self.clock.now(),
        };
        whole_seconds_between(started_at, until)
    }

    pub fn phase(&self) -> TimerPhase {
        self.snapshot.phase()
    }

    pub fn is_running(&self) -> bool {
        self.snapshot.running
    }

    pub fn is_shown(&self) -> bool {
        self.snapshot.shown
    }

    pub fn current_display_text(&self) -> &str {
        &self.snapshot.display_text
    }

    /// Current instant on the engine's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn context_key(&self) -> &str {
        &self.key
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &TimerSnapshot {
        &self.snapshot
    }

    /// Token of the active periodic tick, if any
    pub fn active_tick(&self) -> Option<TickToken> {
        self.tick
    }

    /// Current view, updated on every state change and tick
    pub fn view(&self) -> TimerView {
        TimerView {
            phase: self.phase(),
            shown: self.snapshot.shown,
            display_text: self.snapshot.display_text.clone(),
            elapsed_seconds: self.elapsed_seconds(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerView> {
        self.view_tx.subscribe()
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.view());
    }

    fn restart_tick(&mut self) {
        self.cancel_tick();
        self.tick = Some(self.scheduler.schedule(self.config.tick_interval));
    }

    fn cancel_tick(&mut self) {
        if let Some(token) = self.tick.take() {
            self.scheduler.cancel(token);
        }
    }

    /// Write the snapshot through to storage, keeping other contexts intact
    fn persist(&self) {
        let mut timers = self.store.load();
        timers.insert(self.key.clone(), self.snapshot.clone());

        if let Err(e) = self.store.save(&timers) {
            error!("Failed to save timer {}: {}", self.key, e);
        }
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.cancel_tick();
    }
}

fn whole_seconds_between(from: DateTime<Utc>, until: DateTime<Utc>) -> u64 {
    let millis = until.signed_duration_since(from).num_milliseconds().max(0);
    (millis / 1000) as u64
}
