//! Wall-clock and periodic tick capabilities
//!
//! The engine never reads the system time or spawns timers itself. It is
//! handed a [`Clock`] and a [`Scheduler`] so the same state machine runs on
//! real time in the binary and on a virtual clock in tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Source of the current wall-clock instant
pub trait Clock: Send {
    fn now(&self) -> DateTime<Utc>;
}

/// Identifies one scheduled periodic tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickToken(u64);

impl TickToken {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Starts and cancels periodic ticks.
///
/// Tick delivery is up to the implementation; the driver hands delivered
/// tokens back to the engine.
pub trait Scheduler: Send {
    fn schedule(&mut self, every: Duration) -> TickToken;

    /// Cancel a tick. Unknown or already cancelled tokens are ignored.
    fn cancel(&mut self, token: TickToken);
}

/// The system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Scheduler backed by tokio interval tasks.
///
/// Each scheduled tick runs its own task that sends the tick token over the
/// channel returned by [`TokioScheduler::new`]. Must be used from within a
/// tokio runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    next_id: u64,
    tasks: HashMap<TickToken, JoinHandle<()>>,
    tick_tx: mpsc::UnboundedSender<TickToken>,
}

impl TokioScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TickToken>) {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            next_id: 0,
            tasks: HashMap::new(),
            tick_tx,
        };
        (scheduler, tick_rx)
    }

    /// Number of tick tasks currently alive
    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, every: Duration) -> TickToken {
        self.next_id += 1;
        let token = TickToken(self.next_id);
        let tick_tx = self.tick_tx.clone();

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + every, every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if tick_tx.send(token).is_err() {
                    // Receiver gone, nobody is listening for ticks anymore
                    break;
                }
            }
        });

        debug!("Scheduled tick {} every {:?}", token.id(), every);
        self.tasks.insert(token, handle);
        token
    }

    fn cancel(&mut self, token: TickToken) {
        if let Some(handle) = self.tasks.remove(&token) {
            handle.abort();
            debug!("Cancelled tick {}", token.id());
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}

/// Virtual clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the engine.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.now);
        if let Some(later) = TimeDelta::from_std(by)
            .ok()
            .and_then(|by| now.checked_add_signed(by))
        {
            *now = later;
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *lock(&self.now) = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

#[derive(Debug, Default)]
struct ManualTicks {
    next_id: u64,
    active: HashSet<TickToken>,
    scheduled: usize,
    cancelled: usize,
}

/// Scheduler that records ticks without ever firing them.
///
/// Tests deliver ticks by hand and inspect how many are active. Clones
/// share the same bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    ticks: Arc<Mutex<ManualTicks>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens scheduled and not yet cancelled
    pub fn active(&self) -> Vec<TickToken> {
        lock(&self.ticks).active.iter().copied().collect()
    }

    pub fn scheduled_count(&self) -> usize {
        lock(&self.ticks).scheduled
    }

    pub fn cancelled_count(&self) -> usize {
        lock(&self.ticks).cancelled
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, _every: Duration) -> TickToken {
        let mut ticks = lock(&self.ticks);
        ticks.next_id += 1;
        ticks.scheduled += 1;
        let token = TickToken(ticks.next_id);
        ticks.active.insert(token);
        token
    }

    fn cancel(&mut self, token: TickToken) {
        let mut ticks = lock(&self.ticks);
        if ticks.active.remove(&token) {
            ticks.cancelled += 1;
        }
    }
}

/// Lock ignoring poisoning; the guarded values stay valid across panics.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
