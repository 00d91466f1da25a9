//! Persisted timer snapshots and the keyed store that holds them
//!
//! The store serializes as one JSON object keyed by context key:
//!
//! ```json
//! {
//!   "https://example.com/group/project/-/issues/42": {
//!     "shown": true,
//!     "running": false,
//!     "startedAt": 1700000000000,
//!     "pausedAt": 1700000030000,
//!     "outputText": "0m 30s"
//!   }
//! }
//! ```
//!
//! Instants are epoch milliseconds and are omitted when unset.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::utils::ZERO_DISPLAY;

use super::TimerPhase;

/// Serializable state of one timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    #[serde(default)]
    pub shown: bool,
    #[serde(default)]
    pub running: bool,
    /// Start of the current run segment, shifted forward by every pause
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub paused_at: Option<DateTime<Utc>>,
    /// Last rendered elapsed time, shown before the first recomputation
    #[serde(default = "zero_display", rename = "outputText")]
    pub display_text: String,
}

fn zero_display() -> String {
    ZERO_DISPLAY.to_string()
}

impl TimerSnapshot {
    pub fn new() -> Self {
        Self {
            shown: false,
            running: false,
            started_at: None,
            paused_at: None,
            display_text: zero_display(),
        }
    }

    pub fn phase(&self) -> TimerPhase {
        match (self.started_at, self.running) {
            (None, _) => TimerPhase::Stopped,
            (Some(_), true) => TimerPhase::Running,
            (Some(_), false) => TimerPhase::Paused,
        }
    }

    /// Clear all timing state, keeping visibility
    pub fn zero(&mut self) {
        self.running = false;
        self.started_at = None;
        self.paused_at = None;
        self.display_text = zero_display();
    }

    /// Repair a snapshot read from storage so it satisfies the phase rules.
    ///
    /// A snapshot without a start instant is stopped. Instants in the future,
    /// or a pause before the start, make the timing unusable and the snapshot
    /// is zeroed. A paused snapshot that lost its pause instant is treated as
    /// paused at `now`.
    pub fn normalize(&mut self, now: DateTime<Utc>) {
        if let Some(started_at) = self.started_at {
            let paused_ok = self
                .paused_at
                .map_or(true, |paused_at| paused_at >= started_at && paused_at <= now);
            if started_at > now || !paused_ok {
                warn!(
                    "Snapshot instants out of range (started {:?}, paused {:?}), resetting timer",
                    self.started_at, self.paused_at
                );
                self.zero();
                return;
            }
        }

        if self.started_at.is_none() {
            if self.running || self.paused_at.is_some() {
                debug!("Snapshot has no start instant, treating as stopped");
            }
            self.running = false;
            self.paused_at = None;
        } else if !self.running && self.paused_at.is_none() {
            debug!("Paused snapshot has no pause instant, pausing at load time");
            self.paused_at = Some(now);
        }

        if self.display_text.is_empty() {
            self.display_text = zero_display();
        }
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Context key to snapshot mapping, the only durable timer state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerStore {
    timers: HashMap<String, TimerSnapshot>,
}

impl TimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse serialized store contents.
    ///
    /// Anything that is not a JSON object yields an empty store. Entries
    /// that fail to parse are dropped individually.
    pub fn decode(raw: &str) -> Self {
        if raw.trim().is_empty() {
            debug!("Empty timer store, starting fresh");
            return Self::new();
        }

        let entries = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(entries)) => entries,
            Ok(other) => {
                warn!("Timer store is not an object ({}), starting fresh", json_kind(&other));
                return Self::new();
            }
            Err(e) => {
                warn!("Failed to parse timer store ({}), starting fresh", e);
                return Self::new();
            }
        };

        let mut timers = HashMap::with_capacity(entries.len());
        for (key, value) in entries {
            match serde_json::from_value::<TimerSnapshot>(value) {
                Ok(snapshot) => {
                    timers.insert(key, snapshot);
                }
                Err(e) => warn!("Dropping malformed timer snapshot for {}: {}", key, e),
            }
        }

        Self { timers }
    }

    pub fn encode(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, key: &str) -> Option<&TimerSnapshot> {
        self.timers.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, snapshot: TimerSnapshot) {
        self.timers.insert(key.into(), snapshot);
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TimerSnapshot)> {
        self.timers.iter()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_decode_browser_layout() {
        let raw = r#"{
            "page": {
                "shown": true,
                "running": false,
                "startedAt": 1700000000000,
                "pausedAt": 1700000030000,
                "outputText": "0m 30s"
            }
        }"#;

        let store = TimerStore::decode(raw);
        let snapshot = store.get("page").unwrap();
        assert!(snapshot.shown);
        assert!(!snapshot.running);
        assert_eq!(snapshot.started_at, Some(at(1_700_000_000_000)));
        assert_eq!(snapshot.paused_at, Some(at(1_700_000_030_000)));
        assert_eq!(snapshot.display_text, "0m 30s");
        assert_eq!(snapshot.phase(), TimerPhase::Paused);
    }

    #[test]
    fn test_unset_instants_are_omitted() {
        let mut store = TimerStore::new();
        store.insert("page", TimerSnapshot::new());

        let encoded = store.encode().unwrap();
        assert!(!encoded.contains("startedAt"));
        assert!(!encoded.contains("pausedAt"));
        assert!(encoded.contains("\"outputText\": \"0m 0s\""));
    }

    #[test]
    fn test_corrupt_data_yields_empty_store() {
        for raw in ["", "   ", "not json", "[1, 2]", "42", "null", "\"text\""] {
            assert!(TimerStore::decode(raw).is_empty(), "input {:?}", raw);
        }
    }

    #[test]
    fn test_malformed_entries_are_dropped() {
        let raw = r#"{
            "good": { "shown": true, "running": false, "outputText": "0m 0s" },
            "bad": { "running": "yes" },
            "worse": 7
        }"#;

        let store = TimerStore::decode(raw);
        assert_eq!(store.len(), 1);
        assert!(store.get("good").unwrap().shown);
    }

    #[test]
    fn test_missing_fields_default() {
        let store = TimerStore::decode(r#"{ "page": {} }"#);
        assert_eq!(store.get("page"), Some(&TimerSnapshot::new()));
    }

    #[test]
    fn test_null_instants_are_unset() {
        let store = TimerStore::decode(r#"{ "page": { "startedAt": null, "pausedAt": null } }"#);
        let snapshot = store.get("page").unwrap();
        assert_eq!(snapshot.started_at, None);
        assert_eq!(snapshot.phase(), TimerPhase::Stopped);
    }

    #[test]
    fn test_normalize_without_start_is_stopped() {
        let mut snapshot = TimerSnapshot {
            running: true,
            paused_at: Some(at(5_000)),
            display_text: String::new(),
            ..TimerSnapshot::new()
        };

        snapshot.normalize(at(10_000));
        assert_eq!(snapshot.phase(), TimerPhase::Stopped);
        assert!(!snapshot.running);
        assert_eq!(snapshot.paused_at, None);
        assert_eq!(snapshot.display_text, ZERO_DISPLAY);
    }

    #[test]
    fn test_normalize_paused_without_pause_instant() {
        let mut snapshot = TimerSnapshot {
            started_at: Some(at(1_000)),
            ..TimerSnapshot::new()
        };

        snapshot.normalize(at(10_000));
        assert_eq!(snapshot.phase(), TimerPhase::Paused);
        assert_eq!(snapshot.paused_at, Some(at(10_000)));
    }

    #[test]
    fn test_normalize_zeroes_out_of_range_instants() {
        let now = at(10_000);
        let cases = [
            (Some(at(20_000)), None, true),
            (Some(at(5_000)), Some(at(4_000)), false),
            (Some(at(5_000)), Some(at(15_000)), false),
            (Some(at(-8_200_000_000_000_000)), Some(at(8_200_000_000_000_000)), true),
        ];

        for (started_at, paused_at, running) in cases {
            let mut snapshot = TimerSnapshot {
                shown: true,
                running,
                started_at,
                paused_at,
                display_text: "9m 9s".to_string(),
            };

            snapshot.normalize(now);
            assert_eq!(snapshot.phase(), TimerPhase::Stopped, "{:?} {:?}", started_at, paused_at);
            assert!(!snapshot.running);
            assert_eq!(snapshot.paused_at, None);
            assert_eq!(snapshot.display_text, ZERO_DISPLAY);
            assert!(snapshot.shown);
        }
    }

    #[test]
    fn test_zero_keeps_visibility() {
        let mut snapshot = TimerSnapshot {
            shown: true,
            running: true,
            started_at: Some(at(1_000)),
            display_text: "1m 0s".to_string(),
            ..TimerSnapshot::new()
        };

        snapshot.zero();
        assert!(snapshot.shown);
        assert_eq!(snapshot.phase(), TimerPhase::Stopped);
        assert_eq!(snapshot.display_text, ZERO_DISPLAY);
    }
}
