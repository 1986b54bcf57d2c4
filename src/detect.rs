//! Sliding-window pattern detectors
//!
//! Each check is evaluated inline, immediately after the mutation that could
//! have completed a pattern. They are heuristics over the engine's bounded
//! state, tuned to be cheap; false positives and negatives are accepted.

use chrono::{DateTime, Utc};

use crate::store::EventLog;
use crate::types::EventKind;

/// Window for net-zero content-hash matches
pub const NET_ZERO_WINDOW_MS: i64 = 60_000;

/// Undo/redo churn counting window
pub const CHURN_WINDOW_MS: i64 = 60_000;

/// Undo/redo operations within the window before churn fires
pub const CHURN_THRESHOLD: u32 = 6;

/// Trailing window for the UI-fiddle streak
pub const UI_FIDDLE_WINDOW_MS: i64 = 90_000;

/// UI-fiddle events within the window before the streak fires
pub const UI_FIDDLE_THRESHOLD: usize = 3;

/// Trailing window for the tab-switch streak
pub const TAB_SWITCH_WINDOW_MS: i64 = 120_000;

/// Returns to visibility within the window before the streak fires
pub const TAB_SWITCH_THRESHOLD: usize = 3;

/// Silence after the last activity signal before ticks count as idle
pub const IDLE_AFTER_MS: u64 = 60_000;

/// Cumulative idle time before the idle alert can fire
pub const IDLE_ALERT_THRESHOLD_MS: u64 = 120_000;

/// Suppression window between idle alerts
pub const IDLE_ALERT_SUPPRESSION_MS: i64 = 60_000;

/// First-edit delay past which warm-up lag fires
pub const WARM_UP_LAG_MS: u64 = 90_000;

/// Cheap 32-bit rolling hash over the full text.
///
/// Order-sensitive, wrapping; a repeat-detection signal, not a content
/// integrity check.
pub fn content_hash(text: &str) -> u32 {
    let mut hash: u32 = 0;
    for ch in text.chars() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(ch as u32);
    }
    hash
}

/// Transient window of recently seen content hashes.
///
/// Entries older than [`NET_ZERO_WINDOW_MS`] are pruned on every observation;
/// the window is never persisted.
#[derive(Debug, Clone, Default)]
pub struct ContentHashWindow {
    entries: Vec<(u32, DateTime<Utc>)>,
}

impl ContentHashWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `hash` at `now` and report whether it repeats a hash already
    /// seen inside the window.
    pub fn observe(&mut self, hash: u32, now: DateTime<Utc>) -> bool {
        let repeat = self
            .entries
            .iter()
            .any(|(h, t)| *h == hash && (now - *t).num_milliseconds() < NET_ZERO_WINDOW_MS);

        self.entries.push((hash, now));
        self.entries
            .retain(|(_, t)| (now - *t).num_milliseconds() < NET_ZERO_WINDOW_MS);

        repeat
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Running undo/redo counter with its reset rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChurnWindow {
    count: u32,
    last: Option<DateTime<Utc>>,
}

impl ChurnWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one undo or redo at `now`.
    pub fn record(&mut self, now: DateTime<Utc>) {
        self.count += 1;
        self.last = Some(now);
    }

    /// Apply the reset rules and report whether churn fires.
    ///
    /// The counter is zeroed when more than [`CHURN_WINDOW_MS`] has elapsed
    /// since the last undo/redo, and zeroed again on fire.
    pub fn check(&mut self, now: DateTime<Utc>) -> bool {
        if let Some(last) = self.last {
            if (now - last).num_milliseconds() > CHURN_WINDOW_MS {
                self.count = 0;
            }
        }
        if self.count >= CHURN_THRESHOLD {
            self.count = 0;
            return true;
        }
        false
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// At least [`UI_FIDDLE_THRESHOLD`] UI-fiddle events in the trailing window.
/// No suppression: may re-fire on every subsequent qualifying action.
pub fn ui_fiddle_streak(events: &EventLog, now: DateTime<Utc>) -> bool {
    events.count_recent(EventKind::UiFiddle, UI_FIDDLE_WINDOW_MS, now) >= UI_FIDDLE_THRESHOLD
}

/// At least [`TAB_SWITCH_THRESHOLD`] returns to visibility in the trailing
/// window. No suppression.
pub fn tab_switch_streak(events: &EventLog, now: DateTime<Utc>) -> bool {
    events.count_recent(EventKind::TabVisible, TAB_SWITCH_WINDOW_MS, now) >= TAB_SWITCH_THRESHOLD
}

/// Cumulative idle time past the threshold, with a suppression window keyed
/// off the last logged `idle-alert` event.
pub fn idle_alert(idle_ms: u64, events: &EventLog, now: DateTime<Utc>) -> bool {
    idle_ms > IDLE_ALERT_THRESHOLD_MS
        && !events.has_recent(EventKind::IdleAlert, IDLE_ALERT_SUPPRESSION_MS, now)
}

/// First-edit delay past the warm-up threshold. Evaluated once, at the moment
/// of the first qualifying edit.
pub fn warm_up_lag(first_edit_delay_ms: u64) -> bool {
    first_edit_delay_ms > WARM_UP_LAG_MS
}
