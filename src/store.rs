//! Bounded event and quip logs
//!
//! Both logs enforce their caps after every mutation: the event log is a FIFO
//! ring of the last 100 events, the quip log keeps the 20 newest quips with
//! the newest first. The recency queries feed the sliding-window detectors.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::types::{Event, EventKind, Quip};

/// Maximum number of events retained
pub const EVENT_LOG_CAP: usize = 100;

/// Maximum number of quips retained
pub const QUIP_LOG_CAP: usize = 20;

/// FIFO ring buffer of the most recent events, oldest first.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: VecDeque<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(EVENT_LOG_CAP),
        }
    }

    /// Append an event, evicting the oldest entry past the cap.
    pub fn push(&mut self, event: Event) {
        self.entries.push_back(event);
        while self.entries.len() > EVENT_LOG_CAP {
            self.entries.pop_front();
        }
    }

    /// Number of events of `kind` younger than `window_ms`.
    pub fn count_recent(&self, kind: EventKind, window_ms: i64, now: DateTime<Utc>) -> usize {
        self.entries
            .iter()
            .filter(|e| e.kind == kind && (now - e.timestamp).num_milliseconds() < window_ms)
            .count()
    }

    /// Whether any event of `kind` is younger than `window_ms`.
    pub fn has_recent(&self, kind: EventKind, window_ms: i64, now: DateTime<Utc>) -> bool {
        self.entries
            .iter()
            .any(|e| e.kind == kind && (now - e.timestamp).num_milliseconds() < window_ms)
    }

    /// The last `n` events, oldest first.
    pub fn tail(&self, n: usize) -> Vec<Event> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Replace the log contents, re-applying the cap.
    pub fn replace(&mut self, events: Vec<Event>) {
        self.entries = events.into();
        while self.entries.len() > EVENT_LOG_CAP {
            self.entries.pop_front();
        }
    }

    pub fn to_vec(&self) -> Vec<Event> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Newest-first quip log.
#[derive(Debug, Clone, Default)]
pub struct QuipLog {
    entries: Vec<Quip>,
}

impl QuipLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(QUIP_LOG_CAP),
        }
    }

    /// Prepend a quip, evicting the oldest from the tail past the cap.
    pub fn push(&mut self, quip: Quip) {
        self.entries.insert(0, quip);
        self.entries.truncate(QUIP_LOG_CAP);
    }

    /// Replace the log contents, re-applying the cap.
    pub fn replace(&mut self, quips: Vec<Quip>) {
        self.entries = quips;
        self.entries.truncate(QUIP_LOG_CAP);
    }

    pub fn to_vec(&self) -> Vec<Quip> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
