//! The tracking engine
//!
//! [`TrackerEngine`] orchestrates classification, metrics, the bounded logs,
//! the detectors, the notification gate, and persistence behind a small set
//! of ingestion operations. Every operation runs synchronously to completion
//! and ends with a snapshot broadcast to subscribers.
//!
//! The engine owns all mutable state exclusively. For hosts that drive the
//! ticker from a background thread, [`TrackerEngine::into_shared`] parks the
//! engine behind one mutex; detectors perform non-atomic read-then-write
//! sequences and rely on that exclusive access.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::classify::{classify_edit, EditClass, EditDelta};
use crate::clock::{elapsed_ms, Clock};
use crate::detect::{self, ChurnWindow, ContentHashWindow};
use crate::gate::NotificationGate;
use crate::observer::{ObserverId, Registry};
use crate::quips;
use crate::session::{SessionSnapshot, SnapshotStore, SNAPSHOT_EVENT_LIMIT};
use crate::store::{EventLog, QuipLog};
use crate::types::{Event, EventKind, Metrics, PatternKind, Quip, TrackerSnapshot};

/// Fixed time credit added to `ui_fiddle_time_ms` per cosmetic action
pub const UI_FIDDLE_TIME_CREDIT_MS: u64 = 1_000;

/// Snapshot observer callback.
pub type SnapshotObserver = Box<dyn Fn(&TrackerSnapshot) + Send>;

/// Banner observer callback, invoked only when the gate admits a detection.
pub type BannerObserver = Box<dyn Fn(&str, PatternKind) + Send>;

/// An engine shared with a background ticker.
pub type SharedEngine = Arc<Mutex<TrackerEngine>>;

/// The behavioral-event tracking engine.
pub struct TrackerEngine {
    clock: Box<dyn Clock>,
    store: Box<dyn SnapshotStore>,
    instance_id: Uuid,

    metrics: Metrics,
    events: EventLog,
    quips: QuipLog,

    hash_window: ContentHashWindow,
    churn: ChurnWindow,
    gate: NotificationGate,

    snapshot_observers: Registry<SnapshotObserver>,
    banner_observers: Registry<BannerObserver>,

    visible: bool,
    visibility_since: DateTime<Utc>,
    last_active: DateTime<Utc>,
    last_tick: DateTime<Utc>,
    ready_at: Option<DateTime<Utc>>,
    first_edit_seen: bool,
}

impl TrackerEngine {
    /// Construct an engine and immediately attempt to restore a prior
    /// session through `store`. A missing, malformed, or stale snapshot
    /// leaves the defaults in place.
    pub fn new(clock: Box<dyn Clock>, store: Box<dyn SnapshotStore>) -> Self {
        let now = clock.now();
        let mut engine = Self {
            clock,
            store,
            instance_id: Uuid::new_v4(),
            metrics: Metrics::default(),
            events: EventLog::new(),
            quips: QuipLog::new(),
            hash_window: ContentHashWindow::new(),
            churn: ChurnWindow::new(),
            gate: NotificationGate::new(),
            snapshot_observers: Registry::new(),
            banner_observers: Registry::new(),
            visible: true,
            visibility_since: now,
            last_active: now,
            last_tick: now,
            ready_at: None,
            first_edit_seen: false,
        };
        engine.load_session();
        engine
    }

    /// An engine on the system clock with no durable storage. Suitable for
    /// tests and embedders that persist through their own store.
    pub fn in_memory() -> Self {
        Self::new(
            Box::new(crate::clock::SystemClock),
            Box::new(crate::session::MemoryStore::new()),
        )
    }

    /// Park the engine behind one mutex for a background ticker.
    pub fn into_shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    /// The identity this engine stamps into persisted snapshots.
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    // ------------------------------------------------------------------
    // Ingestion operations
    // ------------------------------------------------------------------

    /// Record (or re-record) the reference timestamp warm-up delay is
    /// measured from. Re-invocation moves the reference to the latest mount;
    /// the first edit is only ever recorded once per engine lifetime.
    pub fn mark_editor_ready(&mut self) {
        self.ready_at = Some(self.clock.now());
        self.notify();
    }

    /// Register an activity signal: refreshes the last-active timestamp and
    /// clears the idle flag.
    pub fn record_activity(&mut self) {
        let now = self.clock.now();
        self.touch_activity(now);
        self.notify();
    }

    /// State transition over the page visibility boolean.
    ///
    /// Calls repeating the current state are no-ops. Going hidden flushes the
    /// visible time the ticker has not yet accounted into `active_ms`;
    /// returning flushes the whole hidden span into `hidden_ms` and counts an
    /// interruption.
    pub fn record_visibility_change(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        let now = self.clock.now();

        if !visible {
            // The ticker accounts visible time up to `last_tick`; only the
            // residual belongs to this flush.
            let accounted_from = self.visibility_since.max(self.last_tick);
            self.metrics.active_ms += elapsed_ms(accounted_from, now);
            self.push_event(EventKind::TabHidden, None, now);
        } else {
            self.metrics.hidden_ms += elapsed_ms(self.visibility_since, now);
            self.metrics.interruptions += 1;
            self.push_event(EventKind::TabVisible, None, now);
            if detect::tab_switch_streak(&self.events, now) {
                self.fire(PatternKind::TabSwitch, now);
            }
        }

        self.visible = visible;
        self.visibility_since = now;
        self.notify();
    }

    /// Ingest one content edit: the full current text plus its structured
    /// delta.
    pub fn record_content_change(&mut self, content: &str, delta: &EditDelta) {
        let now = self.clock.now();

        if !self.first_edit_seen {
            if let Some(ready_at) = self.ready_at {
                let delay = elapsed_ms(ready_at, now);
                self.metrics.first_edit_delay_ms = delay;
                self.first_edit_seen = true;
                self.push_event(EventKind::FirstEdit, Some(json!({ "delay_ms": delay })), now);
                if detect::warm_up_lag(delay) {
                    self.fire(PatternKind::WarmUp, now);
                }
            }
        }

        match classify_edit(delta) {
            EditClass::Undo => {
                self.metrics.undo_count += 1;
                self.churn.record(now);
                self.push_event(EventKind::Undo, None, now);
            }
            EditClass::Redo => {
                self.metrics.redo_count += 1;
                self.churn.record(now);
                self.push_event(EventKind::Redo, None, now);
            }
            EditClass::Forward => {
                let hash = detect::content_hash(content);
                if self.hash_window.observe(hash, now) {
                    self.metrics.net_zero_edit_loops += 1;
                    self.fire(PatternKind::NetZero, now);
                    self.push_event(EventKind::NetZeroLoop, None, now);
                }
            }
        }

        if self.churn.check(now) {
            self.fire(PatternKind::UndoChurn, now);
        }

        self.touch_activity(now);
        self.notify();
    }

    /// Record one cosmetic UI action under a free-form action kind.
    pub fn record_ui_fiddle(&mut self, kind: &str) {
        let now = self.clock.now();
        self.metrics.ui_fiddle_count += 1;
        self.metrics.ui_fiddle_time_ms += UI_FIDDLE_TIME_CREDIT_MS;
        self.push_event(EventKind::UiFiddle, Some(json!({ "kind": kind })), now);
        if detect::ui_fiddle_streak(&self.events, now) {
            self.fire(PatternKind::UiFiddle, now);
        }
        self.notify();
    }

    /// One cadence step: classify the elapsed interval as active or idle
    /// while visible, do no accounting while hidden, and broadcast a
    /// snapshot either way.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        let elapsed = elapsed_ms(self.last_tick, now);

        if self.visible {
            if elapsed_ms(self.last_active, now) > detect::IDLE_AFTER_MS {
                self.metrics.idle_ms += elapsed;
                self.metrics.currently_idle = true;
                if detect::idle_alert(self.metrics.idle_ms, &self.events, now) {
                    self.fire(PatternKind::Idle, now);
                    self.push_event(EventKind::IdleAlert, None, now);
                }
            } else {
                self.metrics.active_ms += elapsed;
                self.metrics.currently_idle = false;
            }
        }

        self.last_tick = now;
        self.notify();
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// An independent copy of the current state. Mutating it never affects
    /// the engine.
    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            metrics: self.metrics.clone(),
            recent_quips: self.quips.to_vec(),
            events: self.events.to_vec(),
        }
    }

    /// Deliver a snapshot to `observer` on every mutation and every tick.
    pub fn subscribe(&mut self, observer: impl Fn(&TrackerSnapshot) + Send + 'static) -> ObserverId {
        self.snapshot_observers.insert(Box::new(observer))
    }

    /// Remove a snapshot observer. Idempotent.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.snapshot_observers.remove(id)
    }

    /// Deliver `(message, pattern)` to `observer` whenever the gate admits a
    /// detection.
    pub fn on_banner(&mut self, observer: impl Fn(&str, PatternKind) + Send + 'static) -> ObserverId {
        self.banner_observers.insert(Box::new(observer))
    }

    /// Remove a banner observer. Idempotent.
    pub fn remove_banner_observer(&mut self, id: ObserverId) -> bool {
        self.banner_observers.remove(id)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Persist the current session, best effort. Failures are logged and
    /// contained; in-memory state is never affected.
    pub fn save_session(&self) {
        let now = self.clock.now();
        let snapshot = SessionSnapshot {
            instance_id: Some(self.instance_id),
            metrics: self.metrics.clone(),
            recent_quips: self.quips.to_vec(),
            events: self.events.tail(SNAPSHOT_EVENT_LIMIT),
            timestamp: now,
        };

        let payload = match snapshot.encode() {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "failed to encode session snapshot");
                return;
            }
        };
        if let Err(err) = self.store.store(&payload) {
            warn!(error = %err, "failed to persist session snapshot");
        }
    }

    fn load_session(&mut self) {
        let raw = match self.store.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(err) => {
                warn!(error = %err, "failed to read persisted session");
                return;
            }
        };
        let snapshot = match SessionSnapshot::decode(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "discarding undecodable session snapshot");
                return;
            }
        };

        let now = self.clock.now();
        if !snapshot.is_fresh(now) {
            debug!(age_ms = snapshot.age_ms(now), "discarding stale session snapshot");
            return;
        }

        self.metrics = snapshot.metrics;
        self.quips.replace(snapshot.recent_quips);
        self.events.replace(snapshot.events);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn touch_activity(&mut self, now: DateTime<Utc>) {
        self.last_active = now;
        self.metrics.currently_idle = false;
    }

    fn push_event(&mut self, kind: EventKind, payload: Option<serde_json::Value>, now: DateTime<Utc>) {
        self.events.push(Event {
            kind,
            timestamp: now,
            payload,
        });
    }

    /// A detector fired: pick a message, surface it if the gate admits, and
    /// always record the quip.
    fn fire(&mut self, pattern: PatternKind, now: DateTime<Utc>) {
        let message = quips::pick(pattern);

        if self.gate.admit(now) {
            for observer in self.banner_observers.iter() {
                observer(message, pattern);
            }
        }

        self.quips.push(Quip {
            message: message.to_string(),
            pattern,
            timestamp: now,
        });
    }

    fn notify(&self) {
        if self.snapshot_observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in self.snapshot_observers.iter() {
            observer(&snapshot);
        }
    }
}

impl Drop for TrackerEngine {
    /// One best-effort persistence attempt at teardown.
    fn drop(&mut self) {
        self.save_session();
    }
}

impl std::fmt::Debug for TrackerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerEngine")
            .field("instance_id", &self.instance_id)
            .field("metrics", &self.metrics)
            .field("events", &self.events.len())
            .field("quips", &self.quips.len())
            .field("visible", &self.visible)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::session::{MemoryStore, MAX_SNAPSHOT_AGE_MS};
    use crate::store::{EVENT_LOG_CAP, QUIP_LOG_CAP};
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap()
    }

    fn test_engine() -> (TrackerEngine, ManualClock, MemoryStore) {
        let clock = ManualClock::new(base());
        let store = MemoryStore::new();
        let engine = TrackerEngine::new(Box::new(clock.clone()), Box::new(store.clone()));
        (engine, clock, store)
    }

    fn forward_edit(engine: &mut TrackerEngine, content: &str) {
        engine.record_content_change(content, &EditDelta::typed(0, "x"));
    }

    #[test]
    fn test_scenario_idle_tick_after_silence() {
        let (mut engine, clock, _store) = test_engine();

        // Redundant: the engine starts visible.
        engine.record_visibility_change(true);

        clock.advance_ms(65_000);
        engine.tick();

        let snapshot = engine.snapshot();
        assert!(snapshot.metrics.currently_idle);
        assert_eq!(snapshot.metrics.idle_ms, 65_000);
        assert_eq!(snapshot.metrics.active_ms, 0);
    }

    #[test]
    fn test_scenario_warm_up_lag_on_slow_first_edit() {
        let (mut engine, clock, _store) = test_engine();
        let banners = Arc::new(AtomicUsize::new(0));
        let seen = banners.clone();
        engine.on_banner(move |_message, pattern| {
            assert_eq!(pattern, PatternKind::WarmUp);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        engine.mark_editor_ready();
        clock.advance_ms(95_000);
        forward_edit(&mut engine, "x");

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.metrics.first_edit_delay_ms, 95_000);
        assert_eq!(banners.load(Ordering::SeqCst), 1);
        assert_eq!(snapshot.recent_quips[0].pattern, PatternKind::WarmUp);
    }

    #[test]
    fn test_scenario_stale_snapshot_discarded_wholesale() {
        let clock = ManualClock::new(base());
        let store = MemoryStore::new();

        let stale = SessionSnapshot {
            instance_id: None,
            metrics: Metrics {
                active_ms: 99_000,
                undo_count: 12,
                ..Metrics::default()
            },
            recent_quips: Vec::new(),
            events: Vec::new(),
            timestamp: base() - Duration::hours(5),
        };
        store.put(stale.encode().unwrap());

        let engine = TrackerEngine::new(Box::new(clock), Box::new(store));
        assert_eq!(engine.snapshot().metrics, Metrics::default());
    }

    #[test]
    fn test_fresh_snapshot_is_restored() {
        let clock = ManualClock::new(base());
        let store = MemoryStore::new();

        let prior = SessionSnapshot {
            instance_id: None,
            metrics: Metrics {
                active_ms: 42_000,
                interruptions: 2,
                ..Metrics::default()
            },
            recent_quips: vec![Quip {
                message: "earlier".to_string(),
                pattern: PatternKind::Idle,
                timestamp: base() - Duration::hours(1),
            }],
            events: vec![Event {
                kind: EventKind::TabVisible,
                timestamp: base() - Duration::hours(1),
                payload: None,
            }],
            timestamp: base() - Duration::hours(1),
        };
        store.put(prior.encode().unwrap());

        let engine = TrackerEngine::new(Box::new(clock), Box::new(store));
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.metrics.active_ms, 42_000);
        assert_eq!(snapshot.metrics.interruptions, 2);
        assert_eq!(snapshot.recent_quips.len(), 1);
        assert_eq!(snapshot.events.len(), 1);
    }

    #[test]
    fn test_malformed_snapshot_leaves_defaults() {
        let clock = ManualClock::new(base());
        let store = MemoryStore::new();
        store.put("{ definitely not a snapshot }");

        let engine = TrackerEngine::new(Box::new(clock), Box::new(store));
        assert_eq!(engine.snapshot().metrics, Metrics::default());
    }

    #[test]
    fn test_undo_churn_fires_exactly_once_for_six_undos() {
        let (mut engine, clock, _store) = test_engine();
        let fired = Arc::new(AtomicUsize::new(0));
        let seen = fired.clone();
        engine.on_banner(move |_message, pattern| {
            if pattern == PatternKind::UndoChurn {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        for _ in 0..6 {
            clock.advance_ms(2_000);
            engine.record_content_change("text", &EditDelta::native_undo());
        }

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.metrics.undo_count, 6);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // The counter reset on fire: six more undos are needed to re-fire.
        clock.advance_ms(2_000);
        engine.record_content_change("text", &EditDelta::native_undo());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_net_zero_loop_detected_on_repeat_content() {
        let (mut engine, clock, _store) = test_engine();

        forward_edit(&mut engine, "let x = 1;");
        clock.advance_ms(10_000);
        forward_edit(&mut engine, "let x = 1;");

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.metrics.net_zero_edit_loops, 1);
        assert_eq!(snapshot.recent_quips[0].pattern, PatternKind::NetZero);
        assert!(snapshot
            .events
            .iter()
            .any(|e| e.kind == EventKind::NetZeroLoop));
    }

    #[test]
    fn test_net_zero_ignores_stale_hashes() {
        let (mut engine, clock, _store) = test_engine();

        forward_edit(&mut engine, "let x = 1;");
        clock.advance_ms(61_000);
        forward_edit(&mut engine, "let x = 1;");

        assert_eq!(engine.snapshot().metrics.net_zero_edit_loops, 0);
    }

    #[test]
    fn test_denied_detections_still_record_quips() {
        let (mut engine, clock, _store) = test_engine();
        let banners = Arc::new(AtomicUsize::new(0));
        let seen = banners.clone();
        engine.on_banner(move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        // Five net-zero detections inside one minute: one banner, five quips.
        forward_edit(&mut engine, "same");
        for _ in 0..5 {
            clock.advance_ms(5_000);
            forward_edit(&mut engine, "same");
        }

        assert_eq!(banners.load(Ordering::SeqCst), 1);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.metrics.net_zero_edit_loops, 5);
        assert_eq!(snapshot.recent_quips.len(), 5);
    }

    #[test]
    fn test_active_plus_idle_tracks_visible_wall_clock() {
        let (mut engine, clock, _store) = test_engine();

        engine.record_activity();
        for _ in 0..130 {
            clock.advance_ms(1_000);
            engine.tick();
        }

        let metrics = engine.snapshot().metrics;
        assert_eq!(metrics.active_ms + metrics.idle_ms, 130_000);
        // Sixty quiet seconds pass before ticks start counting idle.
        assert!(metrics.currently_idle);
        assert!(metrics.idle_ms >= 65_000);
    }

    #[test]
    fn test_hidden_time_accounted_on_return() {
        let (mut engine, clock, _store) = test_engine();

        clock.advance_ms(5_000);
        engine.record_visibility_change(false);
        assert_eq!(engine.snapshot().metrics.active_ms, 5_000);

        clock.advance_ms(30_000);
        engine.tick(); // hidden: no active/idle accounting
        clock.advance_ms(30_000);
        engine.record_visibility_change(true);

        let metrics = engine.snapshot().metrics;
        assert_eq!(metrics.hidden_ms, 60_000);
        assert_eq!(metrics.active_ms, 5_000);
        assert_eq!(metrics.interruptions, 1);
    }

    #[test]
    fn test_redundant_visibility_calls_are_no_ops() {
        let (mut engine, clock, _store) = test_engine();

        clock.advance_ms(5_000);
        engine.record_visibility_change(true);
        engine.record_visibility_change(true);

        let metrics = engine.snapshot().metrics;
        assert_eq!(metrics.interruptions, 0);
        assert_eq!(metrics.hidden_ms, 0);
        assert!(engine.snapshot().events.is_empty());
    }

    #[test]
    fn test_tab_switch_streak_fires_on_third_return() {
        let (mut engine, clock, _store) = test_engine();
        let fired = Arc::new(AtomicUsize::new(0));
        let seen = fired.clone();
        engine.on_banner(move |_message, pattern| {
            if pattern == PatternKind::TabSwitch {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        for _ in 0..3 {
            clock.advance_ms(5_000);
            engine.record_visibility_change(false);
            clock.advance_ms(5_000);
            engine.record_visibility_change(true);
        }

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(engine.snapshot().metrics.interruptions, 3);
    }

    #[test]
    fn test_ui_fiddle_credits_and_streak() {
        let (mut engine, clock, _store) = test_engine();

        engine.record_ui_fiddle("theme");
        clock.advance_ms(10_000);
        engine.record_ui_fiddle("font");
        clock.advance_ms(10_000);
        engine.record_ui_fiddle("background");

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.metrics.ui_fiddle_count, 3);
        assert_eq!(snapshot.metrics.ui_fiddle_time_ms, 3_000);
        assert_eq!(snapshot.recent_quips[0].pattern, PatternKind::UiFiddle);
        assert_eq!(
            snapshot.events[0].payload,
            Some(json!({ "kind": "theme" }))
        );
    }

    #[test]
    fn test_log_caps_hold_under_sustained_ingestion() {
        let (mut engine, clock, _store) = test_engine();

        for i in 0..150 {
            clock.advance_ms(61_000); // keep the gate and streak windows cold
            engine.record_ui_fiddle(&format!("action-{i}"));
        }

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.events.len(), EVENT_LOG_CAP);
        assert!(snapshot.recent_quips.len() <= QUIP_LOG_CAP);
    }

    #[test]
    fn test_snapshots_are_independent_copies() {
        let (mut engine, _clock, _store) = test_engine();
        forward_edit(&mut engine, "x");

        let first = engine.snapshot();
        let mut second = engine.snapshot();
        assert_eq!(first, second);

        second.metrics.undo_count = 99;
        second.events.clear();
        assert_eq!(engine.snapshot(), first);
    }

    #[test]
    fn test_first_edit_recorded_once_even_after_remount() {
        let (mut engine, clock, _store) = test_engine();

        engine.mark_editor_ready();
        clock.advance_ms(10_000);
        forward_edit(&mut engine, "a");
        assert_eq!(engine.snapshot().metrics.first_edit_delay_ms, 10_000);

        // Remount resets the reference, but the first edit stays recorded.
        engine.mark_editor_ready();
        clock.advance_ms(100_000);
        forward_edit(&mut engine, "b");
        assert_eq!(engine.snapshot().metrics.first_edit_delay_ms, 10_000);

        let first_edits = engine
            .snapshot()
            .events
            .iter()
            .filter(|e| e.kind == EventKind::FirstEdit)
            .count();
        assert_eq!(first_edits, 1);
    }

    #[test]
    fn test_edit_before_ready_does_not_start_the_clock() {
        let (mut engine, clock, _store) = test_engine();

        forward_edit(&mut engine, "early");
        assert_eq!(engine.snapshot().metrics.first_edit_delay_ms, 0);

        engine.mark_editor_ready();
        clock.advance_ms(2_000);
        forward_edit(&mut engine, "later");
        assert_eq!(engine.snapshot().metrics.first_edit_delay_ms, 2_000);
    }

    #[test]
    fn test_subscribers_receive_snapshots_until_unsubscribed() {
        let (mut engine, _clock, _store) = test_engine();
        let delivered = Arc::new(AtomicUsize::new(0));
        let seen = delivered.clone();
        let id = engine.subscribe(move |_snapshot| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        engine.record_activity();
        engine.tick();
        assert_eq!(delivered.load(Ordering::SeqCst), 2);

        assert!(engine.unsubscribe(id));
        assert!(!engine.unsubscribe(id));
        engine.record_activity();
        assert_eq!(delivered.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_idle_alert_fires_past_two_minutes_with_suppression() {
        let (mut engine, clock, _store) = test_engine();
        let fired = Arc::new(AtomicUsize::new(0));
        let seen = fired.clone();
        engine.on_banner(move |_message, pattern| {
            if pattern == PatternKind::Idle {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        // Idle time only starts accruing after sixty silent seconds, so the
        // cumulative threshold is crossed three minutes in.
        for _ in 0..185 {
            clock.advance_ms(1_000);
            engine.tick();
        }
        assert!(engine.snapshot().metrics.idle_ms > 120_000);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Suppressed while the last idle-alert event is under a minute old.
        for _ in 0..30 {
            clock.advance_ms(1_000);
            engine.tick();
        }
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        for _ in 0..30 {
            clock.advance_ms(1_000);
            engine.tick();
        }
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_teardown_persists_session() {
        let (mut engine, clock, store) = test_engine();

        engine.mark_editor_ready();
        forward_edit(&mut engine, "x");
        clock.advance_ms(1_000);
        drop(engine);

        let saved = store.contents().expect("snapshot persisted on drop");
        let snapshot = SessionSnapshot::decode(&saved).unwrap();
        assert_eq!(snapshot.metrics.first_edit_delay_ms, 0);
        assert!(snapshot.events.iter().any(|e| e.kind == EventKind::FirstEdit));
        assert!(snapshot.instance_id.is_some());
        assert!(snapshot.timestamp >= base());
    }

    #[test]
    fn test_persisted_events_are_capped_at_fifty() {
        let (mut engine, clock, store) = test_engine();

        for i in 0..80 {
            clock.advance_ms(61_000);
            engine.record_ui_fiddle(&format!("a{i}"));
        }
        engine.save_session();

        let saved = store.contents().unwrap();
        let snapshot = SessionSnapshot::decode(&saved).unwrap();
        assert_eq!(snapshot.events.len(), SNAPSHOT_EVENT_LIMIT);
    }

    #[test]
    fn test_snapshot_age_boundary_is_exclusive() {
        let clock = ManualClock::new(base());
        let store = MemoryStore::new();
        let prior = SessionSnapshot {
            instance_id: None,
            metrics: Metrics {
                undo_count: 3,
                ..Metrics::default()
            },
            recent_quips: Vec::new(),
            events: Vec::new(),
            timestamp: base() - Duration::milliseconds(MAX_SNAPSHOT_AGE_MS - 1),
        };
        store.put(prior.encode().unwrap());

        let engine = TrackerEngine::new(Box::new(clock), Box::new(store));
        assert_eq!(engine.snapshot().metrics.undo_count, 3);
    }
}
