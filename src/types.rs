//! Core data types for the tracking engine
//!
//! This module defines the metrics aggregate, the event and quip records kept
//! in the bounded logs, and the immutable snapshot handed to observers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cumulative session metrics, exclusively owned by the engine.
///
/// Every duration and count is monotonically non-decreasing for the lifetime
/// of the engine; `currently_idle` is the only field that moves both ways.
/// All fields carry `#[serde(default)]` so a partial persisted snapshot
/// overlays field-by-field onto zero defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Time spent visible with recent activity, in milliseconds
    #[serde(default)]
    pub active_ms: u64,
    /// Time spent with the page hidden, in milliseconds
    #[serde(default)]
    pub hidden_ms: u64,
    /// Time spent visible but idle, in milliseconds
    #[serde(default)]
    pub idle_ms: u64,
    /// Number of hidden-to-visible transitions
    #[serde(default)]
    pub interruptions: u32,
    /// Delay between editor readiness and the first edit, in milliseconds
    #[serde(default)]
    pub first_edit_delay_ms: u64,
    /// Number of edits classified as undo
    #[serde(default)]
    pub undo_count: u32,
    /// Number of edits classified as redo
    #[serde(default)]
    pub redo_count: u32,
    /// Number of edits that returned content to a recently seen state
    #[serde(default)]
    pub net_zero_edit_loops: u32,
    /// Number of cosmetic UI actions
    #[serde(default)]
    pub ui_fiddle_count: u32,
    /// Fixed time credit accumulated for UI actions, in milliseconds
    #[serde(default)]
    pub ui_fiddle_time_ms: u64,
    /// Whether the last tick classified the session as idle
    #[serde(default)]
    pub currently_idle: bool,
}

/// Event type tags, serialized with the persisted wire spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    TabHidden,
    TabVisible,
    FirstEdit,
    Undo,
    Redo,
    NetZeroLoop,
    UiFiddle,
    IdleAlert,
}

/// One entry in the bounded event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type
    pub kind: EventKind,
    /// When the event was recorded
    pub timestamp: DateTime<Utc>,
    /// Optional opaque payload (e.g. the UI action kind, the first-edit delay)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

/// Behavioral patterns the detectors can recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    UndoChurn,
    NetZero,
    UiFiddle,
    TabSwitch,
    WarmUp,
    Idle,
}

impl PatternKind {
    /// The wire tag for this pattern, matching its serde spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            PatternKind::UndoChurn => "undo-churn",
            PatternKind::NetZero => "net-zero",
            PatternKind::UiFiddle => "ui-fiddle",
            PatternKind::TabSwitch => "tab-switch",
            PatternKind::WarmUp => "warm-up",
            PatternKind::Idle => "idle",
        }
    }
}

/// A short canned message tagged with the pattern that triggered it.
///
/// Every detected pattern produces a quip, whether or not the notification
/// gate let a banner through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quip {
    /// Message text selected from the pattern's pool
    pub message: String,
    /// Pattern that fired
    pub pattern: PatternKind,
    /// When the pattern fired
    pub timestamp: DateTime<Utc>,
}

/// Immutable copy of engine state delivered to observers and returned by
/// [`snapshot`](crate::engine::TrackerEngine::snapshot).
///
/// Mutating a snapshot never affects engine state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    /// Metrics at the time of the snapshot
    pub metrics: Metrics,
    /// Quip log, newest first
    pub recent_quips: Vec<Quip>,
    /// Event log, oldest first
    pub events: Vec<Event>,
}
