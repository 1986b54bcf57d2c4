//! Session persistence
//!
//! The engine persists one [`SessionSnapshot`] as a single JSON unit through
//! the [`SnapshotStore`] boundary, and restores it on construction if it is
//! fresh enough. Storage backends deal in serialized strings only, so a
//! browser shell can park the payload in web storage while a desktop host
//! uses [`FileStore`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TelemetryError;
use crate::types::{Event, Metrics, Quip};

/// Fixed key the snapshot is stored under.
pub const SESSION_KEY: &str = "sidetrack-session";

/// Snapshots older than this are discarded wholesale on load (4 hours).
pub const MAX_SNAPSHOT_AGE_MS: i64 = 4 * 60 * 60 * 1000;

/// Only the newest events are persisted.
pub const SNAPSHOT_EVENT_LIMIT: usize = 50;

/// The single persisted unit: metrics, quips, the newest events, and the
/// moment it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Engine instance that wrote the snapshot, for provenance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<Uuid>,
    #[serde(default)]
    pub metrics: Metrics,
    #[serde(default)]
    pub recent_quips: Vec<Quip>,
    #[serde(default)]
    pub events: Vec<Event>,
    pub timestamp: DateTime<Utc>,
}

impl SessionSnapshot {
    /// Milliseconds since the snapshot was written, clamped at zero.
    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.timestamp).num_milliseconds().max(0)
    }

    /// Whether the snapshot is inside the freshness window.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.age_ms(now) < MAX_SNAPSHOT_AGE_MS
    }

    pub fn encode(&self) -> Result<String, TelemetryError> {
        serde_json::to_string(self).map_err(TelemetryError::Encode)
    }

    pub fn decode(json: &str) -> Result<Self, TelemetryError> {
        serde_json::from_str(json).map_err(TelemetryError::Decode)
    }
}

/// Durable-storage boundary for session snapshots.
///
/// Implementations persist and restore one serialized snapshot under one
/// fixed key. Errors are reported so the engine can contain and log them;
/// they never reach the host.
pub trait SnapshotStore: Send {
    /// The stored snapshot, if any.
    fn load(&self) -> Result<Option<String>, TelemetryError>;

    /// Replace the stored snapshot.
    fn store(&self, snapshot: &str) -> Result<(), TelemetryError>;
}

/// In-process store. Cloning yields a handle onto the same slot, so a test
/// or an embedder can inspect what the engine persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently stored payload.
    pub fn contents(&self) -> Option<String> {
        self.lock().clone()
    }

    /// Seed the store with a payload, as a host restoring web storage would.
    pub fn put(&self, snapshot: impl Into<String>) {
        *self.lock() = Some(snapshot.into());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, TelemetryError> {
        Ok(self.contents())
    }

    fn store(&self, snapshot: &str) -> Result<(), TelemetryError> {
        self.put(snapshot);
        Ok(())
    }
}

/// Single-file store for desktop hosts and the CLI.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<String>, TelemetryError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn store(&self, snapshot: &str) -> Result<(), TelemetryError> {
        std::fs::write(&self.path, snapshot)?;
        Ok(())
    }
}
