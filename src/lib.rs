//! Sidetrack - in-process behavioral telemetry engine for editor sessions
//!
//! Sidetrack ingests raw activity signals from an editor shell (content
//! edits, visibility transitions, cosmetic UI actions), classifies them into
//! named behavioral patterns with sliding-time-window heuristics, maintains
//! cumulative metrics with bounded history logs, and drives a rate-limited
//! notification stream.
//!
//! ## Modules
//!
//! - **engine**: the [`TrackerEngine`] orchestrator and its ingestion operations
//! - **classify / detect / gate / quips**: edit classification, pattern
//!   detectors, banner rate limiting, and the canned message pools
//! - **session**: snapshot persistence behind the [`SnapshotStore`] boundary
//! - **ticker**: the one-second idle/active cadence thread
//! - **schema**: the NDJSON wire form of recorded signals for replay
//!
//! All detectors are heuristics: false positives and negatives are accepted
//! by design, and no failure in this crate ever propagates to the host.

pub mod classify;
pub mod clock;
pub mod detect;
pub mod engine;
pub mod error;
pub mod gate;
pub mod observer;
pub mod quips;
pub mod schema;
pub mod session;
pub mod store;
pub mod ticker;
pub mod types;

pub use classify::{classify_edit, EditClass, EditDelta};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{SharedEngine, TrackerEngine};
pub use error::TelemetryError;
pub use observer::ObserverId;
pub use schema::{parse_ndjson, RawSignal, SignalBody, SCHEMA_VERSION};
pub use session::{FileStore, MemoryStore, SessionSnapshot, SnapshotStore};
pub use ticker::Ticker;
pub use types::{Event, EventKind, Metrics, PatternKind, Quip, TrackerSnapshot};

/// Crate version embedded in CLI reports
pub const SIDETRACK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for CLI reports and diagnostics
pub const PRODUCER_NAME: &str = "sidetrack";
