//! Error types for the tracking engine

use thiserror::Error;

/// Errors that can occur at the persistence boundary.
///
/// None of these propagate out of the public ingestion operations: the engine
/// contains persistence failures and logs them at warn level, so telemetry can
/// never crash the host application. The variants exist so storage backends
/// can report what went wrong.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to encode session snapshot: {0}")]
    Encode(serde_json::Error),

    #[error("failed to decode session snapshot: {0}")]
    Decode(serde_json::Error),

    #[error("snapshot storage I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot storage backend: {0}")]
    Storage(String),
}
