//! Raw signal schema
//!
//! NDJSON wire form for recorded ingestion signals, used by the CLI replay
//! command and by hosts that capture sessions for later analysis. Each line
//! is one [`RawSignal`]; the `signal` tag selects the ingestion operation it
//! maps onto.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::{EditClass, EditDelta};
use crate::engine::TrackerEngine;

/// Input schema identifier
pub const SCHEMA_VERSION: &str = "sidetrack.signal.v1";

/// Errors raised while validating or parsing recorded signals.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("unsupported schema version: {0}")]
    UnsupportedVersion(String),

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("a content change cannot be both a native undo and a native redo")]
    ConflictingFlags,
}

/// One recorded ingestion signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSignal {
    /// Schema identifier; absent means current
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// When the signal occurred
    pub timestamp: DateTime<Utc>,
    /// The signal body
    #[serde(flatten)]
    pub body: SignalBody,
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

/// Signal variants, tagged with the ingestion operation they map onto.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "kebab-case")]
pub enum SignalBody {
    /// `mark_editor_ready`
    EditorReady,
    /// `record_activity`
    Activity,
    /// `record_visibility_change`
    Visibility { visible: bool },
    /// `record_content_change`
    ContentChange {
        content: String,
        #[serde(default)]
        replaced_len: usize,
        #[serde(default)]
        inserted: String,
        #[serde(default)]
        native_undo: bool,
        #[serde(default)]
        native_redo: bool,
    },
    /// `record_ui_fiddle`
    UiFiddle { kind: String },
    /// One ticker cadence step
    Tick,
}

impl RawSignal {
    /// Check schema version and internal consistency.
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(SignalError::UnsupportedVersion(self.schema_version.clone()));
        }
        if let SignalBody::ContentChange {
            native_undo: true,
            native_redo: true,
            ..
        } = self.body
        {
            return Err(SignalError::ConflictingFlags);
        }
        Ok(())
    }

    /// Apply this signal to an engine as the matching ingestion operation.
    ///
    /// The caller is responsible for setting the engine's clock to
    /// `self.timestamp` first when replaying on a manual clock.
    pub fn apply(&self, engine: &mut TrackerEngine) {
        match &self.body {
            SignalBody::EditorReady => engine.mark_editor_ready(),
            SignalBody::Activity => engine.record_activity(),
            SignalBody::Visibility { visible } => engine.record_visibility_change(*visible),
            SignalBody::ContentChange {
                content,
                replaced_len,
                inserted,
                native_undo,
                native_redo,
            } => {
                let native = if *native_undo {
                    Some(EditClass::Undo)
                } else if *native_redo {
                    Some(EditClass::Redo)
                } else {
                    None
                };
                let delta = EditDelta {
                    replaced_len: *replaced_len,
                    inserted: inserted.clone(),
                    native,
                };
                engine.record_content_change(content, &delta);
            }
            SignalBody::UiFiddle { kind } => engine.record_ui_fiddle(kind),
            SignalBody::Tick => engine.tick(),
        }
    }
}

/// Parse newline-delimited JSON into validated signals.
///
/// Blank lines are skipped; the first malformed or invalid line aborts the
/// parse with its line number.
pub fn parse_ndjson(input: &str) -> Result<Vec<RawSignal>, SignalError> {
    let mut signals = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let signal: RawSignal =
            serde_json::from_str(trimmed).map_err(|e| SignalError::Malformed {
                line: index + 1,
                message: e.to_string(),
            })?;
        signal.validate()?;
        signals.push(signal);
    }
    Ok(signals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::session::MemoryStore;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_ndjson_round_trip() {
        let input = r#"
{"timestamp": "2024-01-15T14:00:00Z", "signal": "editor-ready"}
{"timestamp": "2024-01-15T14:00:05Z", "signal": "content-change", "content": "fn main() {}"}

{"timestamp": "2024-01-15T14:00:09Z", "signal": "ui-fiddle", "kind": "theme"}
{"timestamp": "2024-01-15T14:00:10Z", "signal": "visibility", "visible": false}
{"timestamp": "2024-01-15T14:00:12Z", "signal": "tick"}
"#;
        let signals = parse_ndjson(input).unwrap();
        assert_eq!(signals.len(), 5);
        assert_eq!(signals[0].schema_version, SCHEMA_VERSION);
        assert!(matches!(signals[4].body, SignalBody::Tick));
    }

    #[test]
    fn test_parse_reports_line_numbers() {
        let input = "{\"timestamp\": \"2024-01-15T14:00:00Z\", \"signal\": \"activity\"}\nnot json\n";
        let err = parse_ndjson(input).unwrap_err();
        assert!(matches!(err, SignalError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_validate_rejects_foreign_schema() {
        let signal = RawSignal {
            schema_version: "sidetrack.signal.v2".to_string(),
            timestamp: base(),
            body: SignalBody::Activity,
        };
        assert!(matches!(
            signal.validate(),
            Err(SignalError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_validate_rejects_conflicting_native_flags() {
        let signal = RawSignal {
            schema_version: SCHEMA_VERSION.to_string(),
            timestamp: base(),
            body: SignalBody::ContentChange {
                content: "x".to_string(),
                replaced_len: 0,
                inserted: String::new(),
                native_undo: true,
                native_redo: true,
            },
        };
        assert!(matches!(signal.validate(), Err(SignalError::ConflictingFlags)));
    }

    #[test]
    fn test_apply_drives_the_matching_operations() {
        let clock = ManualClock::new(base());
        let mut engine = TrackerEngine::new(
            Box::new(clock.clone()),
            Box::new(MemoryStore::new()),
        );

        let input = r#"
{"timestamp": "2024-01-15T14:00:00Z", "signal": "editor-ready"}
{"timestamp": "2024-01-15T14:00:05Z", "signal": "content-change", "content": "let x = 1;"}
{"timestamp": "2024-01-15T14:00:08Z", "signal": "content-change", "content": "let y = 1;"}
{"timestamp": "2024-01-15T14:00:11Z", "signal": "content-change", "content": "let x = 1;"}
{"timestamp": "2024-01-15T14:00:15Z", "signal": "ui-fiddle", "kind": "font"}
"#;
        for signal in parse_ndjson(input).unwrap() {
            clock.set(signal.timestamp);
            signal.apply(&mut engine);
        }

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.metrics.first_edit_delay_ms, 5_000);
        assert_eq!(snapshot.metrics.net_zero_edit_loops, 1);
        assert_eq!(snapshot.metrics.ui_fiddle_count, 1);
    }
}
