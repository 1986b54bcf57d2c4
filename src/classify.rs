//! Undo/redo edit classification
//!
//! Turns one content-edit delta into forward, undo, or redo. When the host
//! editor reports its own undo/redo flags those win; otherwise the span
//! arithmetic below makes a best-effort guess. Collisions with genuine typing
//! are accepted.

use serde::{Deserialize, Serialize};

/// Classification of a single content edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditClass {
    Forward,
    Undo,
    Redo,
}

/// A structured content-edit delta as supplied by the editor widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditDelta {
    /// Length of the replaced span, in characters
    pub replaced_len: usize,
    /// Text inserted in place of the span
    pub inserted: String,
    /// Native undo/redo classification from the host editor, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<EditClass>,
}

impl EditDelta {
    /// A delta with no native classification.
    pub fn typed(replaced_len: usize, inserted: impl Into<String>) -> Self {
        Self {
            replaced_len,
            inserted: inserted.into(),
            native: None,
        }
    }

    /// A delta the host editor flagged as a native undo.
    pub fn native_undo() -> Self {
        Self {
            replaced_len: 0,
            inserted: String::new(),
            native: Some(EditClass::Undo),
        }
    }

    /// A delta the host editor flagged as a native redo.
    pub fn native_redo() -> Self {
        Self {
            replaced_len: 0,
            inserted: String::new(),
            native: Some(EditClass::Redo),
        }
    }
}

/// Classify one edit delta.
///
/// Undo: a span of more than one character deleted with no meaningful
/// insertion, or replaced by text less than half its length. Redo: insertion
/// more than double a non-empty replaced span. Everything else is forward.
pub fn classify_edit(delta: &EditDelta) -> EditClass {
    if let Some(native) = delta.native {
        return native;
    }

    let inserted_len = delta.inserted.chars().count();

    // Single-character spans are ordinary backspacing and overtyping.
    if delta.replaced_len > 1 {
        if delta.inserted.trim().is_empty() {
            return EditClass::Undo;
        }
        if inserted_len * 2 < delta.replaced_len {
            return EditClass::Undo;
        }
    }
    if delta.replaced_len > 0 && inserted_len > delta.replaced_len * 2 {
        return EditClass::Redo;
    }

    EditClass::Forward
}
