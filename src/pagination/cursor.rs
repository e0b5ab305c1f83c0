//! Opaque pagination cursors.
//!
//! A cursor is base64-encoded JSON of the form `{"offset": n}`. Callers must
//! treat it as opaque; only round-trip fidelity is guaranteed.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Any malformed cursor. All decode failures share this one kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid pagination cursor: {reason}")]
pub struct InvalidCursor {
  reason: String,
}

impl InvalidCursor {
  pub fn new(reason: impl Into<String>) -> Self {
    Self {
      reason: reason.into(),
    }
  }
}

#[derive(Serialize)]
struct CursorPayload {
  offset: usize,
}

/// Encode an offset into a cursor.
pub fn encode(offset: usize) -> String {
  // Serializing a struct with one integer field cannot fail.
  let json = serde_json::to_vec(&CursorPayload { offset }).unwrap_or_default();
  STANDARD.encode(json)
}

/// Decode a cursor into an offset. An absent or empty cursor is the start.
pub fn decode(cursor: Option<&str>) -> Result<usize, InvalidCursor> {
  let cursor = match cursor {
    Some(c) if !c.is_empty() => c,
    _ => return Ok(0),
  };

  let bytes = STANDARD
    .decode(cursor)
    .map_err(|e| InvalidCursor::new(format!("not base64 ({})", e)))?;

  let payload: Value = serde_json::from_slice(&bytes)
    .map_err(|e| InvalidCursor::new(format!("not JSON ({})", e)))?;

  let offset = payload
    .get("offset")
    .ok_or_else(|| InvalidCursor::new("offset is missing"))?;

  let offset = offset
    .as_u64()
    .ok_or_else(|| InvalidCursor::new("offset must be a non-negative integer"))?;

  usize::try_from(offset).map_err(|_| InvalidCursor::new("offset is out of range"))
}
