//! Caller-visible errors for transit tool calls.
//!
//! Only malformed input and upstream failures ever reach a caller. Cache
//! problems and malformed payloads are recovered inside the cache layer.

use thiserror::Error;

use crate::pagination::InvalidCursor;

#[derive(Error, Debug)]
pub enum PoaError {
  #[error(transparent)]
  InvalidCursor(#[from] InvalidCursor),

  #[error("Invalid route id: must be a non-empty string")]
  InvalidRouteId,

  #[error("Upstream request to {url} failed: {reason}")]
  UpstreamUnavailable { url: String, reason: String },
}

impl PoaError {
  /// Build an upstream failure from any displayable cause.
  pub fn upstream(url: impl Into<String>, reason: impl ToString) -> Self {
    Self::UpstreamUnavailable {
      url: url.into(),
      reason: reason.to_string(),
    }
  }

  /// Whether the failure was caused by the caller's input rather than the service.
  pub fn is_invalid_input(&self) -> bool {
    matches!(self, Self::InvalidCursor(_) | Self::InvalidRouteId)
  }
}

pub type Result<T> = std::result::Result<T, PoaError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_input_errors_are_classified() {
    let cursor = PoaError::from(InvalidCursor::new("bad base64"));
    assert!(cursor.is_invalid_input());
    assert!(PoaError::InvalidRouteId.is_invalid_input());
  }

  #[test]
  fn test_upstream_error_is_not_invalid_input() {
    let err = PoaError::upstream("http://example.test/", "connection refused");
    assert!(!err.is_invalid_input());
    assert_eq!(
      err.to_string(),
      "Upstream request to http://example.test/ failed: connection refused"
    );
  }
}
