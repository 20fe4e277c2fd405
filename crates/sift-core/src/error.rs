//! Error types for `sift-core`.

use thiserror::Error;

/// Invalid widget configuration.
#[derive(Debug, Error)]
pub enum Error {
  #[error("min_search_length must be at least 1")]
  ZeroMinLength,

  #[error("endpoint must be an absolute path, got {0:?}")]
  RelativeEndpoint(String),

  #[error("request_timeout_ms must be greater than zero")]
  ZeroTimeout,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Why a lookup did not produce a result set.
///
/// Every variant is recovered inside the widget: it becomes the
/// [`Phase::Errored`](crate::widget::Phase::Errored) phase and the user can
/// keep typing to retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
  /// HTTP 401.
  #[error("authentication required")]
  AuthRequired,

  /// HTTP 404.
  #[error("lookup endpoint unavailable")]
  EndpointUnavailable,

  /// Any other non-2xx status.
  #[error("server error {0}")]
  ServerError(u16),

  /// The request exceeded the configured timeout.
  #[error("lookup timed out")]
  Timeout,

  /// The request could not be sent or the response body could not be read.
  #[error("network error: {0}")]
  Network(String),

  /// The response body was not the expected JSON.
  #[error("malformed response: {0}")]
  Decode(String),
}

impl LookupError {
  /// Message shown inside the result panel.
  pub fn user_message(&self) -> String {
    match self {
      Self::AuthRequired => "Your session has expired. Please sign in again.".into(),
      Self::EndpointUnavailable => "User search is not available.".into(),
      Self::ServerError(status) => format!("Server error {status}"),
      Self::Timeout => "Server error: the search took too long".into(),
      Self::Network(_) | Self::Decode(_) => "Search failed. Please try again.".into(),
    }
  }

  /// Map a non-success HTTP status to its error class.
  pub fn from_status(status: u16) -> Self {
    match status {
      401 => Self::AuthRequired,
      404 => Self::EndpointUnavailable,
      other => Self::ServerError(other),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_classes() {
    assert_eq!(LookupError::from_status(401), LookupError::AuthRequired);
    assert_eq!(LookupError::from_status(404), LookupError::EndpointUnavailable);
    assert_eq!(LookupError::from_status(500), LookupError::ServerError(500));
    assert_eq!(LookupError::from_status(403), LookupError::ServerError(403));
  }

  #[test]
  fn messages_differ_by_class() {
    let auth = LookupError::AuthRequired.user_message();
    let gone = LookupError::EndpointUnavailable.user_message();
    let server = LookupError::ServerError(502).user_message();
    assert_ne!(auth, gone);
    assert_eq!(server, "Server error 502");
    assert_eq!(
      LookupError::Network("reset".into()).user_message(),
      LookupError::Decode("eof".into()).user_message(),
    );
  }
}
