//! Error types for `sift-client`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid widget configuration: {0}")]
  Config(#[from] sift_core::Error),

  #[error("invalid base url {0:?}")]
  BaseUrl(String),

  #[error("failed to build HTTP client: {0}")]
  Client(#[from] reqwest::Error),

  #[error("widget driver has shut down")]
  DriverClosed,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
