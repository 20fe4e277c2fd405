//! Per-instance widget configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Options a host passes when constructing a widget. Every field has a
/// default, so an empty TOML table or `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
  pub placeholder:        String,
  pub no_results_text:    String,
  pub loading_text:       String,
  /// Trimmed queries shorter than this (in characters) never hit the server.
  pub min_search_length:  usize,
  pub debounce_ms:        u64,
  /// Path of the lookup endpoint, joined onto the host's base URL.
  pub endpoint:           String,
  /// Upper bound on a single lookup. Expiry is reported as a server error.
  pub request_timeout_ms: u64,
  /// How long the result list survives focus leaving the widget, so a pointer
  /// pick inside the list still lands.
  pub blur_grace_ms:      u64,
  /// Display cap for the result list.
  pub max_results:        usize,
}

impl Default for WidgetConfig {
  fn default() -> Self {
    Self {
      placeholder:        "Search by name, phone or email…".into(),
      no_results_text:    "No users found".into(),
      loading_text:       "Searching…".into(),
      min_search_length:  2,
      debounce_ms:        300,
      endpoint:           "/api/users/search".into(),
      request_timeout_ms: 10_000,
      blur_grace_ms:      150,
      max_results:        10,
    }
  }
}

impl WidgetConfig {
  pub fn validate(&self) -> Result<()> {
    if self.min_search_length == 0 {
      return Err(Error::ZeroMinLength);
    }
    if !self.endpoint.starts_with('/') {
      return Err(Error::RelativeEndpoint(self.endpoint.clone()));
    }
    if self.request_timeout_ms == 0 {
      return Err(Error::ZeroTimeout);
    }
    Ok(())
  }

  pub fn debounce(&self) -> Duration { Duration::from_millis(self.debounce_ms) }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_millis(self.request_timeout_ms)
  }

  pub fn blur_grace(&self) -> Duration { Duration::from_millis(self.blur_grace_ms) }
}
