//! Reference lookup endpoint for the `sift` search-select widget.
//!
//! Exposes an axum [`Router`] serving `GET <endpoint>?q=<query>` over any
//! [`Directory`]. Requests are authenticated with HTTP Basic or a session
//! cookie and may be required to carry an anti-forgery token.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = sift_api::router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod directory;
pub mod error;
pub mod search;

#[cfg(test)]
mod tests;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;
pub use directory::{Directory, MemoryDirectory};
pub use error::{ApiError, LoadError};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and `SIFT_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub endpoint:           String,
  /// JSON file of users; the demo directory is served when unset.
  pub directory_path:     Option<PathBuf>,
  pub max_results:        usize,
  pub auth_username:      String,
  pub auth_password_hash: Option<String>,
  pub session_tokens:     Vec<String>,
  pub csrf_token:         Option<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               "127.0.0.1".into(),
      port:               8080,
      endpoint:           "/api/users/search".into(),
      directory_path:     None,
      max_results:        20,
      auth_username:      String::new(),
      auth_password_hash: None,
      session_tokens:     Vec::new(),
      csrf_token:         None,
    }
  }
}

impl ServerConfig {
  pub fn auth_config(&self) -> AuthConfig {
    AuthConfig {
      username:       self.auth_username.clone(),
      password_hash:  self.auth_password_hash.clone(),
      session_tokens: self.session_tokens.clone(),
      csrf_token:     self.csrf_token.clone(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<D: Directory> {
  pub directory: Arc<D>,
  pub config:    Arc<ServerConfig>,
  pub auth:      Arc<AuthConfig>,
}

impl<D: Directory> AppState<D> {
  pub fn new(directory: D, config: ServerConfig) -> Self {
    Self {
      directory: Arc::new(directory),
      auth:      Arc::new(config.auth_config()),
      config:    Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the lookup router. Any path other than the configured endpoint is a
/// 404.
pub fn router<D>(state: AppState<D>) -> Router
where
  D: Directory + Clone + 'static,
{
  let endpoint = state.config.endpoint.clone();
  Router::new()
    .route(&endpoint, get(search::handler::<D>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
