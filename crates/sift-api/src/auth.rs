//! Request authentication: HTTP Basic or a session cookie, plus an optional
//! anti-forgery token check.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

use crate::{AppState, directory::Directory, error::ApiError};

/// Name of the cookie carrying a session token.
pub const SESSION_COOKIE: &str = "session";

/// Header carrying the anti-forgery token.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Credentials accepted by this server instance.
#[derive(Clone, Default)]
pub struct AuthConfig {
  /// Basic-auth username. Empty disables Basic auth.
  pub username:       String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash:  Option<String>,
  /// Session tokens accepted in the `session` cookie.
  pub session_tokens: Vec<String>,
  /// When set, every request must echo it in `X-CSRF-Token`.
  pub csrf_token:     Option<String>,
}

impl AuthConfig {
  /// No credentials configured: every request is authenticated.
  pub fn is_open(&self) -> bool {
    self.username.is_empty() && self.session_tokens.is_empty()
  }
}

/// Zero-size marker: present in the handler means the request was authenticated.
pub struct Authenticated;

/// Verify a request's credentials and anti-forgery token.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), ApiError> {
  if !config.is_open() && !has_session(headers, config) {
    verify_basic(headers, config)?;
  }

  if let Some(expected) = &config.csrf_token {
    let got = headers.get(CSRF_HEADER).and_then(|v| v.to_str().ok());
    if got != Some(expected.as_str()) {
      return Err(ApiError::Forbidden("invalid anti-forgery token".into()));
    }
  }
  Ok(())
}

fn has_session(headers: &HeaderMap, config: &AuthConfig) -> bool {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .any(|(name, value)| {
      name == SESSION_COOKIE && config.session_tokens.iter().any(|t| t == value)
    })
}

fn verify_basic(headers: &HeaderMap, config: &AuthConfig) -> Result<(), ApiError> {
  if config.username.is_empty() {
    return Err(ApiError::Unauthorized);
  }

  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  if username != config.username {
    return Err(ApiError::Unauthorized);
  }

  let hash = config.password_hash.as_deref().ok_or(ApiError::Unauthorized)?;
  let parsed_hash = PasswordHash::new(hash).map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(())
}

impl<D> FromRequestParts<AppState<D>> for Authenticated
where
  D: Directory + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<D>,
  ) -> Result<Self, Self::Rejection> {
    verify_auth(&parts.headers, &state.auth)?;
    Ok(Authenticated)
  }
}
