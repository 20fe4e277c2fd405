//! reqwest implementation of [`Lookup`].

use std::sync::Arc;

use reqwest::{Client, Url, cookie::Jar, header::ACCEPT};
use sift_core::{CandidateRecord, Lookup, LookupError, UsersResponse, WidgetConfig};
use tracing::warn;

use crate::{Error, Result};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// How the lookup request authenticates.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
  /// HTTP Basic username. Empty disables Basic auth.
  pub username:       String,
  pub password:       String,
  /// Session token preloaded into the cookie jar.
  pub session_cookie: Option<String>,
  /// Anti-forgery token echoed in `X-CSRF-Token`.
  pub csrf_token:     Option<String>,
}

/// Lookup over `GET <base_url><endpoint>?q=<query>`.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpLookup {
  client:      Client,
  url:         Url,
  credentials: Credentials,
}

impl HttpLookup {
  pub fn new(base_url: &str, config: &WidgetConfig, credentials: Credentials) -> Result<Self> {
    config.validate()?;
    let url = Url::parse(&format!(
      "{}{}",
      base_url.trim_end_matches('/'),
      config.endpoint
    ))
    .map_err(|_| Error::BaseUrl(base_url.to_owned()))?;

    let jar = Arc::new(Jar::default());
    if let Some(token) = &credentials.session_cookie {
      jar.add_cookie_str(&format!("{SESSION_COOKIE}={token}; Path=/"), &url);
    }

    let client = Client::builder()
      .timeout(config.request_timeout())
      .cookie_provider(jar)
      .build()?;
    Ok(Self { client, url, credentials })
  }

  pub fn url(&self) -> &Url { &self.url }
}

impl Lookup for HttpLookup {
  async fn lookup(&self, query: &str) -> Result<Vec<CandidateRecord>, LookupError> {
    let mut req = self
      .client
      .get(self.url.clone())
      .query(&[("q", query)])
      .header(ACCEPT, "application/json")
      .header("X-Requested-With", "XMLHttpRequest");

    if let Some(token) = &self.credentials.csrf_token {
      req = req.header("X-CSRF-Token", token);
    }
    if !self.credentials.username.is_empty() {
      req = req.basic_auth(&self.credentials.username, Some(&self.credentials.password));
    }

    let resp = req.send().await.map_err(classify)?;
    let status = resp.status();
    if !status.is_success() {
      warn!(%status, url = %self.url, "lookup rejected");
      return Err(LookupError::from_status(status.as_u16()));
    }

    let body: UsersResponse = resp.json().await.map_err(classify)?;
    Ok(body.users)
  }
}

fn classify(e: reqwest::Error) -> LookupError {
  if e.is_timeout() {
    LookupError::Timeout
  } else if e.is_decode() {
    LookupError::Decode(e.to_string())
  } else {
    LookupError::Network(e.to_string())
  }
}
