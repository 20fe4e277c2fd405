//! Handler for `GET <endpoint>?q=<query>`.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use sift_core::UsersResponse;

use crate::{AppState, auth::Authenticated, directory::Directory, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  /// Free-text query over name, phone and email.
  pub q:     Option<String>,
  /// Optional cap, never above the server's `max_results`.
  pub limit: Option<usize>,
}

/// `GET <endpoint>?q=...[&limit=...]` → `{"users": [...]}`
pub async fn handler<D>(
  _auth: Authenticated,
  State(state): State<AppState<D>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<UsersResponse>, ApiError>
where
  D: Directory + Clone + 'static,
{
  let query = params.q.unwrap_or_default();
  let limit = params
    .limit
    .unwrap_or(state.config.max_results)
    .min(state.config.max_results);

  let users = state
    .directory
    .search(&query, limit)
    .await
    .map_err(|e| ApiError::Directory(Box::new(e)))?;

  tracing::debug!(query = %query, hits = users.len(), "user search");
  Ok(Json(UsersResponse { users }))
}
