//! Router tests driven through `tower::ServiceExt::oneshot`.

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt as _;

use crate::{AppState, MemoryDirectory, ServerConfig, router};

fn app(config: ServerConfig) -> axum::Router {
  router(AppState::new(MemoryDirectory::demo(), config))
}

async fn get(app: axum::Router, uri: &str, headers: &[(&str, &str)]) -> (StatusCode, Value) {
  let mut req = Request::builder().uri(uri);
  for (name, value) in headers {
    req = req.header(*name, *value);
  }
  let resp = app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, json)
}

#[tokio::test]
async fn search_returns_users_object() {
  let (status, body) = get(app(ServerConfig::default()), "/api/users/search?q=ali", &[]).await;
  assert_eq!(status, StatusCode::OK);
  let users = body["users"].as_array().unwrap();
  assert_eq!(users.len(), 2);
  assert!(users.iter().any(|u| u["id"] == 7 && u["first_name"] == "Ali"));
}

#[tokio::test]
async fn missing_query_is_empty_list() {
  let (status, body) = get(app(ServerConfig::default()), "/api/users/search", &[]).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["users"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn limit_is_capped_by_server() {
  let config = ServerConfig { max_results: 1, ..ServerConfig::default() };
  let (_, body) = get(app(config), "/api/users/search?q=a&limit=50", &[]).await;
  assert_eq!(body["users"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn unknown_path_is_404() {
  let (status, _) = get(app(ServerConfig::default()), "/api/people", &[]).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn custom_endpoint() {
  let config = ServerConfig { endpoint: "/admin/lookup".into(), ..ServerConfig::default() };
  let (status, _) = get(app(config.clone()), "/admin/lookup?q=sa", &[]).await;
  assert_eq!(status, StatusCode::OK);
  let (status, _) = get(app(config), "/api/users/search?q=sa", &[]).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unauthenticated_is_401_with_challenge() {
  let config = ServerConfig {
    session_tokens: vec!["tok".into()],
    ..ServerConfig::default()
  };
  let resp = app(config)
    .oneshot(
      Request::builder()
        .uri("/api/users/search?q=ali")
        .body(Body::empty())
        .unwrap(),
    )
    .await
    .unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn session_cookie_and_csrf() {
  let config = ServerConfig {
    session_tokens: vec!["tok".into()],
    csrf_token: Some("abc".into()),
    ..ServerConfig::default()
  };

  let (status, body) = get(
    app(config.clone()),
    "/api/users/search?q=ali",
    &[("cookie", "session=tok"), ("x-csrf-token", "abc")],
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["users"].is_array());

  let (status, body) = get(
    app(config),
    "/api/users/search?q=ali",
    &[("cookie", "session=tok"), ("x-csrf-token", "zzz")],
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["error"], "invalid anti-forgery token");
}
