//! `HttpLookup` against live axum servers on ephemeral ports.

use std::{sync::Arc, time::Duration};

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  Json, Router,
  http::{HeaderMap, StatusCode},
  routing::get,
};
use serde_json::json;
use sift_api::{AppState, MemoryDirectory, ServerConfig};
use sift_client::{Credentials, Driver, HttpLookup};
use sift_core::{Lookup, LookupError, SearchSelect, WidgetConfig, view::PanelView};
use rand_core::OsRng;
use tokio::net::TcpListener;

async fn serve(app: Router) -> String {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
  format!("http://{addr}")
}

async fn serve_directory(config: ServerConfig) -> String {
  serve(sift_api::router(AppState::new(MemoryDirectory::demo(), config))).await
}

fn lookup(base: &str, credentials: Credentials) -> HttpLookup {
  HttpLookup::new(base, &WidgetConfig::default(), credentials).unwrap()
}

#[tokio::test]
async fn returns_users_in_order() {
  let base = serve_directory(ServerConfig::default()).await;
  let users = lookup(&base, Credentials::default()).lookup("0935").await.unwrap();
  assert_eq!(users.len(), 1);
  assert_eq!(users[0].id.to_string(), "8");
  assert_eq!(users[0].initials(), "SK");
}

#[tokio::test]
async fn missing_session_is_auth_required() {
  let base = serve_directory(ServerConfig {
    session_tokens: vec!["tok".into()],
    ..ServerConfig::default()
  })
  .await;
  let err = lookup(&base, Credentials::default()).lookup("al").await.unwrap_err();
  assert_eq!(err, LookupError::AuthRequired);
}

#[tokio::test]
async fn session_cookie_and_csrf_token_are_sent() {
  let base = serve_directory(ServerConfig {
    session_tokens: vec!["tok".into()],
    csrf_token: Some("abc".into()),
    ..ServerConfig::default()
  })
  .await;

  let good = Credentials {
    session_cookie: Some("tok".into()),
    csrf_token: Some("abc".into()),
    ..Credentials::default()
  };
  assert!(lookup(&base, good).lookup("ali").await.is_ok());

  let no_csrf = Credentials {
    session_cookie: Some("tok".into()),
    ..Credentials::default()
  };
  assert_eq!(
    lookup(&base, no_csrf).lookup("ali").await.unwrap_err(),
    LookupError::ServerError(403)
  );
}

#[tokio::test]
async fn basic_credentials_are_checked() {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(b"secret", &salt)
    .unwrap()
    .to_string();
  let base = serve_directory(ServerConfig {
    auth_username: "admin".into(),
    auth_password_hash: Some(hash),
    ..ServerConfig::default()
  })
  .await;

  let good = Credentials {
    username: "admin".into(),
    password: "secret".into(),
    ..Credentials::default()
  };
  let users = lookup(&base, good.clone()).lookup("ali").await.unwrap();
  assert_eq!(users.len(), 2);

  let wrong = Credentials { password: "nope".into(), ..good };
  assert_eq!(
    lookup(&base, wrong).lookup("ali").await.unwrap_err(),
    LookupError::AuthRequired
  );
  assert_eq!(
    lookup(&base, Credentials::default()).lookup("ali").await.unwrap_err(),
    LookupError::AuthRequired
  );
}

#[tokio::test]
async fn wrong_endpoint_is_unavailable() {
  let base = serve_directory(ServerConfig {
    endpoint: "/elsewhere".into(),
    ..ServerConfig::default()
  })
  .await;
  let err = lookup(&base, Credentials::default()).lookup("al").await.unwrap_err();
  assert_eq!(err, LookupError::EndpointUnavailable);
}

#[tokio::test]
async fn other_statuses_are_server_errors() {
  let app = Router::new().route(
    "/api/users/search",
    get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
  );
  let base = serve(app).await;
  let err = lookup(&base, Credentials::default()).lookup("al").await.unwrap_err();
  assert_eq!(err, LookupError::ServerError(502));
}

#[tokio::test]
async fn non_json_body_is_decode_error() {
  let app = Router::new().route("/api/users/search", get(|| async { "<html>login</html>" }));
  let base = serve(app).await;
  let err = lookup(&base, Credentials::default()).lookup("al").await.unwrap_err();
  assert!(matches!(err, LookupError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn request_markers_are_present() {
  let app = Router::new().route(
    "/api/users/search",
    get(|headers: HeaderMap| async move {
      let ajax = headers.get("x-requested-with").and_then(|v| v.to_str().ok());
      let accept = headers.get("accept").and_then(|v| v.to_str().ok());
      if ajax == Some("XMLHttpRequest") && accept == Some("application/json") {
        (StatusCode::OK, Json(json!({ "users": [] })))
      } else {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": "missing markers" })))
      }
    }),
  );
  let base = serve(app).await;
  let users = lookup(&base, Credentials::default()).lookup("al").await.unwrap();
  assert!(users.is_empty());
}

#[tokio::test]
async fn slow_server_times_out() {
  let app = Router::new().route(
    "/api/users/search",
    get(|| async {
      tokio::time::sleep(Duration::from_secs(5)).await;
      Json(json!({ "users": [] }))
    }),
  );
  let base = serve(app).await;
  let config = WidgetConfig { request_timeout_ms: 200, ..Default::default() };
  let lookup = HttpLookup::new(&base, &config, Credentials::default()).unwrap();
  assert_eq!(lookup.lookup("al").await.unwrap_err(), LookupError::Timeout);
}

#[tokio::test]
async fn refused_connection_is_network_error() {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);
  let err = lookup(&format!("http://{addr}"), Credentials::default())
    .lookup("al")
    .await
    .unwrap_err();
  assert!(matches!(err, LookupError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn bad_base_url_is_rejected() {
  let res = HttpLookup::new("not a url", &WidgetConfig::default(), Credentials::default());
  assert!(matches!(res, Err(sift_client::Error::BaseUrl(_))));
}

#[tokio::test]
async fn driver_end_to_end() {
  let base = serve_directory(ServerConfig::default()).await;
  let config = WidgetConfig { debounce_ms: 20, ..Default::default() };
  let lookup = Arc::new(HttpLookup::new(&base, &config, Credentials::default()).unwrap());
  let (mut handle, _task) = Driver::spawn(SearchSelect::new(config), lookup);

  handle.input("al").await.unwrap();
  let view = tokio::time::timeout(Duration::from_secs(5), async {
    loop {
      let view = handle.changed().await.unwrap();
      if matches!(view.panel, Some(PanelView::Items(_))) {
        return view;
      }
    }
  })
  .await
  .expect("results within five seconds");

  assert!(view.items().iter().any(|i| i.id == "7" && i.initials == "AR"));
}
