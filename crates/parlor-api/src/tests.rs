//! Router tests: requests go through `tower::ServiceExt::oneshot` against an
//! in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use parlor_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  api_router(Arc::new(store))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn request_body(from: &str, to: &str) -> Value {
  json!({ "fromId": from, "toId": to, "type": "request", "status": "pending" })
}

// ── Entries ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn post_entry_assigns_id_and_timestamp() {
  let app = app().await;

  let resp = send(&app, "POST", "/entries", Some(request_body("1", "2"))).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created = json_body(resp).await;
  assert_eq!(created["id"], "1");
  assert_eq!(created["type"], "request");
  assert!(created["createdAt"].as_str().is_some_and(|s| !s.is_empty()));

  let resp = send(&app, "GET", "/entries", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await, json!([created]));
}

#[tokio::test]
async fn numeric_ids_in_bodies_are_accepted() {
  let app = app().await;
  let resp = send(
    &app,
    "POST",
    "/entries",
    Some(json!({ "fromId": 1, "toId": 2, "type": "chat", "status": "accepted", "text": "hi" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created = json_body(resp).await;
  assert_eq!(created["fromId"], "1");
  assert_eq!(created["text"], "hi");
}

#[tokio::test]
async fn malformed_entries_are_bad_requests() {
  let app = app().await;

  let resp = send(
    &app,
    "POST",
    "/entries",
    Some(json!({ "fromId": "1", "toId": "2", "type": "chat", "status": "pending", "text": "x" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(resp).await["error"].as_str().is_some());

  let resp = send(&app, "POST", "/entries", Some(json!({ "sender": "Amy" }))).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(resp).await["error"].as_str().is_some());
}

#[tokio::test]
async fn put_replaces_and_path_id_wins() {
  let app = app().await;
  send(&app, "POST", "/entries", Some(request_body("1", "2"))).await;

  let mut accepted = request_body("1", "2");
  accepted["id"] = json!("99");
  accepted["status"] = json!("accepted");
  accepted["createdAt"] = json!("2024-01-01T00:00:00Z");

  let resp = send(&app, "PUT", "/entries/1", Some(accepted.clone())).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let updated = json_body(resp).await;
  assert_eq!(updated["id"], "1");
  assert_eq!(updated["status"], "accepted");

  let resp = send(&app, "GET", "/entries/1", None).await;
  assert_eq!(json_body(resp).await, updated);

  let resp = send(&app, "PUT", "/entries/7", Some(accepted)).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_returns_no_content_then_not_found() {
  let app = app().await;
  send(&app, "POST", "/entries", Some(request_body("1", "2"))).await;

  let resp = send(&app, "DELETE", "/entries/1", None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let resp = send(&app, "DELETE", "/entries/1", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let resp = send(&app, "GET", "/entries/1", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── Users ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_and_edit_a_user() {
  let app = app().await;

  let resp = send(
    &app,
    "POST",
    "/users",
    Some(json!({ "fullName": "  Amy ", "email": "amy@example.com", "UserImage": "" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let amy = json_body(resp).await;
  assert_eq!(amy, json!({ "id": "1", "fullName": "Amy", "email": "amy@example.com" }));

  let resp = send(
    &app,
    "PUT",
    "/users/1",
    Some(json!({
      "fullName": "Amy Pond",
      "email": "amy@example.com",
      "UserImage": "https://example.com/amy.png"
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["UserImage"], "https://example.com/amy.png");

  let resp = send(&app, "GET", "/users", None).await;
  let users = json_body(resp).await;
  assert_eq!(users.as_array().map(Vec::len), Some(1));
  assert_eq!(users[0]["fullName"], "Amy Pond");
}

#[tokio::test]
async fn invalid_profiles_are_rejected() {
  let app = app().await;
  send(
    &app,
    "POST",
    "/users",
    Some(json!({ "fullName": "Amy", "email": "amy@example.com" })),
  )
  .await;

  let resp = send(
    &app,
    "PUT",
    "/users/1",
    Some(json!({ "fullName": "Amy", "email": "amy@example.com", "UserImage": "javascript:alert(1)" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let resp = send(&app, "POST", "/users", Some(json!({ "fullName": "", "email": "x@y" }))).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(json_body(resp).await["error"], "a display name is required");

  let resp = send(&app, "GET", "/users/1", None).await;
  assert_eq!(json_body(resp).await["fullName"], "Amy");
}

#[tokio::test]
async fn unknown_users_are_not_found() {
  let app = app().await;
  let resp = send(&app, "GET", "/users/3", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let resp = send(
    &app,
    "PUT",
    "/users/3",
    Some(json!({ "fullName": "Rory", "email": "rory@example.com" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
