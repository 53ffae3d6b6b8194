//! Handlers for `/users` endpoints.
//!
//! Profile bodies are validated before they reach the store; a failure is a
//! 400 with the validation message.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use parlor_core::{
  store::UserStore,
  user::{Profile, User, UserId},
};

use crate::error::ApiError;

fn profile(payload: Result<Json<Profile>, JsonRejection>) -> Result<Profile, ApiError> {
  let Json(profile) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  Ok(profile.validated()?)
}

/// `GET /users`
pub async fn list<S: UserStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<User>>, ApiError> {
  let users = store.list_users().await.map_err(ApiError::store)?;
  Ok(Json(users))
}

/// `POST /users`
pub async fn create<S: UserStore>(
  State(store): State<Arc<S>>,
  payload: Result<Json<Profile>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let user = store
    .create_user(profile(payload)?)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/:id`
pub async fn get_one<S: UserStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
  let user = store
    .get_user(UserId::new(&id))
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user))
}

/// `PUT /users/:id`
pub async fn update<S: UserStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  payload: Result<Json<Profile>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
  let profile = profile(payload)?;
  let user = store
    .update_profile(UserId::new(&id), profile)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user))
}
