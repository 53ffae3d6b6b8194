//! Handlers for `/entries` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/entries` | The whole collection, no paging |
//! | `POST`   | `/entries` | Wire record without `id`; `createdAt` defaults to now |
//! | `GET`    | `/entries/:id` | 404 if not found |
//! | `PUT`    | `/entries/:id` | Full record; the path id wins over any body id |
//! | `DELETE` | `/entries/:id` | 204, or 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use parlor_core::{
  entry::{Entry, EntryId, NewEntry},
  store::EntryStore,
  wire::WireEntry,
};

use crate::error::ApiError;

fn body(payload: Result<Json<WireEntry>, JsonRejection>) -> Result<WireEntry, ApiError> {
  payload
    .map(|Json(wire)| wire)
    .map_err(|e| ApiError::BadRequest(e.body_text()))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /entries`
pub async fn list<S: EntryStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Entry>>, ApiError> {
  let entries = store.list_entries().await.map_err(ApiError::store)?;
  Ok(Json(entries))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /entries`
pub async fn create<S: EntryStore>(
  State(store): State<Arc<S>>,
  payload: Result<Json<WireEntry>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let new = NewEntry::try_from(body(payload)?)?;
  let entry = store.create_entry(new).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /entries/:id`
pub async fn get_one<S: EntryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Entry>, ApiError> {
  let entry = store
    .get_entry(EntryId::new(&id))
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("entry {id} not found")))?;
  Ok(Json(entry))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /entries/:id`
pub async fn update<S: EntryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  payload: Result<Json<WireEntry>, JsonRejection>,
) -> Result<Json<Entry>, ApiError> {
  let mut wire = body(payload)?;
  wire.id = Some(id.clone());
  let entry = Entry::try_from(wire)?;
  let updated = store
    .update_entry(entry)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("entry {id} not found")))?;
  Ok(Json(updated))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /entries/:id`
pub async fn delete<S: EntryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
  let deleted = store
    .delete_entry(EntryId::new(&id))
    .await
    .map_err(ApiError::store)?;
  if !deleted {
    return Err(ApiError::NotFound(format!("entry {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}
