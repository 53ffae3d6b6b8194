//! JSON REST backend for Parlor.
//!
//! Serves the same flat records as the hosted mock API the chat clients were
//! written against, backed by any store that implements both
//! [`EntryStore`] and [`UserStore`]. There are no business rules here: the
//! server stores what it is given, exactly like the hosted service.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(parlor_api::api_router(store.clone()))
//! ```

pub mod entries;
pub mod error;
pub mod users;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use parlor_core::store::{EntryStore, UserStore};
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PARLOR_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: EntryStore + UserStore + 'static,
{
  Router::new()
    // Entries
    .route("/entries", get(entries::list::<S>).post(entries::create::<S>))
    .route(
      "/entries/{id}",
      get(entries::get_one::<S>)
        .put(entries::update::<S>)
        .delete(entries::delete::<S>),
    )
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route("/users/{id}", get(users::get_one::<S>).put(users::update::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests;
