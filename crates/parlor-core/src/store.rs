//! The `EntryStore` and `UserStore` traits.
//!
//! Both collections live behind a generic REST CRUD service with no business
//! logic of its own. The traits are implemented by `parlor-client` (the
//! remote service) and `parlor-store-sqlite` (a local stand-in). Higher layers
//! (`parlor-engine`, `parlor-api`) depend on these abstractions, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  entry::{Entry, EntryId, NewEntry},
  user::{Profile, User, UserId},
};

/// The shared collection of requests and messages.
///
/// The store is an opaque, eventually consistent source of truth. It does not
/// enforce any relationship rule; all of that happens client-side.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait EntryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the entire collection. There is no paging or filtering.
  fn list_entries(
    &self,
  ) -> impl Future<Output = Result<Vec<Entry>, Self::Error>> + Send + '_;

  /// Retrieve one entry. Returns `None` if not found.
  fn get_entry(
    &self,
    id: EntryId,
  ) -> impl Future<Output = Result<Option<Entry>, Self::Error>> + Send + '_;

  /// Persist a new entry; the store assigns its id.
  fn create_entry(
    &self,
    entry: NewEntry,
  ) -> impl Future<Output = Result<Entry, Self::Error>> + Send + '_;

  /// Replace the stored record that has `entry.id` with `entry`.
  /// Returns `None` if no such record exists.
  fn update_entry(
    &self,
    entry: Entry,
  ) -> impl Future<Output = Result<Option<Entry>, Self::Error>> + Send + '_;

  /// Remove an entry. Returns `false` if it was already gone.
  fn delete_entry(
    &self,
    id: EntryId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

/// The user directory. Read-only from the chat core's point of view; writes
/// are limited to registration and profile edits.
pub trait UserStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// List every known user.
  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Register a new user; the store assigns the id.
  ///
  /// `profile` is expected to have passed [`Profile::validated`].
  fn create_user(
    &self,
    profile: Profile,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Overwrite the profile fields of `id`. Returns `None` if not found.
  fn update_profile(
    &self,
    id: UserId,
    profile: Profile,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;
}
