//! Error types for `parlor-core`.

use thiserror::Error;

use crate::{entry::EntryId, relationship::Relationship};

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed entry {id}: {reason}")]
  MalformedEntry { id: String, reason: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A local precondition failure. Raised before any remote store is contacted,
/// and always worded so it can be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  // ── Requests ────────────────────────────────────────────────────────────
  #[error("you cannot send a chat request to yourself")]
  SelfRequest,

  #[error("a chat request with this user already exists (entry {existing})")]
  DuplicateRequest { existing: EntryId },

  #[error("chat request {0} was not found")]
  UnknownRequest(EntryId),

  #[error("entry {0} is a message, not a chat request")]
  NotARequest(EntryId),

  #[error("only the recipient can respond to this chat request")]
  NotRecipient,

  #[error("only the sender can cancel this chat request")]
  NotSender,

  #[error("this chat request is no longer pending")]
  NotPending,

  #[error("there is no pending chat request {0} this user")]
  NoPendingRequest(&'static str),

  // ── Messages ────────────────────────────────────────────────────────────
  #[error("cannot send an empty message")]
  EmptyMessage,

  #[error("you can only message accepted contacts (relationship is {0})")]
  NotConnected(Relationship),

  // ── Profiles ────────────────────────────────────────────────────────────
  #[error("a display name is required")]
  MissingName,

  #[error("invalid email address: {0:?}")]
  InvalidEmail(String),

  #[error("profile image must be an absolute http(s) URL: {0:?}")]
  InvalidImageUrl(String),
}
