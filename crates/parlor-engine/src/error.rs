//! Error types for `parlor-engine`.

use parlor_core::{ValidationError, entry::EntryId, user::UserId};
use thiserror::Error;

/// Why an action was rejected. Every variant reads as a complete sentence
/// fragment suitable for showing to the user.
#[derive(Debug, Error)]
pub enum ActionError {
  /// A local precondition failed; the store was not contacted.
  #[error("{0}")]
  Validation(#[from] ValidationError),

  /// The store call failed. Local state is unchanged.
  #[error("the server could not be reached: {0}")]
  Remote(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The store no longer has the entry the write was aimed at.
  #[error("entry {0} no longer exists on the server")]
  Gone(EntryId),

  #[error("user {0} no longer exists on the server")]
  UserGone(UserId),

  /// No entry set has been loaded to check the action against.
  #[error("chat state has not been loaded yet; try again")]
  NotSynced,
}

impl ActionError {
  pub fn remote(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Remote(Box::new(e))
  }

  pub fn is_validation(&self) -> bool { matches!(self, Self::Validation(_)) }
}

#[derive(Debug, Error)]
pub enum SessionError {
  #[error("no user with id {0}")]
  UnknownUser(UserId),

  #[error("could not load user {id}: {source}")]
  Remote {
    id:     UserId,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}
