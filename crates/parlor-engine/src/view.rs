//! Read-side views computed from a [`Snapshot`].

use parlor_core::{
  conversation,
  entry::Entry,
  relationship::{Relationship, resolve},
  roster::Roster,
  user::{User, UserId},
};
use tracing::warn;

use crate::sync::Snapshot;

/// [`resolve`], logging any duplicate-request conflict.
pub fn relationship(entries: &[Entry], me: &UserId, other: &UserId) -> Relationship {
  let resolution = resolve(entries, me, other);
  if let Some(conflict) = &resolution.conflict {
    warn!(%conflict, "duplicate chat requests");
  }
  resolution.relationship
}

/// [`Roster::build`], logging any duplicate-request conflicts.
pub fn roster<'a>(users: &'a [User], entries: &[Entry], me: &UserId) -> Roster<'a> {
  let roster = Roster::build(users, entries, me);
  for conflict in &roster.conflicts {
    warn!(%conflict, "duplicate chat requests");
  }
  roster
}

/// What the viewer sees when they open a chat with one other user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
  pub other:        UserId,
  pub relationship: Relationship,
  /// Messages in display order. Empty unless the relationship is accepted.
  pub timeline:     Vec<Entry>,
}

impl ChatView {
  pub fn build(snapshot: &Snapshot, me: &UserId, other: &UserId) -> Self {
    let relationship = relationship(&snapshot.entries, me, other);
    let timeline = if relationship.is_accepted() {
      conversation::project(&snapshot.entries, me, other)
        .into_iter()
        .cloned()
        .collect()
    } else {
      Vec::new()
    };
    Self { other: other.clone(), relationship, timeline }
  }

  pub fn can_send(&self) -> bool { self.relationship.is_accepted() }
}
