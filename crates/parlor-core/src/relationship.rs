//! Relationship resolution: who may talk to whom.
//!
//! Relationship state is never stored. It is derived on every poll by
//! scanning the request entries that join a pair of users.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::{
  entry::{Entry, EntryId, RequestStatus},
  user::UserId,
};

// ─── Relationship ────────────────────────────────────────────────────────────

/// The derived relationship between the viewing user and another user.
///
/// Every state except [`Relationship::None`] carries the id of the request
/// entry it was derived from, so callers can act on that request directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Relationship {
  /// No request joins the pair.
  None,
  /// The viewer sent a request that is still pending; they may cancel it.
  PendingOutgoing { request: EntryId },
  /// The other user sent a pending request; the viewer may accept or
  /// decline it.
  PendingIncoming { request: EntryId },
  /// Messages may be exchanged and the conversation is visible.
  Accepted { request: EntryId },
}

impl Relationship {
  pub fn is_accepted(&self) -> bool { matches!(self, Self::Accepted { .. }) }

  pub fn is_pending(&self) -> bool {
    matches!(
      self,
      Self::PendingOutgoing { .. } | Self::PendingIncoming { .. }
    )
  }

  /// The request entry this state was derived from.
  pub fn request_id(&self) -> Option<&EntryId> {
    match self {
      Self::None => None,
      Self::PendingOutgoing { request }
      | Self::PendingIncoming { request }
      | Self::Accepted { request } => Some(request),
    }
  }
}

impl fmt::Display for Relationship {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::None => "none",
      Self::PendingOutgoing { .. } => "pending (outgoing)",
      Self::PendingIncoming { .. } => "pending (incoming)",
      Self::Accepted { .. } => "accepted",
    })
  }
}

// ─── Conflicts ───────────────────────────────────────────────────────────────

/// More than one request joins the same pair.
///
/// The remote store has no uniqueness constraint, so two racing clients can
/// both create a request. Resolution still succeeds by picking the most
/// recent request; this records what was ignored so callers can flag it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
  "{} chat requests join {} and {}; using {chosen}, ignoring {ignored:?}",
  .ignored.len() + 1, .pair.0, .pair.1
)]
pub struct InvariantViolation {
  pub pair:    (UserId, UserId),
  pub chosen:  EntryId,
  pub ignored: Vec<EntryId>,
}

/// Result of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
  pub relationship: Relationship,
  pub conflict:     Option<InvariantViolation>,
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Derive the relationship between `me` and `other` from the full entry set.
///
/// When several requests join the pair, the most recently created one wins
/// (by creation instant, then by id) and the rest are reported in
/// [`Resolution::conflict`].
pub fn resolve(entries: &[Entry], me: &UserId, other: &UserId) -> Resolution {
  let mut requests: Vec<(&Entry, RequestStatus)> = entries
    .iter()
    .filter(|e| e.joins(me, other))
    .filter_map(|e| e.request_status().map(|status| (e, status)))
    .collect();
  requests.sort_by(|(a, _), (b, _)| a.order_key().cmp(&b.order_key()));

  let Some((chosen, status)) = requests.pop() else {
    return Resolution { relationship: Relationship::None, conflict: None };
  };

  let request = chosen.id.clone();
  let relationship = match status {
    RequestStatus::Accepted => Relationship::Accepted { request },
    RequestStatus::Pending if chosen.from_id == *me => {
      Relationship::PendingOutgoing { request }
    }
    RequestStatus::Pending => Relationship::PendingIncoming { request },
  };

  let conflict = (!requests.is_empty()).then(|| InvariantViolation {
    pair:    (me.clone(), other.clone()),
    chosen:  chosen.id.clone(),
    ignored: requests.iter().map(|(e, _)| e.id.clone()).collect(),
  });

  Resolution { relationship, conflict }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entry::{EntryBody, NewEntry, Timestamp};

  fn request(id: &str, from: &str, to: &str, status: RequestStatus, at: &str) -> Entry {
    Entry {
      id:         id.into(),
      from_id:    from.into(),
      to_id:      to.into(),
      created_at: Timestamp::parse(at),
      body:       EntryBody::Request { status },
    }
  }

  fn ids() -> (UserId, UserId) { ("amy".into(), "john".into()) }

  #[test]
  fn no_request_means_none() {
    let (amy, john) = ids();
    let entries = vec![
      request("1", "amy", "rory", RequestStatus::Accepted, "2024-01-01T00:00:00Z"),
      NewEntry::message(amy.clone(), john.clone(), "hi").into_entry("2".into()),
    ];
    let r = resolve(&entries, &amy, &john);
    assert_eq!(r.relationship, Relationship::None);
    assert_eq!(r.conflict, None);
    assert_eq!(resolve(&[], &amy, &john).relationship, Relationship::None);
  }

  #[test]
  fn pending_direction_follows_sender() {
    let (amy, john) = ids();
    let entries = vec![request(
      "1", "amy", "john", RequestStatus::Pending, "2024-01-01T00:00:00Z",
    )];

    assert_eq!(
      resolve(&entries, &amy, &john).relationship,
      Relationship::PendingOutgoing { request: "1".into() }
    );
    assert_eq!(
      resolve(&entries, &john, &amy).relationship,
      Relationship::PendingIncoming { request: "1".into() }
    );
  }

  #[test]
  fn accepted_is_symmetric() {
    let (amy, john) = ids();
    let entries = vec![request(
      "4", "john", "amy", RequestStatus::Accepted, "2024-01-01T00:00:00Z",
    )];
    let expected = Relationship::Accepted { request: "4".into() };
    assert_eq!(resolve(&entries, &amy, &john).relationship, expected);
    assert_eq!(resolve(&entries, &john, &amy).relationship, expected);
  }

  #[test]
  fn duplicates_pick_latest_and_flag_conflict() {
    let (amy, john) = ids();
    let entries = vec![
      request("7", "amy", "john", RequestStatus::Pending, "2024-01-01T00:00:00Z"),
      request("3", "john", "amy", RequestStatus::Accepted, "2024-01-02T00:00:00Z"),
      request("5", "amy", "john", RequestStatus::Pending, "2024-01-01T00:00:00Z"),
    ];
    let r = resolve(&entries, &amy, &john);
    assert_eq!(r.relationship, Relationship::Accepted { request: "3".into() });

    let conflict = r.conflict.expect("conflict flagged");
    assert_eq!(conflict.chosen, EntryId::from("3"));
    assert_eq!(conflict.ignored, vec![EntryId::from("5"), EntryId::from("7")]);
  }

  #[test]
  fn equal_timestamps_break_ties_by_id() {
    let (amy, john) = ids();
    let entries = vec![
      request("10", "john", "amy", RequestStatus::Pending, "2024-01-01T00:00:00Z"),
      request("9", "amy", "john", RequestStatus::Accepted, "2024-01-01T00:00:00Z"),
    ];
    // "10" > "9" numerically, so the pending request wins.
    assert_eq!(
      resolve(&entries, &amy, &john).relationship,
      Relationship::PendingIncoming { request: "10".into() }
    );
  }
}
