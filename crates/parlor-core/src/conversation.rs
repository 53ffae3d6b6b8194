//! Conversation projection.
//!
//! A conversation is recomputed from scratch on every poll, never patched, so
//! a transient misordering caused by clock skew disappears on the next pass.

use crate::{entry::Entry, user::UserId};

/// The messages exchanged between exactly `a` and `b`, oldest first.
///
/// Messages are ordered by creation instant; equal instants fall back to the
/// entry id so the order is total and stable across polls. Requests are
/// skipped. Whether the pair is allowed to see the conversation is the
/// caller's concern (see [`crate::relationship::resolve`]).
pub fn project<'a>(entries: &'a [Entry], a: &UserId, b: &UserId) -> Vec<&'a Entry> {
  let mut messages: Vec<&Entry> = entries
    .iter()
    .filter(|e| e.text().is_some() && e.joins(a, b))
    .collect();
  messages.sort_by(|x, y| x.order_key().cmp(&y.order_key()));
  messages
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entry::{EntryBody, EntryId, RequestStatus, Timestamp};

  fn message(id: &str, from: &str, to: &str, text: &str, at: &str) -> Entry {
    Entry {
      id:         id.into(),
      from_id:    from.into(),
      to_id:      to.into(),
      created_at: Timestamp::parse(at),
      body:       EntryBody::Message { text: text.into() },
    }
  }

  fn ids(projected: &[&Entry]) -> Vec<EntryId> {
    projected.iter().map(|e| e.id.clone()).collect()
  }

  #[test]
  fn keeps_only_the_pair_and_only_messages() {
    let entries = vec![
      message("1", "amy", "john", "hi john", "2024-01-01T00:00:01Z"),
      message("2", "amy", "rory", "hi rory", "2024-01-01T00:00:02Z"),
      message("3", "john", "amy", "hi amy", "2024-01-01T00:00:03Z"),
      Entry {
        id:         "4".into(),
        from_id:    "amy".into(),
        to_id:      "john".into(),
        created_at: Timestamp::parse("2024-01-01T00:00:00Z"),
        body:       EntryBody::Request { status: RequestStatus::Accepted },
      },
    ];
    let convo = project(&entries, &"amy".into(), &"john".into());
    assert_eq!(ids(&convo), vec![EntryId::from("1"), EntryId::from("3")]);
  }

  #[test]
  fn orders_by_instant_not_by_text() {
    let entries = vec![
      message("1", "amy", "john", "later", "2024-01-01T02:00:00+01:00"),
      message("2", "john", "amy", "earlier", "2024-01-01T00:30:00Z"),
    ];
    let convo = project(&entries, &"amy".into(), &"john".into());
    assert_eq!(ids(&convo), vec![EntryId::from("2"), EntryId::from("1")]);
  }

  #[test]
  fn equal_instants_order_by_id() {
    let entries = vec![
      message("5", "amy", "john", "five", "2024-01-01T00:00:00Z"),
      message("3", "john", "amy", "three", "2024-01-01T00:00:00Z"),
    ];
    let convo = project(&entries, &"amy".into(), &"john".into());
    assert_eq!(ids(&convo), vec![EntryId::from("3"), EntryId::from("5")]);
  }

  #[test]
  fn projection_is_idempotent() {
    let entries = vec![
      message("2", "amy", "john", "b", "2024-01-01T00:00:00Z"),
      message("1", "john", "amy", "a", "2024-01-01T00:00:00Z"),
      message("3", "amy", "john", "c", "not a date"),
    ];
    let (amy, john) = ("amy".into(), "john".into());
    let first = ids(&project(&entries, &amy, &john));
    let second = ids(&project(&entries, &amy, &john));
    assert_eq!(first, second);
    assert_eq!(first[0], EntryId::from("3"), "unparseable stamps sort first");
  }
}
