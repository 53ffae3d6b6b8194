//! Roster: every other user, split into accepted contacts and everyone else.

use crate::{
  entry::Entry,
  relationship::{InvariantViolation, Relationship, resolve},
  user::{User, UserId},
};

/// One user as seen from the viewer, with the relationship that decides which
/// badge (outgoing / incoming request) a front end shows next to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow<'a> {
  pub user:         &'a User,
  pub relationship: Relationship,
}

/// All users other than the viewer, grouped by relationship.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster<'a> {
  /// Users the viewer can message.
  pub contacts:  Vec<RosterRow<'a>>,
  /// Everyone else, including users with a pending request either way.
  pub others:    Vec<RosterRow<'a>>,
  /// Duplicate-request conflicts met while resolving rows.
  pub conflicts: Vec<InvariantViolation>,
}

impl<'a> Roster<'a> {
  /// Build the roster for `me`. Rows are sorted by display name
  /// (case-insensitive), then by id.
  pub fn build(users: &'a [User], entries: &[Entry], me: &UserId) -> Self {
    let mut others: Vec<&User> = users.iter().filter(|u| u.id != *me).collect();
    others.sort_by(|a, b| {
      a.display_name()
        .to_lowercase()
        .cmp(&b.display_name().to_lowercase())
        .then_with(|| a.id.cmp(&b.id))
    });

    let mut roster = Self::default();
    for user in others {
      let resolution = resolve(entries, me, &user.id);
      roster.conflicts.extend(resolution.conflict);
      let row = RosterRow { user, relationship: resolution.relationship };
      if row.relationship.is_accepted() {
        roster.contacts.push(row);
      } else {
        roster.others.push(row);
      }
    }
    roster
  }

  /// Users waiting for the viewer to accept or decline their request.
  pub fn incoming(&self) -> impl Iterator<Item = &RosterRow<'a>> {
    self
      .others
      .iter()
      .filter(|row| matches!(row.relationship, Relationship::PendingIncoming { .. }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entry::{EntryBody, RequestStatus, Timestamp};

  fn user(id: &str, name: &str) -> User {
    User {
      id:        id.into(),
      full_name: name.into(),
      email:     None,
      image:     None,
    }
  }

  fn request(id: &str, from: &str, to: &str, status: RequestStatus) -> Entry {
    Entry {
      id:         id.into(),
      from_id:    from.into(),
      to_id:      to.into(),
      created_at: Timestamp::parse("2024-01-01T00:00:00Z"),
      body:       EntryBody::Request { status },
    }
  }

  #[test]
  fn splits_contacts_from_others() {
    let users = vec![
      user("1", "amy"),
      user("2", "Rory"),
      user("3", "John"),
      user("4", "clara"),
      user("5", "Bill"),
    ];
    let entries = vec![
      request("10", "1", "3", RequestStatus::Accepted),
      request("11", "2", "1", RequestStatus::Pending),
      request("12", "1", "4", RequestStatus::Pending),
    ];
    let roster = Roster::build(&users, &entries, &"1".into());

    let contacts: Vec<_> = roster.contacts.iter().map(|r| r.user.display_name()).collect();
    assert_eq!(contacts, vec!["John"]);

    let others: Vec<_> = roster.others.iter().map(|r| r.user.display_name()).collect();
    assert_eq!(others, vec!["Bill", "clara", "Rory"]);

    let incoming: Vec<_> = roster.incoming().map(|r| r.user.id.clone()).collect();
    assert_eq!(incoming, vec![UserId::new("2")]);

    assert!(matches!(
      roster.others[1].relationship,
      Relationship::PendingOutgoing { .. }
    ));
    assert!(roster.conflicts.is_empty());
  }

  #[test]
  fn collects_conflicts() {
    let users = vec![user("1", "amy"), user("2", "rory")];
    let entries = vec![
      request("10", "1", "2", RequestStatus::Pending),
      request("11", "2", "1", RequestStatus::Pending),
    ];
    let roster = Roster::build(&users, &entries, &"1".into());
    assert_eq!(roster.conflicts.len(), 1);
    assert_eq!(roster.conflicts[0].chosen.as_str(), "11");
  }
}
