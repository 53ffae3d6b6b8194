//! Entries, the single polymorphic record kind in the shared collection.
//!
//! Contact requests and chat messages share one remote collection. On the
//! wire they are told apart by loose `type`/`status` strings (see
//! [`crate::wire`]); in memory they are an [`EntryBody`] sum type so every
//! consumer has to handle both cases.

use std::{cmp::Ordering, fmt};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{user::UserId, wire::WireEntry};

// ─── EntryId ─────────────────────────────────────────────────────────────────

/// Server-assigned identifier of an entry.
///
/// Ids compare numerically when both are unsigned integers (the mock API
/// hands out `"1"`, `"2"`, …, so `"9" < "10"`). Numeric ids sort before any
/// other id; everything else compares as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl<'de> Deserialize<'de> for EntryId {
  fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    crate::wire::lenient_id(d).map(Self)
  }
}

impl Ord for EntryId {
  fn cmp(&self, other: &Self) -> Ordering {
    match (self.0.parse::<u64>(), other.0.parse::<u64>()) {
      // "03" and "3" are numerically equal; fall back to the text so the
      // ordering stays consistent with `Eq`.
      (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
      (Ok(_), Err(_)) => Ordering::Less,
      (Err(_), Ok(_)) => Ordering::Greater,
      (Err(_), Err(_)) => self.0.cmp(&other.0),
    }
  }
}

impl PartialOrd for EntryId {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl fmt::Display for EntryId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for EntryId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

// ─── Timestamp ───────────────────────────────────────────────────────────────

/// An externally supplied `createdAt` value.
///
/// The raw string is kept verbatim so a record round-trips unchanged; the
/// parsed instant is what ordering uses. A value that is not RFC 3339 has no
/// instant and sorts before every parseable one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
  raw:     String,
  instant: Option<DateTime<Utc>>,
}

impl Timestamp {
  pub fn parse(raw: impl Into<String>) -> Self {
    let raw = raw.into();
    let instant = DateTime::parse_from_rfc3339(raw.trim())
      .ok()
      .map(|dt| dt.with_timezone(&Utc));
    Self { raw, instant }
  }

  /// Format `at` the way browsers' `Date.toISOString()` does
  /// (`2024-01-01T00:00:00.000Z`).
  pub fn from_instant(at: DateTime<Utc>) -> Self {
    Self {
      raw:     at.to_rfc3339_opts(SecondsFormat::Millis, true),
      instant: Some(at),
    }
  }

  pub fn now() -> Self { Self::from_instant(Utc::now()) }

  pub fn as_str(&self) -> &str { &self.raw }

  pub fn instant(&self) -> Option<DateTime<Utc>> { self.instant }
}

impl fmt::Display for Timestamp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.raw)
  }
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// Status of a contact request. Declined and cancelled requests are deleted,
/// so there is no third state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
  Pending,
  Accepted,
}

/// What an entry is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryBody {
  /// A contact request from `from_id` to `to_id`.
  Request { status: RequestStatus },
  /// A chat message. Messages are immutable once stored.
  Message { text: String },
}

/// One record of the shared entry collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireEntry", into = "WireEntry")]
pub struct Entry {
  pub id:         EntryId,
  pub from_id:    UserId,
  pub to_id:      UserId,
  pub created_at: Timestamp,
  pub body:       EntryBody,
}

impl Entry {
  /// Whether this entry connects `a` and `b`, in either direction.
  pub fn joins(&self, a: &UserId, b: &UserId) -> bool {
    (self.from_id == *a && self.to_id == *b)
      || (self.from_id == *b && self.to_id == *a)
  }

  /// The request status, or `None` for a message.
  pub fn request_status(&self) -> Option<RequestStatus> {
    match self.body {
      EntryBody::Request { status } => Some(status),
      EntryBody::Message { .. } => None,
    }
  }

  /// The message text, or `None` for a request.
  pub fn text(&self) -> Option<&str> {
    match &self.body {
      EntryBody::Message { text } => Some(text),
      EntryBody::Request { .. } => None,
    }
  }

  /// Total order over entries: creation instant, then id.
  pub fn order_key(&self) -> (Option<DateTime<Utc>>, &EntryId) {
    (self.created_at.instant(), &self.id)
  }
}

// ─── NewEntry ────────────────────────────────────────────────────────────────

/// Input to [`crate::store::EntryStore::create_entry`]. The id is always
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
  pub from_id:    UserId,
  pub to_id:      UserId,
  pub created_at: Timestamp,
  pub body:       EntryBody,
}

impl NewEntry {
  /// A fresh pending contact request, stamped now.
  pub fn request(from_id: UserId, to_id: UserId) -> Self {
    Self {
      from_id,
      to_id,
      created_at: Timestamp::now(),
      body: EntryBody::Request { status: RequestStatus::Pending },
    }
  }

  /// A chat message, stamped now.
  pub fn message(from_id: UserId, to_id: UserId, text: impl Into<String>) -> Self {
    Self {
      from_id,
      to_id,
      created_at: Timestamp::now(),
      body: EntryBody::Message { text: text.into() },
    }
  }

  /// Attach the id the store assigned.
  pub fn into_entry(self, id: EntryId) -> Entry {
    Entry {
      id,
      from_id: self.from_id,
      to_id: self.to_id,
      created_at: self.created_at,
      body: self.body,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn numeric_ids_order_by_value() {
    assert!(EntryId::from("3") < EntryId::from("5"));
    assert!(EntryId::from("9") < EntryId::from("10"));
    assert!(EntryId::from("10") < EntryId::from("abc"));
    assert!(EntryId::from("abc") < EntryId::from("abd"));
    assert_ne!(
      EntryId::from("03").cmp(&EntryId::from("3")),
      Ordering::Equal
    );
  }

  #[test]
  fn timestamps_parse_offsets_to_the_same_instant() {
    let a = Timestamp::parse("2024-01-01T01:00:00+01:00");
    let b = Timestamp::parse("2024-01-01T00:00:00Z");
    assert_eq!(a.instant(), b.instant());
    assert_ne!(a, b, "raw text is preserved");
  }

  #[test]
  fn unparseable_timestamp_sorts_first() {
    let bad = Timestamp::parse("yesterday");
    let good = Timestamp::parse("1970-01-01T00:00:00Z");
    assert_eq!(bad.instant(), None);
    assert!(bad.instant() < good.instant());
  }

  #[test]
  fn from_instant_matches_browser_iso_format() {
    let at = DateTime::parse_from_rfc3339("2024-05-06T07:08:09.123Z")
      .unwrap()
      .with_timezone(&Utc);
    assert_eq!(
      Timestamp::from_instant(at).as_str(),
      "2024-05-06T07:08:09.123Z"
    );
  }

  #[test]
  fn joins_is_direction_agnostic() {
    let entry = NewEntry::request("a".into(), "b".into()).into_entry("1".into());
    assert!(entry.joins(&"a".into(), &"b".into()));
    assert!(entry.joins(&"b".into(), &"a".into()));
    assert!(!entry.joins(&"a".into(), &"c".into()));
  }
}
