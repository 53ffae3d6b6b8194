//! JSON wire shape of the entry collection.
//!
//! The hosted mock API stores entries as flat camelCase records:
//!
//! ```json
//! { "id": "5", "fromId": "1", "toId": "2", "type": "chat",
//!   "status": "accepted", "text": "hi", "createdAt": "2024-01-01T00:00:00Z" }
//! ```
//!
//! `type` is `"request"` or `"chat"`; `status` is `"pending"` or
//! `"accepted"`. Chat records are only meaningful with status `accepted`.
//! [`WireEntry`] mirrors that shape field-for-field; conversion into
//! [`Entry`] is where the strings get checked.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
  Error, Result,
  entry::{Entry, EntryBody, EntryId, NewEntry, RequestStatus, Timestamp},
  user::UserId,
};

const KIND_REQUEST: &str = "request";
const KIND_CHAT: &str = "chat";
const STATUS_PENDING: &str = "pending";
const STATUS_ACCEPTED: &str = "accepted";

// ─── Lenient ids ─────────────────────────────────────────────────────────────

/// An id the remote side may have emitted as a string or as a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientId {
  Text(String),
  Number(serde_json::Number),
}

impl From<LenientId> for String {
  fn from(id: LenientId) -> Self {
    match id {
      LenientId::Text(s) => s,
      LenientId::Number(n) => n.to_string(),
    }
  }
}

/// Deserialise an id that may be a JSON string or number.
pub fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
  LenientId::deserialize(d).map(String::from)
}

fn lenient_opt_id<'de, D: Deserializer<'de>>(
  d: D,
) -> Result<Option<String>, D::Error> {
  Ok(Option::<LenientId>::deserialize(d)?.map(String::from))
}

// ─── WireEntry ───────────────────────────────────────────────────────────────

/// A raw entry record exactly as the REST store sends and receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEntry {
  /// Absent on create requests; the server assigns it.
  #[serde(
    default,
    deserialize_with = "lenient_opt_id",
    skip_serializing_if = "Option::is_none"
  )]
  pub id:         Option<String>,
  #[serde(deserialize_with = "lenient_id")]
  pub from_id:    String,
  #[serde(deserialize_with = "lenient_id")]
  pub to_id:      String,
  #[serde(rename = "type")]
  pub kind:       String,
  pub status:     String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub text:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<String>,
}

impl WireEntry {
  fn label(&self) -> String {
    self.id.clone().unwrap_or_else(|| "<new>".to_owned())
  }

  fn malformed(&self, reason: impl Into<String>) -> Error {
    Error::MalformedEntry { id: self.label(), reason: reason.into() }
  }

  /// Interpret `type`, `status` and `text` as an [`EntryBody`].
  fn body(&self) -> Result<EntryBody> {
    match (self.kind.as_str(), self.status.as_str()) {
      (KIND_REQUEST, STATUS_PENDING) => {
        Ok(EntryBody::Request { status: RequestStatus::Pending })
      }
      (KIND_REQUEST, STATUS_ACCEPTED) => {
        Ok(EntryBody::Request { status: RequestStatus::Accepted })
      }
      (KIND_CHAT, STATUS_ACCEPTED) => match &self.text {
        Some(text) => Ok(EntryBody::Message { text: text.clone() }),
        None => Err(self.malformed("chat entry has no text")),
      },
      (KIND_CHAT, other) => {
        Err(self.malformed(format!("chat entry with status {other:?}")))
      }
      (KIND_REQUEST, other) => {
        Err(self.malformed(format!("unknown request status {other:?}")))
      }
      (other, _) => Err(self.malformed(format!("unknown entry type {other:?}"))),
    }
  }

  fn from_parts(
    id: Option<String>,
    from_id: UserId,
    to_id: UserId,
    created_at: Timestamp,
    body: EntryBody,
  ) -> Self {
    let (kind, status, text) = match body {
      EntryBody::Request { status } => {
        let status = match status {
          RequestStatus::Pending => STATUS_PENDING,
          RequestStatus::Accepted => STATUS_ACCEPTED,
        };
        (KIND_REQUEST, status, None)
      }
      EntryBody::Message { text } => (KIND_CHAT, STATUS_ACCEPTED, Some(text)),
    };
    Self {
      id,
      from_id: from_id.as_str().to_owned(),
      to_id: to_id.as_str().to_owned(),
      kind: kind.to_owned(),
      status: status.to_owned(),
      text,
      created_at: Some(created_at.as_str().to_owned()),
    }
  }
}

impl TryFrom<WireEntry> for Entry {
  type Error = Error;

  fn try_from(wire: WireEntry) -> Result<Self> {
    let body = wire.body()?;
    let Some(id) = wire.id.clone() else {
      return Err(wire.malformed("missing id"));
    };
    Ok(Entry {
      id: EntryId::new(id),
      from_id: UserId::new(wire.from_id),
      to_id: UserId::new(wire.to_id),
      created_at: Timestamp::parse(wire.created_at.unwrap_or_default()),
      body,
    })
  }
}

/// Create bodies may omit `createdAt`; the entry is then stamped now.
impl TryFrom<WireEntry> for NewEntry {
  type Error = Error;

  fn try_from(wire: WireEntry) -> Result<Self> {
    let body = wire.body()?;
    let created_at = match wire.created_at {
      Some(raw) => Timestamp::parse(raw),
      None => Timestamp::now(),
    };
    Ok(NewEntry {
      from_id: UserId::new(wire.from_id),
      to_id: UserId::new(wire.to_id),
      created_at,
      body,
    })
  }
}

impl From<Entry> for WireEntry {
  fn from(e: Entry) -> Self {
    Self::from_parts(
      Some(e.id.as_str().to_owned()),
      e.from_id,
      e.to_id,
      e.created_at,
      e.body,
    )
  }
}

impl From<NewEntry> for WireEntry {
  fn from(e: NewEntry) -> Self {
    Self::from_parts(None, e.from_id, e.to_id, e.created_at, e.body)
  }
}

// ─── Collections ─────────────────────────────────────────────────────────────

/// Decode a whole collection, keeping every well-formed record.
///
/// One bad record must not blank the view, so failures are returned beside
/// the good entries instead of aborting.
pub fn decode_collection(
  records: Vec<serde_json::Value>,
) -> (Vec<Entry>, Vec<Error>) {
  let mut entries = Vec::with_capacity(records.len());
  let mut rejected = Vec::new();
  for record in records {
    let decoded = serde_json::from_value::<WireEntry>(record)
      .map_err(Error::from)
      .and_then(Entry::try_from);
    match decoded {
      Ok(entry) => entries.push(entry),
      Err(e) => rejected.push(e),
    }
  }
  (entries, rejected)
}
