//! Conversions between domain types and the plain-text column values stored
//! in SQLite.
//!
//! Entry columns hold exactly the strings of the JSON wire format, so decoding
//! goes through [`WireEntry`] and shares its validation.

use parlor_core::{
  entry::{Entry, EntryId, NewEntry},
  user::{Profile, User, UserId},
  wire::WireEntry,
};

use crate::Result;

// ─── Ids ──────────────────────────────────────────────────────────────────────

/// The rowid behind an id, or `None` if the id cannot name any row.
pub fn decode_rowid(id: &str) -> Option<i64> { id.parse().ok() }

// ─── Entries ──────────────────────────────────────────────────────────────────

/// Column values for an `entries` row (without the rowid).
pub struct EntryColumns {
  pub from_id:    String,
  pub to_id:      String,
  pub kind:       String,
  pub status:     String,
  pub text:       Option<String>,
  pub created_at: String,
}

impl From<WireEntry> for EntryColumns {
  fn from(w: WireEntry) -> Self {
    Self {
      from_id:    w.from_id,
      to_id:      w.to_id,
      kind:       w.kind,
      status:     w.status,
      text:       w.text,
      created_at: w.created_at.unwrap_or_default(),
    }
  }
}

pub fn encode_new_entry(entry: NewEntry) -> EntryColumns {
  WireEntry::from(entry).into()
}

pub fn encode_entry(entry: Entry) -> EntryColumns { WireEntry::from(entry).into() }

/// Raw values read directly from an `entries` row.
pub struct RawEntry {
  pub id:      i64,
  pub columns: EntryColumns,
}

impl RawEntry {
  pub const COLUMNS: &'static str =
    "id, from_id, to_id, kind, status, text, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:      row.get(0)?,
      columns: EntryColumns {
        from_id:    row.get(1)?,
        to_id:      row.get(2)?,
        kind:       row.get(3)?,
        status:     row.get(4)?,
        text:       row.get(5)?,
        created_at: row.get(6)?,
      },
    })
  }

  pub fn into_entry(self) -> Result<Entry> {
    let c = self.columns;
    let wire = WireEntry {
      id:         Some(self.id.to_string()),
      from_id:    c.from_id,
      to_id:      c.to_id,
      kind:       c.kind,
      status:     c.status,
      text:       c.text,
      created_at: Some(c.created_at),
    };
    Ok(Entry::try_from(wire)?)
  }
}

pub fn encode_entry_id(id: i64) -> EntryId { EntryId::new(id.to_string()) }

// ─── Users ────────────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:        i64,
  pub full_name: String,
  pub email:     Option<String>,
  pub image:     Option<String>,
}

impl RawUser {
  pub const COLUMNS: &'static str = "id, full_name, email, image";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(0)?,
      full_name: row.get(1)?,
      email:     row.get(2)?,
      image:     row.get(3)?,
    })
  }

  pub fn into_user(self) -> User {
    User {
      id:        UserId::new(self.id.to_string()),
      full_name: self.full_name,
      email:     self.email,
      image:     self.image,
    }
  }

  pub fn from_profile(id: i64, profile: Profile) -> Self {
    Self {
      id,
      full_name: profile.full_name,
      email: Some(profile.email),
      image: profile.image,
    }
  }
}
