//! [`SqliteStore`], the SQLite implementation of [`EntryStore`] and
//! [`UserStore`].

use std::path::Path;

use parlor_core::{
  entry::{Entry, EntryId, NewEntry},
  store::{EntryStore, UserStore},
  user::{Profile, User, UserId},
};
use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{
  Result,
  encode::{RawEntry, RawUser, decode_rowid, encode_entry, encode_entry_id, encode_new_entry},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Entry and user collections backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_entry(&self, rowid: i64) -> Result<Option<Entry>> {
    let raw: Option<RawEntry> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM entries WHERE id = ?1", RawEntry::COLUMNS),
              rusqlite::params![rowid],
              RawEntry::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEntry::into_entry).transpose()
  }
}

// ─── EntryStore impl ─────────────────────────────────────────────────────────

impl EntryStore for SqliteStore {
  type Error = crate::Error;

  async fn list_entries(&self) -> Result<Vec<Entry>> {
    let raws: Vec<RawEntry> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM entries ORDER BY id",
          RawEntry::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }

  async fn get_entry(&self, id: EntryId) -> Result<Option<Entry>> {
    match decode_rowid(id.as_str()) {
      Some(rowid) => self.fetch_entry(rowid).await,
      None => Ok(None),
    }
  }

  async fn create_entry(&self, entry: NewEntry) -> Result<Entry> {
    let cols = encode_new_entry(entry.clone());

    let rowid: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO entries (from_id, to_id, kind, status, text, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            cols.from_id,
            cols.to_id,
            cols.kind,
            cols.status,
            cols.text,
            cols.created_at,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    debug!(id = rowid, "entry created");
    Ok(entry.into_entry(encode_entry_id(rowid)))
  }

  async fn update_entry(&self, entry: Entry) -> Result<Option<Entry>> {
    let Some(rowid) = decode_rowid(entry.id.as_str()) else {
      return Ok(None);
    };
    let cols = encode_entry(entry.clone());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE entries
              SET from_id = ?2, to_id = ?3, kind = ?4, status = ?5,
                  text = ?6, created_at = ?7
            WHERE id = ?1",
          rusqlite::params![
            rowid,
            cols.from_id,
            cols.to_id,
            cols.kind,
            cols.status,
            cols.text,
            cols.created_at,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    debug!(id = rowid, "entry updated");
    Ok(Some(entry))
  }

  async fn delete_entry(&self, id: EntryId) -> Result<bool> {
    let Some(rowid) = decode_rowid(id.as_str()) else {
      return Ok(false);
    };

    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM entries WHERE id = ?1", rusqlite::params![rowid])?)
      })
      .await?;

    if deleted > 0 {
      debug!(id = rowid, "entry deleted");
    }
    Ok(deleted > 0)
  }
}

// ─── UserStore impl ──────────────────────────────────────────────────────────

impl UserStore for SqliteStore {
  type Error = crate::Error;

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM users ORDER BY id",
          RawUser::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawUser::into_user).collect())
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let Some(rowid) = decode_rowid(id.as_str()) else {
      return Ok(None);
    };

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM users WHERE id = ?1", RawUser::COLUMNS),
              rusqlite::params![rowid],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawUser::into_user))
  }

  async fn create_user(&self, profile: Profile) -> Result<User> {
    let raw = RawUser::from_profile(0, profile);
    let (full_name, email, image) =
      (raw.full_name.clone(), raw.email.clone(), raw.image.clone());

    let rowid: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (full_name, email, image) VALUES (?1, ?2, ?3)",
          rusqlite::params![full_name, email, image],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    debug!(id = rowid, "user created");
    Ok(RawUser { id: rowid, ..raw }.into_user())
  }

  async fn update_profile(&self, id: UserId, profile: Profile) -> Result<Option<User>> {
    let Some(rowid) = decode_rowid(id.as_str()) else {
      return Ok(None);
    };
    let raw = RawUser::from_profile(rowid, profile);
    let (full_name, email, image) =
      (raw.full_name.clone(), raw.email.clone(), raw.image.clone());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET full_name = ?2, email = ?3, image = ?4 WHERE id = ?1",
          rusqlite::params![rowid, full_name, email, image],
        )?)
      })
      .await?;

    Ok((changed > 0).then(|| raw.into_user()))
  }
}
