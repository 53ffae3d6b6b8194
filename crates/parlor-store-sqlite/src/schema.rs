//! SQL schema for the Parlor SQLite store.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Ids are SQLite rowids so they come out as the small increasing integers
/// the hosted mock API hands out. `AUTOINCREMENT` keeps a deleted request's
/// id from being reused by the next entry.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS entries (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    from_id     TEXT NOT NULL,
    to_id       TEXT NOT NULL,
    kind        TEXT NOT NULL,   -- 'request' | 'chat'
    status      TEXT NOT NULL,   -- 'pending' | 'accepted'
    text        TEXT,            -- chat only
    created_at  TEXT NOT NULL    -- raw createdAt as supplied by the client
);

CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name   TEXT NOT NULL,
    email       TEXT,
    image       TEXT
);

CREATE INDEX IF NOT EXISTS entries_pair_idx ON entries(from_id, to_id);

PRAGMA user_version = 1;
";
