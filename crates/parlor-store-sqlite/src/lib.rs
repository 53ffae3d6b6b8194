//! SQLite backend for the Parlor entry and user collections.
//!
//! This is a local stand-in for the hosted mock API: same records, same
//! server-assigned numeric ids, no business rules. Wraps [`tokio_rusqlite`]
//! so all database access runs on a dedicated thread without blocking the
//! async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
