//! HTTP client for the REST store that holds Parlor's entries and users.
//!
//! [`HttpStore`] implements [`parlor_core::store::EntryStore`] and
//! [`parlor_core::store::UserStore`] on top of any generic CRUD service that
//! speaks the mock-API JSON shapes: the hosted mock API the chat was built
//! against, or `parlor-api` running locally.

mod client;

pub mod error;

pub use client::{ClientConfig, HttpStore};
pub use error::{Error, Result};
