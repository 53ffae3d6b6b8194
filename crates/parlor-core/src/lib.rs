//! Core types and pure derivations for the Parlor chat engine.
//!
//! This crate is deliberately free of HTTP, database, and runtime
//! dependencies. Everything here is a function of an entry set and a pair of
//! user ids; fetching and writing live in the store implementations and in
//! `parlor-engine`.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod conversation;
pub mod entry;
pub mod error;
pub mod relationship;
pub mod roster;
pub mod store;
pub mod user;
pub mod wire;

pub use error::{Error, Result, ValidationError};
