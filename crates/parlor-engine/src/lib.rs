//! The client-side chat engine: polling, derived state, and validated writes.
//!
//! ```text
//! Synchronizer ──snapshot──▶ ChatView / Roster ──▶ front end
//!      ▲                                              │
//!      └──── forced refresh ◀── Dispatcher ◀──────────┘
//! ```
//!
//! Everything is generic over [`parlor_core::store::EntryStore`] and
//! [`parlor_core::store::UserStore`]; the engine never talks HTTP itself.

pub mod dispatch;
pub mod error;
pub mod session;
pub mod sync;
pub mod view;

pub use dispatch::Dispatcher;
pub use error::{ActionError, SessionError};
pub use session::{Session, register};
pub use sync::{Snapshot, SyncConfig, SyncFailure, Synchronizer};
pub use view::ChatView;
