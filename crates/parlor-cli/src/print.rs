//! Plain-text formatting for terminal output.

use parlor_core::{
  entry::{Entry, Timestamp},
  relationship::Relationship,
  user::{User, UserId},
};

/// `YYYY-MM-DD HH:MM` in UTC, or the raw string when it did not parse.
pub fn timestamp(ts: &Timestamp) -> String {
  match ts.instant() {
    Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
    None => ts.as_str().to_owned(),
  }
}

pub fn user_row(user: &User, me: Option<&UserId>) -> String {
  let you = if Some(&user.id) == me { "  (you)" } else { "" };
  match &user.email {
    Some(email) => format!("{:>4}  {}  <{email}>{you}", user.id.as_str(), user.display_name()),
    None => format!("{:>4}  {}{you}", user.id.as_str(), user.display_name()),
  }
}

/// What `me` can do next with `other` in state `rel`. Commands name the user
/// by id, which is always a single shell word.
pub fn hint(rel: &Relationship, other: &User) -> String {
  let id = other.id.as_str();
  match rel {
    Relationship::None => format!("send a request with `parlor request {id}`"),
    Relationship::PendingOutgoing { .. } => format!(
      "waiting for {} to answer; `parlor cancel {id}` withdraws it",
      other.display_name()
    ),
    Relationship::PendingIncoming { .. } => {
      format!("`parlor accept {id}` or `parlor decline {id}`")
    }
    Relationship::Accepted { .. } => format!("`parlor send {id} <text>` to chat"),
  }
}

/// One timeline line: `[time] sender: text`.
pub fn message(entry: &Entry, me: &User, other: &User) -> String {
  let sender = if entry.from_id == me.id { "you" } else { other.display_name() };
  format!(
    "[{}] {sender}: {}",
    timestamp(&entry.created_at),
    entry.text().unwrap_or_default()
  )
}
