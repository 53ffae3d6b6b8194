//! Users: the read-mostly directory of chat participants.
//!
//! Users live in a remote collection that this crate never owns. The chat
//! core only needs an id and a display name; the profile fields ride along so
//! front ends can show and edit them.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::ValidationError;

// ─── UserId ──────────────────────────────────────────────────────────────────

/// Opaque identifier of a user in the remote user collection.
///
/// The mock API hands these out as strings (`"1"`, `"2"`, …) but some
/// deployments emit JSON numbers; both decode to the same id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl<'de> Deserialize<'de> for UserId {
  fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    crate::wire::lenient_id(d).map(Self)
  }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for UserId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for UserId {
  fn from(s: String) -> Self { Self(s) }
}

// ─── User ────────────────────────────────────────────────────────────────────

/// A user record as stored in the remote `users` (hosted: `auth`)
/// collection. Unknown fields, including any stored password, are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:        UserId,
  #[serde(rename = "fullName", default)]
  pub full_name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:     Option<String>,
  /// Avatar URL.
  #[serde(rename = "UserImage", default, skip_serializing_if = "Option::is_none")]
  pub image:     Option<String>,
}

impl User {
  /// The name to show for this user; falls back to the id when the record
  /// has no usable name.
  pub fn display_name(&self) -> &str {
    let name = self.full_name.trim();
    if name.is_empty() { self.id.as_str() } else { name }
  }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// The editable part of a user record. Used both to register a new user and
/// to update an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  #[serde(rename = "fullName")]
  pub full_name: String,
  pub email:     String,
  #[serde(rename = "UserImage", default, skip_serializing_if = "Option::is_none")]
  pub image:     Option<String>,
}

impl Profile {
  /// Trim every field, drop a blank image, and check what is left.
  ///
  /// The image, if any, must be an absolute `http` or `https` URL.
  pub fn validated(self) -> Result<Self, ValidationError> {
    let full_name = self.full_name.trim().to_owned();
    if full_name.is_empty() {
      return Err(ValidationError::MissingName);
    }

    let email = self.email.trim().to_owned();
    match email.split_once('@') {
      Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
      _ => return Err(ValidationError::InvalidEmail(email)),
    }

    let image = match self.image.as_deref().map(str::trim) {
      None | Some("") => None,
      Some(raw) => match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
          Some(raw.to_owned())
        }
        _ => return Err(ValidationError::InvalidImageUrl(raw.to_owned())),
      },
    };

    Ok(Self { full_name, email, image })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn profile(name: &str, email: &str, image: Option<&str>) -> Profile {
    Profile {
      full_name: name.into(),
      email:     email.into(),
      image:     image.map(Into::into),
    }
  }

  #[test]
  fn user_decodes_mock_api_record() {
    let user: User = serde_json::from_value(serde_json::json!({
      "id": 7,
      "fullName": "Amy Pond",
      "email": "amy@example.com",
      "password": "hunter2",
      "UserImage": "https://example.com/amy.png"
    }))
    .unwrap();

    assert_eq!(user.id, UserId::new("7"));
    assert_eq!(user.display_name(), "Amy Pond");
    assert_eq!(user.image.as_deref(), Some("https://example.com/amy.png"));
  }

  #[test]
  fn display_name_falls_back_to_id() {
    let user = User {
      id:        UserId::new("42"),
      full_name: "   ".into(),
      email:     None,
      image:     None,
    };
    assert_eq!(user.display_name(), "42");
  }

  #[test]
  fn profile_is_trimmed_and_blank_image_dropped() {
    let p = profile("  John  ", " john@example.com ", Some("  "))
      .validated()
      .unwrap();
    assert_eq!(p.full_name, "John");
    assert_eq!(p.email, "john@example.com");
    assert_eq!(p.image, None);
  }

  #[test]
  fn profile_rejects_bad_fields() {
    assert_eq!(
      profile(" ", "a@b", None).validated(),
      Err(ValidationError::MissingName)
    );
    assert!(matches!(
      profile("A", "nobody", None).validated(),
      Err(ValidationError::InvalidEmail(_))
    ));
    assert!(matches!(
      profile("A", "a@b", Some("User_profile.svg")).validated(),
      Err(ValidationError::InvalidImageUrl(_))
    ));
    assert!(matches!(
      profile("A", "a@b", Some("ftp://example.com/a.png")).validated(),
      Err(ValidationError::InvalidImageUrl(_))
    ));
  }
}
