//! Who the engine is acting as.

use parlor_core::{
  store::UserStore,
  user::{Profile, User, UserId},
};
use tracing::info;

use crate::error::{ActionError, SessionError};

/// The signed-in user. Every derived view and every write is made from this
/// user's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  user: User,
}

impl Session {
  /// Load `id` from the user directory and act as them.
  pub async fn open<U: UserStore>(users: &U, id: UserId) -> Result<Self, SessionError> {
    match users.get_user(id.clone()).await {
      Ok(Some(user)) => {
        info!(id = %user.id, name = user.display_name(), "session opened");
        Ok(Self { user })
      }
      Ok(None) => Err(SessionError::UnknownUser(id)),
      Err(e) => Err(SessionError::Remote { id, source: Box::new(e) }),
    }
  }

  pub fn from_user(user: User) -> Self { Self { user } }

  pub fn user(&self) -> &User { &self.user }

  pub fn id(&self) -> &UserId { &self.user.id }

  /// Validate and store new profile fields for the signed-in user.
  pub async fn update_profile<U: UserStore>(
    &mut self,
    users: &U,
    profile: Profile,
  ) -> Result<&User, ActionError> {
    let profile = profile.validated()?;
    let updated = users
      .update_profile(self.user.id.clone(), profile)
      .await
      .map_err(ActionError::remote)?
      .ok_or_else(|| ActionError::UserGone(self.user.id.clone()))?;
    self.user = updated;
    Ok(&self.user)
  }
}

/// Validate `profile` and create a user from it.
pub async fn register<U: UserStore>(users: &U, profile: Profile) -> Result<User, ActionError> {
  let profile = profile.validated()?;
  let user = users.create_user(profile).await.map_err(ActionError::remote)?;
  info!(id = %user.id, "user registered");
  Ok(user)
}
