//! The action dispatcher: validated writes against the entry store.
//!
//! Every action is checked against the current snapshot first. A rejected
//! action never reaches the store. A successful write forces a refresh so the
//! caller's own change is visible straight away.

use std::sync::Arc;

use parlor_core::{
  ValidationError,
  entry::{Entry, EntryBody, EntryId, NewEntry, RequestStatus},
  relationship::Relationship,
  store::EntryStore,
  user::UserId,
};
use tracing::{debug, info};

use crate::{
  error::ActionError,
  session::Session,
  sync::{Snapshot, Synchronizer},
  view,
};

pub struct Dispatcher<S> {
  store: Arc<S>,
  sync:  Synchronizer<S>,
  me:    UserId,
}

impl<S: EntryStore + 'static> Dispatcher<S> {
  pub fn new(session: &Session, sync: Synchronizer<S>) -> Self {
    Self {
      store: Arc::clone(sync.store()),
      sync,
      me: session.id().clone(),
    }
  }

  pub fn sync(&self) -> &Synchronizer<S> { &self.sync }

  // ── Requests ────────────────────────────────────────────────────────────

  /// Ask `other` to chat. Rejected if any request already joins the pair,
  /// in either direction and in any state.
  pub async fn send_request(&self, other: &UserId) -> Result<Entry, ActionError> {
    if *other == self.me {
      return Err(ValidationError::SelfRequest.into());
    }
    let snap = self.current().await?;
    if let Some(existing) = view::relationship(&snap.entries, &self.me, other).request_id() {
      return Err(ValidationError::DuplicateRequest { existing: existing.clone() }.into());
    }

    let entry = self
      .store
      .create_entry(NewEntry::request(self.me.clone(), other.clone()))
      .await
      .map_err(ActionError::remote)?;
    info!(id = %entry.id, to = %other, "chat request sent");
    self.written().await;
    Ok(entry)
  }

  /// Accept or decline a pending request addressed to the viewer.
  ///
  /// Accepting rewrites the request with status `accepted` and returns it.
  /// Declining deletes the request and returns `None`.
  pub async fn respond_request(
    &self,
    request: &EntryId,
    accept: bool,
  ) -> Result<Option<Entry>, ActionError> {
    let snap = self.current().await?;
    let entry = pending_request(&snap, request)?;
    if entry.to_id != self.me {
      return Err(ValidationError::NotRecipient.into());
    }

    if accept {
      let accepted = Entry {
        body: EntryBody::Request { status: RequestStatus::Accepted },
        ..entry.clone()
      };
      let updated = self
        .store
        .update_entry(accepted)
        .await
        .map_err(ActionError::remote)?
        .ok_or_else(|| ActionError::Gone(request.clone()))?;
      info!(id = %request, from = %updated.from_id, "chat request accepted");
      self.written().await;
      Ok(Some(updated))
    } else {
      self.delete(request).await?;
      info!(id = %request, "chat request declined");
      Ok(None)
    }
  }

  /// Withdraw a pending request the viewer sent.
  pub async fn cancel_request(&self, request: &EntryId) -> Result<(), ActionError> {
    let snap = self.current().await?;
    let entry = pending_request(&snap, request)?;
    if entry.from_id != self.me {
      return Err(ValidationError::NotSender.into());
    }
    self.delete(request).await?;
    info!(id = %request, "chat request cancelled");
    Ok(())
  }

  /// Accept the pending request `other` sent the viewer.
  pub async fn accept_from(&self, other: &UserId) -> Result<Entry, ActionError> {
    let request = self.incoming_from(other).await?;
    self
      .respond_request(&request, true)
      .await?
      .ok_or(ActionError::Gone(request))
  }

  /// Decline the pending request `other` sent the viewer.
  pub async fn decline_from(&self, other: &UserId) -> Result<(), ActionError> {
    let request = self.incoming_from(other).await?;
    self.respond_request(&request, false).await.map(drop)
  }

  /// Cancel the viewer's pending request to `other`.
  pub async fn cancel_to(&self, other: &UserId) -> Result<(), ActionError> {
    let snap = self.current().await?;
    match view::relationship(&snap.entries, &self.me, other) {
      Relationship::PendingOutgoing { request } => self.cancel_request(&request).await,
      _ => Err(ValidationError::NoPendingRequest("to").into()),
    }
  }

  // ── Messages ────────────────────────────────────────────────────────────

  /// Send `text` to an accepted contact. Surrounding whitespace is trimmed;
  /// nothing is sent if that leaves the message empty.
  pub async fn send_message(&self, other: &UserId, text: &str) -> Result<Entry, ActionError> {
    let text = text.trim();
    if text.is_empty() {
      return Err(ValidationError::EmptyMessage.into());
    }
    let snap = self.current().await?;
    let relationship = view::relationship(&snap.entries, &self.me, other);
    if !relationship.is_accepted() {
      return Err(ValidationError::NotConnected(relationship).into());
    }

    let entry = self
      .store
      .create_entry(NewEntry::message(self.me.clone(), other.clone(), text))
      .await
      .map_err(ActionError::remote)?;
    debug!(id = %entry.id, to = %other, "message sent");
    self.written().await;
    Ok(entry)
  }

  // ── Internals ───────────────────────────────────────────────────────────

  /// The snapshot to validate against, fetching one if nothing has been
  /// loaded yet.
  async fn current(&self) -> Result<Snapshot, ActionError> {
    let snap = self.sync.snapshot();
    if snap.is_loaded() {
      return Ok(snap);
    }
    let snap = self.sync.refresh().await.map_err(ActionError::remote)?;
    // The fetch was dropped by a deactivation; an empty set would let every
    // rule pass or fail wrongly.
    if !snap.is_loaded() {
      return Err(ActionError::NotSynced);
    }
    Ok(snap)
  }

  async fn incoming_from(&self, other: &UserId) -> Result<EntryId, ActionError> {
    let snap = self.current().await?;
    match view::relationship(&snap.entries, &self.me, other) {
      Relationship::PendingIncoming { request } => Ok(request),
      _ => Err(ValidationError::NoPendingRequest("from").into()),
    }
  }

  async fn delete(&self, id: &EntryId) -> Result<(), ActionError> {
    let deleted = self
      .store
      .delete_entry(id.clone())
      .await
      .map_err(ActionError::remote)?;
    if !deleted {
      return Err(ActionError::Gone(id.clone()));
    }
    self.written().await;
    Ok(())
  }

  /// Pull the write back in. A failure here is already logged and recorded
  /// on the snapshot; the write itself succeeded.
  async fn written(&self) { self.sync.refresh().await.ok(); }
}

/// Look `id` up in `snap` and check it is a request that is still pending.
fn pending_request<'a>(snap: &'a Snapshot, id: &EntryId) -> Result<&'a Entry, ValidationError> {
  let entry = snap
    .entries
    .iter()
    .find(|e| e.id == *id)
    .ok_or_else(|| ValidationError::UnknownRequest(id.clone()))?;
  match entry.request_status() {
    None => Err(ValidationError::NotARequest(id.clone())),
    Some(RequestStatus::Accepted) => Err(ValidationError::NotPending),
    Some(RequestStatus::Pending) => Ok(entry),
  }
}
