//! Async HTTP client wrapping the mock-API JSON endpoints.

use std::time::Duration;

use parlor_core::{
  entry::{Entry, EntryId, NewEntry},
  store::{EntryStore, UserStore},
  user::{Profile, User, UserId},
  wire::{WireEntry, decode_collection},
};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{Error, Result};

// ─── Config ───────────────────────────────────────────────────────────────────

/// Connection settings for the REST store.
#[derive(Debug, Clone)]
pub struct ClientConfig {
  pub base_url:     String,
  /// Collection holding requests and messages. The hosted mock API calls it
  /// `messages`.
  pub entries_path: String,
  /// Collection holding users. The hosted mock API calls it `auth`.
  pub users_path:   String,
  pub timeout:      Duration,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      base_url:     "http://localhost:5232".to_owned(),
      entries_path: "entries".to_owned(),
      users_path:   "users".to_owned(),
      timeout:      Duration::from_secs(30),
    }
  }
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async HTTP client for the entry and user collections.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpStore {
  client:       Client,
  base:         Url,
  entries_path: String,
  users_path:   String,
}

impl HttpStore {
  pub fn new(config: ClientConfig) -> Result<Self> {
    let base = Url::parse(&config.base_url)
      .ok()
      .filter(|url| !url.cannot_be_a_base())
      .ok_or_else(|| Error::InvalidBaseUrl(config.base_url.clone()))?;
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(Error::Build)?;
    Ok(Self {
      client,
      base,
      entries_path: config.entries_path,
      users_path: config.users_path,
    })
  }

  /// `<base>/<collection>[/<id>]`, with `id` percent-encoded as one segment.
  fn url(&self, collection: &str, id: Option<&str>) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
      segments.pop_if_empty();
      segments.extend(collection.split('/').filter(|s| !s.is_empty()));
      if let Some(id) = id {
        segments.push(id);
      }
    }
    url
  }

  /// Send a request. A 404 becomes `Ok(None)`; any other non-success status
  /// is an error.
  async fn exchange<B>(
    &self,
    method: Method,
    url: &Url,
    body: Option<&B>,
  ) -> Result<Option<Response>>
  where
    B: Serialize + Sync + ?Sized,
  {
    let mut req = self.client.request(method.clone(), url.clone());
    if let Some(body) = body {
      req = req.json(body);
    }
    let resp = req.send().await.map_err(|source| Error::Http {
      method: method.clone(),
      url: url.to_string(),
      source,
    })?;

    match resp.status() {
      StatusCode::NOT_FOUND => Ok(None),
      status if status.is_success() => Ok(Some(resp)),
      status => Err(Error::Status { method, url: url.to_string(), status }),
    }
  }

  /// [`Self::exchange`], then deserialise the JSON body.
  async fn request<T, B>(
    &self,
    method: Method,
    url: Url,
    body: Option<&B>,
  ) -> Result<Option<T>>
  where
    T: DeserializeOwned,
    B: Serialize + Sync + ?Sized,
  {
    let Some(resp) = self.exchange(method.clone(), &url, body).await? else {
      return Ok(None);
    };
    let bytes = resp.bytes().await.map_err(|source| Error::Http {
      method: method.clone(),
      url: url.to_string(),
      source,
    })?;
    serde_json::from_slice(&bytes)
      .map(Some)
      .map_err(|source| Error::Decode { method, url: url.to_string(), source })
  }

  /// Like [`Self::request`], but a 404 is an error: the collection itself
  /// is missing, so the configured path is wrong.
  async fn request_collection<T, B>(
    &self,
    method: Method,
    url: Url,
    body: Option<&B>,
  ) -> Result<T>
  where
    T: DeserializeOwned,
    B: Serialize + Sync + ?Sized,
  {
    let shown = url.to_string();
    self
      .request(method.clone(), url, body)
      .await?
      .ok_or(Error::Status { method, url: shown, status: StatusCode::NOT_FOUND })
  }
}

// ─── EntryStore impl ──────────────────────────────────────────────────────────

impl EntryStore for HttpStore {
  type Error = Error;

  /// `GET /<entries>` — malformed records are logged and skipped.
  async fn list_entries(&self) -> Result<Vec<Entry>> {
    let url = self.url(&self.entries_path, None);
    let records: Vec<serde_json::Value> =
      self.request_collection(Method::GET, url, None::<&()>).await?;

    let (entries, rejected) = decode_collection(records);
    for e in &rejected {
      warn!(error = %e, "skipping malformed entry");
    }
    Ok(entries)
  }

  /// `GET /<entries>/<id>`
  async fn get_entry(&self, id: EntryId) -> Result<Option<Entry>> {
    let url = self.url(&self.entries_path, Some(id.as_str()));
    self.request(Method::GET, url, None::<&()>).await
  }

  /// `POST /<entries>`
  async fn create_entry(&self, entry: NewEntry) -> Result<Entry> {
    let url = self.url(&self.entries_path, None);
    let body = WireEntry::from(entry);
    let created: Entry = self.request_collection(Method::POST, url, Some(&body)).await?;
    debug!(id = %created.id, "entry created");
    Ok(created)
  }

  /// `PUT /<entries>/<id>` with the full record.
  async fn update_entry(&self, entry: Entry) -> Result<Option<Entry>> {
    let url = self.url(&self.entries_path, Some(entry.id.as_str()));
    let body = WireEntry::from(entry);
    let updated: Option<Entry> = self.request(Method::PUT, url, Some(&body)).await?;
    if let Some(e) = &updated {
      debug!(id = %e.id, "entry updated");
    }
    Ok(updated)
  }

  /// `DELETE /<entries>/<id>`. Any response body is ignored.
  async fn delete_entry(&self, id: EntryId) -> Result<bool> {
    let url = self.url(&self.entries_path, Some(id.as_str()));
    let deleted = self
      .exchange(Method::DELETE, &url, None::<&()>)
      .await?
      .is_some();
    if deleted {
      debug!(%id, "entry deleted");
    }
    Ok(deleted)
  }
}

// ─── UserStore impl ───────────────────────────────────────────────────────────

impl UserStore for HttpStore {
  type Error = Error;

  /// `GET /<users>`
  async fn list_users(&self) -> Result<Vec<User>> {
    let url = self.url(&self.users_path, None);
    self.request_collection(Method::GET, url, None::<&()>).await
  }

  /// `GET /<users>/<id>`
  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let url = self.url(&self.users_path, Some(id.as_str()));
    self.request(Method::GET, url, None::<&()>).await
  }

  /// `POST /<users>`
  async fn create_user(&self, profile: Profile) -> Result<User> {
    let url = self.url(&self.users_path, None);
    self.request_collection(Method::POST, url, Some(&profile)).await
  }

  /// `PUT /<users>/<id>` — the mock API merges the profile fields into the
  /// stored record, leaving any other fields alone.
  async fn update_profile(&self, id: UserId, profile: Profile) -> Result<Option<User>> {
    let url = self.url(&self.users_path, Some(id.as_str()));
    self.request(Method::PUT, url, Some(&profile)).await
  }
}
