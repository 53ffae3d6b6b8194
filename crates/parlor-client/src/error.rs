//! Error type for `parlor-client`.

use reqwest::{Method, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid base URL {0:?}")]
  InvalidBaseUrl(String),

  #[error("failed to build HTTP client: {0}")]
  Build(#[source] reqwest::Error),

  #[error("{method} {url} failed: {source}")]
  Http {
    method: Method,
    url:    String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{method} {url} → {status}")]
  Status {
    method: Method,
    url:    String,
    status: StatusCode,
  },

  #[error("deserialising response of {method} {url}: {source}")]
  Decode {
    method: Method,
    url:    String,
    #[source]
    source: serde_json::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
