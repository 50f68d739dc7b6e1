//! Error type for `keel-genai`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http request failed: {0}")]
  Request(#[from] reqwest::Error),

  /// The endpoint answered with a non-success status.
  #[error("generation API returned {status}: {body}")]
  Api { status: u16, body: String },

  /// The response parsed but carried no usable message content.
  #[error("generation API returned no content")]
  MissingContent,

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
