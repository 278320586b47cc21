//! Error type for `campusdesk-ai`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("upstream returned {status}: {body}")]
  Status { status: reqwest::StatusCode, body: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
