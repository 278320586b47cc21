//! Error type for `campusdesk-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] campusdesk_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enum discriminant that no longer maps to a variant.
  #[error("unknown {kind}: {value:?}")]
  UnknownVariant { kind: &'static str, value: String },
}

/// Domain failures pass through unchanged; everything else is a store error.
impl From<Error> for campusdesk_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      other => campusdesk_core::Error::store(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
