//! Error types for `campusdesk-core`.

use thiserror::Error;

use crate::ticket::TicketStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("ticket not found: {0}")]
  TicketNotFound(String),

  #[error("cannot move ticket from {from} to {to}")]
  InvalidTransition { from: TicketStatus, to: TicketStatus },

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("invalid input: {0}")]
  Invalid(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box an arbitrary backend error into [`Error::Store`].
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
