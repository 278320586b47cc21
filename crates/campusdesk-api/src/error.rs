//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<campusdesk_core::Error> for ApiError {
  fn from(e: campusdesk_core::Error) -> Self {
    use campusdesk_core::Error as Core;
    match e {
      Core::TicketNotFound(id) => ApiError::NotFound(format!("ticket {id} not found")),
      e @ Core::InvalidTransition { .. } => ApiError::Conflict(e.to_string()),
      Core::Forbidden(m) => ApiError::Forbidden(m),
      Core::Invalid(m) => ApiError::BadRequest(m),
      Core::Store(e) => ApiError::Store(e),
    }
  }
}

/// Map a storage backend error through the core error, so domain failures
/// keep their status codes.
pub(crate) fn store_error<E: Into<campusdesk_core::Error>>(e: E) -> ApiError {
  ApiError::from(e.into())
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "request failed in storage");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
