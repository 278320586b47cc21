//! Caller identity from gateway-supplied headers.
//!
//! Authentication happens upstream; this layer only trusts and parses the
//! result. A missing or malformed identity is rejected with 401.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use campusdesk_core::actor::{Actor, Department, Role};

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USER_DEPARTMENT_HEADER: &str = "x-user-department";

/// The authenticated caller. Present in a handler means the identity
/// headers were well-formed.
#[derive(Debug, Clone)]
pub struct Caller(pub Actor);

impl Caller {
  /// Reject callers who are neither staff nor admin.
  pub fn require_staff(&self) -> Result<(), ApiError> {
    if self.0.is_staff() {
      Ok(())
    } else {
      Err(ApiError::Forbidden("staff access required".into()))
    }
  }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|v| !v.is_empty())
}

/// Parse the identity headers into an [`Actor`].
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, ApiError> {
  let user_id = header(headers, USER_ID_HEADER)
    .ok_or_else(|| ApiError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?;

  let role = header(headers, USER_ROLE_HEADER)
    .ok_or_else(|| ApiError::Unauthorized(format!("missing {USER_ROLE_HEADER} header")))?;
  let role: Role = role
    .to_ascii_uppercase()
    .parse()
    .map_err(|_| ApiError::Unauthorized(format!("unknown role {role:?}")))?;

  let department = header(headers, USER_DEPARTMENT_HEADER)
    .map(|d| {
      d.to_ascii_uppercase()
        .parse::<Department>()
        .map_err(|_| ApiError::Unauthorized(format!("unknown department {d:?}")))
    })
    .transpose()?;

  Ok(Actor { user_id: user_id.to_owned(), role, department })
}

impl<S> FromRequestParts<S> for Caller
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    actor_from_headers(&parts.headers).map(Caller)
  }
}
