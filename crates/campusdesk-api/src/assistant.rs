//! Handler for `POST /assistant/message`.

use axum::{Json, extract::State};
use campusdesk_core::assistant::{AssistantResponse, MessageInput};

use crate::{AppState, Backend, Caller, Model, error::ApiError, require_chars};

/// `POST /assistant/message`: body is a [`MessageInput`].
///
/// A status check for an unknown ticket is a 404, not an answer.
pub async fn message<S: Backend, M: Model>(
  State(state): State<AppState<S, M>>,
  Caller(actor): Caller,
  Json(input): Json<MessageInput>,
) -> Result<Json<AssistantResponse>, ApiError> {
  require_chars("message", &input.message, 2)?;
  let response = state.assistant.route_message(&actor, &input).await?;
  Ok(Json(response))
}
