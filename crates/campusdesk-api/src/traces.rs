//! Handlers for `/traces` endpoints. Traces are read-only over HTTP.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use campusdesk_core::trace::Trace;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState, Backend, Caller, Model,
  error::{ApiError, store_error},
};

const DEFAULT_TRACE_LIMIT: usize = 50;

/// `GET /traces/{id}`: the owner or an admin.
pub async fn get_one<S: Backend, M: Model>(
  State(state): State<AppState<S, M>>,
  Caller(actor): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Trace>, ApiError> {
  let trace = state
    .store
    .get_trace(id)
    .await
    .map_err(store_error)?
    .ok_or_else(|| ApiError::NotFound(format!("trace {id} not found")))?;

  if !actor.is_admin() && trace.user_id != actor.user_id {
    return Err(ApiError::Forbidden("not your trace".into()));
  }
  Ok(Json(trace))
}

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Admin only; everyone else always sees their own traces.
  pub user_id: Option<String>,
  pub limit:   Option<usize>,
}

/// `GET /traces[?user_id=...][&limit=...]`, newest first.
pub async fn list<S: Backend, M: Model>(
  State(state): State<AppState<S, M>>,
  Caller(actor): Caller,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Trace>>, ApiError> {
  let user_id = if actor.is_admin() { params.user_id } else { Some(actor.user_id) };
  let traces = state
    .store
    .list_traces(user_id, params.limit.unwrap_or(DEFAULT_TRACE_LIMIT))
    .await
    .map_err(store_error)?;
  Ok(Json(traces))
}
