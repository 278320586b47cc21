//! Handlers for `/tickets` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/tickets` | Body: [`CreateTicketBody`]; returns 201 + ticket |
//! | `GET`  | `/tickets` | Scoped by role; optional `department`, `status`, `q`, `page`, `limit` |
//! | `GET`  | `/tickets/{id}` | Students only see their own |
//! | `POST` | `/tickets/{id}/claim` | Staff only |
//! | `POST` | `/tickets/{id}/status` | Staff only; body `{"status": "..."}` |
//! | `POST` | `/tickets/{id}/attachments` | Owner or staff; body: attachment metadata |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use campusdesk_core::{
  actor::{Department, Role},
  store::{Page, TicketQuery},
  ticket::{NewAttachment, NewTicket, Ticket, TicketStatus},
};
use serde::Deserialize;

use crate::{
  AppState, Backend, Caller, Model, check_paging,
  error::{ApiError, store_error},
  require_chars,
};

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateTicketBody {
  pub department:  Department,
  pub subject:     String,
  pub description: String,
}

/// `POST /tickets`: opens a ticket owned by the caller.
pub async fn create<S: Backend, M: Model>(
  State(state): State<AppState<S, M>>,
  Caller(actor): Caller,
  Json(body): Json<CreateTicketBody>,
) -> Result<impl IntoResponse, ApiError> {
  require_chars("subject", &body.subject, 3)?;
  require_chars("description", &body.description, 10)?;

  let ticket = state
    .store
    .create_ticket(actor.user_id.clone(), NewTicket {
      department:  body.department,
      subject:     body.subject.trim().to_owned(),
      description: body.description.trim().to_owned(),
    })
    .await
    .map_err(store_error)?;

  tracing::info!(
    ticket_id = %ticket.ticket_id,
    department = %ticket.department,
    user_id = %actor.user_id,
    "ticket created"
  );
  Ok((StatusCode::CREATED, Json(ticket)))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub department: Option<Department>,
  pub status:     Option<TicketStatus>,
  /// Free-text filter over subject and description.
  pub q:          Option<String>,
  pub page:       Option<usize>,
  pub limit:      Option<usize>,
}

/// `GET /tickets`
///
/// Students see their own tickets. Staff see the queue of their own
/// department, or every department if they have none. Admins see everything.
pub async fn list<S: Backend, M: Model>(
  State(state): State<AppState<S, M>>,
  Caller(actor): Caller,
  Query(params): Query<ListParams>,
) -> Result<Json<Page<Ticket>>, ApiError> {
  check_paging(params.page, params.limit)?;

  let (student_id, department) = match actor.role {
    Role::Student => (Some(actor.user_id.clone()), params.department),
    Role::Staff => (None, actor.department.or(params.department)),
    Role::Admin => (None, params.department),
  };

  let page = state
    .store
    .list_tickets(&TicketQuery {
      student_id,
      department,
      status: params.status,
      text: params.q,
      page: params.page,
      limit: params.limit,
    })
    .await
    .map_err(store_error)?;
  Ok(Json(page))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

async fn visible_ticket<S: Backend>(
  store: &S,
  caller: &Caller,
  id: &str,
) -> Result<Ticket, ApiError> {
  let ticket = store
    .get_ticket(id)
    .await
    .map_err(store_error)?
    .ok_or_else(|| ApiError::NotFound(format!("ticket {id} not found")))?;

  if !caller.0.is_staff() && ticket.student_id != caller.0.user_id {
    return Err(ApiError::Forbidden("not your ticket".into()));
  }
  Ok(ticket)
}

/// `GET /tickets/{id}`
pub async fn get_one<S: Backend, M: Model>(
  State(state): State<AppState<S, M>>,
  caller: Caller,
  Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
  Ok(Json(visible_ticket(&*state.store, &caller, &id).await?))
}

// ─── Staff actions ───────────────────────────────────────────────────────────

/// `POST /tickets/{id}/claim`
pub async fn claim<S: Backend, M: Model>(
  State(state): State<AppState<S, M>>,
  caller: Caller,
  Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
  caller.require_staff()?;
  let ticket = state
    .store
    .claim_ticket(id, caller.0.user_id.clone())
    .await
    .map_err(store_error)?;
  tracing::info!(ticket_id = %ticket.ticket_id, staff_id = %caller.0.user_id, "ticket claimed");
  Ok(Json(ticket))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: TicketStatus,
}

/// `POST /tickets/{id}/status`
pub async fn update_status<S: Backend, M: Model>(
  State(state): State<AppState<S, M>>,
  caller: Caller,
  Path(id): Path<String>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Ticket>, ApiError> {
  caller.require_staff()?;
  let ticket = state
    .store
    .update_status(id, caller.0.user_id.clone(), body.status)
    .await
    .map_err(store_error)?;
  tracing::info!(ticket_id = %ticket.ticket_id, status = %ticket.status, "ticket status changed");
  Ok(Json(ticket))
}

// ─── Attachments ─────────────────────────────────────────────────────────────

/// `POST /tickets/{id}/attachments`: returns 201 + attachment metadata.
pub async fn add_attachment<S: Backend, M: Model>(
  State(state): State<AppState<S, M>>,
  caller: Caller,
  Path(id): Path<String>,
  Json(body): Json<NewAttachment>,
) -> Result<impl IntoResponse, ApiError> {
  visible_ticket(&*state.store, &caller, &id).await?;
  let attachment = state
    .store
    .add_attachment(id, caller.0.user_id.clone(), body)
    .await
    .map_err(store_error)?;
  Ok((StatusCode::CREATED, Json(attachment)))
}
