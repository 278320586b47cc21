//! Handlers for `/knowledge` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/knowledge/faqs` | Staff only; body: [`NewFaq`]; returns 201 + entry |
//! | `POST` | `/knowledge/documents` | Staff only; body: [`DocumentBody`]; returns 201 + `{id, chunks_created}` |
//! | `GET`  | `/knowledge/search` | `?q` required; optional `department`, `page`, `limit` |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use campusdesk_core::{
  actor::Department,
  knowledge::{KnowledgeHit, NewDocument, NewFaq},
  store::{KnowledgeQuery, Page},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AppState, Backend, Caller, Model, check_paging,
  error::{ApiError, store_error},
  require_chars,
};

// ─── FAQ ─────────────────────────────────────────────────────────────────────

/// `POST /knowledge/faqs`
pub async fn create_faq<S: Backend, M: Model>(
  State(state): State<AppState<S, M>>,
  caller: Caller,
  Json(body): Json<NewFaq>,
) -> Result<impl IntoResponse, ApiError> {
  caller.require_staff()?;
  require_chars("question", &body.question, 4)?;
  require_chars("answer", &body.answer, 4)?;

  let faq = state.ingestor.add_faq(body).await?;
  Ok((StatusCode::CREATED, Json(faq)))
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DocumentBody {
  pub department: Department,
  pub title:      String,
  pub content:    String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentCreated {
  pub id:             Uuid,
  pub chunks_created: usize,
}

/// `POST /knowledge/documents`: chunks and embeds `content` before storing.
pub async fn create_document<S: Backend, M: Model>(
  State(state): State<AppState<S, M>>,
  caller: Caller,
  Json(body): Json<DocumentBody>,
) -> Result<impl IntoResponse, ApiError> {
  caller.require_staff()?;
  require_chars("title", &body.title, 3)?;
  require_chars("content", &body.content, 20)?;

  let document = state
    .ingestor
    .add_document(NewDocument {
      department:  body.department,
      title:       body.title.trim().to_owned(),
      content:     body.content,
      uploaded_by: caller.0.user_id,
    })
    .await?;

  Ok((
    StatusCode::CREATED,
    Json(DocumentCreated {
      id:             document.document_id,
      chunks_created: document.chunk_count,
    }),
  ))
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub q:          String,
  pub department: Option<Department>,
  pub page:       Option<usize>,
  pub limit:      Option<usize>,
}

/// `GET /knowledge/search?q=...`
pub async fn search<S: Backend, M: Model>(
  State(state): State<AppState<S, M>>,
  _caller: Caller,
  Query(params): Query<SearchParams>,
) -> Result<Json<Page<KnowledgeHit>>, ApiError> {
  check_paging(params.page, params.limit)?;
  let page = state
    .store
    .search(&KnowledgeQuery {
      text:       params.q,
      department: params.department,
      page:       params.page,
      limit:      params.limit,
    })
    .await
    .map_err(store_error)?;
  Ok(Json(page))
}
