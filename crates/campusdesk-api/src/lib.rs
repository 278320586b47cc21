//! JSON REST API for campusdesk.
//!
//! Exposes an axum [`Router`] over one storage backend and one model
//! backend. Caller identity arrives in `x-user-*` headers set by the
//! gateway; TLS and authentication are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = campusdesk_api::AppState::new(store, provider, &config.routing);
//! axum::serve(listener, campusdesk_api::api_router(state)).await?;
//! ```

pub mod assistant;
pub mod error;
pub mod identity;
pub mod knowledge;
pub mod tickets;
pub mod traces;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use campusdesk_core::{
  assistant::Assistant,
  config::RoutingConfig,
  embedding::Embedder,
  generate::Generator,
  ingest::Ingestor,
  retrieve::StoreRetriever,
  store::{KnowledgeStore, MAX_PAGE_LIMIT, TicketStore, TraceStore},
};

pub use error::ApiError;
pub use identity::Caller;

// ─── Backends ────────────────────────────────────────────────────────────────

/// A store implementing every storage trait.
pub trait Backend: TicketStore + KnowledgeStore + TraceStore + 'static {}

impl<T> Backend for T where T: TicketStore + KnowledgeStore + TraceStore + 'static {}

/// A model backend that both embeds and generates.
pub trait Model: Embedder + Generator + Clone + 'static {}

impl<T> Model for T where T: Embedder + Generator + Clone + 'static {}

/// The routing pipeline as wired for a single backend and model.
pub type Pipeline<S, M> = Assistant<StoreRetriever<S, M>, M, S, S>;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, M> {
  pub store:     Arc<S>,
  pub assistant: Arc<Pipeline<S, M>>,
  pub ingestor:  Arc<Ingestor<S, M>>,
}

impl<S, M> Clone for AppState<S, M> {
  fn clone(&self) -> Self {
    Self {
      store:     self.store.clone(),
      assistant: self.assistant.clone(),
      ingestor:  self.ingestor.clone(),
    }
  }
}

impl<S: Backend, M: Model> AppState<S, M> {
  pub fn new(store: Arc<S>, model: M, routing: &RoutingConfig) -> Self {
    let retriever = StoreRetriever::new(store.clone(), model.clone(), routing.clone());
    let assistant = Assistant::new(
      retriever,
      model.clone(),
      store.clone(),
      store.clone(),
      routing,
    );
    let ingestor = Ingestor::new(store.clone(), model, routing.chunk_size);
    Self {
      store,
      assistant: Arc::new(assistant),
      ingestor: Arc::new(ingestor),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S: Backend, M: Model>(state: AppState<S, M>) -> Router<()> {
  Router::new()
    // Assistant
    .route("/assistant/message", post(assistant::message::<S, M>))
    // Tickets
    .route("/tickets", get(tickets::list::<S, M>).post(tickets::create::<S, M>))
    .route("/tickets/{id}", get(tickets::get_one::<S, M>))
    .route("/tickets/{id}/claim", post(tickets::claim::<S, M>))
    .route("/tickets/{id}/status", post(tickets::update_status::<S, M>))
    .route("/tickets/{id}/attachments", post(tickets::add_attachment::<S, M>))
    // Knowledge
    .route("/knowledge/faqs", post(knowledge::create_faq::<S, M>))
    .route("/knowledge/documents", post(knowledge::create_document::<S, M>))
    .route("/knowledge/search", get(knowledge::search::<S, M>))
    // Traces
    .route("/traces", get(traces::list::<S, M>))
    .route("/traces/{id}", get(traces::get_one::<S, M>))
    .with_state(state)
}

// ─── Request validation ──────────────────────────────────────────────────────

/// Require at least `min` characters in `value` once trimmed.
pub(crate) fn require_chars(field: &str, value: &str, min: usize) -> Result<(), ApiError> {
  if value.trim().chars().count() < min {
    return Err(ApiError::BadRequest(format!(
      "{field} must be at least {min} characters"
    )));
  }
  Ok(())
}

/// Pages are 1-based; limits run from 1 to [`MAX_PAGE_LIMIT`].
pub(crate) fn check_paging(page: Option<usize>, limit: Option<usize>) -> Result<(), ApiError> {
  if page == Some(0) {
    return Err(ApiError::BadRequest("page must be at least 1".into()));
  }
  if let Some(limit) = limit
    && !(1..=MAX_PAGE_LIMIT).contains(&limit)
  {
    return Err(ApiError::BadRequest(format!(
      "limit must be between 1 and {MAX_PAGE_LIMIT}"
    )));
  }
  Ok(())
}
