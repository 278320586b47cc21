//! Storage traits and supporting query types.
//!
//! The traits are implemented by storage backends (e.g.
//! `campusdesk-store-sqlite`). The routing pipeline and the HTTP layer depend
//! on these abstractions, not on any concrete backend.
//!
//! Every backend error must convert into [`crate::Error`], so callers can
//! tell "ticket not found" apart from an I/O failure.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  actor::Department,
  knowledge::{ChunkCandidate, Document, FaqEntry, KnowledgeHit, NewChunk, NewDocument, NewFaq},
  ticket::{Attachment, NewAttachment, NewTicket, Ticket, TicketStatus},
  trace::{NewTrace, Trace},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
  pub page:  usize,
  pub limit: usize,
  pub total: usize,
  pub items: Vec<T>,
}

/// Parameters for [`TicketStore::list_tickets`].
#[derive(Debug, Clone, Default)]
pub struct TicketQuery {
  /// Restrict to tickets opened by this student.
  pub student_id: Option<String>,
  pub department: Option<Department>,
  pub status:     Option<TicketStatus>,
  /// Case-insensitive filter over subject and description.
  pub text:       Option<String>,
  /// 1-based; defaults to 1.
  pub page:       Option<usize>,
  /// Defaults to 10.
  pub limit:      Option<usize>,
}

/// Parameters for [`KnowledgeStore::search`].
#[derive(Debug, Clone, Default)]
pub struct KnowledgeQuery {
  pub text:       String,
  pub department: Option<Department>,
  pub page:       Option<usize>,
  pub limit:      Option<usize>,
}

pub const DEFAULT_PAGE_LIMIT: usize = 10;
/// Larger requested limits are clamped to this.
pub const MAX_PAGE_LIMIT: usize = 50;

// ─── Tickets ─────────────────────────────────────────────────────────────────

/// Ticket persistence. Every mutation appends to the ticket's event log.
pub trait TicketStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  /// Open a ticket on behalf of `student_id` and record a `Created` event.
  fn create_ticket(
    &self,
    student_id: String,
    input: NewTicket,
  ) -> impl Future<Output = Result<Ticket, Self::Error>> + Send + '_;

  /// Fetch a ticket with its events and attachments. `None` if not found.
  fn get_ticket<'a>(
    &'a self,
    ticket_id: &'a str,
  ) -> impl Future<Output = Result<Option<Ticket>, Self::Error>> + Send + 'a;

  /// Newest first. Events and attachments are not loaded.
  fn list_tickets<'a>(
    &'a self,
    query: &'a TicketQuery,
  ) -> impl Future<Output = Result<Page<Ticket>, Self::Error>> + Send + 'a;

  /// Assign the ticket to `staff_id` and move it to `InProgress`.
  ///
  /// Fails with a not-found error for unknown ids and an invalid-transition
  /// error for resolved tickets.
  fn claim_ticket(
    &self,
    ticket_id: String,
    staff_id: String,
  ) -> impl Future<Output = Result<Ticket, Self::Error>> + Send + '_;

  /// Move the ticket forward to `status`; see
  /// [`TicketStatus::can_advance_to`].
  fn update_status(
    &self,
    ticket_id: String,
    actor_id: String,
    status: TicketStatus,
  ) -> impl Future<Output = Result<Ticket, Self::Error>> + Send + '_;

  /// Record attachment metadata against a ticket.
  fn add_attachment(
    &self,
    ticket_id: String,
    uploader_id: String,
    input: NewAttachment,
  ) -> impl Future<Output = Result<Attachment, Self::Error>> + Send + '_;
}

// ─── Knowledge ───────────────────────────────────────────────────────────────

/// Trusted knowledge persistence: FAQ entries and chunked documents.
pub trait KnowledgeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  fn add_faq(
    &self,
    input: NewFaq,
  ) -> impl Future<Output = Result<FaqEntry, Self::Error>> + Send + '_;

  /// Store a document and its chunks together.
  fn add_document(
    &self,
    input: NewDocument,
    chunks: Vec<NewChunk>,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Up to `limit` stored chunks, optionally restricted to one department.
  fn chunk_candidates(
    &self,
    department: Option<Department>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ChunkCandidate>, Self::Error>> + Send + '_;

  /// Up to `limit` FAQ entries, optionally restricted to one department.
  fn faq_candidates(
    &self,
    department: Option<Department>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<FaqEntry>, Self::Error>> + Send + '_;

  /// Case-insensitive keyword search over FAQs and documents, newest first.
  fn search<'a>(
    &'a self,
    query: &'a KnowledgeQuery,
  ) -> impl Future<Output = Result<Page<KnowledgeHit>, Self::Error>> + Send + 'a;
}

// ─── Traces ──────────────────────────────────────────────────────────────────

/// Append-only store of routing traces.
pub trait TraceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  /// Persist a trace. The store assigns `trace_id` and `created_at`.
  fn append_trace(
    &self,
    input: NewTrace,
  ) -> impl Future<Output = Result<Trace, Self::Error>> + Send + '_;

  fn get_trace(
    &self,
    trace_id: Uuid,
  ) -> impl Future<Output = Result<Option<Trace>, Self::Error>> + Send + '_;

  /// Newest first, optionally restricted to one user.
  fn list_traces(
    &self,
    user_id: Option<String>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Trace>, Self::Error>> + Send + '_;
}
