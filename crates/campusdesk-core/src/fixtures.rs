//! In-memory stand-ins for stores, retriever, and generator, shared by the
//! unit tests in this crate.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  actor::{Actor, Department, Role},
  assistant::MessageInput,
  generate::Generator,
  knowledge::{
    Chunk, ChunkCandidate, Document, FaqEntry, KnowledgeHit, NewChunk, NewDocument, NewFaq,
    RetrievedContext,
  },
  retrieve::Retriever,
  store::{KnowledgeQuery, KnowledgeStore, Page, TicketQuery, TicketStore, TraceStore},
  ticket::{Attachment, NewAttachment, NewTicket, Ticket, TicketStatus, new_ticket_id},
  trace::{NewTrace, Trace},
};

pub fn student(department: Option<Department>) -> Actor {
  Actor { user_id: "student-1".into(), role: Role::Student, department }
}

pub fn message(text: &str) -> MessageInput {
  MessageInput { message: text.into(), ..MessageInput::default() }
}

pub fn context(title: &str, text: &str, score: f64) -> RetrievedContext {
  RetrievedContext { source_id: Uuid::new_v4(), title: title.into(), text: text.into(), score }
}

// ─── Retriever / generator ───────────────────────────────────────────────────

/// Returns a fixed list of contexts and records how it was called.
#[derive(Clone, Default)]
pub struct StubRetriever {
  contexts: Vec<RetrievedContext>,
  calls:    Arc<Mutex<Vec<(Option<Department>, usize)>>>,
}

impl StubRetriever {
  pub fn empty() -> Self { Self::default() }

  pub fn with(contexts: Vec<RetrievedContext>) -> Self {
    Self { contexts, ..Self::default() }
  }

  pub fn calls(&self) -> usize { self.calls.lock().unwrap().len() }

  pub fn last_call(&self) -> Option<(Option<Department>, usize)> {
    self.calls.lock().unwrap().last().copied()
  }
}

impl Retriever for StubRetriever {
  async fn retrieve(
    &self,
    _query: &str,
    department: Option<Department>,
    top_k: usize,
  ) -> Result<Vec<RetrievedContext>> {
    self.calls.lock().unwrap().push((department, top_k));
    Ok(self.contexts.iter().take(top_k).cloned().collect())
  }
}

/// Always replies with the same text and remembers the contexts it saw.
#[derive(Clone)]
pub struct StubGenerator {
  reply: String,
  seen:  Arc<Mutex<Vec<Vec<String>>>>,
}

impl StubGenerator {
  pub fn replying(reply: &str) -> Self {
    Self { reply: reply.into(), seen: Arc::default() }
  }

  pub fn calls(&self) -> usize { self.seen.lock().unwrap().len() }

  pub fn last_contexts(&self) -> Vec<String> {
    self.seen.lock().unwrap().last().cloned().unwrap_or_default()
  }
}

impl Generator for StubGenerator {
  async fn answer(&self, _question: &str, contexts: &[String]) -> String {
    self.seen.lock().unwrap().push(contexts.to_vec());
    self.reply.clone()
  }
}

// ─── Tickets ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryTickets {
  tickets: Mutex<Vec<Ticket>>,
}

impl MemoryTickets {
  pub fn insert_with_id(&self, id: &str, status: TicketStatus) {
    let now = Utc::now();
    self.tickets.lock().unwrap().push(Ticket {
      ticket_id:   id.into(),
      student_id:  "student-1".into(),
      department:  Department::It,
      subject:     "Existing".into(),
      description: "Existing ticket".into(),
      status,
      assignee_id: None,
      created_at:  now,
      updated_at:  now,
      events:      vec![],
      attachments: vec![],
    });
  }

  pub fn get(&self, id: &str) -> Option<Ticket> {
    self.tickets.lock().unwrap().iter().find(|t| t.ticket_id == id).cloned()
  }

  pub fn count(&self) -> usize { self.tickets.lock().unwrap().len() }

  fn advance(&self, id: &str, status: TicketStatus, assignee: Option<String>) -> Result<Ticket> {
    let mut tickets = self.tickets.lock().unwrap();
    let ticket = tickets
      .iter_mut()
      .find(|t| t.ticket_id == id)
      .ok_or_else(|| Error::TicketNotFound(id.into()))?;
    ticket.status.check_advance(status)?;
    ticket.status = status;
    if assignee.is_some() {
      ticket.assignee_id = assignee;
    }
    Ok(ticket.clone())
  }
}

impl TicketStore for MemoryTickets {
  type Error = Error;

  async fn create_ticket(&self, student_id: String, input: NewTicket) -> Result<Ticket> {
    let now = Utc::now();
    let ticket = Ticket {
      ticket_id: new_ticket_id(),
      student_id,
      department: input.department,
      subject: input.subject,
      description: input.description,
      status: TicketStatus::Open,
      assignee_id: None,
      created_at: now,
      updated_at: now,
      events: vec![],
      attachments: vec![],
    };
    self.tickets.lock().unwrap().push(ticket.clone());
    Ok(ticket)
  }

  async fn get_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>> { Ok(self.get(ticket_id)) }

  async fn list_tickets(&self, query: &TicketQuery) -> Result<Page<Ticket>> {
    let items: Vec<Ticket> = self
      .tickets
      .lock()
      .unwrap()
      .iter()
      .filter(|t| query.student_id.as_ref().is_none_or(|s| &t.student_id == s))
      .cloned()
      .collect();
    Ok(Page { page: 1, limit: items.len(), total: items.len(), items })
  }

  async fn claim_ticket(&self, ticket_id: String, staff_id: String) -> Result<Ticket> {
    self.advance(&ticket_id, TicketStatus::InProgress, Some(staff_id))
  }

  async fn update_status(
    &self,
    ticket_id: String,
    _actor_id: String,
    status: TicketStatus,
  ) -> Result<Ticket> {
    self.advance(&ticket_id, status, None)
  }

  async fn add_attachment(
    &self,
    ticket_id: String,
    uploader_id: String,
    input: NewAttachment,
  ) -> Result<Attachment> {
    self.get(&ticket_id).ok_or_else(|| Error::TicketNotFound(ticket_id.clone()))?;
    Ok(Attachment {
      attachment_id: Uuid::new_v4(),
      ticket_id,
      uploader_id,
      file_name: input.file_name,
      mime_type: input.mime_type,
      size_bytes: input.size_bytes,
      storage_path: input.storage_path,
      created_at: Utc::now(),
    })
  }
}

// ─── Traces ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryTraces {
  traces: Mutex<Vec<Trace>>,
}

impl MemoryTraces {
  pub fn count(&self) -> usize { self.traces.lock().unwrap().len() }

  /// The single recorded trace; panics unless exactly one exists.
  pub fn only(&self) -> Trace {
    let traces = self.traces.lock().unwrap();
    assert_eq!(traces.len(), 1, "expected exactly one trace");
    traces[0].clone()
  }
}

impl TraceStore for MemoryTraces {
  type Error = Error;

  async fn append_trace(&self, input: NewTrace) -> Result<Trace> {
    let trace = Trace {
      trace_id:      Uuid::new_v4(),
      user_id:       input.user_id,
      intent:        input.intent,
      confidence:    input.confidence,
      routed_agents: input.routed_agents,
      outcome:       input.outcome,
      created_at:    Utc::now(),
    };
    self.traces.lock().unwrap().push(trace.clone());
    Ok(trace)
  }

  async fn get_trace(&self, trace_id: Uuid) -> Result<Option<Trace>> {
    Ok(self.traces.lock().unwrap().iter().find(|t| t.trace_id == trace_id).cloned())
  }

  async fn list_traces(&self, user_id: Option<String>, limit: usize) -> Result<Vec<Trace>> {
    Ok(
      self
        .traces
        .lock()
        .unwrap()
        .iter()
        .rev()
        .filter(|t| user_id.as_ref().is_none_or(|u| &t.user_id == u))
        .take(limit)
        .cloned()
        .collect(),
    )
  }
}

// ─── Knowledge ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryKnowledge {
  faqs:   Mutex<Vec<FaqEntry>>,
  chunks: Mutex<Vec<(Department, ChunkCandidate)>>,
  stored: Mutex<Vec<Chunk>>,
}

impl MemoryKnowledge {
  /// Add a one-chunk document; returns its document id.
  pub fn push_chunk(
    &self,
    department: Department,
    title: &str,
    text: &str,
    embedding: Vec<f64>,
  ) -> Uuid {
    let document_id = Uuid::new_v4();
    self.chunks.lock().unwrap().push((department, ChunkCandidate {
      document_id,
      title: title.into(),
      text: text.into(),
      embedding,
    }));
    document_id
  }

  pub fn push_faq(&self, department: Department, question: &str, answer: &str) -> Uuid {
    let faq_id = Uuid::new_v4();
    self.faqs.lock().unwrap().push(FaqEntry {
      faq_id,
      department,
      question: question.into(),
      answer: answer.into(),
      tags: vec![],
      created_at: Utc::now(),
    });
    faq_id
  }

  pub fn stored_chunks(&self) -> Vec<Chunk> { self.stored.lock().unwrap().clone() }
}

impl KnowledgeStore for MemoryKnowledge {
  type Error = Error;

  async fn add_faq(&self, input: NewFaq) -> Result<FaqEntry> {
    let faq_id = self.push_faq(input.department, &input.question, &input.answer);
    Ok(self.faqs.lock().unwrap().iter().find(|f| f.faq_id == faq_id).cloned().unwrap())
  }

  async fn add_document(&self, input: NewDocument, chunks: Vec<NewChunk>) -> Result<Document> {
    let document_id = Uuid::new_v4();
    let chunk_count = chunks.len();
    for c in chunks {
      self.chunks.lock().unwrap().push((input.department, ChunkCandidate {
        document_id,
        title: input.title.clone(),
        text: c.text.clone(),
        embedding: c.embedding.clone(),
      }));
      self.stored.lock().unwrap().push(Chunk {
        chunk_id: Uuid::new_v4(),
        document_id,
        chunk_index: c.chunk_index,
        text: c.text,
        embedding: c.embedding,
      });
    }
    Ok(Document {
      document_id,
      department: input.department,
      title: input.title,
      content: input.content,
      uploaded_by: input.uploaded_by,
      created_at: Utc::now(),
      chunk_count,
    })
  }

  async fn chunk_candidates(
    &self,
    department: Option<Department>,
    limit: usize,
  ) -> Result<Vec<ChunkCandidate>> {
    Ok(
      self
        .chunks
        .lock()
        .unwrap()
        .iter()
        .filter(|(d, _)| department.is_none_or(|want| *d == want))
        .take(limit)
        .map(|(_, c)| c.clone())
        .collect(),
    )
  }

  async fn faq_candidates(
    &self,
    department: Option<Department>,
    limit: usize,
  ) -> Result<Vec<FaqEntry>> {
    Ok(
      self
        .faqs
        .lock()
        .unwrap()
        .iter()
        .filter(|f| department.is_none_or(|want| f.department == want))
        .take(limit)
        .cloned()
        .collect(),
    )
  }

  async fn search(&self, _query: &KnowledgeQuery) -> Result<Page<KnowledgeHit>> {
    Ok(Page { page: 1, limit: 0, total: 0, items: vec![] })
  }
}
