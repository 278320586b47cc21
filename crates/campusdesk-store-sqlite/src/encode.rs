//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that string order is time order. Enums are
//! stored by their upper-case names. Vectors, tags, and other structured
//! fields are stored as compact JSON.

use std::str::FromStr;

use campusdesk_core::{
  actor::Department,
  knowledge::{ChunkCandidate, FaqEntry, KnowledgeHit, KnowledgeKind, excerpt},
  ticket::{Attachment, EventKind, Ticket, TicketEvent, TicketStatus},
  trace::{Intent, Outcome, RouteLog, Trace},
};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The stored name of an enum variant.
pub fn encode_enum<T: Into<&'static str>>(value: T) -> String { value.into().to_owned() }

pub fn decode_enum<T: FromStr>(kind: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| Error::UnknownVariant { kind, value: s.to_owned() })
}

pub fn decode_department(s: &str) -> Result<Department> { decode_enum("department", s) }

// ─── Raw rows ────────────────────────────────────────────────────────────────
//
// Each `Raw*` struct is filled inside a `tokio_rusqlite` closure (where only
// `rusqlite` errors are available) and decoded outside it.

pub struct RawTicket {
  pub ticket_id:   String,
  pub student_id:  String,
  pub department:  String,
  pub subject:     String,
  pub description: String,
  pub status:      String,
  pub assignee_id: Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

pub const TICKET_COLUMNS: &str = "ticket_id, student_id, department, subject, description, \
                                  status, assignee_id, created_at, updated_at";

impl RawTicket {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      ticket_id:   row.get(0)?,
      student_id:  row.get(1)?,
      department:  row.get(2)?,
      subject:     row.get(3)?,
      description: row.get(4)?,
      status:      row.get(5)?,
      assignee_id: row.get(6)?,
      created_at:  row.get(7)?,
      updated_at:  row.get(8)?,
    })
  }

  /// Decode without events or attachments.
  pub fn into_ticket(self) -> Result<Ticket> {
    Ok(Ticket {
      ticket_id:   self.ticket_id,
      student_id:  self.student_id,
      department:  decode_department(&self.department)?,
      subject:     self.subject,
      description: self.description,
      status:      decode_enum::<TicketStatus>("ticket status", &self.status)?,
      assignee_id: self.assignee_id,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
      events:      Vec::new(),
      attachments: Vec::new(),
    })
  }
}

pub struct RawEvent {
  pub event_id:    String,
  pub ticket_id:   String,
  pub actor_id:    String,
  pub kind:        String,
  pub payload:     String,
  pub recorded_at: String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<TicketEvent> {
    Ok(TicketEvent {
      event_id:    decode_uuid(&self.event_id)?,
      ticket_id:   self.ticket_id,
      actor_id:    self.actor_id,
      kind:        decode_enum::<EventKind>("event kind", &self.kind)?,
      payload:     serde_json::from_str(&self.payload)?,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

pub struct RawAttachment {
  pub attachment_id: String,
  pub ticket_id:     String,
  pub uploader_id:   String,
  pub file_name:     String,
  pub mime_type:     String,
  pub size_bytes:    i64,
  pub storage_path:  String,
  pub created_at:    String,
}

impl RawAttachment {
  pub fn into_attachment(self) -> Result<Attachment> {
    Ok(Attachment {
      attachment_id: decode_uuid(&self.attachment_id)?,
      ticket_id:     self.ticket_id,
      uploader_id:   self.uploader_id,
      file_name:     self.file_name,
      mime_type:     self.mime_type,
      size_bytes:    self.size_bytes.max(0) as u64,
      storage_path:  self.storage_path,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawFaq {
  pub faq_id:     String,
  pub department: String,
  pub question:   String,
  pub answer:     String,
  pub tags:       String,
  pub created_at: String,
}

pub const FAQ_COLUMNS: &str = "faq_id, department, question, answer, tags, created_at";

impl RawFaq {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      faq_id:     row.get(0)?,
      department: row.get(1)?,
      question:   row.get(2)?,
      answer:     row.get(3)?,
      tags:       row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_faq(self) -> Result<FaqEntry> {
    Ok(FaqEntry {
      faq_id:     decode_uuid(&self.faq_id)?,
      department: decode_department(&self.department)?,
      question:   self.question,
      answer:     self.answer,
      tags:       serde_json::from_str(&self.tags)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawChunkCandidate {
  pub document_id: String,
  pub title:       String,
  pub text:        String,
  pub embedding:   String,
}

impl RawChunkCandidate {
  pub fn into_candidate(self) -> Result<ChunkCandidate> {
    Ok(ChunkCandidate {
      document_id: decode_uuid(&self.document_id)?,
      title:       self.title,
      text:        self.text,
      embedding:   serde_json::from_str(&self.embedding)?,
    })
  }
}

pub struct RawHit {
  pub id:         String,
  pub kind:       String,
  pub department: String,
  pub title:      String,
  pub body:       String,
  pub created_at: String,
}

impl RawHit {
  pub fn into_hit(self) -> Result<KnowledgeHit> {
    Ok(KnowledgeHit {
      id:         decode_uuid(&self.id)?,
      kind:       decode_enum::<KnowledgeKind>("knowledge kind", &self.kind)?,
      department: decode_department(&self.department)?,
      title:      self.title,
      excerpt:    excerpt(&self.body),
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawTrace {
  pub trace_id:      String,
  pub user_id:       String,
  pub intent:        String,
  pub confidence:    Option<f64>,
  pub routed_agents: String,
  pub outcome:       String,
  pub created_at:    String,
}

pub const TRACE_COLUMNS: &str =
  "trace_id, user_id, intent, confidence, routed_agents, outcome, created_at";

impl RawTrace {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      trace_id:      row.get(0)?,
      user_id:       row.get(1)?,
      intent:        row.get(2)?,
      confidence:    row.get(3)?,
      routed_agents: row.get(4)?,
      outcome:       row.get(5)?,
      created_at:    row.get(6)?,
    })
  }

  pub fn into_trace(self) -> Result<Trace> {
    let routed_agents: RouteLog = serde_json::from_str(&self.routed_agents)?;
    let outcome: Outcome = serde_json::from_str(&self.outcome)?;
    Ok(Trace {
      trace_id: decode_uuid(&self.trace_id)?,
      user_id: self.user_id,
      intent: decode_enum::<Intent>("intent", &self.intent)?,
      confidence: self.confidence,
      routed_agents,
      outcome,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
