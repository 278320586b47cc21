//! Trusted knowledge: FAQ entries, documents and their embedded chunks, and
//! the snippets retrieved from them at question time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::actor::Department;

// ─── FAQ ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqEntry {
  pub faq_id:     Uuid,
  pub department: Department,
  pub question:   String,
  pub answer:     String,
  pub tags:       Vec<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFaq {
  pub department: Department,
  pub question:   String,
  pub answer:     String,
  #[serde(default)]
  pub tags:       Vec<String>,
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// A document uploaded by staff. Its content is split into [`Chunk`]s once,
/// at creation time; a document is never edited, only replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
  pub document_id: Uuid,
  pub department:  Department,
  pub title:       String,
  pub content:     String,
  pub uploaded_by: String,
  pub created_at:  DateTime<Utc>,
  pub chunk_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
  pub department:  Department,
  pub title:       String,
  pub content:     String,
  pub uploaded_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
  pub chunk_id:    Uuid,
  pub document_id: Uuid,
  pub chunk_index: usize,
  pub text:        String,
  pub embedding:   Vec<f64>,
}

/// A chunk ready to be stored alongside its parent document.
#[derive(Debug, Clone)]
pub struct NewChunk {
  pub chunk_index: usize,
  pub text:        String,
  pub embedding:   Vec<f64>,
}

/// A stored chunk joined with the title of the document it belongs to.
#[derive(Debug, Clone)]
pub struct ChunkCandidate {
  pub document_id: Uuid,
  pub title:       String,
  pub text:        String,
  pub embedding:   Vec<f64>,
}

// ─── Keyword search ──────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
  EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum KnowledgeKind {
  Faq,
  Document,
}

/// One row of a keyword search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeHit {
  pub id:         Uuid,
  pub kind:       KnowledgeKind,
  pub department: Department,
  pub title:      String,
  /// First 220 characters of the answer or document content.
  pub excerpt:    String,
  pub created_at: DateTime<Utc>,
}

/// Number of characters kept in [`KnowledgeHit::excerpt`].
pub const EXCERPT_CHARS: usize = 220;

pub fn excerpt(text: &str) -> String { text.chars().take(EXCERPT_CHARS).collect() }

// ─── Retrieval ───────────────────────────────────────────────────────────────

/// A trusted snippet retrieved for one question. Never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContext {
  /// Id of the FAQ entry or document the snippet came from.
  pub source_id: Uuid,
  pub title:     String,
  pub text:      String,
  /// Cosine relevance in `[0, 1]` after the relevance floor is applied.
  pub score:     f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
  pub source_id: Uuid,
  pub title:     String,
}

impl From<&RetrievedContext> for Citation {
  fn from(c: &RetrievedContext) -> Self {
    Citation { source_id: c.source_id, title: c.title.clone() }
  }
}
