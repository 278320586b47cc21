//! Support tickets and their append-only event log.
//!
//! A ticket is owned by the student who opened it. Staff and admins may claim
//! it and move its status forward; ownership never changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result, actor::Department};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display,
  EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
  #[default]
  Open,
  InProgress,
  Resolved,
}

impl TicketStatus {
  /// Whether a ticket may move from `self` to `next`.
  ///
  /// Status only moves forward. `InProgress -> InProgress` is allowed so that
  /// another staff member can take over a claimed ticket.
  pub fn can_advance_to(self, next: TicketStatus) -> bool {
    use TicketStatus::*;
    matches!(
      (self, next),
      (Open, InProgress) | (Open, Resolved) | (InProgress, InProgress) | (InProgress, Resolved)
    )
  }

  /// Like [`can_advance_to`](Self::can_advance_to) but as a `Result`.
  pub fn check_advance(self, next: TicketStatus) -> Result<()> {
    if self.can_advance_to(next) {
      Ok(())
    } else {
      Err(Error::InvalidTransition { from: self, to: next })
    }
  }
}

/// Generate a ticket id: 32 lower-case hex characters.
///
/// Ids are plain alphanumerics so a student can quote one in a chat message
/// ("status of ticket 3f2a...") and have it recognised.
pub fn new_ticket_id() -> String { Uuid::new_v4().simple().to_string() }

// ─── Ticket ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
  pub ticket_id:   String,
  pub student_id:  String,
  pub department:  Department,
  pub subject:     String,
  pub description: String,
  pub status:      TicketStatus,
  pub assignee_id: Option<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
  /// Oldest first.
  pub events:      Vec<TicketEvent>,
  pub attachments: Vec<Attachment>,
}

/// Input to [`TicketStore::create_ticket`](crate::store::TicketStore::create_ticket).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTicket {
  pub department:  Department,
  pub subject:     String,
  pub description: String,
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
  EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
  Created,
  Claimed,
  StatusChanged,
  AttachmentAdded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketEvent {
  pub event_id:    Uuid,
  pub ticket_id:   String,
  pub actor_id:    String,
  pub kind:        EventKind,
  pub payload:     serde_json::Value,
  pub recorded_at: DateTime<Utc>,
}

// ─── Attachments ─────────────────────────────────────────────────────────────

/// Largest attachment accepted, in bytes.
pub const MAX_ATTACHMENT_BYTES: u64 = 5 * 1024 * 1024;

const ALLOWED_MIME_TYPES: &[&str] =
  &["image/png", "image/jpeg", "application/pdf", "text/plain"];

/// Metadata for a file attached to a ticket. The bytes live elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
  pub attachment_id: Uuid,
  pub ticket_id:     String,
  pub uploader_id:   String,
  pub file_name:     String,
  pub mime_type:     String,
  pub size_bytes:    u64,
  pub storage_path:  String,
  pub created_at:    DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAttachment {
  pub file_name:    String,
  pub mime_type:    String,
  pub size_bytes:   u64,
  pub storage_path: String,
}

impl NewAttachment {
  pub fn validate(&self) -> Result<()> {
    if !ALLOWED_MIME_TYPES.contains(&self.mime_type.as_str()) {
      return Err(Error::Invalid(format!(
        "unsupported file type: {}",
        self.mime_type
      )));
    }
    if self.size_bytes > MAX_ATTACHMENT_BYTES {
      return Err(Error::Invalid("attachment too large (max 5MB)".into()));
    }
    Ok(())
  }
}
