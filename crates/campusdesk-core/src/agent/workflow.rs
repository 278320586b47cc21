//! Ticket status lookups and ticket creation on a student's behalf.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::{
  Error, Result,
  actor::{Actor, Department},
  assistant::MessageInput,
  store::TicketStore,
  ticket::NewTicket,
};

/// Phrases that ask for a new ticket.
pub const CREATE_SIGNALS: &[&str] = &[
  "create ticket",
  "open ticket",
  "create request",
  "open request",
  "support request",
  "escalate",
];

/// Shown when the message is neither a status check nor a creation request.
pub const HELP_MESSAGE: &str =
  "I can create a support ticket or check ticket status. Say \"create ticket\" and include details.";

const SUBJECT_MAX_CHARS: usize = 60;
const SUBJECT_KEEP_CHARS: usize = 57;

static TICKET_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)ticket\s+([a-z0-9]{10,})").expect("ticket id pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowReply {
  pub message:   String,
  pub ticket_id: Option<String>,
}

pub struct WorkflowAgent<T> {
  tickets: Arc<T>,
}

impl<T: TicketStore> WorkflowAgent<T> {
  pub fn new(tickets: Arc<T>) -> Self { Self { tickets } }

  /// Interpret `input` as a status check or a ticket request.
  ///
  /// A status check for an unknown ticket fails with
  /// [`Error::TicketNotFound`].
  pub async fn handle(&self, actor: &Actor, input: &MessageInput) -> Result<WorkflowReply> {
    let text = input.message.to_lowercase();

    if text.contains("status")
      && let Some(id) = quoted_ticket_id(&input.message)
    {
      let ticket = self
        .tickets
        .get_ticket(id)
        .await
        .map_err(Into::<Error>::into)?
        .ok_or_else(|| Error::TicketNotFound(id.to_owned()))?;

      return Ok(WorkflowReply {
        message:   format!("Ticket {} is currently {}.", ticket.ticket_id, ticket.status),
        ticket_id: Some(ticket.ticket_id),
      });
    }

    let explicit = input.department.is_some()
      && input.subject.is_some()
      && input.description.is_some();
    let asked = CREATE_SIGNALS.iter().any(|s| text.contains(s));

    if !(asked || explicit) {
      return Ok(WorkflowReply { message: HELP_MESSAGE.to_owned(), ticket_id: None });
    }

    let department = input
      .department
      .or(actor.department)
      .unwrap_or(Department::It);
    let new_ticket = NewTicket {
      department,
      subject:     input
        .subject
        .clone()
        .unwrap_or_else(|| infer_subject(&input.message)),
      description: input
        .description
        .clone()
        .unwrap_or_else(|| input.message.clone()),
    };

    let ticket = self
      .tickets
      .create_ticket(actor.user_id.clone(), new_ticket)
      .await
      .map_err(Into::<Error>::into)?;

    tracing::info!(
      ticket_id = %ticket.ticket_id,
      student_id = %actor.user_id,
      %department,
      "assistant opened ticket"
    );

    Ok(WorkflowReply {
      message:   format!(
        "I created ticket {} for {department}. The support team has been notified.",
        ticket.ticket_id
      ),
      ticket_id: Some(ticket.ticket_id),
    })
  }
}

/// The id in "ticket <id>", if the message quotes one.
pub fn quoted_ticket_id(message: &str) -> Option<&str> {
  TICKET_ID_RE
    .captures(message)
    .and_then(|c| c.get(1))
    .map(|m| m.as_str())
}

/// A subject line derived from the message: trimmed, and cut to 57
/// characters plus `...` when longer than 60.
pub fn infer_subject(message: &str) -> String {
  let trimmed = message.trim();
  if trimmed.chars().count() <= SUBJECT_MAX_CHARS {
    return trimmed.to_owned();
  }
  let head: String = trimmed.chars().take(SUBJECT_KEEP_CHARS).collect();
  format!("{head}...")
}
