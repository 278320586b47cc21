//! [`TicketStore`] for [`SqliteStore`].

use campusdesk_core::{
  store::{Page, TicketQuery, TicketStore},
  ticket::{
    Attachment, EventKind, NewAttachment, NewTicket, Ticket, TicketStatus, new_ticket_id,
  },
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use serde_json::json;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawAttachment, RawEvent, RawTicket, TICKET_COLUMNS, decode_enum, encode_dt, encode_enum,
    encode_uuid,
  },
  store::{SqliteStore, like_pattern, page_window},
};

/// A ticket row with its event log and attachments, still undecoded.
type RawBundle = (RawTicket, Vec<RawEvent>, Vec<RawAttachment>);

const TICKET_FILTER: &str = "
  WHERE (?1 IS NULL OR student_id = ?1)
    AND (?2 IS NULL OR department = ?2)
    AND (?3 IS NULL OR status = ?3)
    AND (?4 IS NULL
         OR lower(subject) LIKE ?4 ESCAPE '\\'
         OR lower(description) LIKE ?4 ESCAPE '\\')";

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn fetch_bundle(
  conn: &rusqlite::Connection,
  ticket_id: &str,
) -> rusqlite::Result<Option<RawBundle>> {
  let ticket = conn
    .query_row(
      &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE ticket_id = ?1"),
      rusqlite::params![ticket_id],
      RawTicket::from_row,
    )
    .optional()?;
  let Some(ticket) = ticket else {
    return Ok(None);
  };

  let events = conn
    .prepare(
      "SELECT event_id, ticket_id, actor_id, kind, payload, recorded_at
       FROM ticket_events WHERE ticket_id = ?1
       ORDER BY recorded_at ASC, rowid ASC",
    )?
    .query_map(rusqlite::params![ticket_id], |row| {
      Ok(RawEvent {
        event_id:    row.get(0)?,
        ticket_id:   row.get(1)?,
        actor_id:    row.get(2)?,
        kind:        row.get(3)?,
        payload:     row.get(4)?,
        recorded_at: row.get(5)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let attachments = conn
    .prepare(
      "SELECT attachment_id, ticket_id, uploader_id, file_name, mime_type,
              size_bytes, storage_path, created_at
       FROM attachments WHERE ticket_id = ?1
       ORDER BY created_at ASC, rowid ASC",
    )?
    .query_map(rusqlite::params![ticket_id], |row| {
      Ok(RawAttachment {
        attachment_id: row.get(0)?,
        ticket_id:     row.get(1)?,
        uploader_id:   row.get(2)?,
        file_name:     row.get(3)?,
        mime_type:     row.get(4)?,
        size_bytes:    row.get(5)?,
        storage_path:  row.get(6)?,
        created_at:    row.get(7)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(Some((ticket, events, attachments)))
}

fn decode_bundle((ticket, events, attachments): RawBundle) -> Result<Ticket> {
  let mut ticket = ticket.into_ticket()?;
  ticket.events = events.into_iter().map(RawEvent::into_event).collect::<Result<_>>()?;
  ticket.attachments = attachments
    .into_iter()
    .map(RawAttachment::into_attachment)
    .collect::<Result<_>>()?;
  Ok(ticket)
}

fn insert_event(
  conn: &rusqlite::Connection,
  ticket_id: &str,
  actor_id: &str,
  kind: EventKind,
  payload: &serde_json::Value,
  at: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO ticket_events (event_id, ticket_id, actor_id, kind, payload, recorded_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      encode_uuid(Uuid::new_v4()),
      ticket_id,
      actor_id,
      encode_enum(kind),
      payload.to_string(),
      at,
    ],
  )?;
  Ok(())
}

/// A forward status move, applied by [`SqliteStore::advance`].
struct Advance {
  ticket_id: String,
  actor_id:  String,
  next:      TicketStatus,
  /// `Some` when claiming; the assignee is left alone otherwise.
  assignee:  Option<String>,
  kind:      EventKind,
}

impl SqliteStore {
  /// Check the transition, update the row, and append one event, all in a
  /// single transaction.
  async fn advance(&self, change: Advance) -> Result<Ticket> {
    let now = encode_dt(Utc::now());

    let bundle = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let current: Option<String> = tx
          .query_row(
            "SELECT status FROM tickets WHERE ticket_id = ?1",
            rusqlite::params![change.ticket_id],
            |r| r.get(0),
          )
          .optional()?;
        let Some(current) = current else {
          return Ok(Err(Error::Core(campusdesk_core::Error::TicketNotFound(
            change.ticket_id,
          ))));
        };
        let current = match decode_enum::<TicketStatus>("ticket status", &current) {
          Ok(status) => status,
          Err(e) => return Ok(Err(e)),
        };
        if let Err(e) = current.check_advance(change.next) {
          return Ok(Err(e.into()));
        }

        tx.execute(
          "UPDATE tickets
           SET status = ?2, assignee_id = COALESCE(?3, assignee_id), updated_at = ?4
           WHERE ticket_id = ?1",
          rusqlite::params![
            change.ticket_id,
            encode_enum(change.next),
            change.assignee,
            now,
          ],
        )?;

        let payload = match change.kind {
          EventKind::Claimed => json!({ "assignee_id": change.assignee }),
          _ => json!({ "from": current, "to": change.next }),
        };
        insert_event(&tx, &change.ticket_id, &change.actor_id, change.kind, &payload, &now)?;

        match fetch_bundle(&tx, &change.ticket_id)? {
          Some(bundle) => {
            tx.commit()?;
            Ok(Ok(bundle))
          }
          None => Ok(Err(campusdesk_core::Error::TicketNotFound(change.ticket_id).into())),
        }
      })
      .await??;

    decode_bundle(bundle)
  }
}

// ─── TicketStore impl ────────────────────────────────────────────────────────

impl TicketStore for SqliteStore {
  type Error = Error;

  async fn create_ticket(&self, student_id: String, input: NewTicket) -> Result<Ticket> {
    let now = Utc::now();
    let mut ticket = Ticket {
      ticket_id: new_ticket_id(),
      student_id,
      department: input.department,
      subject: input.subject,
      description: input.description,
      status: TicketStatus::Open,
      assignee_id: None,
      created_at: now,
      updated_at: now,
      events: Vec::new(),
      attachments: Vec::new(),
    };

    let ticket_id   = ticket.ticket_id.clone();
    let student_id  = ticket.student_id.clone();
    let department  = encode_enum(ticket.department);
    let subject     = ticket.subject.clone();
    let description = ticket.description.clone();
    let status      = encode_enum(ticket.status);
    let at          = encode_dt(now);

    let events = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO tickets (
             ticket_id, student_id, department, subject, description,
             status, assignee_id, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7, ?7)",
          rusqlite::params![ticket_id, student_id, department, subject, description, status, at],
        )?;
        insert_event(
          &tx,
          &ticket_id,
          &student_id,
          EventKind::Created,
          &json!({ "department": department, "subject": subject }),
          &at,
        )?;
        let bundle = fetch_bundle(&tx, &ticket_id)?;
        tx.commit()?;
        Ok(bundle.map(|(_, events, _)| events).unwrap_or_default())
      })
      .await?;

    ticket.events = events.into_iter().map(RawEvent::into_event).collect::<Result<_>>()?;
    tracing::debug!(ticket_id = %ticket.ticket_id, "ticket stored");
    Ok(ticket)
  }

  async fn get_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>> {
    let ticket_id = ticket_id.to_owned();
    let bundle = self
      .conn
      .call(move |conn| Ok(fetch_bundle(conn, &ticket_id)?))
      .await?;
    bundle.map(decode_bundle).transpose()
  }

  async fn list_tickets(&self, query: &TicketQuery) -> Result<Page<Ticket>> {
    let (page, limit, offset) = page_window(query.page, query.limit);
    let student_id = query.student_id.clone();
    let department = query.department.map(encode_enum);
    let status     = query.status.map(encode_enum);
    let text       = like_pattern(query.text.as_deref());

    let (total, raws): (i64, Vec<RawTicket>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM tickets {TICKET_FILTER}"),
          rusqlite::params![student_id, department, status, text],
          |r| r.get(0),
        )?;

        let rows = conn
          .prepare(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets {TICKET_FILTER}
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?5 OFFSET ?6"
          ))?
          .query_map(
            rusqlite::params![student_id, department, status, text, limit as i64, offset as i64],
            RawTicket::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    let items = raws.into_iter().map(RawTicket::into_ticket).collect::<Result<_>>()?;
    Ok(Page { page, limit, total: total.max(0) as usize, items })
  }

  async fn claim_ticket(&self, ticket_id: String, staff_id: String) -> Result<Ticket> {
    self
      .advance(Advance {
        ticket_id,
        actor_id: staff_id.clone(),
        next: TicketStatus::InProgress,
        assignee: Some(staff_id),
        kind: EventKind::Claimed,
      })
      .await
  }

  async fn update_status(
    &self,
    ticket_id: String,
    actor_id: String,
    status: TicketStatus,
  ) -> Result<Ticket> {
    self
      .advance(Advance {
        ticket_id,
        actor_id,
        next: status,
        assignee: None,
        kind: EventKind::StatusChanged,
      })
      .await
  }

  async fn add_attachment(
    &self,
    ticket_id: String,
    uploader_id: String,
    input: NewAttachment,
  ) -> Result<Attachment> {
    input.validate()?;

    let attachment = Attachment {
      attachment_id: Uuid::new_v4(),
      ticket_id,
      uploader_id,
      file_name: input.file_name,
      mime_type: input.mime_type,
      size_bytes: input.size_bytes,
      storage_path: input.storage_path,
      created_at: Utc::now(),
    };

    let row = attachment.clone();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM tickets WHERE ticket_id = ?1",
            rusqlite::params![row.ticket_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(Err(campusdesk_core::Error::TicketNotFound(row.ticket_id)));
        }

        let at = encode_dt(row.created_at);
        tx.execute(
          "INSERT INTO attachments (
             attachment_id, ticket_id, uploader_id, file_name, mime_type,
             size_bytes, storage_path, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            encode_uuid(row.attachment_id),
            row.ticket_id,
            row.uploader_id,
            row.file_name,
            row.mime_type,
            row.size_bytes as i64,
            row.storage_path,
            at,
          ],
        )?;
        insert_event(
          &tx,
          &row.ticket_id,
          &row.uploader_id,
          EventKind::AttachmentAdded,
          &json!({ "attachment_id": row.attachment_id, "file_name": row.file_name }),
          &at,
        )?;
        tx.execute(
          "UPDATE tickets SET updated_at = ?2 WHERE ticket_id = ?1",
          rusqlite::params![row.ticket_id, at],
        )?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    Ok(attachment)
  }
}
