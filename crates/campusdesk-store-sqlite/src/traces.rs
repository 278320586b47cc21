//! [`TraceStore`] for [`SqliteStore`]. Traces are inserted and read, never
//! updated.

use campusdesk_core::{
  store::{MAX_PAGE_LIMIT, TraceStore},
  trace::{NewTrace, Trace},
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{RawTrace, TRACE_COLUMNS, encode_dt, encode_enum, encode_uuid},
  store::SqliteStore,
};

impl TraceStore for SqliteStore {
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

    let id_str     = encode_uuid(trace.trace_id);
    let user_id    = trace.user_id.clone();
    let intent     = encode_enum(trace.intent);
    let confidence = trace.confidence;
    let agents     = serde_json::to_string(&trace.routed_agents)?;
    let outcome    = serde_json::to_string(&trace.outcome)?;
    let at         = encode_dt(trace.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO traces ({TRACE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
          rusqlite::params![id_str, user_id, intent, confidence, agents, outcome, at],
        )?;
        Ok(())
      })
      .await?;

    Ok(trace)
  }

  async fn get_trace(&self, trace_id: Uuid) -> Result<Option<Trace>> {
    let id_str = encode_uuid(trace_id);

    let raw: Option<RawTrace> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {TRACE_COLUMNS} FROM traces WHERE trace_id = ?1"),
            rusqlite::params![id_str],
            RawTrace::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawTrace::into_trace).transpose()
  }

  async fn list_traces(&self, user_id: Option<String>, limit: usize) -> Result<Vec<Trace>> {
    let limit = limit.clamp(1, MAX_PAGE_LIMIT) as i64;

    let raws: Vec<RawTrace> = self
      .conn
      .call(move |conn| {
        let rows = conn
          .prepare(&format!(
            "SELECT {TRACE_COLUMNS} FROM traces
             WHERE (?1 IS NULL OR user_id = ?1)
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2"
          ))?
          .query_map(rusqlite::params![user_id, limit], RawTrace::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTrace::into_trace).collect()
  }
}
