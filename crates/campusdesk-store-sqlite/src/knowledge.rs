//! [`KnowledgeStore`] for [`SqliteStore`].

use campusdesk_core::{
  actor::Department,
  knowledge::{ChunkCandidate, Document, FaqEntry, KnowledgeHit, NewChunk, NewDocument, NewFaq},
  store::{KnowledgeQuery, KnowledgeStore, Page},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    FAQ_COLUMNS, RawChunkCandidate, RawFaq, RawHit, encode_dt, encode_enum, encode_uuid,
  },
  store::{SqliteStore, like_pattern, page_window},
};

/// FAQ entries and documents as one result set. `?1` is the department
/// filter and `?2` the lower-cased `LIKE` pattern; either may be NULL.
const HITS: &str = "
  SELECT faq_id AS id, 'FAQ' AS kind, department, question AS title,
         answer AS body, created_at, rowid AS rid
  FROM faq_entries
  WHERE (?1 IS NULL OR department = ?1)
    AND (?2 IS NULL
         OR lower(question) LIKE ?2 ESCAPE '\\'
         OR lower(answer) LIKE ?2 ESCAPE '\\'
         OR EXISTS (SELECT 1 FROM json_each(faq_entries.tags)
                    WHERE lower(json_each.value) LIKE ?2 ESCAPE '\\'))
  UNION ALL
  SELECT document_id, 'DOCUMENT', department, title, content, created_at, rowid
  FROM documents
  WHERE (?1 IS NULL OR department = ?1)
    AND (?2 IS NULL
         OR lower(title) LIKE ?2 ESCAPE '\\'
         OR lower(content) LIKE ?2 ESCAPE '\\')";

impl KnowledgeStore for SqliteStore {
  type Error = Error;

  async fn add_faq(&self, input: NewFaq) -> Result<FaqEntry> {
    let faq = FaqEntry {
      faq_id:     Uuid::new_v4(),
      department: input.department,
      question:   input.question,
      answer:     input.answer,
      tags:       input.tags,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(faq.faq_id);
    let department = encode_enum(faq.department);
    let question   = faq.question.clone();
    let answer     = faq.answer.clone();
    let tags       = serde_json::to_string(&faq.tags)?;
    let at         = encode_dt(faq.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO faq_entries ({FAQ_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
          rusqlite::params![id_str, department, question, answer, tags, at],
        )?;
        Ok(())
      })
      .await?;

    Ok(faq)
  }

  async fn add_document(&self, input: NewDocument, chunks: Vec<NewChunk>) -> Result<Document> {
    let document = Document {
      document_id: Uuid::new_v4(),
      department:  input.department,
      title:       input.title,
      content:     input.content,
      uploaded_by: input.uploaded_by,
      created_at:  Utc::now(),
      chunk_count: chunks.len(),
    };

    let doc_id      = encode_uuid(document.document_id);
    let department  = encode_enum(document.department);
    let title       = document.title.clone();
    let content     = document.content.clone();
    let uploaded_by = document.uploaded_by.clone();
    let at          = encode_dt(document.created_at);
    let rows = chunks
      .into_iter()
      .map(|c| Ok((c.chunk_index as i64, c.text, serde_json::to_string(&c.embedding)?)))
      .collect::<Result<Vec<_>>>()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO documents (
             document_id, department, title, content, uploaded_by, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![doc_id, department, title, content, uploaded_by, at],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO chunks (chunk_id, document_id, chunk_index, text, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for (index, text, embedding) in &rows {
            stmt.execute(rusqlite::params![
              encode_uuid(Uuid::new_v4()),
              doc_id,
              index,
              text,
              embedding,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(
      document_id = %document.document_id,
      chunks = document.chunk_count,
      "document stored"
    );
    Ok(document)
  }

  async fn chunk_candidates(
    &self,
    department: Option<Department>,
    limit: usize,
  ) -> Result<Vec<ChunkCandidate>> {
    let department = department.map(encode_enum);

    let raws: Vec<RawChunkCandidate> = self
      .conn
      .call(move |conn| {
        let rows = conn
          .prepare(
            "SELECT c.document_id, d.title, c.text, c.embedding
             FROM chunks c
             JOIN documents d ON d.document_id = c.document_id
             WHERE (?1 IS NULL OR d.department = ?1)
             ORDER BY d.created_at DESC, d.rowid DESC, c.chunk_index ASC
             LIMIT ?2",
          )?
          .query_map(rusqlite::params![department, limit as i64], |row| {
            Ok(RawChunkCandidate {
              document_id: row.get(0)?,
              title:       row.get(1)?,
              text:        row.get(2)?,
              embedding:   row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawChunkCandidate::into_candidate).collect()
  }

  async fn faq_candidates(
    &self,
    department: Option<Department>,
    limit: usize,
  ) -> Result<Vec<FaqEntry>> {
    let department = department.map(encode_enum);

    let raws: Vec<RawFaq> = self
      .conn
      .call(move |conn| {
        let rows = conn
          .prepare(&format!(
            "SELECT {FAQ_COLUMNS} FROM faq_entries
             WHERE (?1 IS NULL OR department = ?1)
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2"
          ))?
          .query_map(rusqlite::params![department, limit as i64], RawFaq::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFaq::into_faq).collect()
  }

  async fn search(&self, query: &KnowledgeQuery) -> Result<Page<KnowledgeHit>> {
    let (page, limit, offset) = page_window(query.page, query.limit);
    let department = query.department.map(encode_enum);
    let pattern    = like_pattern(Some(&query.text));

    let (total, raws): (i64, Vec<RawHit>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM ({HITS})"),
          rusqlite::params![department, pattern],
          |r| r.get(0),
        )?;

        let rows = conn
          .prepare(&format!(
            "SELECT id, kind, department, title, body, created_at FROM ({HITS})
             ORDER BY created_at DESC, rid DESC
             LIMIT ?3 OFFSET ?4"
          ))?
          .query_map(
            rusqlite::params![department, pattern, limit as i64, offset as i64],
            |row| {
              Ok(RawHit {
                id:         row.get(0)?,
                kind:       row.get(1)?,
                department: row.get(2)?,
                title:      row.get(3)?,
                body:       row.get(4)?,
                created_at: row.get(5)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    let items = raws.into_iter().map(RawHit::into_hit).collect::<Result<_>>()?;
    Ok(Page { page, limit, total: total.max(0) as usize, items })
  }
}
