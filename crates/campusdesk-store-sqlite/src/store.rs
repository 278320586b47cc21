//! [`SqliteStore`]: one SQLite file behind every campusdesk storage trait.
//!
//! The trait impls live in sibling modules (`tickets`, `knowledge`,
//! `traces`); this module owns the connection and schema setup.

use std::path::Path;

use campusdesk_core::store::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

use crate::{Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A campusdesk store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Translate a 1-based page and optional limit into `(page, limit, offset)`.
pub(crate) fn page_window(page: Option<usize>, limit: Option<usize>) -> (usize, usize, usize) {
  let page = page.unwrap_or(1).max(1);
  let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
  (page, limit, (page - 1) * limit)
}

/// `%text%` for a case-insensitive `LIKE ... ESCAPE '\'`, or `None` for a
/// blank filter. Wildcards in `text` match literally.
pub(crate) fn like_pattern(text: Option<&str>) -> Option<String> {
  let text = text.map(str::trim).filter(|t| !t.is_empty())?;
  let mut pattern = String::with_capacity(text.len() + 2);
  pattern.push('%');
  for c in text.to_lowercase().chars() {
    if matches!(c, '\\' | '%' | '_') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  Some(pattern)
}
