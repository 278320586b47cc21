//! Knowledge ingestion: FAQ entries as-is, documents chunked and embedded.

use std::sync::Arc;

use crate::{
  Error, Result,
  embedding::Embedder,
  knowledge::{Document, FaqEntry, NewChunk, NewDocument, NewFaq},
  store::KnowledgeStore,
  text::chunk_text,
};

pub struct Ingestor<K, E> {
  store:      Arc<K>,
  embedder:   E,
  chunk_size: usize,
}

impl<K: KnowledgeStore, E: Embedder> Ingestor<K, E> {
  pub fn new(store: Arc<K>, embedder: E, chunk_size: usize) -> Self {
    Self { store, embedder, chunk_size }
  }

  pub async fn add_faq(&self, input: NewFaq) -> Result<FaqEntry> {
    if input.question.trim().is_empty() || input.answer.trim().is_empty() {
      return Err(Error::Invalid("FAQ question and answer are required".into()));
    }
    self.store.add_faq(input).await.map_err(Into::into)
  }

  /// Store a document, splitting its content into chunks and embedding each
  /// one. Chunks are computed once here and never recomputed.
  pub async fn add_document(&self, mut input: NewDocument) -> Result<Document> {
    input.content = input.content.trim().to_owned();
    if input.content.is_empty() {
      return Err(Error::Invalid("document content is required".into()));
    }

    let mut chunks = Vec::new();
    for (chunk_index, text) in chunk_text(&input.content, self.chunk_size)
      .into_iter()
      .enumerate()
    {
      let embedding = self.embedder.embed(&text).await;
      chunks.push(NewChunk { chunk_index, text, embedding });
    }

    let document = self
      .store
      .add_document(input, chunks)
      .await
      .map_err(Into::<Error>::into)?;

    tracing::info!(
      document_id = %document.document_id,
      chunks = document.chunk_count,
      "ingested document"
    );
    Ok(document)
  }
}
