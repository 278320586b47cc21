//! Relevance-ranked retrieval of trusted snippets.

use std::{future::Future, sync::Arc};

use crate::{
  Error, Result,
  actor::Department,
  config::RoutingConfig,
  embedding::{Embedder, hash_embedding},
  knowledge::RetrievedContext,
  store::KnowledgeStore,
  text::cosine_similarity,
};

/// Finds the trusted snippets most relevant to a query.
pub trait Retriever: Send + Sync {
  /// At most `top_k` snippets, best first, each scoring above the relevance
  /// floor.
  fn retrieve<'a>(
    &'a self,
    query: &'a str,
    department: Option<Department>,
    top_k: usize,
  ) -> impl Future<Output = Result<Vec<RetrievedContext>>> + Send + 'a;
}

/// [`Retriever`] over a [`KnowledgeStore`], scoring by cosine similarity.
///
/// Document chunks are scored against their stored embeddings. FAQ entries
/// carry no stored vector; each is scored against a hash embedding of
/// `question + " " + answer` sized to match the query vector.
pub struct StoreRetriever<K, E> {
  store:    Arc<K>,
  embedder: E,
  config:   RoutingConfig,
}

impl<K, E> StoreRetriever<K, E> {
  pub fn new(store: Arc<K>, embedder: E, config: RoutingConfig) -> Self {
    Self { store, embedder, config }
  }
}

impl<K: KnowledgeStore, E: Embedder> Retriever for StoreRetriever<K, E> {
  async fn retrieve(
    &self,
    query: &str,
    department: Option<Department>,
    top_k: usize,
  ) -> Result<Vec<RetrievedContext>> {
    let (query_vec, chunks, faqs) = tokio::join!(
      self.embedder.embed(query),
      self.store.chunk_candidates(department, self.config.chunk_candidate_limit),
      self.store.faq_candidates(department, self.config.faq_candidate_limit),
    );
    let chunks = chunks.map_err(Into::<Error>::into)?;
    let faqs = faqs.map_err(Into::<Error>::into)?;

    let faq_dims = if query_vec.is_empty() {
      self.config.embedding_dims
    } else {
      query_vec.len()
    };

    let chunk_hits = chunks.into_iter().map(|c| RetrievedContext {
      score:     cosine_similarity(&query_vec, &c.embedding),
      source_id: c.document_id,
      title:     c.title,
      text:      c.text,
    });

    let faq_hits = faqs.into_iter().map(|f| {
      let faq_vec = hash_embedding(&format!("{} {}", f.question, f.answer), faq_dims);
      RetrievedContext {
        score:     cosine_similarity(&query_vec, &faq_vec),
        source_id: f.faq_id,
        title:     f.question,
        text:      f.answer,
      }
    });

    let floor = self.config.relevance_floor;
    let mut hits: Vec<RetrievedContext> =
      chunk_hits.chain(faq_hits).filter(|c| c.score > floor).collect();

    // Stable: equal scores keep chunks ahead of FAQs.
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.truncate(top_k);

    tracing::debug!(
      query_dims = query_vec.len(),
      hits = hits.len(),
      ?department,
      "retrieved trusted context"
    );
    Ok(hits)
  }
}
