//! Tunable constants for retrieval and routing.

use serde::{Deserialize, Serialize};

/// Routing thresholds and retrieval limits.
///
/// Every field has a default, so a config file may set any subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
  /// Knowledge answers below this mean relevance are not shown.
  pub confidence_threshold:  f64,
  /// Retrieved snippets scoring at or below this are discarded.
  pub relevance_floor:       f64,
  /// Maximum snippets handed to the generator.
  pub top_k:                 usize,
  /// Characters per document chunk.
  pub chunk_size:            usize,
  /// Dimensionality of the offline hash embedding.
  pub embedding_dims:        usize,
  pub chunk_candidate_limit: usize,
  pub faq_candidate_limit:   usize,
}

impl Default for RoutingConfig {
  fn default() -> Self {
    Self {
      confidence_threshold:  0.35,
      relevance_floor:       0.18,
      top_k:                 4,
      chunk_size:            700,
      embedding_dims:        64,
      chunk_candidate_limit: 250,
      faq_candidate_limit:   200,
    }
  }
}
