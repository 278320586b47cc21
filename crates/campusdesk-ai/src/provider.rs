//! Runtime choice between the hosted model and the offline fallbacks.

use campusdesk_core::{
  embedding::{Embedder, HashEmbedder},
  generate::{ExtractiveGenerator, Generator},
};

use crate::{GeminiClient, GeminiConfig, Result};

/// The model backend the server runs with.
///
/// One concrete type for both traits, so the routing pipeline is
/// monomorphised once whatever the configuration says.
#[derive(Clone)]
pub enum Provider {
  Gemini(GeminiClient),
  Offline(HashEmbedder),
}

impl Provider {
  /// Gemini when `config` carries an API key, offline otherwise.
  pub fn from_config(config: Option<&GeminiConfig>) -> Result<Self> {
    match config {
      Some(cfg) if cfg.is_configured() => {
        tracing::info!(model = %cfg.model, embedding_model = %cfg.embedding_model, "using gemini");
        Ok(Self::Gemini(GeminiClient::new(cfg.clone())?))
      }
      _ => {
        tracing::warn!(
          "no gemini api key configured; falling back to hash embeddings and extractive answers"
        );
        Ok(Self::offline())
      }
    }
  }

  pub fn offline() -> Self { Self::Offline(HashEmbedder::default()) }

  pub fn name(&self) -> &'static str {
    match self {
      Self::Gemini(_) => "gemini",
      Self::Offline(_) => "offline",
    }
  }
}

impl Embedder for Provider {
  async fn embed(&self, text: &str) -> Vec<f64> {
    match self {
      Self::Gemini(client) => client.embed(text).await,
      Self::Offline(hash) => hash.embed(text).await,
    }
  }
}

impl Generator for Provider {
  async fn answer(&self, question: &str, contexts: &[String]) -> String {
    match self {
      Self::Gemini(client) => client.answer(question, contexts).await,
      Self::Offline(_) => ExtractiveGenerator.answer(question, contexts).await,
    }
  }
}
