//! [`GeminiClient`]: the Gemini REST API behind the core model traits.

use std::time::Duration;

use campusdesk_core::{
  embedding::{Embedder, HASH_DIMS, hash_embedding},
  generate::{ExtractiveGenerator, Generator, INSUFFICIENT_TOKEN, build_prompt},
};
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Error, GeminiConfig, Result};

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Part<'a> {
  text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
  parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
  model:   String,
  content: Content<'a>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
  embedding: Option<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
  #[serde(default)]
  values: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
  contents: [Content<'a>; 1],
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
  content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
  #[serde(default)]
  text: String,
}

impl GenerateResponse {
  /// Text of the first candidate, parts concatenated.
  fn text(self) -> String {
    self
      .candidates
      .into_iter()
      .next()
      .and_then(|c| c.content)
      .map(|c| c.parts.into_iter().map(|p| p.text).collect())
      .unwrap_or_default()
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Gemini REST client.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GeminiClient {
  client: Client,
  config: GeminiConfig,
}

impl GeminiClient {
  pub fn new(config: GeminiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, model: &str, method: &str) -> String {
    format!(
      "{}/models/{model}:{method}",
      self.config.endpoint.trim_end_matches('/')
    )
  }

  async fn post<Req: Serialize, Resp: DeserializeOwned>(
    &self,
    url: String,
    body: &Req,
  ) -> Result<Resp> {
    let resp = self
      .client
      .post(url)
      .header("x-goog-api-key", &self.config.api_key)
      .json(body)
      .send()
      .await?;

    if !resp.status().is_success() {
      let status = resp.status();
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status, body });
    }
    Ok(resp.json().await?)
  }

  /// `POST models/{embedding_model}:embedContent`. May return an empty vector.
  pub async fn try_embed(&self, text: &str) -> Result<Vec<f64>> {
    let model = &self.config.embedding_model;
    let request = EmbedRequest {
      model:   format!("models/{model}"),
      content: Content { parts: [Part { text }] },
    };
    let resp: EmbedResponse = self.post(self.url(model, "embedContent"), &request).await?;
    Ok(resp.embedding.map(|e| e.values).unwrap_or_default())
  }

  /// `POST models/{model}:generateContent` with the grounded prompt.
  pub async fn try_generate(&self, question: &str, contexts: &[String]) -> Result<String> {
    let prompt = build_prompt(question, contexts);
    let request = GenerateRequest {
      contents: [Content { parts: [Part { text: &prompt }] }],
    };
    let resp: GenerateResponse =
      self.post(self.url(&self.config.model, "generateContent"), &request).await?;
    Ok(resp.text())
  }
}

impl Embedder for GeminiClient {
  async fn embed(&self, text: &str) -> Vec<f64> {
    if text.trim().is_empty() {
      return Vec::new();
    }
    match self.try_embed(text).await {
      Ok(values) if !values.is_empty() => values,
      Ok(_) => {
        tracing::warn!("gemini returned an empty embedding; using hash fallback");
        hash_embedding(text, HASH_DIMS)
      }
      Err(e) => {
        tracing::warn!(error = %e, "gemini embedding call failed; using hash fallback");
        hash_embedding(text, HASH_DIMS)
      }
    }
  }
}

impl Generator for GeminiClient {
  async fn answer(&self, question: &str, contexts: &[String]) -> String {
    match self.try_generate(question, contexts).await {
      Ok(text) if text.trim().is_empty() => INSUFFICIENT_TOKEN.to_owned(),
      Ok(text) => text.trim().to_owned(),
      Err(e) => {
        tracing::warn!(error = %e, "gemini answer call failed; using extractive fallback");
        ExtractiveGenerator::reply(contexts)
      }
    }
  }
}
