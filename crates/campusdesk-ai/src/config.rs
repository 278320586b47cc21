use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Settings for the hosted model. An empty `api_key` means "run offline".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiConfig {
  #[serde(default)]
  pub api_key:         String,
  #[serde(default = "default_model")]
  pub model:           String,
  #[serde(default = "default_embedding_model")]
  pub embedding_model: String,
  #[serde(default = "default_endpoint")]
  pub endpoint:        String,
  /// Per-request timeout in seconds.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:    u64,
}

fn default_model() -> String { "gemini-1.5-flash".into() }
fn default_embedding_model() -> String { "text-embedding-004".into() }
fn default_endpoint() -> String { DEFAULT_ENDPOINT.into() }
fn default_timeout_secs() -> u64 { 30 }

impl Default for GeminiConfig {
  fn default() -> Self {
    Self {
      api_key:         String::new(),
      model:           default_model(),
      embedding_model: default_embedding_model(),
      endpoint:        default_endpoint(),
      timeout_secs:    default_timeout_secs(),
    }
  }
}

impl GeminiConfig {
  pub fn is_configured(&self) -> bool { !self.api_key.trim().is_empty() }
}
