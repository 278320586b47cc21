//! Grounded answer generation.
//!
//! A [`Generator`] must answer only from the trusted context it is given and
//! reply with [`INSUFFICIENT_TOKEN`] when that context does not cover the
//! question.

use std::{future::Future, sync::Arc};

/// Literal reply meaning "the trusted context does not answer this".
pub const INSUFFICIENT_TOKEN: &str = "CONTEXT_INSUFFICIENT.";

pub trait Generator: Send + Sync {
  /// Answer `question` from `contexts`, most relevant first.
  ///
  /// Implementations never fail; upstream errors degrade to
  /// [`ExtractiveGenerator`] behaviour.
  fn answer<'a>(
    &'a self,
    question: &'a str,
    contexts: &'a [String],
  ) -> impl Future<Output = String> + Send + 'a;
}

impl<T: Generator> Generator for Arc<T> {
  fn answer<'a>(
    &'a self,
    question: &'a str,
    contexts: &'a [String],
  ) -> impl Future<Output = String> + Send + 'a {
    (**self).answer(question, contexts)
  }
}

/// Whether a generator reply signals insufficient context.
pub fn is_insufficient(reply: &str) -> bool {
  let trimmed = reply.trim();
  trimmed == INSUFFICIENT_TOKEN || trimmed.contains("CONTEXT_INSUFFICIENT")
}

/// Number the contexts from 1 and separate them with blank lines.
pub fn context_block(contexts: &[String]) -> String {
  contexts
    .iter()
    .enumerate()
    .map(|(i, c)| format!("[{}] {c}", i + 1))
    .collect::<Vec<_>>()
    .join("\n\n")
}

/// The full instruction sent to a hosted model.
pub fn build_prompt(question: &str, contexts: &[String]) -> String {
  [
    "You are a college support assistant for registration and IT.".to_owned(),
    "Only answer from the provided trusted context.".to_owned(),
    format!("If context is insufficient, respond exactly with: {INSUFFICIENT_TOKEN}"),
    String::new(),
    format!("Question: {question}"),
    String::new(),
    format!("Trusted context:\n{}", context_block(contexts)),
  ]
  .join("\n")
}

/// Offline generator: returns the most relevant context verbatim.
///
/// A deliberately low-fidelity stand-in for a hosted model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractiveGenerator;

impl ExtractiveGenerator {
  pub fn reply(contexts: &[String]) -> String {
    contexts
      .first()
      .cloned()
      .unwrap_or_else(|| INSUFFICIENT_TOKEN.to_owned())
  }
}

impl Generator for ExtractiveGenerator {
  async fn answer(&self, _question: &str, contexts: &[String]) -> String {
    Self::reply(contexts)
  }
}
