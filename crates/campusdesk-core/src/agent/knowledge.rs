//! Grounded question answering over retrieved context.

use serde::Serialize;

use crate::{
  Result,
  actor::Department,
  generate::{Generator, is_insufficient},
  knowledge::Citation,
  retrieve::Retriever,
};

/// Shown when retrieval finds nothing above the relevance floor.
pub const NO_CONTEXT_MESSAGE: &str = "I do not have trusted context for this question.";

/// Shown in place of the generator's insufficiency token.
pub const INSUFFICIENT_MESSAGE: &str =
  "I could not find enough trusted context to answer safely.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeAnswer {
  pub message:         String,
  /// Mean relevance of the retrieved snippets, not a property of the answer.
  pub confidence:      f64,
  pub citations:       Vec<Citation>,
  /// The generator could not answer from the snippets, or there were none.
  pub missing_context: bool,
}

pub struct KnowledgeAgent<R, G> {
  retriever: R,
  generator: G,
  top_k:     usize,
}

impl<R: Retriever, G: Generator> KnowledgeAgent<R, G> {
  pub fn new(retriever: R, generator: G, top_k: usize) -> Self {
    Self { retriever, generator, top_k }
  }

  /// Answer `question` from trusted context, scoped to `department` if given.
  pub async fn answer(
    &self,
    question: &str,
    department: Option<Department>,
  ) -> Result<KnowledgeAnswer> {
    let contexts = self.retriever.retrieve(question, department, self.top_k).await?;

    if contexts.is_empty() {
      return Ok(KnowledgeAnswer {
        message:         NO_CONTEXT_MESSAGE.to_owned(),
        confidence:      0.0,
        citations:       Vec::new(),
        missing_context: true,
      });
    }

    let texts: Vec<String> = contexts.iter().map(|c| c.text.clone()).collect();
    let reply = self.generator.answer(question, &texts).await;

    let confidence =
      contexts.iter().map(|c| c.score).sum::<f64>() / contexts.len() as f64;
    let missing_context = is_insufficient(&reply);

    let message = if missing_context {
      INSUFFICIENT_MESSAGE.to_owned()
    } else {
      reply.trim().to_owned()
    };

    Ok(KnowledgeAnswer {
      message,
      confidence,
      citations: contexts.iter().map(Citation::from).collect(),
      missing_context,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    fixtures::{StubGenerator, StubRetriever, context},
    generate::INSUFFICIENT_TOKEN,
  };

  #[tokio::test]
  async fn no_context_short_circuits() {
    let generator = StubGenerator::replying("should not be used");
    let agent = KnowledgeAgent::new(StubRetriever::empty(), generator.clone(), 4);

    let answer = agent.answer("Anything at all?", None).await.unwrap();
    assert_eq!(answer.message, NO_CONTEXT_MESSAGE);
    assert_eq!(answer.confidence, 0.0);
    assert!(answer.missing_context);
    assert!(answer.citations.is_empty());
    assert_eq!(generator.calls(), 0);
  }

  #[tokio::test]
  async fn confidence_is_mean_score_and_answer_is_verbatim() {
    let retriever = StubRetriever::with(vec![
      context("Fees", "Fees are due in week 3.", 0.9),
      context("Deadlines", "Late fees apply after week 3.", 0.7),
    ]);
    let agent = KnowledgeAgent::new(retriever, StubGenerator::replying("  Pay by week 3.\n"), 4);

    let answer = agent.answer("When are fees due?", None).await.unwrap();
    assert!((answer.confidence - 0.8).abs() < 1e-9);
    assert!(!answer.missing_context);
    assert_eq!(answer.message, "Pay by week 3.");
    assert_eq!(answer.citations.len(), 2);
    assert_eq!(answer.citations[0].title, "Fees");
  }

  #[tokio::test]
  async fn insufficiency_token_is_replaced_but_flagged() {
    let retriever = StubRetriever::with(vec![context("Parking", "Lot B is closed.", 0.5)]);
    let agent = KnowledgeAgent::new(retriever, StubGenerator::replying(INSUFFICIENT_TOKEN), 4);

    let answer = agent.answer("Where do I print?", None).await.unwrap();
    assert!(answer.missing_context);
    assert_eq!(answer.message, INSUFFICIENT_MESSAGE);
    assert!((answer.confidence - 0.5).abs() < 1e-9);
    // Citations survive even when the answer is withheld.
    assert_eq!(answer.citations.len(), 1);
  }

  #[tokio::test]
  async fn generator_sees_contexts_in_rank_order() {
    let retriever = StubRetriever::with(vec![
      context("A", "first", 0.9),
      context("B", "second", 0.4),
    ]);
    let generator = StubGenerator::replying("ok");
    let agent = KnowledgeAgent::new(retriever, generator.clone(), 4);

    agent.answer("q", None).await.unwrap();
    assert_eq!(generator.last_contexts(), vec!["first".to_owned(), "second".to_owned()]);
  }

  #[tokio::test]
  async fn department_and_top_k_reach_the_retriever() {
    let retriever = StubRetriever::empty();
    let agent = KnowledgeAgent::new(retriever.clone(), StubGenerator::replying("x"), 4);

    agent.answer("q", Some(Department::It)).await.unwrap();
    assert_eq!(retriever.last_call(), Some((Some(Department::It), 4)));
  }
}
