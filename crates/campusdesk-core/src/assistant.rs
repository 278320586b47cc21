//! The routing orchestrator: the single entry point that turns one student
//! message into one reply and one trace.
//!
//! Per call the steps run strictly in order:
//!
//! 1. classify the intent;
//! 2. for informational and mixed intents, ask the knowledge agent, and
//!    either show its answer, escalate to a ticket, or offer one;
//! 3. for actionable intents, hand the message to the workflow agent;
//! 4. for mixed intents that mention a ticket and have not produced one yet,
//!    also run the workflow agent and append its reply;
//! 5. append a [`Trace`](crate::trace::Trace) recording all of the above.
//!
//! The knowledge agent always runs before the workflow agent; actionable
//! messages never reach the knowledge agent.
//!
//! Ticket creation and trace persistence are not transactional. If the
//! trace write fails after a ticket was opened, the ticket stays and the
//! error is returned.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  actor::{Actor, Department},
  agent::{KnowledgeAgent, WorkflowAgent},
  classify::{classify, detect_department},
  config::RoutingConfig,
  generate::Generator,
  knowledge::Citation,
  retrieve::Retriever,
  store::{TicketStore, TraceStore},
  trace::{AgentKind, Intent, NewTrace, Outcome, RouteLog},
};

/// Offered when knowledge could not answer and the caller did not opt into
/// automatic escalation.
pub const ASK_TO_CREATE_TICKET: &str =
  "I could not find enough trusted context to answer safely. Do you want me to create a support ticket?";

/// Prefix of the reply when a question was escalated automatically.
pub const ESCALATION_NOTICE: &str =
  "I could not answer from trusted sources, so I escalated this to staff.";

/// Subject of tickets opened by automatic escalation.
pub const ESCALATION_SUBJECT: &str = "Escalation from assistant";

const SUGGESTION_REASON: &str = "No trusted context found.";

// ─── Input / output ──────────────────────────────────────────────────────────

/// One inbound message. Validated by the caller before it reaches the core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageInput {
  pub message:                  String,
  pub department:               Option<Department>,
  pub subject:                  Option<String>,
  pub description:              Option<String>,
  /// Open a ticket automatically when knowledge cannot answer.
  #[serde(default)]
  pub create_ticket_on_decline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketSuggestion {
  pub allowed: bool,
  pub reason:  Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantResponse {
  pub trace_id:         Uuid,
  pub intent:           Intent,
  pub message:          String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub confidence:       Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub citations:        Option<Vec<Citation>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ticket_suggestion: Option<TicketSuggestion>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ticket_id:        Option<String>,
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

pub struct Assistant<R, G, T, A> {
  knowledge:            KnowledgeAgent<R, G>,
  workflow:             WorkflowAgent<T>,
  traces:               Arc<A>,
  confidence_threshold: f64,
}

impl<R, G, T, A> Assistant<R, G, T, A>
where
  R: Retriever,
  G: Generator,
  T: TicketStore,
  A: TraceStore,
{
  pub fn new(
    retriever: R,
    generator: G,
    tickets: Arc<T>,
    traces: Arc<A>,
    config: &RoutingConfig,
  ) -> Self {
    Self {
      knowledge: KnowledgeAgent::new(retriever, generator, config.top_k),
      workflow: WorkflowAgent::new(tickets),
      traces,
      confidence_threshold: config.confidence_threshold,
    }
  }

  /// Route one message from `actor` and record the decision.
  pub async fn route_message(
    &self,
    actor: &Actor,
    input: &MessageInput,
  ) -> Result<AssistantResponse> {
    let intent = classify(&input.message);
    let mut route = RouteLog::new();

    let mut message = String::new();
    let mut confidence = None;
    let mut citations = None;
    let mut ticket_id = None;
    let mut suggested = false;

    if intent.wants_knowledge() {
      route.record(AgentKind::Knowledge);
      let department = input
        .department
        .or(actor.department)
        .or_else(|| detect_department(&input.message));

      let answer = self.knowledge.answer(&input.message, department).await?;
      confidence = Some(answer.confidence);
      citations = Some(answer.citations);

      if answer.missing_context || answer.confidence < self.confidence_threshold {
        if input.create_ticket_on_decline {
          route.record(AgentKind::Workflow);
          let escalation = MessageInput {
            department: Some(input.department.or(department).unwrap_or(Department::It)),
            subject: Some(input.subject.clone().unwrap_or_else(|| ESCALATION_SUBJECT.to_owned())),
            description: Some(input.description.clone().unwrap_or_else(|| input.message.clone())),
            ..input.clone()
          };
          let reply = self.workflow.handle(actor, &escalation).await?;
          message = format!("{ESCALATION_NOTICE} {}", reply.message);
          ticket_id = reply.ticket_id;
          tracing::info!(
            user_id = %actor.user_id,
            confidence = answer.confidence,
            ticket_id = ?ticket_id,
            "escalated unanswered question"
          );
        } else {
          message = ASK_TO_CREATE_TICKET.to_owned();
          suggested = true;
        }
      } else {
        message = answer.message;
      }
    }

    if intent == Intent::Actionable {
      route.record(AgentKind::Workflow);
      let reply = self.workflow.handle(actor, input).await?;
      message = reply.message;
      ticket_id = reply.ticket_id;
    }

    if intent == Intent::Mixed
      && ticket_id.is_none()
      && input.message.to_lowercase().contains("ticket")
    {
      route.record(AgentKind::Workflow);
      let reply = self.workflow.handle(actor, input).await?;
      message = format!("{message}\n\n{}", reply.message);
      ticket_id = reply.ticket_id;
    }

    tracing::debug!(
      %intent,
      agents = ?route.agents(),
      ?confidence,
      "routed assistant message"
    );

    let trace = self
      .traces
      .append_trace(NewTrace {
        user_id:       actor.user_id.clone(),
        intent,
        confidence,
        routed_agents: route,
        outcome:       Outcome { message: message.clone(), ticket_id: ticket_id.clone() },
      })
      .await
      .map_err(Into::<Error>::into)
      .inspect_err(|e| {
        if let Some(id) = &ticket_id {
          tracing::warn!(ticket_id = %id, error = %e, "ticket created but trace not recorded");
        }
      })?;

    Ok(AssistantResponse {
      trace_id: trace.trace_id,
      intent,
      message,
      confidence,
      citations,
      ticket_suggestion: suggested.then(|| TicketSuggestion {
        allowed: true,
        reason:  Some(SUGGESTION_REASON.to_owned()),
      }),
      ticket_id,
    })
  }
}
