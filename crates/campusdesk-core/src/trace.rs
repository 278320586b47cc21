//! Routing traces: the append-only audit record of every assistant call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

/// Routing classification of an inbound message.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
  EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
  /// Answerable from trusted knowledge.
  Informational,
  /// Needs a ticket operation.
  Actionable,
  /// Both of the above.
  Mixed,
}

impl Intent {
  /// Whether the knowledge agent runs for this intent.
  pub fn wants_knowledge(self) -> bool { matches!(self, Self::Informational | Self::Mixed) }
}

/// An agent the orchestrator can hand a message to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
  EnumString, IntoStaticStr,
)]
pub enum AgentKind {
  #[serde(rename = "KnowledgeAgent")]
  #[strum(serialize = "KnowledgeAgent")]
  Knowledge,
  #[serde(rename = "WorkflowAgent")]
  #[strum(serialize = "WorkflowAgent")]
  Workflow,
}

/// The agents that ran during one routing call, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteLog(Vec<AgentKind>);

impl RouteLog {
  pub fn new() -> Self { Self::default() }

  pub fn record(&mut self, agent: AgentKind) { self.0.push(agent); }

  pub fn agents(&self) -> &[AgentKind] { &self.0 }
}

impl From<Vec<AgentKind>> for RouteLog {
  fn from(agents: Vec<AgentKind>) -> Self { Self(agents) }
}

/// What the caller was told.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
  pub message:   String,
  pub ticket_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
  pub trace_id:      Uuid,
  pub user_id:       String,
  pub intent:        Intent,
  /// Present if and only if the knowledge agent ran.
  pub confidence:    Option<f64>,
  pub routed_agents: RouteLog,
  pub outcome:       Outcome,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`TraceStore::append_trace`](crate::store::TraceStore::append_trace).
#[derive(Debug, Clone)]
pub struct NewTrace {
  pub user_id:       String,
  pub intent:        Intent,
  pub confidence:    Option<f64>,
  pub routed_agents: RouteLog,
  pub outcome:       Outcome,
}
