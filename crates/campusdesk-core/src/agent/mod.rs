//! The two agents the orchestrator routes messages to.
//!
//! - [`knowledge::KnowledgeAgent`] answers from trusted context.
//! - [`workflow::WorkflowAgent`] checks ticket status and opens tickets.

pub mod knowledge;
pub mod workflow;

pub use knowledge::{KnowledgeAgent, KnowledgeAnswer};
pub use workflow::{WorkflowAgent, WorkflowReply};
