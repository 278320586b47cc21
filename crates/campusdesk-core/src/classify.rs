//! Rule-based intent classification and department detection.
//!
//! Both are plain substring lookups over lower-cased text, so short signals
//! such as `it` also hit inside longer words (`"with"`, `"submit"`). The
//! tables are public so callers and tests can enumerate every signal.

use crate::{actor::Department, trace::Intent};

/// Phrases that mean the user wants something done.
pub const WORKFLOW_SIGNALS: &[&str] = &[
  "ticket",
  "status",
  "open request",
  "create request",
  "escalate",
  "support request",
];

/// Phrases that mean the user wants to know something.
pub const INFORMATIONAL_SIGNALS: &[&str] = &[
  "where",
  "how",
  "what",
  "when",
  "who",
  "policy",
  "document",
  "registration",
  "it",
];

/// Department keyword groups, checked in order; the first hit wins.
pub const DEPARTMENT_SIGNALS: &[(Department, &[&str])] = &[
  (Department::It, &["it", "wifi", "network", "password"]),
  (Department::Registration, &["registration", "enroll", "document", "paper"]),
];

fn any_signal(lower: &str, signals: &[&str]) -> bool {
  signals.iter().any(|s| lower.contains(s))
}

/// Label a message as informational, actionable, or both.
///
/// A message with no signals at all is treated as an informational query.
pub fn classify(text: &str) -> Intent {
  let lower = text.to_lowercase();
  let workflow = any_signal(&lower, WORKFLOW_SIGNALS);
  let informational = any_signal(&lower, INFORMATIONAL_SIGNALS);

  match (workflow, informational) {
    (true, true) => Intent::Mixed,
    (true, false) => Intent::Actionable,
    (false, _) => Intent::Informational,
  }
}

/// Guess the department a message is about, if any keyword group matches.
pub fn detect_department(text: &str) -> Option<Department> {
  let lower = text.to_lowercase();
  DEPARTMENT_SIGNALS
    .iter()
    .find(|(_, signals)| any_signal(&lower, signals))
    .map(|(department, _)| *department)
}
