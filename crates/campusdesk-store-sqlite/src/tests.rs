//! Integration tests for `SqliteStore` against an in-memory database.

use campusdesk_core::{
  actor::Department,
  knowledge::{KnowledgeKind, NewChunk, NewDocument, NewFaq},
  store::{KnowledgeQuery, KnowledgeStore, TicketQuery, TicketStore, TraceStore},
  ticket::{EventKind, NewAttachment, NewTicket, TicketStatus},
  trace::{AgentKind, Intent, NewTrace, Outcome, RouteLog},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_ticket(department: Department, subject: &str) -> NewTicket {
  NewTicket {
    department,
    subject: subject.into(),
    description: format!("{subject}, please help"),
  }
}

// ─── Tickets ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_ticket() {
  let s = store().await;

  let ticket = s
    .create_ticket("student-1".into(), new_ticket(Department::It, "Wifi is down"))
    .await
    .unwrap();
  assert_eq!(ticket.status, TicketStatus::Open);
  assert_eq!(ticket.events.len(), 1);
  assert_eq!(ticket.events[0].kind, EventKind::Created);

  let fetched = s.get_ticket(&ticket.ticket_id).await.unwrap().unwrap();
  assert_eq!(fetched.ticket_id, ticket.ticket_id);
  assert_eq!(fetched.student_id, "student-1");
  assert_eq!(fetched.department, Department::It);
  assert_eq!(fetched.subject, "Wifi is down");
  assert_eq!(fetched.events.len(), 1);
  assert!(fetched.attachments.is_empty());
}

#[tokio::test]
async fn get_ticket_missing_returns_none() {
  let s = store().await;
  assert!(s.get_ticket("0123456789abcdef").await.unwrap().is_none());
}

#[tokio::test]
async fn claim_then_resolve_appends_events() {
  let s = store().await;
  let ticket = s
    .create_ticket("student-1".into(), new_ticket(Department::Registration, "Transcript"))
    .await
    .unwrap();

  let claimed = s
    .claim_ticket(ticket.ticket_id.clone(), "staff-1".into())
    .await
    .unwrap();
  assert_eq!(claimed.status, TicketStatus::InProgress);
  assert_eq!(claimed.assignee_id.as_deref(), Some("staff-1"));

  let resolved = s
    .update_status(ticket.ticket_id.clone(), "staff-1".into(), TicketStatus::Resolved)
    .await
    .unwrap();
  assert_eq!(resolved.status, TicketStatus::Resolved);
  assert_eq!(resolved.assignee_id.as_deref(), Some("staff-1"));

  let kinds: Vec<_> = resolved.events.iter().map(|e| e.kind).collect();
  assert_eq!(
    kinds,
    vec![EventKind::Created, EventKind::Claimed, EventKind::StatusChanged]
  );
  assert_eq!(resolved.events[2].payload["to"], "RESOLVED");
}

#[tokio::test]
async fn another_staff_member_can_take_over() {
  let s = store().await;
  let ticket = s
    .create_ticket("student-1".into(), new_ticket(Department::It, "Password reset"))
    .await
    .unwrap();

  s.claim_ticket(ticket.ticket_id.clone(), "staff-1".into()).await.unwrap();
  let retaken = s
    .claim_ticket(ticket.ticket_id.clone(), "staff-2".into())
    .await
    .unwrap();
  assert_eq!(retaken.assignee_id.as_deref(), Some("staff-2"));
}

#[tokio::test]
async fn resolved_ticket_cannot_move_backwards() {
  let s = store().await;
  let ticket = s
    .create_ticket("student-1".into(), new_ticket(Department::It, "Laptop"))
    .await
    .unwrap();
  s.update_status(ticket.ticket_id.clone(), "staff-1".into(), TicketStatus::Resolved)
    .await
    .unwrap();

  let err = s
    .claim_ticket(ticket.ticket_id.clone(), "staff-1".into())
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(campusdesk_core::Error::InvalidTransition {
      from: TicketStatus::Resolved,
      to:   TicketStatus::InProgress,
    })
  ));

  // Nothing was written by the rejected claim.
  let fetched = s.get_ticket(&ticket.ticket_id).await.unwrap().unwrap();
  assert_eq!(fetched.events.len(), 2);
  assert_eq!(fetched.status, TicketStatus::Resolved);
}

#[tokio::test]
async fn claim_unknown_ticket_is_not_found() {
  let s = store().await;
  let err = s
    .claim_ticket("doesnotexist00".into(), "staff-1".into())
    .await
    .unwrap_err();
  let core: campusdesk_core::Error = err.into();
  assert!(matches!(core, campusdesk_core::Error::TicketNotFound(id) if id == "doesnotexist00"));
}

#[tokio::test]
async fn list_tickets_filters_and_paginates() {
  let s = store().await;
  for i in 0..3 {
    s.create_ticket("student-1".into(), new_ticket(Department::It, &format!("Wifi {i}")))
      .await
      .unwrap();
  }
  s.create_ticket("student-2".into(), new_ticket(Department::Registration, "Enrollment"))
    .await
    .unwrap();

  let mine = s
    .list_tickets(&TicketQuery { student_id: Some("student-1".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(mine.total, 3);
  assert_eq!(mine.items[0].subject, "Wifi 2", "newest first");

  let registration = s
    .list_tickets(&TicketQuery { department: Some(Department::Registration), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(registration.total, 1);
  assert_eq!(registration.items[0].student_id, "student-2");

  let text = s
    .list_tickets(&TicketQuery { text: Some("ENROLL".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(text.total, 1);

  let second_page = s
    .list_tickets(&TicketQuery { page: Some(2), limit: Some(3), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(second_page.total, 4);
  assert_eq!(second_page.page, 2);
  assert_eq!(second_page.items.len(), 1);
  assert_eq!(second_page.items[0].subject, "Wifi 0");

  let open = s
    .list_tickets(&TicketQuery { status: Some(TicketStatus::Resolved), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(open.total, 0);
}

#[tokio::test]
async fn add_attachment_records_metadata_and_event() {
  let s = store().await;
  let ticket = s
    .create_ticket("student-1".into(), new_ticket(Department::Registration, "Transcript"))
    .await
    .unwrap();

  let attachment = s
    .add_attachment(
      ticket.ticket_id.clone(),
      "student-1".into(),
      NewAttachment {
        file_name:    "transcript.pdf".into(),
        mime_type:    "application/pdf".into(),
        size_bytes:   2048,
        storage_path: "uploads/transcript.pdf".into(),
      },
    )
    .await
    .unwrap();

  let fetched = s.get_ticket(&ticket.ticket_id).await.unwrap().unwrap();
  assert_eq!(fetched.attachments.len(), 1);
  assert_eq!(fetched.attachments[0].attachment_id, attachment.attachment_id);
  assert_eq!(fetched.attachments[0].size_bytes, 2048);
  assert_eq!(fetched.events.last().unwrap().kind, EventKind::AttachmentAdded);
}

#[tokio::test]
async fn add_attachment_rejects_bad_input() {
  let s = store().await;
  let bad_type = NewAttachment {
    file_name:    "setup.exe".into(),
    mime_type:    "application/x-msdownload".into(),
    size_bytes:   10,
    storage_path: "uploads/setup.exe".into(),
  };
  let ticket = s
    .create_ticket("student-1".into(), new_ticket(Department::It, "Install"))
    .await
    .unwrap();
  let err = s
    .add_attachment(ticket.ticket_id, "student-1".into(), bad_type.clone())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(campusdesk_core::Error::Invalid(_))));

  let missing = NewAttachment { mime_type: "text/plain".into(), ..bad_type };
  let err = s
    .add_attachment("nosuchticket00".into(), "student-1".into(), missing)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(campusdesk_core::Error::TicketNotFound(_))));
}

// ─── Knowledge ───────────────────────────────────────────────────────────────

fn faq(department: Department, question: &str, answer: &str, tags: &[&str]) -> NewFaq {
  NewFaq {
    department,
    question: question.into(),
    answer:   answer.into(),
    tags:     tags.iter().map(|t| t.to_string()).collect(),
  }
}

#[tokio::test]
async fn faq_candidates_filter_by_department() {
  let s = store().await;
  s.add_faq(faq(Department::It, "How do I reset my password?", "Use the portal.", &[]))
    .await
    .unwrap();
  s.add_faq(faq(Department::Registration, "When does enrollment open?", "In May.", &["dates"]))
    .await
    .unwrap();

  let it = s.faq_candidates(Some(Department::It), 10).await.unwrap();
  assert_eq!(it.len(), 1);
  assert_eq!(it[0].answer, "Use the portal.");

  let all = s.faq_candidates(None, 10).await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all[0].tags, vec!["dates".to_string()], "newest first");

  let capped = s.faq_candidates(None, 1).await.unwrap();
  assert_eq!(capped.len(), 1);
}

#[tokio::test]
async fn document_chunks_roundtrip_with_embeddings() {
  let s = store().await;
  let document = s
    .add_document(
      NewDocument {
        department:  Department::It,
        title:       "Wifi guide".into(),
        content:     "Connect to eduroam. Use your student id.".into(),
        uploaded_by: "staff-1".into(),
      },
      vec![
        NewChunk { chunk_index: 0, text: "Connect to eduroam.".into(), embedding: vec![0.6, 0.8] },
        NewChunk { chunk_index: 1, text: "Use your student id.".into(), embedding: vec![1.0, 0.0] },
      ],
    )
    .await
    .unwrap();
  assert_eq!(document.chunk_count, 2);

  let candidates = s.chunk_candidates(Some(Department::It), 250).await.unwrap();
  assert_eq!(candidates.len(), 2);
  assert_eq!(candidates[0].document_id, document.document_id);
  assert_eq!(candidates[0].title, "Wifi guide");
  assert_eq!(candidates[0].text, "Connect to eduroam.");
  assert_eq!(candidates[0].embedding, vec![0.6, 0.8]);

  let other = s.chunk_candidates(Some(Department::Registration), 250).await.unwrap();
  assert!(other.is_empty());
}

#[tokio::test]
async fn search_covers_faqs_tags_and_documents() {
  let s = store().await;
  s.add_faq(faq(Department::It, "How do I connect?", "Join eduroam.", &["WiFi"]))
    .await
    .unwrap();
  s.add_faq(faq(Department::Registration, "Transcript copies?", "Ask the office.", &[]))
    .await
    .unwrap();
  s.add_document(
    NewDocument {
      department:  Department::It,
      title:       "Campus wifi".into(),
      content:     "x".repeat(400),
      uploaded_by: "staff-1".into(),
    },
    vec![],
  )
  .await
  .unwrap();

  let wifi = s
    .search(&KnowledgeQuery { text: "wifi".into(), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(wifi.total, 2);
  assert_eq!(wifi.items[0].kind, KnowledgeKind::Document, "newest first");
  assert_eq!(wifi.items[0].excerpt.chars().count(), 220);
  assert_eq!(wifi.items[1].kind, KnowledgeKind::Faq);
  assert_eq!(wifi.items[1].title, "How do I connect?");

  let registration = s
    .search(&KnowledgeQuery {
      text: "".into(),
      department: Some(Department::Registration),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(registration.total, 1);

  let paged = s
    .search(&KnowledgeQuery { text: " ".into(), page: Some(2), limit: Some(2), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(paged.total, 3);
  assert_eq!(paged.items.len(), 1);
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
  let s = store().await;
  s.add_faq(faq(Department::It, "How to reset wifi", "Use the portal.", &[]))
    .await
    .unwrap();
  s.add_faq(faq(Department::Registration, "Is there a 50% refund?", "Before week_2 only.", &[]))
    .await
    .unwrap();

  let total = |text: &str| {
    let s = s.clone();
    let text = text.to_owned();
    async move {
      s.search(&KnowledgeQuery { text, ..Default::default() })
        .await
        .unwrap()
        .total
    }
  };

  assert_eq!(total("r_set").await, 0);
  assert_eq!(total("50%").await, 1);
  assert_eq!(total("week_2").await, 1);
  assert_eq!(total("%").await, 1);
  assert_eq!(total("_").await, 1);
}

#[tokio::test]
async fn ticket_text_filter_treats_wildcards_literally() {
  let s = store().await;
  s.create_ticket("student-1".into(), new_ticket(Department::It, "Reset password"))
    .await
    .unwrap();
  s.create_ticket("student-1".into(), new_ticket(Department::It, "Quota at 100%"))
    .await
    .unwrap();

  let count = |text: &str| TicketQuery { text: Some(text.into()), ..Default::default() };
  assert_eq!(s.list_tickets(&count("r_set")).await.unwrap().total, 0);
  assert_eq!(s.list_tickets(&count("%")).await.unwrap().total, 1);
  assert_eq!(s.list_tickets(&count("100%")).await.unwrap().total, 1);
}

// ─── Traces ──────────────────────────────────────────────────────────────────

fn trace_for(user_id: &str, intent: Intent, confidence: Option<f64>) -> NewTrace {
  NewTrace {
    user_id: user_id.into(),
    intent,
    confidence,
    routed_agents: RouteLog::from(vec![AgentKind::Knowledge, AgentKind::Workflow]),
    outcome: Outcome { message: "done".into(), ticket_id: Some("abc0123456".into()) },
  }
}

#[tokio::test]
async fn append_and_get_trace() {
  let s = store().await;
  let trace = s
    .append_trace(trace_for("student-1", Intent::Mixed, Some(0.42)))
    .await
    .unwrap();

  let fetched = s.get_trace(trace.trace_id).await.unwrap().unwrap();
  assert_eq!(fetched.intent, Intent::Mixed);
  assert_eq!(fetched.confidence, Some(0.42));
  assert_eq!(
    fetched.routed_agents.agents(),
    &[AgentKind::Knowledge, AgentKind::Workflow]
  );
  assert_eq!(fetched.outcome.ticket_id.as_deref(), Some("abc0123456"));

  assert!(s.get_trace(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn trace_without_knowledge_has_no_confidence() {
  let s = store().await;
  let trace = s
    .append_trace(trace_for("student-1", Intent::Actionable, None))
    .await
    .unwrap();
  let fetched = s.get_trace(trace.trace_id).await.unwrap().unwrap();
  assert_eq!(fetched.confidence, None);
}

#[tokio::test]
async fn list_traces_by_user_newest_first() {
  let s = store().await;
  s.append_trace(trace_for("student-1", Intent::Informational, Some(0.1))).await.unwrap();
  s.append_trace(trace_for("student-2", Intent::Actionable, None)).await.unwrap();
  s.append_trace(trace_for("student-1", Intent::Mixed, Some(0.9))).await.unwrap();

  let mine = s.list_traces(Some("student-1".into()), 10).await.unwrap();
  assert_eq!(mine.len(), 2);
  assert_eq!(mine[0].intent, Intent::Mixed);

  let all = s.list_traces(None, 2).await.unwrap();
  assert_eq!(all.len(), 2);
}
