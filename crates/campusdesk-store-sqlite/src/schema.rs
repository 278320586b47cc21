//! SQL schema for the campusdesk SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS tickets (
    ticket_id   TEXT PRIMARY KEY,
    student_id  TEXT NOT NULL,
    department  TEXT NOT NULL,   -- 'REGISTRATION' | 'IT'
    subject     TEXT NOT NULL,
    description TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'OPEN',
    assignee_id TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS ticket_events (
    event_id    TEXT PRIMARY KEY,
    ticket_id   TEXT NOT NULL REFERENCES tickets(ticket_id),
    actor_id    TEXT NOT NULL,
    kind        TEXT NOT NULL,
    payload     TEXT NOT NULL DEFAULT 'null',
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS attachments (
    attachment_id TEXT PRIMARY KEY,
    ticket_id     TEXT NOT NULL REFERENCES tickets(ticket_id),
    uploader_id   TEXT NOT NULL,
    file_name     TEXT NOT NULL,
    mime_type     TEXT NOT NULL,
    size_bytes    INTEGER NOT NULL,
    storage_path  TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS faq_entries (
    faq_id     TEXT PRIMARY KEY,
    department TEXT NOT NULL,
    question   TEXT NOT NULL,
    answer     TEXT NOT NULL,
    tags       TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS documents (
    document_id TEXT PRIMARY KEY,
    department  TEXT NOT NULL,
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    uploaded_by TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- Written once with their document; never re-embedded.
CREATE TABLE IF NOT EXISTS chunks (
    chunk_id    TEXT PRIMARY KEY,
    document_id TEXT NOT NULL REFERENCES documents(document_id),
    chunk_index INTEGER NOT NULL,
    text        TEXT NOT NULL,
    embedding   TEXT NOT NULL,   -- JSON array of floats
    UNIQUE (document_id, chunk_index)
);

-- Append-only audit log of assistant routing decisions.
CREATE TABLE IF NOT EXISTS traces (
    trace_id      TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL,
    intent        TEXT NOT NULL,
    confidence    REAL,          -- NULL iff the knowledge agent did not run
    routed_agents TEXT NOT NULL, -- JSON array of agent names, in order
    outcome       TEXT NOT NULL, -- JSON {message, ticket_id}
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS tickets_student_idx    ON tickets(student_id);
CREATE INDEX IF NOT EXISTS tickets_department_idx ON tickets(department, status);
CREATE INDEX IF NOT EXISTS events_ticket_idx      ON ticket_events(ticket_id);
CREATE INDEX IF NOT EXISTS attachments_ticket_idx ON attachments(ticket_id);
CREATE INDEX IF NOT EXISTS faq_department_idx     ON faq_entries(department);
CREATE INDEX IF NOT EXISTS documents_department_idx ON documents(department);
CREATE INDEX IF NOT EXISTS chunks_document_idx    ON chunks(document_id);
CREATE INDEX IF NOT EXISTS traces_user_idx        ON traces(user_id, created_at);

PRAGMA user_version = 1;
";
