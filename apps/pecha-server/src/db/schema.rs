//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Texts marked completed per proofreading task
CREATE TABLE IF NOT EXISTS completed_tasks (
    task_name TEXT NOT NULL,
    text_id TEXT NOT NULL,
    completed_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_completed_tasks_task ON completed_tasks(task_name);

-- Note edit submissions, payload is the JSON array as received
CREATE TABLE IF NOT EXISTS note_edits (
    id TEXT PRIMARY KEY,
    text_id TEXT NOT NULL,
    payload TEXT NOT NULL,
    submitted_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_note_edits_text ON note_edits(text_id, submitted_at);
"#;
