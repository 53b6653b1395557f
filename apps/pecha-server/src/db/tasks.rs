//! Completed task database operations

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::Result;

/// Completed task repository
pub struct TaskRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TaskRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a text as completed for a task
    pub async fn mark_completed(&self, task_name: &str, text_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO completed_tasks (task_name, text_id, completed_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(task_name)
        .bind(text_id)
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool)
        .await?;

        tracing::info!(task_name = %task_name, text_id = %text_id, "Task marked as completed");
        Ok(())
    }

    /// Text ids completed for a task, in the order they were recorded
    pub async fn list_completed(&self, task_name: &str) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT text_id
            FROM completed_tasks
            WHERE task_name = ?
            ORDER BY rowid ASC
            "#,
        )
        .bind(task_name)
        .fetch_all(self.pool)
        .await?;

        Ok(ids)
    }
}
