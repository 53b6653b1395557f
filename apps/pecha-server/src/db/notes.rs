//! Note edit submission database operations

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;
use crate::pedurma::PedurmaNoteEdit;

/// Note edit submission repository
pub struct NoteEditRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> NoteEditRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a submission of note edits for a text
    pub async fn record(&self, text_id: &str, edits: &[PedurmaNoteEdit]) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let payload = serde_json::to_string(edits)?;

        sqlx::query(
            r#"
            INSERT INTO note_edits (id, text_id, payload, submitted_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(text_id)
        .bind(&payload)
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool)
        .await?;

        Ok(id)
    }

    /// Edits of the most recent submission for a text, empty when none
    pub async fn latest(&self, text_id: &str) -> Result<Vec<PedurmaNoteEdit>> {
        let payload = sqlx::query_scalar::<_, String>(
            r#"
            SELECT payload
            FROM note_edits
            WHERE text_id = ?
            ORDER BY submitted_at DESC, rowid DESC
            LIMIT 1
            "#,
        )
        .bind(text_id)
        .fetch_optional(self.pool)
        .await?;

        match payload {
            Some(payload) => Ok(serde_json::from_str(&payload)?),
            None => Ok(Vec::new()),
        }
    }
}
