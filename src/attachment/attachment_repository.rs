use crate::error::Result;
use sqlx::PgPool;
use uuid::Uuid;
use super::attachment_models::Attachment;

const ATTACHMENT_COLUMNS: &str =
    "id, note_id, user_id, object_key, file_name, content_type, size_bytes, created_at";

#[derive(Clone)]
pub struct AttachmentRepository {
    pool: PgPool,
}

impl AttachmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        id: Uuid,
        note_id: Uuid,
        user_id: Uuid,
        object_key: &str,
        file_name: &str,
        content_type: &str,
        size_bytes: i64,
    ) -> Result<Attachment> {
        let attachment = sqlx::query_as::<_, Attachment>(&format!(
            "INSERT INTO attachments (id, note_id, user_id, object_key, file_name, content_type, size_bytes)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {ATTACHMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(note_id)
        .bind(user_id)
        .bind(object_key)
        .bind(file_name)
        .bind(content_type)
        .bind(size_bytes)
        .fetch_one(&self.pool)
        .await?;

        Ok(attachment)
    }

    pub async fn find_by_note(&self, note_id: Uuid, user_id: Uuid) -> Result<Vec<Attachment>> {
        let attachments = sqlx::query_as::<_, Attachment>(&format!(
            "SELECT {ATTACHMENT_COLUMNS} FROM attachments
             WHERE note_id = $1 AND user_id = $2
             ORDER BY created_at"
        ))
        .bind(note_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attachments)
    }

    pub async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Attachment>> {
        let attachment = sqlx::query_as::<_, Attachment>(&format!(
            "SELECT {ATTACHMENT_COLUMNS} FROM attachments WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attachment)
    }

    pub async fn count_for_notes(&self, note_ids: &[Uuid]) -> Result<Vec<(Uuid, i64)>> {
        if note_ids.is_empty() {
            return Ok(Vec::new());
        }

        let counts = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT note_id, COUNT(*) FROM attachments
             WHERE note_id = ANY($1)
             GROUP BY note_id"
        )
        .bind(note_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM attachments WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
