use crate::error::Result;
use sqlx::PgPool;
use uuid::Uuid;
use super::tag_models::{NoteTag, Tag};

#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self, user_id: Uuid) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, user_id, name, color, created_at FROM tags
             WHERE user_id = $1 ORDER BY name"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    pub async fn create(&self, user_id: Uuid, name: &str, color: Option<&str>) -> Result<Tag> {
        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (user_id, name, color) VALUES ($1, $2, $3)
             RETURNING id, user_id, name, color, created_at"
        )
        .bind(user_id)
        .bind(name)
        .bind(color)
        .fetch_one(&self.pool)
        .await?;

        Ok(tag)
    }

    /// `clear_color` wins over `color`.
    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        name: Option<&str>,
        color: Option<&str>,
        clear_color: bool,
    ) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>(
            "UPDATE tags SET
                name = COALESCE($1, name),
                color = CASE WHEN $3 THEN NULL ELSE COALESCE($2, color) END
             WHERE id = $4 AND user_id = $5
             RETURNING id, user_id, name, color, created_at"
        )
        .bind(name)
        .bind(color)
        .bind(clear_color)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tag)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn find_for_notes(&self, note_ids: &[Uuid]) -> Result<Vec<NoteTag>> {
        if note_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, NoteTag>(
            "SELECT nt.note_id, t.id, t.user_id, t.name, t.color, t.created_at
             FROM note_tags nt
             JOIN tags t ON t.id = nt.tag_id
             WHERE nt.note_id = ANY($1)
             ORDER BY t.name"
        )
        .bind(note_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Replaces the tag set of a note. Only tags owned by `user_id` are
    /// linked; the return value is the number of links written so callers
    /// can detect foreign or unknown ids.
    pub async fn replace_note_tags_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        note_id: Uuid,
        user_id: Uuid,
        tag_ids: &[Uuid],
    ) -> Result<u64> {
        sqlx::query("DELETE FROM note_tags WHERE note_id = $1")
            .bind(note_id)
            .execute(&mut **tx)
            .await?;

        if tag_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "INSERT INTO note_tags (note_id, tag_id)
             SELECT $1, id FROM tags WHERE id = ANY($2) AND user_id = $3"
        )
        .bind(note_id)
        .bind(tag_ids)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }
}
