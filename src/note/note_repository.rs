use crate::error::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;
use super::note_models::{CalendarDay, Importance, Note, NoteStatus};

const NOTE_COLUMNS: &str =
    "id, user_id, title, content, note_date, deadline, importance, status, created_at, updated_at";

#[derive(Clone)]
pub struct NoteRepository {
    pool: PgPool,
}

#[derive(Debug, Default, Clone)]
pub struct NoteFilters {
    pub status: Option<NoteStatus>,
    pub importance: Option<Importance>,
    pub tag_id: Option<Uuid>,
}

/// Column values for a new note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub note_date: NaiveDate,
    pub deadline: Option<String>,
    pub importance: Option<Importance>,
    pub status: NoteStatus,
}

/// Partial update. `None` leaves a column untouched; for the nullable
/// columns `Some(None)` writes NULL.
#[derive(Debug, Default, Clone)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub note_date: Option<NaiveDate>,
    pub deadline: Option<Option<String>>,
    pub importance: Option<Option<Importance>>,
    pub status: Option<NoteStatus>,
}

impl NoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Notes of one user, optionally limited to an inclusive range of diary
    /// days. Returned in creation order; callers rank them.
    pub async fn find_all(
        &self,
        user_id: Uuid,
        range: Option<(NaiveDate, NaiveDate)>,
        filters: &NoteFilters,
    ) -> Result<Vec<Note>> {
        let mut query = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = $1");
        let mut params_count = 1;

        if range.is_some() {
            query.push_str(&format!(
                " AND note_date BETWEEN ${} AND ${}",
                params_count + 1,
                params_count + 2
            ));
            params_count += 2;
        }

        if filters.status.is_some() {
            params_count += 1;
            query.push_str(&format!(" AND status = ${}", params_count));
        }

        if filters.importance.is_some() {
            params_count += 1;
            query.push_str(&format!(" AND importance = ${}", params_count));
        }

        if filters.tag_id.is_some() {
            params_count += 1;
            query.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM note_tags nt WHERE nt.note_id = notes.id AND nt.tag_id = ${})",
                params_count
            ));
        }

        query.push_str(" ORDER BY created_at, id");

        let mut db_query = sqlx::query_as::<_, Note>(&query).bind(user_id);

        if let Some((first, last)) = range {
            db_query = db_query.bind(first).bind(last);
        }

        if let Some(status) = filters.status {
            db_query = db_query.bind(status.as_str());
        }

        if let Some(importance) = filters.importance {
            db_query = db_query.bind(importance.as_str());
        }

        if let Some(tag_id) = filters.tag_id {
            db_query = db_query.bind(tag_id);
        }

        let notes = db_query.fetch_all(&self.pool).await?;
        Ok(notes)
    }

    pub async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(note)
    }

    pub async fn exists(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM notes WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn create_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        note: &NewNote,
    ) -> Result<Note> {
        let note = sqlx::query_as::<_, Note>(&format!(
            "INSERT INTO notes (user_id, title, content, note_date, deadline, importance, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.note_date)
        .bind(note.deadline.as_deref())
        .bind(note.importance.map(|i| i.as_str()))
        .bind(note.status.as_str())
        .fetch_one(&mut **tx)
        .await?;

        Ok(note)
    }

    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &NoteChanges,
    ) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(&format!(
            "UPDATE notes SET
                title = COALESCE($1, title),
                content = COALESCE($2, content),
                note_date = COALESCE($3, note_date),
                deadline = CASE WHEN $4 THEN $5::TEXT ELSE deadline END,
                importance = CASE WHEN $6 THEN $7::TEXT ELSE importance END,
                status = COALESCE($8, status),
                updated_at = NOW()
             WHERE id = $9 AND user_id = $10
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(changes.title.as_deref())
        .bind(changes.content.as_deref())
        .bind(changes.note_date)
        .bind(changes.deadline.is_some())
        .bind(changes.deadline.clone().flatten())
        .bind(changes.importance.is_some())
        .bind(changes.importance.flatten().map(|i| i.as_str()))
        .bind(changes.status.map(|s| s.as_str()))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(note)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        user_id: Uuid,
        status: NoteStatus,
    ) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(&format!(
            "UPDATE notes SET status = $1, updated_at = NOW()
             WHERE id = $2 AND user_id = $3
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(note)
    }

    pub async fn touch_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(&format!(
            "UPDATE notes SET updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(note)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Full-text match on title and content, or a substring match on the
    /// name of any attached tag.
    pub async fn search(&self, user_id: Uuid, text: &str, limit: i64) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes
             WHERE user_id = $1 AND (
                search_vector @@ websearch_to_tsquery('simple', $2)
                OR EXISTS (
                    SELECT 1 FROM note_tags nt
                    JOIN tags t ON t.id = nt.tag_id
                    WHERE nt.note_id = notes.id
                      AND strpos(lower(t.name), lower($2)) > 0
                )
             )
             ORDER BY ts_rank(search_vector, websearch_to_tsquery('simple', $2)) DESC, created_at
             LIMIT $3"
        ))
        .bind(user_id)
        .bind(text)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    pub async fn count_by_day(
        &self,
        user_id: Uuid,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<CalendarDay>> {
        let days = sqlx::query_as::<_, CalendarDay>(
            "SELECT note_date AS date, COUNT(*) AS count
             FROM notes
             WHERE user_id = $1 AND note_date BETWEEN $2 AND $3
             GROUP BY note_date
             ORDER BY note_date"
        )
        .bind(user_id)
        .bind(first)
        .bind(last)
        .fetch_all(&self.pool)
        .await?;

        Ok(days)
    }
}
