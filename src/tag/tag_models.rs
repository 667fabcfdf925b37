use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct Tag {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Join row used when loading the tags of several notes at once.
#[derive(Debug, Clone, FromRow)]
pub struct NoteTag {
    pub note_id: Uuid,
    #[sqlx(flatten)]
    pub tag: Tag,
}
