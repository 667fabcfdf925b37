use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::ranking::Rankable;
use crate::tag::Tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Importance {
    Low,
    Medium,
    High,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Low => "LOW",
            Importance::Medium => "MEDIUM",
            Importance::High => "HIGH",
        }
    }
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kanban column a note sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoteStatus {
    Todo,
    InProgress,
    Done,
}

impl NoteStatus {
    pub const ALL: [NoteStatus; 3] = [NoteStatus::Todo, NoteStatus::InProgress, NoteStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteStatus::Todo => "TODO",
            NoteStatus::InProgress => "IN_PROGRESS",
            NoteStatus::Done => "DONE",
        }
    }
}

impl std::fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub note_date: NaiveDate,
    pub deadline: Option<String>,
    pub importance: Option<Importance>,
    pub status: NoteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A note as returned by the API, with its tags attached.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NoteResponse {
    #[serde(flatten)]
    pub note: Note,
    pub tags: Vec<Tag>,
    pub attachment_count: i64,
}

impl Rankable for Note {
    fn deadline(&self) -> Option<&str> {
        self.deadline.as_deref()
    }

    fn importance(&self) -> Option<Importance> {
        self.importance
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }
}

impl Rankable for NoteResponse {
    fn deadline(&self) -> Option<&str> {
        self.note.deadline()
    }

    fn importance(&self) -> Option<Importance> {
        self.note.importance
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.note.created_at)
    }
}

/// Per-day note count for the calendar month view.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NoteEventKind {
    Created,
    Updated,
    Deleted,
}

/// Change notification pushed to the owner's event stream.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NoteEvent {
    pub kind: NoteEventKind,
    pub note_id: Uuid,
    pub note: Option<NoteResponse>,
}
