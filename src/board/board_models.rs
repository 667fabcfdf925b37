use serde::Serialize;
use utoipa::ToSchema;

use crate::note::{NoteResponse, NoteStatus};

#[derive(Debug, Serialize, ToSchema)]
pub struct BoardColumn {
    pub status: NoteStatus,
    pub notes: Vec<NoteResponse>,
}

/// Kanban view: one column per status, always TODO, IN_PROGRESS, DONE.
#[derive(Debug, Serialize, ToSchema)]
pub struct Board {
    pub columns: Vec<BoardColumn>,
}
