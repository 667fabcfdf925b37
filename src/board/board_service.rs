use uuid::Uuid;

use crate::error::Result;
use crate::note::{ranking::RankClock, NoteResponse, NoteService, NoteStatus};
use super::board_models::{Board, BoardColumn};

#[derive(Clone)]
pub struct BoardService {
    notes: NoteService,
}

impl BoardService {
    pub fn new(notes: NoteService) -> Self {
        Self { notes }
    }

    pub async fn board(&self, user_id: Uuid, clock: &RankClock) -> Result<Board> {
        let ranked = self.notes.all_ranked(user_id, clock).await?;
        Ok(into_columns(ranked))
    }
}

/// Splits a ranked list by status. Each column keeps the relative order of
/// the input, so columns stay ranked.
pub fn into_columns(ranked: Vec<NoteResponse>) -> Board {
    let mut columns: Vec<BoardColumn> = NoteStatus::ALL
        .iter()
        .map(|&status| BoardColumn {
            status,
            notes: Vec::new(),
        })
        .collect();

    for note in ranked {
        if let Some(column) = columns.iter_mut().find(|c| c.status == note.note.status) {
            column.notes.push(note);
        }
    }

    Board { columns }
}
