use axum::{routing::{get, patch, put}, Router};

use crate::state::AppState;
use super::note_handlers::{
    create_note, delete_note, get_calendar, get_note, get_notes, note_stream, search_notes,
    set_note_tags, update_note, update_note_status,
};

pub fn note_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_notes).post(create_note))
        .route("/search", get(search_notes))
        .route("/calendar", get(get_calendar))
        .route("/stream", get(note_stream))
        .route(
            "/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/:id/status", patch(update_note_status))
        .route("/:id/tags", put(set_note_tags))
}
